//! Deterministic top-N selection over repository totals.

/// Returns the `cap` repositories with the largest totals, sorted
/// descending by total.
///
/// Equal totals are broken by repository name ascending, so repeated runs
/// on identical input always produce the identical ordered set. The
/// upstream behavior relied on incidental iteration order; the tie rule is
/// fixed here instead. A cap of zero yields an empty result.
#[must_use]
pub fn top_repositories(
    totals: impl IntoIterator<Item = (String, i64)>,
    cap: usize,
) -> Vec<(String, i64)> {
    let mut ranked: Vec<(String, i64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(cap);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(pairs: &[(&str, i64)]) -> Vec<(String, i64)> {
        pairs.iter().map(|(n, c)| ((*n).to_string(), *c)).collect()
    }

    #[test]
    fn ties_break_by_name_ascending() {
        let result = top_repositories(totals(&[("B", 10), ("C", 5), ("A", 10)]), 2);
        assert_eq!(result, totals(&[("A", 10), ("B", 10)]));
    }

    #[test]
    fn orders_descending_and_truncates() {
        let result = top_repositories(totals(&[("a", 1), ("b", 3), ("c", 2)]), 2);
        assert_eq!(result, totals(&[("b", 3), ("c", 2)]));
    }

    #[test]
    fn cap_larger_than_input_returns_everything() {
        let result = top_repositories(totals(&[("a", 1), ("b", 3)]), 10);
        assert_eq!(result, totals(&[("b", 3), ("a", 1)]));
    }

    #[test]
    fn zero_cap_is_empty() {
        assert!(top_repositories(totals(&[("a", 1)]), 0).is_empty());
    }

    #[test]
    fn identical_input_is_stable_across_runs() {
        let input = totals(&[("x/one", 7), ("x/two", 7), ("x/three", 7), ("y", 9)]);
        let first = top_repositories(input.clone(), 3);
        let second = top_repositories(input, 3);
        assert_eq!(first, second);
        assert_eq!(first, totals(&[("y", 9), ("x/one", 7), ("x/three", 7)]));
    }
}
