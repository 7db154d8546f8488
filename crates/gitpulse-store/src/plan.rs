//! Parameter-safe batch statement planning.
//!
//! Postgres caps the number of bind parameters one statement may carry,
//! so a cycle's row set is split into batches of at most
//! `floor(limit / arity)` rows, each rendered as one multi-row
//! `INSERT … ON CONFLICT DO NOTHING` statement. Planning is a pure
//! function of (rows, columns, limit) — no placeholder-index bookkeeping
//! threads through the apply step, and the templates are unit-testable
//! without a live connection.
//!
//! Conflict-ignore on the natural unique key makes applying a batch
//! idempotent under retry: re-applying the same batch cannot
//! double-count.

use std::fmt::Write as _;

use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{Postgres, Transaction};

use crate::error::{Error, Result};

/// The Postgres wire-protocol bind parameter limit (u16).
pub const MAX_BIND_PARAMS: usize = 65_535;

/// A row that can bind its columns onto a parameterized statement.
///
/// Columns must be bound in the same order they are named to the planner.
pub trait BindRow {
    /// Number of columns the row binds.
    const ARITY: usize;

    /// Binds this row's column values, in column order.
    fn bind<'q>(&'q self, query: Query<'q, Postgres, PgArguments>)
        -> Query<'q, Postgres, PgArguments>;
}

/// One planned insert statement and the rows it binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertBatch<R> {
    /// The statement template, `$n` placeholders laid out row-major.
    pub statement: String,
    /// The rows bound to the template, in placeholder order.
    pub rows: Vec<R>,
}

/// Splits `rows` into parameter-safe insert batches for `table`.
///
/// Every batch holds at most `floor(max_params / arity)` rows; the union
/// of all batches' rows equals the input multiset, in input order.
/// An empty input plans zero batches.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] when `columns` disagrees with the
/// row arity or when one row alone would exceed `max_params`.
pub fn plan_insert_batches<R: BindRow>(
    table: &str,
    columns: &[&str],
    rows: Vec<R>,
    max_params: usize,
) -> Result<Vec<InsertBatch<R>>> {
    if columns.len() != R::ARITY || R::ARITY == 0 {
        return Err(Error::invalid_input(format!(
            "table {table}: {} columns named for rows of arity {}",
            columns.len(),
            R::ARITY
        )));
    }
    let rows_per_batch = max_params / R::ARITY;
    if rows_per_batch == 0 {
        return Err(Error::invalid_input(format!(
            "table {table}: parameter limit {max_params} cannot fit one row of arity {}",
            R::ARITY
        )));
    }

    let mut batches = Vec::with_capacity(rows.len().div_ceil(rows_per_batch));
    let mut remaining = rows.into_iter();
    loop {
        let chunk: Vec<R> = remaining.by_ref().take(rows_per_batch).collect();
        if chunk.is_empty() {
            break;
        }
        batches.push(InsertBatch {
            statement: insert_statement(table, columns, chunk.len()),
            rows: chunk,
        });
    }
    Ok(batches)
}

/// Applies planned batches inside the given transaction.
///
/// Returns the number of rows actually inserted (conflicting rows are
/// ignored, not counted).
///
/// # Errors
///
/// Returns [`Error::Write`] on the first failing statement; the caller
/// owns the transaction and decides the rollback.
pub async fn apply_batches<R: BindRow>(
    tx: &mut Transaction<'_, Postgres>,
    batches: &[InsertBatch<R>],
) -> Result<u64> {
    let mut inserted = 0;
    for batch in batches {
        let mut query = sqlx::query(&batch.statement);
        for row in &batch.rows {
            query = row.bind(query);
        }
        let outcome = query
            .execute(&mut **tx)
            .await
            .map_err(|source| Error::write("apply insert batch", source))?;
        inserted += outcome.rows_affected();
    }
    Ok(inserted)
}

fn insert_statement(table: &str, columns: &[&str], row_count: usize) -> String {
    let mut sql = format!("INSERT INTO \"{table}\" ({}) VALUES ", columns.join(", "));
    let mut param = 0;
    for row in 0..row_count {
        if row > 0 {
            sql.push_str(", ");
        }
        sql.push('(');
        for col in 0..columns.len() {
            if col > 0 {
                sql.push_str(", ");
            }
            param += 1;
            let _ = write!(sql, "${param}");
        }
        sql.push(')');
    }
    sql.push_str(" ON CONFLICT DO NOTHING");
    sql
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct PairRow(i64, i64);

    impl BindRow for PairRow {
        const ARITY: usize = 2;

        fn bind<'q>(
            &'q self,
            query: Query<'q, Postgres, PgArguments>,
        ) -> Query<'q, Postgres, PgArguments> {
            query.bind(self.0).bind(self.1)
        }
    }

    fn rows(count: i64) -> Vec<PairRow> {
        (0..count).map(|i| PairRow(i, i * 10)).collect()
    }

    #[test]
    fn template_lays_placeholders_out_row_major() {
        let batches = plan_insert_batches("t", &["a", "b"], rows(2), 100).unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(
            batches[0].statement,
            "INSERT INTO \"t\" (a, b) VALUES ($1, $2), ($3, $4) ON CONFLICT DO NOTHING"
        );
    }

    #[test]
    fn batches_respect_the_parameter_limit() {
        // limit 7, arity 2 -> floor(7/2) = 3 rows per batch
        let batches = plan_insert_batches("t", &["a", "b"], rows(10), 7).unwrap();
        let sizes: Vec<usize> = batches.iter().map(|b| b.rows.len()).collect();
        assert_eq!(sizes, vec![3, 3, 3, 1]);
        for batch in &batches {
            assert!(batch.rows.len() * PairRow::ARITY <= 7);
        }
    }

    #[test]
    fn union_of_batches_equals_the_input_multiset() {
        let input = rows(10);
        let batches = plan_insert_batches("t", &["a", "b"], input.clone(), 7).unwrap();
        let rejoined: Vec<PairRow> = batches.into_iter().flat_map(|b| b.rows).collect();
        assert_eq!(rejoined, input);
    }

    #[test]
    fn empty_input_plans_no_batches() {
        let batches = plan_insert_batches("t", &["a", "b"], rows(0), 100).unwrap();
        assert!(batches.is_empty());
    }

    #[test]
    fn exact_multiple_has_no_short_tail() {
        let batches = plan_insert_batches("t", &["a", "b"], rows(6), 4).unwrap();
        let sizes: Vec<usize> = batches.iter().map(|b| b.rows.len()).collect();
        assert_eq!(sizes, vec![2, 2, 2]);
    }

    #[test]
    fn limit_too_small_for_one_row_is_rejected() {
        let err = plan_insert_batches("t", &["a", "b"], rows(1), 1).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn column_count_must_match_arity() {
        let err = plan_insert_batches("t", &["a"], rows(1), 100).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn every_statement_ends_with_conflict_ignore() {
        let batches = plan_insert_batches("t", &["a", "b"], rows(9), 4).unwrap();
        for batch in batches {
            assert!(batch.statement.ends_with("ON CONFLICT DO NOTHING"));
        }
    }
}
