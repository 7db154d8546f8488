//! Associative reduction of commit records.
//!
//! Fetch work is partitioned across workers and each worker reduces its
//! own shards independently; the partial aggregates are merged afterwards
//! in completion order. The reduction must therefore be associative and
//! commutative: aggregating a concatenation of record sequences equals
//! merging their independently computed aggregates key by key. Anything
//! order-dependent here is a correctness bug.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::event::CommitRecord;
use crate::fingerprint::AuthorFingerprint;

/// Aggregation key: (repository, author fingerprint).
pub type AggregateKey = (String, AuthorFingerprint);

/// Commit counts keyed by (repository, author fingerprint).
///
/// Built by pure folds; merged by key-wise summation. Iteration order is
/// the key order, so conversions are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitAggregate {
    totals: BTreeMap<AggregateKey, u64>,
}

impl CommitAggregate {
    /// Creates an empty aggregate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one commit record into the aggregate.
    pub fn absorb(&mut self, record: CommitRecord) {
        *self
            .totals
            .entry((record.repository, record.author))
            .or_insert(0) += record.weight;
    }

    /// Builds an aggregate from a record sequence.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = CommitRecord>) -> Self {
        let mut aggregate = Self::new();
        for record in records {
            aggregate.absorb(record);
        }
        aggregate
    }

    /// Merges another aggregate into this one by key-wise summation.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        for (key, weight) in other.totals {
            *self.totals.entry(key).or_insert(0) += weight;
        }
        self
    }

    /// Number of distinct (repository, author) keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    /// True when no records have been absorbed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Rolls the keyed totals up to per-repository totals.
    #[must_use]
    pub fn repository_totals(&self) -> BTreeMap<String, i64> {
        let mut rollup = BTreeMap::new();
        for ((repository, _), weight) in &self.totals {
            *rollup.entry(repository.clone()).or_insert(0) += clamp_count(*weight);
        }
        rollup
    }

    /// Converts the aggregate into row triples, key order.
    #[must_use]
    pub fn into_totals(self) -> Vec<CommitTotal> {
        self.totals
            .into_iter()
            .map(|((repository, author), weight)| CommitTotal {
                repository,
                author,
                n_commits: clamp_count(weight),
            })
            .collect()
    }

    /// Iterates over (key, count) pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&AggregateKey, u64)> + '_ {
        self.totals.iter().map(|(key, weight)| (key, *weight))
    }
}

fn clamp_count(weight: u64) -> i64 {
    i64::try_from(weight).unwrap_or(i64::MAX)
}

/// One aggregated (repository, author) commit count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitTotal {
    /// Full repository name.
    pub repository: String,
    /// Pseudonymized author.
    pub author: AuthorFingerprint,
    /// Summed commit count.
    pub n_commits: i64,
}

/// Published per-repository total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryTotal {
    /// Full repository name.
    pub name: String,
    /// Summed commit count across the retention window.
    pub n_commits: i64,
}

/// Published per-author total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTotal {
    /// Author fingerprint.
    pub hashed_email: String,
    /// Summed commit count across the surviving repositories.
    pub n_commits: i64,
}

/// Published per-(repository, author) total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryUserTotal {
    /// Full repository name.
    pub repository_name: String,
    /// Author fingerprint.
    pub user_hashed_email: String,
    /// Summed commit count.
    pub n_commits: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(repository: &str, email: &str) -> CommitRecord {
        CommitRecord {
            repository: repository.to_string(),
            author: AuthorFingerprint::from_email(email),
            weight: 1,
        }
    }

    #[test]
    fn aggregation_sums_weights_per_key() {
        let aggregate = CommitAggregate::from_records(vec![
            record("a/b", "x@example.com"),
            record("a/b", "x@example.com"),
            record("a/b", "y@example.com"),
        ]);
        assert_eq!(aggregate.len(), 2);
        let totals = aggregate.into_totals();
        let x = AuthorFingerprint::from_email("x@example.com");
        assert!(totals
            .iter()
            .any(|t| t.author == x && t.n_commits == 2 && t.repository == "a/b"));
    }

    #[test]
    fn merge_equals_direct_aggregation_for_any_partition() {
        let records = vec![
            record("a/b", "x@example.com"),
            record("c/d", "y@example.com"),
            record("a/b", "x@example.com"),
            record("a/b", "y@example.com"),
            record("c/d", "y@example.com"),
        ];
        let direct = CommitAggregate::from_records(records.clone());

        // Every split point, including empty partitions.
        for split in 0..=records.len() {
            let left = CommitAggregate::from_records(records[..split].to_vec());
            let right = CommitAggregate::from_records(records[split..].to_vec());
            assert_eq!(left.merge(right), direct, "split at {split}");
        }
    }

    #[test]
    fn merge_is_commutative() {
        let a = CommitAggregate::from_records(vec![
            record("a/b", "x@example.com"),
            record("c/d", "y@example.com"),
        ]);
        let b = CommitAggregate::from_records(vec![record("a/b", "y@example.com")]);
        assert_eq!(a.clone().merge(b.clone()), b.merge(a));
    }

    #[test]
    fn repository_totals_roll_up_authors() {
        let aggregate = CommitAggregate::from_records(vec![
            record("a/b", "x@example.com"),
            record("a/b", "y@example.com"),
            record("c/d", "y@example.com"),
        ]);
        let rollup = aggregate.repository_totals();
        assert_eq!(rollup.get("a/b"), Some(&2));
        assert_eq!(rollup.get("c/d"), Some(&1));
    }

    /// The worked example from the pipeline contract: two pushes to "a/b",
    /// three distinct commits by X, one non-distinct commit by Y.
    #[test]
    fn push_example_counts_only_distinct_commits() {
        use crate::event::{commit_records, CommitAuthor, EventCommit, EventPayload, EventRepo, RawEvent};

        let make = |commits: Vec<(bool, &str)>| RawEvent {
            kind: crate::event::PUSH_EVENT.to_string(),
            repo: EventRepo {
                name: "a/b".to_string(),
            },
            payload: EventPayload {
                commits: commits
                    .into_iter()
                    .enumerate()
                    .map(|(i, (distinct, email))| EventCommit {
                        sha: format!("sha{i}"),
                        distinct,
                        author: CommitAuthor {
                            email: email.to_string(),
                        },
                    })
                    .collect(),
            },
        };
        let event1 = make(vec![(true, "x@example.com"), (true, "x@example.com")]);
        let event2 = make(vec![(true, "x@example.com"), (false, "y@example.com")]);

        let mut aggregate = CommitAggregate::new();
        for event in [&event1, &event2] {
            for record in commit_records(event) {
                aggregate.absorb(record);
            }
        }

        let totals = aggregate.into_totals();
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].repository, "a/b");
        assert_eq!(totals[0].author, AuthorFingerprint::from_email("x@example.com"));
        assert_eq!(totals[0].n_commits, 3);
    }
}
