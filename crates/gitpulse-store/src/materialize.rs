//! Transactional materialization of the published snapshot.
//!
//! One transaction per cycle: prune the raw aggregates, insert the
//! cycle's rows, clear the three published views, and rebuild them from
//! the full retention window. Any step failure rolls the whole
//! transaction back (sqlx rolls back on drop), leaving the prior
//! snapshot visible to readers; the cycle then ends without retry.
//!
//! The prune runs before the insert so the cycle's own rows are never
//! evicted by their own retention pass.

use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{PgPool, Postgres};

use gitpulse_core::{top_repositories, CommitTotal};

use crate::error::{Error, Result};
use crate::plan::{apply_batches, plan_insert_batches, BindRow, MAX_BIND_PARAMS};
use crate::schema::{COMMITS_TABLE, HOURLY_COMMITS_TABLE, REPOSITORIES_TABLE, USERS_TABLE};

/// One raw per-cycle aggregate row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourlyCommitRow {
    /// Full repository name.
    pub repository_name: String,
    /// Author fingerprint.
    pub user_hashed_email: String,
    /// Summed commit count for this cycle.
    pub n_commits: i64,
}

impl From<CommitTotal> for HourlyCommitRow {
    fn from(total: CommitTotal) -> Self {
        Self {
            repository_name: total.repository,
            user_hashed_email: total.author.into_string(),
            n_commits: total.n_commits,
        }
    }
}

impl BindRow for HourlyCommitRow {
    const ARITY: usize = 3;

    fn bind<'q>(
        &'q self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Query<'q, Postgres, PgArguments> {
        query
            .bind(self.repository_name.as_str())
            .bind(self.user_hashed_email.as_str())
            .bind(self.n_commits)
    }
}

/// One published repository-total row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRow {
    /// Full repository name.
    pub name: String,
    /// Summed commit count across the retention window.
    pub n_commits: i64,
}

impl BindRow for RepositoryRow {
    const ARITY: usize = 2;

    fn bind<'q>(
        &'q self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Query<'q, Postgres, PgArguments> {
        query.bind(self.name.as_str()).bind(self.n_commits)
    }
}

/// Counters describing one committed materialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterializeSummary {
    /// Raw rows evicted by the retention prune.
    pub rows_pruned: u64,
    /// Raw rows inserted for this cycle (conflicts excluded).
    pub rows_inserted: u64,
    /// Repositories surviving top-N selection.
    pub repositories_published: usize,
}

/// Applies one cycle's aggregate and republishes the snapshot views.
///
/// At most one materialization may be active at a time; the cycle runner
/// enforces that with its single-flight guard.
#[derive(Debug, Clone)]
pub struct Materializer {
    pool: PgPool,
    retention_days: u32,
    top_repositories: usize,
    max_bind_params: usize,
}

impl Materializer {
    /// Creates a materializer over the given pool.
    #[must_use]
    pub fn new(pool: PgPool, retention_days: u32, top_repositories: usize) -> Self {
        Self {
            pool,
            retention_days,
            top_repositories,
            max_bind_params: MAX_BIND_PARAMS,
        }
    }

    /// Overrides the per-statement parameter limit (tests).
    #[must_use]
    pub fn with_max_bind_params(mut self, max_bind_params: usize) -> Self {
        self.max_bind_params = max_bind_params;
        self
    }

    /// Runs the whole materialization inside one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] from the first failing step. The
    /// transaction is rolled back and the previously published snapshot
    /// remains intact.
    pub async fn materialize(&self, totals: Vec<CommitTotal>) -> Result<MaterializeSummary> {
        let rows: Vec<HourlyCommitRow> = totals.into_iter().map(Into::into).collect();
        let hourly_batches = plan_insert_batches(
            HOURLY_COMMITS_TABLE,
            &["repository_name", "user_hashed_email", "n_commits"],
            rows,
            self.max_bind_params,
        )?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|source| Error::write("begin transaction", source))?;

        // Prune first: the cycle's own rows must survive their own
        // retention pass.
        let rows_pruned = sqlx::query(
            "DELETE FROM hourly_commits WHERE timestamp < now() - make_interval(days => $1)",
        )
        .bind(i32::try_from(self.retention_days).unwrap_or(i32::MAX))
        .execute(&mut *tx)
        .await
        .map_err(|source| Error::write("prune raw aggregates", source))?
        .rows_affected();

        let rows_inserted = apply_batches(&mut tx, &hourly_batches).await?;

        for table in [REPOSITORIES_TABLE, USERS_TABLE, COMMITS_TABLE] {
            sqlx::query(&format!("DELETE FROM \"{table}\""))
                .execute(&mut *tx)
                .await
                .map_err(|source| Error::write("clear published views", source))?;
        }

        // Rank over the full retention window, not just this cycle.
        let window_totals: Vec<(String, i64)> = sqlx::query_as(
            "SELECT repository_name, CAST(SUM(n_commits) AS BIGINT) \
             FROM hourly_commits GROUP BY repository_name",
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(|source| Error::write("read window totals", source))?;

        let winners = top_repositories(window_totals, self.top_repositories);
        let repository_rows: Vec<RepositoryRow> = winners
            .into_iter()
            .map(|(name, n_commits)| RepositoryRow { name, n_commits })
            .collect();
        let repositories_published = repository_rows.len();

        let repository_batches = plan_insert_batches(
            REPOSITORIES_TABLE,
            &["name", "n_commits"],
            repository_rows,
            self.max_bind_params,
        )?;
        apply_batches(&mut tx, &repository_batches).await?;

        sqlx::query(
            "INSERT INTO commits (repository_name, user_hashed_email, n_commits) \
             SELECT h.repository_name, h.user_hashed_email, CAST(SUM(h.n_commits) AS BIGINT) \
             FROM hourly_commits h \
             JOIN repositories r ON h.repository_name = r.name \
             GROUP BY h.repository_name, h.user_hashed_email",
        )
        .execute(&mut *tx)
        .await
        .map_err(|source| Error::write("republish repository-user totals", source))?;

        sqlx::query(
            "INSERT INTO users (hashed_email, n_commits) \
             SELECT user_hashed_email, CAST(SUM(n_commits) AS BIGINT) \
             FROM commits GROUP BY user_hashed_email",
        )
        .execute(&mut *tx)
        .await
        .map_err(|source| Error::write("republish user totals", source))?;

        tx.commit()
            .await
            .map_err(|source| Error::write("commit transaction", source))?;

        let summary = MaterializeSummary {
            rows_pruned,
            rows_inserted,
            repositories_published,
        };
        tracing::info!(
            rows_pruned = summary.rows_pruned,
            rows_inserted = summary.rows_inserted,
            repositories_published = summary.repositories_published,
            "materialized snapshot"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitpulse_core::AuthorFingerprint;

    #[test]
    fn hourly_row_from_commit_total() {
        let total = CommitTotal {
            repository: "a/b".to_string(),
            author: AuthorFingerprint::from_email("x@example.com"),
            n_commits: 3,
        };
        let row = HourlyCommitRow::from(total);
        assert_eq!(row.repository_name, "a/b");
        assert_eq!(row.user_hashed_email.len(), 40);
        assert_eq!(row.n_commits, 3);
    }
}
