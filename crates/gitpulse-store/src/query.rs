//! Read-only queries over the published snapshot views.
//!
//! Pass-through table reads for the query surface. These run against the
//! shared pool alongside the single writer; transaction isolation on the
//! write side guarantees they see either the fully-prior or fully-new
//! snapshot, never a mix.

use sqlx::PgPool;

use gitpulse_core::{RepositoryTotal, RepositoryUserTotal, UserTotal};

use crate::error::{Error, Result};

/// Lists published repository totals, largest first.
///
/// # Errors
///
/// Returns [`Error::Read`] when the query fails.
pub async fn repository_totals(pool: &PgPool) -> Result<Vec<RepositoryTotal>> {
    let rows: Vec<(String, i64)> =
        sqlx::query_as("SELECT name, n_commits FROM repositories ORDER BY n_commits DESC, name")
            .fetch_all(pool)
            .await
            .map_err(|source| Error::read("list repositories", source))?;
    Ok(rows
        .into_iter()
        .map(|(name, n_commits)| RepositoryTotal { name, n_commits })
        .collect())
}

/// Lists published user totals, largest first.
///
/// # Errors
///
/// Returns [`Error::Read`] when the query fails.
pub async fn user_totals(pool: &PgPool) -> Result<Vec<UserTotal>> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT hashed_email, n_commits FROM users ORDER BY n_commits DESC, hashed_email",
    )
    .fetch_all(pool)
    .await
    .map_err(|source| Error::read("list users", source))?;
    Ok(rows
        .into_iter()
        .map(|(hashed_email, n_commits)| UserTotal {
            hashed_email,
            n_commits,
        })
        .collect())
}

/// Lists published per-(repository, author) totals, largest first.
///
/// # Errors
///
/// Returns [`Error::Read`] when the query fails.
pub async fn repository_user_totals(pool: &PgPool) -> Result<Vec<RepositoryUserTotal>> {
    let rows: Vec<(String, String, i64)> = sqlx::query_as(
        "SELECT repository_name, user_hashed_email, n_commits FROM commits \
         ORDER BY n_commits DESC, repository_name, user_hashed_email",
    )
    .fetch_all(pool)
    .await
    .map_err(|source| Error::read("list repository-user totals", source))?;
    Ok(rows
        .into_iter()
        .map(
            |(repository_name, user_hashed_email, n_commits)| RepositoryUserTotal {
                repository_name,
                user_hashed_email,
                n_commits,
            },
        )
        .collect())
}

/// Verifies datastore connectivity.
///
/// # Errors
///
/// Returns [`Error::Read`] when the round-trip fails.
pub async fn ping(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(|source| Error::read("ping", source))?;
    Ok(())
}
