//! Postgres schema bootstrap and pool construction.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::error::{Error, Result};

/// Published per-repository totals.
pub const REPOSITORIES_TABLE: &str = "repositories";
/// Published per-author totals.
pub const USERS_TABLE: &str = "users";
/// Published per-(repository, author) totals.
pub const COMMITS_TABLE: &str = "commits";
/// Raw per-cycle aggregates, pruned by timestamp.
pub const HOURLY_COMMITS_TABLE: &str = "hourly_commits";

/// Connects a Postgres pool.
///
/// # Errors
///
/// Returns [`Error::Connect`] when the pool cannot be established.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|source| Error::Connect { source })
}

/// Runs the embedded schema migrations.
///
/// Idempotent; call at startup before serving or scheduling cycles.
///
/// # Errors
///
/// Returns [`Error::Migrate`] when a migration cannot be applied.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|source| Error::Migrate { source })
}
