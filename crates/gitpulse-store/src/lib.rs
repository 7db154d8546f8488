//! # gitpulse-store
//!
//! The datastore side of the GitPulse pipeline.
//!
//! - **Schema**: the four Postgres relations and their migrations
//! - **Batch Statement Planner**: pure splitting of row sets into
//!   parameter-safe multi-row insert statements
//! - **Transactional Materializer**: all-or-nothing replacement of the
//!   published snapshot views from the raw per-cycle aggregates
//! - **Queries**: read-only pass-through listing of the published views
//!
//! The writer serializes through one transaction per cycle; readers
//! observe either the fully-prior or fully-new snapshot, never an
//! interleaving.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]

pub mod error;
pub mod materialize;
pub mod plan;
pub mod query;
pub mod schema;

pub use error::{Error, Result};
pub use materialize::{HourlyCommitRow, Materializer, MaterializeSummary, RepositoryRow};
pub use plan::{apply_batches, plan_insert_batches, BindRow, InsertBatch, MAX_BIND_PARAMS};
pub use schema::{connect, migrate};
