//! # gitpulse-core
//!
//! Core primitives for the GitPulse commit-activity pipeline.
//!
//! This crate provides the types and pure transformations shared across all
//! GitPulse components:
//!
//! - **Shard Identifiers**: hour-resolution UTC buckets of the event feed
//! - **Author Fingerprints**: fixed-length pseudonyms for commit authors
//! - **Event Model**: decoded feed records and the push-commit mapper
//! - **Commit Aggregate**: associative reduction of commit records
//! - **Top-N Selection**: deterministic ranking of repository totals
//! - **Error Types**: shared error definitions and result types
//!
//! ## Crate Boundary
//!
//! `gitpulse-core` performs no I/O. Everything here is deterministic and
//! unit-testable; the ingest and store crates supply the network and
//! database halves.
//!
//! ## Example
//!
//! ```rust
//! use gitpulse_core::prelude::*;
//!
//! let author = AuthorFingerprint::from_email("dev@example.com");
//! assert_eq!(author.as_str().len(), 40);
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]

pub mod aggregate;
pub mod error;
pub mod event;
pub mod fingerprint;
pub mod observability;
pub mod select;
pub mod shard;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use gitpulse_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::aggregate::{
        CommitAggregate, CommitTotal, RepositoryTotal, RepositoryUserTotal, UserTotal,
    };
    pub use crate::error::{Error, Result};
    pub use crate::event::{commit_records, CommitRecord, RawEvent};
    pub use crate::fingerprint::AuthorFingerprint;
    pub use crate::select::top_repositories;
    pub use crate::shard::ShardId;
}

// Re-export key types at crate root for ergonomics
pub use aggregate::{CommitAggregate, CommitTotal, RepositoryTotal, RepositoryUserTotal, UserTotal};
pub use error::{Error, Result};
pub use event::{commit_records, CommitRecord, RawEvent};
pub use fingerprint::AuthorFingerprint;
pub use observability::{init_logging, LogFormat};
pub use select::top_repositories;
pub use shard::ShardId;
