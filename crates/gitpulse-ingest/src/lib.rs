//! # gitpulse-ingest
//!
//! The fetch side of the GitPulse pipeline: shard retrieval, strict
//! decode, and parallel aggregation.
//!
//! - **Shard Fetcher**: HTTP retrieval and gzip/NDJSON decode of one
//!   hour-bucketed shard into a lazy event sequence
//! - **Worker Coordination**: fan-out of the cycle's shards across a
//!   bounded pool, fan-in via a structured join that propagates the
//!   first error and cancels remaining work
//!
//! Everything here is cycle-scoped: decoded events and commit records are
//! discarded once reduced, and nothing is retried within a cycle. Retry
//! happens only when the next external trigger starts a fresh cycle.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]

pub mod coordinator;
pub mod error;
pub mod fetch;
pub mod metrics;

pub use coordinator::{collect_commits, default_workers};
pub use error::{Error, Result};
pub use fetch::{ShardEvents, ShardFetcher, DEFAULT_FEED_BASE_URL};
