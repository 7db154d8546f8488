//! Error types for the ingest domain.
//!
//! Fetch and decode failures abort the owning worker and, by propagation,
//! the whole cycle. No variant here is retried internally.

use gitpulse_core::ShardId;

/// The result type used throughout `gitpulse-ingest`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while fetching and reducing shards.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The feed HTTP client could not be constructed.
    #[error("failed to build feed client: {source}")]
    Client {
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The feed could not be reached or returned a failure status.
    #[error("fetch failed for shard {shard}: {message}")]
    Fetch {
        /// The shard being fetched.
        shard: ShardId,
        /// Description of the failure.
        message: String,
        /// The underlying transport error, if any.
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The shard body was corrupt or malformed.
    ///
    /// A shard is decoded as a unit: one bad record invalidates all of it.
    #[error("decode failed for shard {shard} at line {line}: {message}")]
    Decode {
        /// The shard being decoded.
        shard: ShardId,
        /// 1-based line number within the decompressed stream.
        line: usize,
        /// Description of the failure.
        message: String,
    },

    /// A worker task panicked or was cancelled before reporting.
    #[error("worker failed: {message}")]
    Worker {
        /// Description of the failure.
        message: String,
    },
}

impl Error {
    /// Creates a fetch error without a transport cause.
    #[must_use]
    pub fn fetch(shard: ShardId, message: impl Into<String>) -> Self {
        Self::Fetch {
            shard,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a fetch error with a transport cause.
    #[must_use]
    pub fn fetch_with_source(
        shard: ShardId,
        message: impl Into<String>,
        source: reqwest::Error,
    ) -> Self {
        Self::Fetch {
            shard,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates a decode error.
    #[must_use]
    pub fn decode(shard: ShardId, line: usize, message: impl Into<String>) -> Self {
        Self::Decode {
            shard,
            line,
            message: message.into(),
        }
    }

    /// Creates a worker error.
    #[must_use]
    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker {
            message: message.into(),
        }
    }
}
