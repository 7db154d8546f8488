//! Ingest metrics.
//!
//! Exposed via the `metrics` crate facade; installing an exporter is a
//! deployment concern and happens in the service binary, not here.

/// Metric names as constants for consistency.
pub mod names {
    /// Counter: shards fetched from the feed.
    pub const SHARDS_FETCHED_TOTAL: &str = "gitpulse_shards_fetched_total";
    /// Counter: event records decoded from shard bodies.
    pub const EVENTS_DECODED_TOTAL: &str = "gitpulse_events_decoded_total";
    /// Counter: commit records extracted from push events.
    pub const COMMIT_RECORDS_TOTAL: &str = "gitpulse_commit_records_total";
}
