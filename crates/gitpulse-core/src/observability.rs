//! Observability infrastructure for GitPulse.
//!
//! Structured logging with consistent spans. This module provides
//! initialization helpers and span constructors used across all
//! components.

use std::sync::Once;

use tracing::Span;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Log output format.
#[derive(Debug, Clone, Copy, Default)]
pub enum LogFormat {
    /// JSON structured logs (for production).
    Json,
    /// Pretty-printed logs (for development).
    #[default]
    Pretty,
}

/// Initializes the logging subsystem.
///
/// Call once at application startup. Safe to call multiple times;
/// subsequent calls are no-ops.
///
/// # Environment Variables
///
/// - `RUST_LOG`: Controls log levels (e.g., `info`, `gitpulse_ingest=debug`)
pub fn init_logging(format: LogFormat) {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        match format {
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().json())
                    .init();
            }
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().pretty())
                    .init();
            }
        }
    });
}

/// Creates a span for one ingestion-materialization cycle.
#[must_use]
pub fn cycle_span(first_shard: &str, shard_count: usize) -> Span {
    tracing::info_span!(
        "cycle",
        first_shard = first_shard,
        shard_count = shard_count,
    )
}

/// Creates a span for work scoped to a single shard.
#[must_use]
pub fn shard_span(operation: &str, shard: &str) -> Span {
    tracing::info_span!("shard", op = operation, shard = shard)
}
