//! `gitpulse` binary entrypoint.
//!
//! Loads configuration from environment variables, prepares the schema,
//! spawns the cycle scheduler, and serves the query surface.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::signal;

use gitpulse_api::config::Config;
use gitpulse_api::cycle::{run_scheduler, CycleRunner};
use gitpulse_api::server::{router, AppState};
use gitpulse_core::observability::{init_logging, LogFormat};
use gitpulse_ingest::{default_workers, ShardFetcher};
use gitpulse_store::Materializer;

fn choose_log_format(config: &Config) -> LogFormat {
    if config.debug {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_logging(choose_log_format(&config));
    tracing::info!(?config, "starting gitpulse");

    let pool = gitpulse_store::connect(&config.database_url, config.db_max_connections)
        .await
        .context("failed to connect to postgres")?;
    gitpulse_store::migrate(&pool)
        .await
        .context("schema migration failed")?;

    let fetcher = ShardFetcher::new(&config.feed_base_url)?;
    let materializer = Materializer::new(pool.clone(), config.retention_days, config.top_repositories);
    let runner = Arc::new(CycleRunner::new(
        fetcher,
        materializer,
        config.shards_per_cycle,
        default_workers(),
    ));
    let scheduler = tokio::spawn(run_scheduler(
        runner,
        Duration::from_secs(config.cycle_interval_secs),
    ));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, router(AppState { pool }).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server shutdown")?;

    scheduler.abort();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::warn!(?err, "failed to listen for CTRL+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => tracing::warn!(?err, "failed to listen for TERM signal"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
