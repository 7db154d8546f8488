//! # gitpulse-api
//!
//! The GitPulse service crate: environment configuration, the periodic
//! cycle runner with its single-flight guard, and the read-only HTTP
//! surface over the published views.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod config;
pub mod cycle;
pub mod error;
pub mod server;

pub use config::Config;
pub use cycle::{run_scheduler, CycleError, CycleOutcome, CycleRunner};
pub use server::{router, AppState};
