//! selfwatch - self-monitoring for a metric alerting pipeline
//!
//! This library provides heartbeat probes over the ingestion and matching
//! stages, an anomaly detector for the matched-metrics rate, a shared health
//! state store and a monitor that alerts when the pipeline itself stops
//! working.
//!
//! # Modules
//!
//! - [`cli`]: Command-line interface definitions
//! - [`clock`]: Wall-clock abstraction
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`domain`]: Domain models with validation
//! - [`error`]: Error types
//! - [`heartbeat`]: Ingestion and match-rate probes
//! - [`notify`]: Notice delivery
//! - [`selfstate`]: Self-state monitor
//! - [`services`]: Pipeline wiring and task supervision
//! - [`store`]: Shared health state store

pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod heartbeat;
pub mod notify;
pub mod selfstate;
pub mod services;
pub mod store;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{AppError, Result};
