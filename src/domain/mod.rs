//! Domain models for selfwatch
//!
//! This module contains the domain types shared by probes, store and monitor.
//! Types are validated on construction (fail-fast pattern).

pub mod contact;
pub mod duration;
pub mod health;

pub use contact::Contact;
pub use duration::{parse_duration, parse_positive_duration};
pub use health::{BreachReason, Dimension, HealthState};
