//! Service layer
//!
//! Wires the store, probes and monitor together and supervises the
//! resulting background tasks.

pub mod pipeline;
pub mod supervisor;

pub use pipeline::{open_store, Pipeline};
pub use supervisor::{Supervisor, TaskHandle};
