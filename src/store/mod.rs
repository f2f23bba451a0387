//! Shared health state store
//!
//! The store is the only state visible outside a single process: the
//! authoritative health flag, last-activity timestamps per dimension and the
//! aggregate matched-metrics counter.
//!
//! Implementations must make every operation atomic per key under concurrent
//! callers, including callers in other processes. Nothing in this crate adds
//! distributed locking on top of that contract.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::domain::{Dimension, HealthState};
use crate::error::StoreError;
use async_trait::async_trait;

/// Key of the authoritative health flag
pub const HEALTH_STATE_KEY: &str = "health_state";
/// Key of the matched-metrics counter
pub const MATCHED_COUNT_KEY: &str = "counter.matched";

/// Cross-process health state store
#[async_trait]
pub trait HealthStore: Send + Sync {
    /// Total number of metrics that matched at least one pattern
    ///
    /// # Errors
    /// Returns `StoreError::Unavailable` on transport or storage failure.
    async fn matched_count(&self) -> Result<i64, StoreError>;

    /// Add to the matched-metrics counter, returning the new total
    ///
    /// Used by the ingestion engine; the probes only read the counter.
    async fn add_matched(&self, count: i64) -> Result<i64, StoreError>;

    /// Timestamp (unix seconds) of the last recorded activity, if any
    async fn last_activity(&self, dimension: Dimension) -> Result<Option<i64>, StoreError>;

    /// Record activity for a dimension at `timestamp` (unix seconds)
    async fn record_activity(&self, dimension: Dimension, timestamp: i64)
        -> Result<(), StoreError>;

    /// Record that the ingestion engine received metrics at `timestamp`
    async fn record_ingestion_heartbeat(&self, timestamp: i64) -> Result<(), StoreError> {
        self.record_activity(Dimension::Ingestion, timestamp).await
    }

    /// Current authoritative health flag
    async fn health_state(&self) -> Result<HealthState, StoreError>;

    /// Replace the authoritative health flag
    async fn set_health_state(&self, state: HealthState) -> Result<(), StoreError>;
}

fn decode_i64(key: &str, raw: &str) -> Result<i64, StoreError> {
    raw.trim().parse().map_err(|_| StoreError::Corrupt {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

fn decode_state(raw: &str) -> Result<HealthState, StoreError> {
    raw.parse().map_err(|_| StoreError::Corrupt {
        key: HEALTH_STATE_KEY.to_string(),
        value: raw.to_string(),
    })
}
