//! In-process store
//!
//! Used when every role runs inside one process, and in tests.

use super::{decode_i64, decode_state, HealthStore, HEALTH_STATE_KEY, MATCHED_COUNT_KEY};
use crate::domain::{Dimension, HealthState};
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Mutex-guarded key/value store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.values
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl HealthStore for MemoryStore {
    async fn matched_count(&self) -> Result<i64, StoreError> {
        let values = self.lock()?;
        match values.get(MATCHED_COUNT_KEY) {
            Some(raw) => decode_i64(MATCHED_COUNT_KEY, raw),
            None => Ok(0),
        }
    }

    async fn add_matched(&self, count: i64) -> Result<i64, StoreError> {
        let mut values = self.lock()?;
        let current = match values.get(MATCHED_COUNT_KEY) {
            Some(raw) => decode_i64(MATCHED_COUNT_KEY, raw)?,
            None => 0,
        };
        let total = current.saturating_add(count);
        values.insert(MATCHED_COUNT_KEY.to_string(), total.to_string());
        Ok(total)
    }

    async fn last_activity(&self, dimension: Dimension) -> Result<Option<i64>, StoreError> {
        let values = self.lock()?;
        values
            .get(dimension.key())
            .map(|raw| decode_i64(dimension.key(), raw))
            .transpose()
    }

    async fn record_activity(
        &self,
        dimension: Dimension,
        timestamp: i64,
    ) -> Result<(), StoreError> {
        self.lock()?
            .insert(dimension.key().to_string(), timestamp.to_string());
        Ok(())
    }

    async fn health_state(&self) -> Result<HealthState, StoreError> {
        let values = self.lock()?;
        match values.get(HEALTH_STATE_KEY) {
            Some(raw) => decode_state(raw),
            None => Ok(HealthState::default()),
        }
    }

    async fn set_health_state(&self, state: HealthState) -> Result<(), StoreError> {
        self.lock()?
            .insert(HEALTH_STATE_KEY.to_string(), state.as_str().to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_store_defaults() {
        let store = MemoryStore::new();
        assert_eq!(store.matched_count().await.unwrap(), 0);
        assert_eq!(store.health_state().await.unwrap(), HealthState::Healthy);
        assert_eq!(store.last_activity(Dimension::Check).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_add_matched_accumulates() {
        let store = MemoryStore::new();
        assert_eq!(store.add_matched(10).await.unwrap(), 10);
        assert_eq!(store.add_matched(5).await.unwrap(), 15);
        assert_eq!(store.matched_count().await.unwrap(), 15);
    }

    #[tokio::test]
    async fn test_ingestion_heartbeat_is_ingestion_activity() {
        let store = MemoryStore::new();
        store.record_ingestion_heartbeat(1_700_000_000).await.unwrap();
        assert_eq!(
            store.last_activity(Dimension::Ingestion).await.unwrap(),
            Some(1_700_000_000)
        );
        assert_eq!(store.last_activity(Dimension::Check).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_health_state_overwrite() {
        let store = MemoryStore::new();
        store.set_health_state(HealthState::Degraded).await.unwrap();
        assert_eq!(store.health_state().await.unwrap(), HealthState::Degraded);
        store.set_health_state(HealthState::Healthy).await.unwrap();
        assert_eq!(store.health_state().await.unwrap(), HealthState::Healthy);
    }
}
