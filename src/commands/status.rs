//! Status, reset and touch commands
//!
//! Read and write the shared store directly.

use crate::cli::args::{DimensionArg, OutputFormat};
use crate::cli::output::{print_output, ActivityEntry, Message, StoreStatus};
use crate::clock::{Clock, SystemClock};
use crate::config::Settings;
use crate::domain::{Dimension, HealthState};
use crate::error::{Result, StoreError};
use crate::services::open_store;
use crate::store::HealthStore;

/// Execute the status command
pub async fn run_status(format: OutputFormat, settings: &Settings) -> Result<()> {
    let store = open_store(&settings.store)?;
    let status = store_status(store.as_ref()).await?;
    print_output(&status, format)?;
    Ok(())
}

/// Execute the reset command
pub async fn run_reset(format: OutputFormat, settings: &Settings) -> Result<()> {
    let store = open_store(&settings.store)?;
    let previous = store.health_state().await?;
    store.set_health_state(HealthState::Healthy).await?;
    log::info!(
        "Health state reset, old value: {}, new value: {}",
        previous,
        HealthState::Healthy
    );

    print_output(
        &Message {
            message: format!(
                "Health flag reset ({} -> {})",
                previous.as_str(),
                HealthState::Healthy.as_str()
            ),
            success: true,
        },
        format,
    )?;
    Ok(())
}

/// Execute the touch command
pub async fn run_touch(
    dimension: DimensionArg,
    format: OutputFormat,
    settings: &Settings,
) -> Result<()> {
    let store = open_store(&settings.store)?;
    let dimension = Dimension::from(dimension);
    let now = SystemClock.now();
    touch(store.as_ref(), dimension, now).await?;

    print_output(
        &Message {
            message: format!("Recorded {} activity at {}", dimension, now),
            success: true,
        },
        format,
    )?;
    Ok(())
}

/// Snapshot of the flag, counter and every dimension's last activity
pub async fn store_status(
    store: &dyn HealthStore,
) -> std::result::Result<StoreStatus, StoreError> {
    let mut activity = Vec::with_capacity(Dimension::ALL.len());
    for dimension in Dimension::ALL {
        activity.push(ActivityEntry {
            dimension,
            last_activity: store.last_activity(dimension).await?,
        });
    }

    Ok(StoreStatus {
        health_state: store.health_state().await?,
        matched_count: store.matched_count().await?,
        activity,
    })
}

/// Record activity for `dimension` at `now`
pub async fn touch(
    store: &dyn HealthStore,
    dimension: Dimension,
    now: i64,
) -> std::result::Result<(), StoreError> {
    match dimension {
        Dimension::Ingestion => store.record_ingestion_heartbeat(now).await,
        other => store.record_activity(other, now).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileStore, MemoryStore};

    #[tokio::test]
    async fn test_status_of_empty_store() {
        let store = MemoryStore::new();
        let status = store_status(&store).await.unwrap();

        assert_eq!(status.health_state, HealthState::Healthy);
        assert_eq!(status.matched_count, 0);
        assert_eq!(status.activity.len(), 3);
        assert!(status.activity.iter().all(|a| a.last_activity.is_none()));
    }

    #[tokio::test]
    async fn test_touch_then_status() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        touch(&store, Dimension::Check, 1_700_000_000).await.unwrap();
        store.add_matched(12).await.unwrap();

        let status = store_status(&store).await.unwrap();
        assert_eq!(status.matched_count, 12);
        assert_eq!(status.activity[1].dimension, Dimension::Check);
        assert_eq!(status.activity[1].last_activity, Some(1_700_000_000));
        assert_eq!(status.activity[0].last_activity, None);
    }

    #[tokio::test]
    async fn test_touch_ingestion_uses_heartbeat_key() {
        let store = MemoryStore::new();
        touch(&store, Dimension::Ingestion, 42).await.unwrap();
        assert_eq!(
            store.last_activity(Dimension::Ingestion).await.unwrap(),
            Some(42)
        );
    }
}
