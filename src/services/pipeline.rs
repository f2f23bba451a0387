//! Pipeline wiring
//!
//! Builds the store, probes and monitor from validated settings and hands
//! them to a [`Supervisor`].

use crate::clock::{Clock, SystemClock};
use crate::config::{Settings, StoreBackend, StoreSettings};
use crate::error::{ConfigError, Result, StoreError};
use crate::heartbeat::{FilterMetrics, IngestionProbe, MatchedProbe};
use crate::notify::Dispatcher;
use crate::selfstate::SelfStateMonitor;
use crate::services::Supervisor;
use crate::store::{FileStore, HealthStore, MemoryStore};

use std::sync::Arc;

/// Open the configured store backend
pub fn open_store(
    settings: &StoreSettings,
) -> std::result::Result<Arc<dyn HealthStore>, StoreError> {
    match &settings.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreBackend::File(path) => {
            let store = FileStore::open(path)?;
            log::debug!("Opened file store at {}", path.display());
            Ok(Arc::new(store))
        }
    }
}

/// Everything one process needs to run the self-monitoring pipeline
pub struct Pipeline {
    settings: Settings,
    store: Arc<dyn HealthStore>,
    metrics: Arc<FilterMetrics>,
    clock: Arc<dyn Clock>,
}

impl Pipeline {
    /// Create a pipeline over an existing store and clock
    pub fn new(settings: Settings, store: Arc<dyn HealthStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            settings,
            store,
            metrics: Arc::new(FilterMetrics::new()),
            clock,
        }
    }

    /// Create a pipeline with the configured store and the system clock
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let store = open_store(&settings.store)?;
        Ok(Self::new(settings, store, Arc::new(SystemClock)))
    }

    /// Counters the ingestion engine increments
    pub fn metrics(&self) -> Arc<FilterMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Shared store handle
    pub fn store(&self) -> Arc<dyn HealthStore> {
        Arc::clone(&self.store)
    }

    /// Validated settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Build a monitor with the built-in senders and configured contacts
    ///
    /// # Errors
    /// Fails if a contact's type has no registered sender.
    pub fn monitor(&self) -> std::result::Result<SelfStateMonitor, ConfigError> {
        let contacts = self.settings.selfstate.contacts.clone();
        let dispatcher = Dispatcher::with_builtin_senders().with_contacts(contacts)?;
        Ok(SelfStateMonitor::new(
            self.settings.selfstate.clone(),
            self.store(),
            dispatcher,
            Arc::clone(&self.clock),
        ))
    }

    /// Spawn both probes and the monitor
    pub fn start(&self) -> Result<Supervisor> {
        let monitor = self.monitor()?;
        let heartbeat = self.settings.heartbeat;

        let mut supervisor = Supervisor::new(self.settings.shutdown_timeout);
        supervisor.spawn_ingestion_probe(
            IngestionProbe::new(self.metrics(), self.store(), Arc::clone(&self.clock)),
            heartbeat.received_check_interval,
        );
        supervisor.spawn_matched_probe(
            MatchedProbe::new(self.store(), heartbeat.matched_check_interval),
            heartbeat.matched_check_interval,
        );
        supervisor.spawn_monitor(monitor);

        log::info!("Started tasks: {}", supervisor.task_names().join(", "));
        Ok(supervisor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::domain::{Contact, Dimension, HealthState};
    use crate::error::AppError;
    use crate::mock::{FlakyStore, ManualClock};
    use std::time::Duration;

    const T0: i64 = 1_700_000_000;

    fn settings() -> Settings {
        Config::default().validate().unwrap()
    }

    #[test]
    fn test_open_memory_store() {
        let store = open_store(&StoreSettings {
            backend: StoreBackend::Memory,
        });
        assert!(store.is_ok());
    }

    #[tokio::test]
    async fn test_open_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state");
        let store = open_store(&StoreSettings {
            backend: StoreBackend::File(path.clone()),
        })
        .unwrap();

        store.add_matched(3).await.unwrap();
        assert!(path.is_dir());
    }

    #[tokio::test]
    async fn test_unknown_contact_type_fails_start() {
        let mut settings = settings();
        settings.selfstate.contacts = vec![Contact::new("pager", "ops").unwrap()];
        let pipeline = Pipeline::new(
            settings,
            Arc::new(FlakyStore::new()),
            Arc::new(ManualClock::new(T0)),
        );

        assert!(matches!(
            pipeline.start(),
            Err(AppError::Config(ConfigError::UnknownContactType(_)))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ingestion_heartbeat_reaches_store() {
        let store = Arc::new(FlakyStore::new());
        let clock = Arc::new(ManualClock::new(T0));
        let pipeline = Pipeline::new(settings(), store.clone(), clock);
        let supervisor = pipeline.start().unwrap();

        pipeline.metrics().mark_received(10);
        tokio::time::sleep(Duration::from_secs(6)).await;

        assert_eq!(
            store.last_activity(Dimension::Ingestion).await.unwrap(),
            Some(T0)
        );
        supervisor.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_matched_read_degrades_flag() {
        let store = Arc::new(FlakyStore::new());
        store.fail_reads(true);
        let clock = Arc::new(ManualClock::new(T0));
        let pipeline = Pipeline::new(settings(), store.clone(), clock);
        let supervisor = pipeline.start().unwrap();

        tokio::time::sleep(Duration::from_secs(1)).await;

        store.fail_reads(false);
        assert_eq!(store.health_state().await.unwrap(), HealthState::Degraded);
        supervisor.shutdown().await.unwrap();
    }
}
