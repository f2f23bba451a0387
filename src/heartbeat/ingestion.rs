//! Ingestion-activity probe
//!
//! Publishes a fresh ingestion heartbeat whenever the received counter moved
//! since the last successful publish.

use super::metrics::MetricsSource;
use crate::clock::Clock;
use crate::store::HealthStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Outcome of one ingestion probe tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionTick {
    /// Counter did not move
    Idle,
    /// Heartbeat published
    Published,
    /// Publishing failed; retried on the next tick
    PublishFailed,
}

/// Fast-cadence probe over the received counter
pub struct IngestionProbe {
    metrics: Arc<dyn MetricsSource>,
    store: Arc<dyn HealthStore>,
    clock: Arc<dyn Clock>,
    published_count: u64,
}

impl IngestionProbe {
    /// Create a probe; the current counter value is the starting point
    pub fn new(
        metrics: Arc<dyn MetricsSource>,
        store: Arc<dyn HealthStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let published_count = metrics.total_received();
        Self {
            metrics,
            store,
            clock,
            published_count,
        }
    }

    /// Sample the counter once
    pub async fn tick(&mut self) -> IngestionTick {
        let received = self.metrics.total_received();
        log::debug!(
            "Update heartbeat count, old value: {}, new value: {}",
            self.published_count,
            received
        );

        if received == self.published_count {
            return IngestionTick::Idle;
        }

        match self
            .store
            .record_ingestion_heartbeat(self.clock.now())
            .await
        {
            Ok(()) => {
                self.published_count = received;
                IngestionTick::Published
            }
            Err(e) => {
                log::info!("Save ingestion heartbeat failed: {}", e);
                IngestionTick::PublishFailed
            }
        }
    }

    /// Run until cancelled, ticking every `period`
    pub async fn run(mut self, period: Duration, cancel: CancellationToken) {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        log::info!("Ingestion heartbeat started (interval {:?})", period);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }

        log::info!("Ingestion heartbeat stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Dimension;
    use crate::heartbeat::FilterMetrics;
    use crate::mock::{FlakyStore, ManualClock};

    fn probe(metrics: &Arc<FilterMetrics>, store: &Arc<FlakyStore>) -> IngestionProbe {
        IngestionProbe::new(
            Arc::clone(metrics) as Arc<dyn MetricsSource>,
            Arc::clone(store) as Arc<dyn HealthStore>,
            Arc::new(ManualClock::new(1_000)),
        )
    }

    #[tokio::test]
    async fn test_idle_when_counter_unchanged() {
        let metrics = Arc::new(FilterMetrics::new());
        metrics.mark_received(5);
        let store = Arc::new(FlakyStore::new());
        let mut probe = probe(&metrics, &store);

        assert_eq!(probe.tick().await, IngestionTick::Idle);
        assert_eq!(store.last_activity(Dimension::Ingestion).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_publishes_on_change() {
        let metrics = Arc::new(FilterMetrics::new());
        let store = Arc::new(FlakyStore::new());
        let mut probe = probe(&metrics, &store);

        metrics.mark_received(10);
        assert_eq!(probe.tick().await, IngestionTick::Published);
        assert_eq!(
            store.last_activity(Dimension::Ingestion).await.unwrap(),
            Some(1_000)
        );
        assert_eq!(probe.tick().await, IngestionTick::Idle);
    }

    #[tokio::test]
    async fn test_failed_publish_retried_next_tick() {
        let metrics = Arc::new(FilterMetrics::new());
        let store = Arc::new(FlakyStore::new());
        let mut probe = probe(&metrics, &store);

        metrics.mark_received(1);
        store.fail_writes(true);
        assert_eq!(probe.tick().await, IngestionTick::PublishFailed);

        store.fail_writes(false);
        assert_eq!(probe.tick().await, IngestionTick::Published);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_cancel() {
        let metrics = Arc::new(FilterMetrics::new());
        let store = Arc::new(FlakyStore::new());
        let probe = probe(&metrics, &store);
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(probe.run(Duration::from_secs(5), cancel.clone()));
        metrics.mark_received(1);
        tokio::time::sleep(Duration::from_secs(6)).await;
        cancel.cancel();
        handle.await.unwrap();

        assert!(store
            .last_activity(Dimension::Ingestion)
            .await
            .unwrap()
            .is_some());
    }
}
