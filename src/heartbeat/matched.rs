//! Match-rate probe
//!
//! Slow-cadence probe over the matched-metrics counter in the shared store.
//! An unreadable counter is itself a failure signal and forces `Degraded`.
//! The probe only clears degradation it set itself.

use super::detector::{MatchRateDetector, MatchVerdict};
use crate::domain::HealthState;
use crate::store::HealthStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Why this probe set the health flag to degraded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeDegradation {
    /// The matched counter could not be read
    ReadFailure,
    /// The match rate dropped by more than half
    RateDrop,
}

/// Outcome of one match-rate probe tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedTick {
    /// Counter could not be read; degraded was requested
    ReadFailed,
    /// Counter was read and evaluated
    Observed(MatchVerdict),
}

/// Match-rate probe
pub struct MatchedProbe {
    store: Arc<dyn HealthStore>,
    detector: MatchRateDetector,
    read_failure: bool,
    rate_drop: bool,
}

impl MatchedProbe {
    /// Create a probe that samples every `period`
    pub fn new(store: Arc<dyn HealthStore>, period: Duration) -> Self {
        Self {
            store,
            detector: MatchRateDetector::new(period),
            read_failure: false,
            rate_drop: false,
        }
    }

    /// Whether this probe currently holds the flag degraded for `cause`
    pub fn owns(&self, cause: ProbeDegradation) -> bool {
        match cause {
            ProbeDegradation::ReadFailure => self.read_failure,
            ProbeDegradation::RateDrop => self.rate_drop,
        }
    }

    /// Read and evaluate the counter once
    pub async fn tick(&mut self) -> MatchedTick {
        let count = match self.store.matched_count().await {
            Ok(count) => count,
            Err(e) => {
                log::error!(
                    "Can't perform check on matched metrics counter: {}. Setting health state to {}",
                    e,
                    HealthState::Degraded
                );
                self.degrade(ProbeDegradation::ReadFailure).await;
                return MatchedTick::ReadFailed;
            }
        };

        let verdict = self.detector.observe(count);
        match verdict {
            MatchVerdict::Anomaly {
                delta,
                previous_delta,
            } => {
                log::error!(
                    "Found 50% less matched metrics than one interval ago. Previously: {}. Now: {}",
                    previous_delta,
                    delta
                );
                self.degrade(ProbeDegradation::RateDrop).await;
                if self.rate_drop {
                    self.read_failure = false;
                }
                return MatchedTick::Observed(verdict);
            }
            MatchVerdict::CounterReset { previous, current } => {
                log::warn!(
                    "Matched metrics counter went backwards ({} -> {}), restarting baseline",
                    previous,
                    current
                );
            }
            _ => {}
        }

        self.release(verdict.is_verified_normal()).await;
        MatchedTick::Observed(verdict)
    }

    async fn degrade(&mut self, cause: ProbeDegradation) {
        match self.store.set_health_state(HealthState::Degraded).await {
            Ok(()) => match cause {
                ProbeDegradation::ReadFailure => self.read_failure = true,
                ProbeDegradation::RateDrop => self.rate_drop = true,
            },
            Err(e) => log::error!(
                "Failed to set health state to {}: {}",
                HealthState::Degraded,
                e
            ),
        }
    }

    /// Drop the causes a successful read resolves. A read failure is resolved
    /// by any read; a rate drop only by a rate comparison that passed. The
    /// flag is written healthy once no cause remains.
    async fn release(&mut self, rate_verified: bool) {
        let clears_rate_drop = self.rate_drop && rate_verified;
        if !self.read_failure && !clears_rate_drop {
            return;
        }

        if self.rate_drop && !clears_rate_drop {
            log::info!("Matched metrics counter readable again, rate drop still unresolved");
            self.read_failure = false;
            return;
        }

        match self.store.set_health_state(HealthState::Healthy).await {
            Ok(()) => {
                log::info!("Matched metrics check recovered, health state cleared");
                self.read_failure = false;
                self.rate_drop = false;
            }
            Err(e) => log::warn!("Failed to clear health state: {}", e),
        }
    }

    /// Run until cancelled, ticking every `period`
    pub async fn run(mut self, period: Duration, cancel: CancellationToken) {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        log::info!("Matched metrics heartbeat started (interval {:?})", period);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }

        log::info!("Matched metrics heartbeat stopped");
    }
}
