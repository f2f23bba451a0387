//! Self-state monitor
//!
//! Aggregates the delay since last activity for every watched dimension and
//! the authoritative health flag into one verdict, and dispatches debounced
//! notices to the configured contacts.
//!
//! The monitor never writes the health flag. Degradation set by a probe is
//! cleared by that probe or by an explicit reset.

use super::config::SelfStateSettings;
use super::notice::SelfStateNotice;
use crate::clock::Clock;
use crate::domain::{BreachReason, Dimension, HealthState};
use crate::notify::{DispatchReport, Dispatcher};
use crate::store::HealthStore;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Time of the last dispatch; process-local
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertDispatchRecord {
    pub last_sent_at: Option<i64>,
}

impl AlertDispatchRecord {
    /// Whether a new dispatch is allowed at `now`
    pub fn is_due(&self, now: i64, notice_interval: Duration) -> bool {
        match self.last_sent_at {
            Some(last) => now.saturating_sub(last) >= secs(notice_interval),
            None => true,
        }
    }
}

/// What the monitor did at the end of an evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorAction {
    /// Nothing to report
    None,
    /// Degraded and an alert was dispatched
    AlertSent(DispatchReport),
    /// Degraded but inside the notice interval
    AlertSuppressed,
    /// Recovered and a recovery notice was dispatched
    RecoverySent(DispatchReport),
    /// Recovered without a notice (disabled or inside the notice interval)
    Recovered,
    /// No breach, but the health flag could not be read; still degraded
    RecoveryHeld,
}

/// Last observed activity for one dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DimensionStatus {
    pub dimension: Dimension,
    /// Unix seconds; `None` if the store has never recorded activity
    pub last_activity: Option<i64>,
    pub elapsed_secs: i64,
    pub limit_secs: i64,
}

/// Breach reasons and observations from one pass over the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    /// Authoritative flag as read from the store, if the read succeeded
    pub observed_flag: Option<HealthState>,
    pub reasons: Vec<BreachReason>,
    pub dimensions: Vec<DimensionStatus>,
}

/// Result of one evaluation cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub now: i64,
    /// Monitor state after this evaluation
    pub state: HealthState,
    /// Authoritative flag as read from the store, if the read succeeded
    pub observed_flag: Option<HealthState>,
    pub reasons: Vec<BreachReason>,
    pub dimensions: Vec<DimensionStatus>,
    pub action: MonitorAction,
}

/// Self-state monitor
pub struct SelfStateMonitor {
    settings: SelfStateSettings,
    store: Arc<dyn HealthStore>,
    dispatcher: Dispatcher,
    clock: Arc<dyn Clock>,
    state: HealthState,
    record: AlertDispatchRecord,
    store_reachable_at: i64,
    last_flag: Option<HealthState>,
    last_seen: HashMap<Dimension, i64>,
    recorded: HashMap<Dimension, i64>,
}

impl SelfStateMonitor {
    /// Create a monitor; the current time is the baseline for every dimension
    pub fn new(
        settings: SelfStateSettings,
        store: Arc<dyn HealthStore>,
        dispatcher: Dispatcher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let started_at = clock.now();
        let last_seen = Dimension::ALL.iter().map(|d| (*d, started_at)).collect();
        Self {
            settings,
            store,
            dispatcher,
            clock,
            state: HealthState::Healthy,
            record: AlertDispatchRecord::default(),
            store_reachable_at: started_at,
            last_flag: None,
            last_seen,
            recorded: HashMap::new(),
        }
    }

    /// Current monitor state
    pub fn state(&self) -> HealthState {
        self.state
    }

    /// Dispatch record
    pub fn record(&self) -> AlertDispatchRecord {
        self.record
    }

    /// Validated settings
    pub fn settings(&self) -> &SelfStateSettings {
        &self.settings
    }

    fn watched(&self) -> Vec<(Dimension, Duration)> {
        let mut watched = vec![
            (Dimension::Ingestion, self.settings.last_metric_received_delay),
            (Dimension::Check, self.settings.last_check_delay),
        ];
        if let Some(delay) = self.settings.remote_check_delay() {
            watched.push((Dimension::RemoteCheck, delay));
        }
        watched
    }

    /// Read the store and compute breach reasons without dispatching
    ///
    /// An unreadable health flag falls back to the last value read.
    pub async fn inspect(&mut self, now: i64) -> Inspection {
        let mut reasons = Vec::new();

        let observed_flag = match self.store.health_state().await {
            Ok(flag) => {
                self.store_reachable_at = now;
                self.last_flag = Some(flag);
                Some(flag)
            }
            Err(e) => {
                log::warn!("Failed to read health state: {}", e);
                None
            }
        };

        let mut dimensions = Vec::new();
        for (dimension, limit) in self.watched() {
            match self.store.last_activity(dimension).await {
                Ok(Some(ts)) => {
                    self.store_reachable_at = now;
                    self.last_seen.insert(dimension, ts);
                    self.recorded.insert(dimension, ts);
                }
                Ok(None) => self.store_reachable_at = now,
                Err(e) => log::warn!("Failed to read {} heartbeat: {}", dimension, e),
            }

            let since = self.last_seen.get(&dimension).copied().unwrap_or(now);
            let status = DimensionStatus {
                dimension,
                last_activity: self.recorded.get(&dimension).copied(),
                elapsed_secs: now.saturating_sub(since),
                limit_secs: secs(limit),
            };
            if status.elapsed_secs > status.limit_secs {
                reasons.push(stalled(dimension, status.elapsed_secs, status.limit_secs));
            }
            dimensions.push(status);
        }

        let unreachable_for = now.saturating_sub(self.store_reachable_at);
        let disconnect_limit = secs(self.settings.redis_disconnect_delay);
        if unreachable_for > disconnect_limit {
            reasons.insert(
                0,
                BreachReason::StoreUnreachable {
                    elapsed_secs: unreachable_for,
                    limit_secs: disconnect_limit,
                },
            );
        }

        if self.last_flag.is_some_and(|flag| flag.is_degraded()) {
            reasons.push(BreachReason::HealthDegraded);
        }

        Inspection {
            observed_flag,
            reasons,
            dimensions,
        }
    }

    /// Run one evaluation cycle at the clock's current time
    pub async fn evaluate(&mut self) -> Evaluation {
        let now = self.clock.now();
        let Inspection {
            observed_flag,
            reasons,
            dimensions,
        } = self.inspect(now).await;
        let breached = !reasons.is_empty();
        let due = self.record.is_due(now, self.settings.notice_interval);

        let action = match (self.state, breached) {
            (HealthState::Healthy, false) => MonitorAction::None,
            (_, true) => {
                if self.state == HealthState::Healthy {
                    log::warn!("Pipeline degraded: {:?}", labels(&reasons));
                }
                self.state = HealthState::Degraded;
                if due {
                    let notice = SelfStateNotice::alert(reasons.clone(), now);
                    MonitorAction::AlertSent(self.send(&notice, now).await)
                } else {
                    log::debug!("Alert suppressed inside notice interval");
                    MonitorAction::AlertSuppressed
                }
            }
            (HealthState::Degraded, false) if observed_flag.is_none() => {
                log::warn!("Health flag unreadable, holding degraded state");
                MonitorAction::RecoveryHeld
            }
            (HealthState::Degraded, false) => {
                log::info!("Pipeline recovered");
                self.state = HealthState::Healthy;
                if self.settings.recovery_notice && due {
                    let notice = SelfStateNotice::recovery(now);
                    MonitorAction::RecoverySent(self.send(&notice, now).await)
                } else {
                    MonitorAction::Recovered
                }
            }
        };

        Evaluation {
            now,
            state: self.state,
            observed_flag,
            reasons,
            dimensions,
            action,
        }
    }

    async fn send(&mut self, notice: &SelfStateNotice, now: i64) -> DispatchReport {
        let report = self.dispatcher.dispatch(notice).await;
        self.record.last_sent_at = Some(now);
        log::info!(
            "Sent {} notice to {} contact(s), {} failed",
            notice.kind,
            report.delivered,
            report.failed
        );
        report
    }

    /// Run until cancelled, evaluating every `check_interval`
    ///
    /// Returns immediately when the monitor is disabled.
    pub async fn run(mut self, cancel: CancellationToken) {
        if !self.settings.enabled {
            log::info!("Self state monitor disabled");
            return;
        }

        let mut ticker = interval(self.settings.check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        log::info!(
            "Self state monitor started (interval {:?}, {} contact(s))",
            self.settings.check_interval,
            self.dispatcher.contacts().len()
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.evaluate().await;
                }
            }
        }

        log::info!("Self state monitor stopped");
    }
}

fn secs(duration: Duration) -> i64 {
    i64::try_from(duration.as_secs()).unwrap_or(i64::MAX)
}

fn stalled(dimension: Dimension, elapsed_secs: i64, limit_secs: i64) -> BreachReason {
    match dimension {
        Dimension::Ingestion => BreachReason::IngestionStalled {
            elapsed_secs,
            limit_secs,
        },
        Dimension::Check => BreachReason::ChecksStalled {
            elapsed_secs,
            limit_secs,
        },
        Dimension::RemoteCheck => BreachReason::RemoteChecksStalled {
            elapsed_secs,
            limit_secs,
        },
    }
}

fn labels(reasons: &[BreachReason]) -> Vec<&'static str> {
    reasons.iter().map(|r| r.label()).collect()
}
