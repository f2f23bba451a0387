//! Check command implementation
//!
//! Evaluates the pipeline once against the shared store.

use crate::cli::args::{CheckArgs, OutputFormat};
use crate::cli::output::{print_output, CheckReport};
use crate::clock::{Clock, SystemClock};
use crate::config::Settings;
use crate::domain::HealthState;
use crate::error::Result;
use crate::selfstate::{Inspection, SelfStateMonitor};
use crate::services::Pipeline;

/// Execute the check command
pub async fn run_check(args: &CheckArgs, format: OutputFormat, settings: Settings) -> Result<()> {
    let pipeline = Pipeline::from_settings(settings)?;
    let mut monitor = pipeline.monitor()?;

    let report = check_once(&mut monitor, args.notify, SystemClock.now()).await;
    print_output(&report, format)?;

    Ok(())
}

/// Evaluate once; dispatch only if asked and the monitor is enabled
pub async fn check_once(monitor: &mut SelfStateMonitor, notify: bool, now: i64) -> CheckReport {
    if notify && monitor.settings().enabled {
        let evaluation = monitor.evaluate().await;
        return CheckReport::from(&evaluation);
    }
    if notify {
        log::warn!("Self state monitor is disabled, not sending notices");
    }

    let Inspection {
        observed_flag: health_flag,
        reasons,
        dimensions,
    } = monitor.inspect(now).await;
    let state = if reasons.is_empty() {
        HealthState::Healthy
    } else {
        HealthState::Degraded
    };
    CheckReport {
        state,
        health_flag,
        reasons,
        dimensions,
        notified: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::domain::{BreachReason, Contact, Dimension};
    use crate::mock::{FlakyStore, ManualClock, RecordingSender};
    use crate::notify::Dispatcher;
    use crate::store::HealthStore;
    use std::sync::Arc;

    const T0: i64 = 1_700_000_000;

    struct Fixture {
        store: Arc<FlakyStore>,
        sender: Arc<RecordingSender>,
        clock: Arc<ManualClock>,
    }

    fn monitor(enabled: bool) -> (SelfStateMonitor, Fixture) {
        let mut settings = Config::default().validate().unwrap().selfstate;
        settings.enabled = enabled;
        settings.contacts = vec![Contact::new("mail", "ops@example.com").unwrap()];

        let store = Arc::new(FlakyStore::new());
        let sender = Arc::new(RecordingSender::new("mail"));
        let clock = Arc::new(ManualClock::new(T0));
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(sender.clone());
        let dispatcher = dispatcher.with_contacts(settings.contacts.clone()).unwrap();

        let monitor = SelfStateMonitor::new(settings, store.clone(), dispatcher, clock.clone());
        (
            monitor,
            Fixture {
                store,
                sender,
                clock,
            },
        )
    }

    #[tokio::test]
    async fn test_healthy_check() {
        let (mut monitor, fx) = monitor(true);
        fx.store.record_activity(Dimension::Ingestion, T0).await.unwrap();
        fx.store.record_activity(Dimension::Check, T0).await.unwrap();

        let report = check_once(&mut monitor, false, fx.clock.now()).await;
        assert_eq!(report.state, HealthState::Healthy);
        assert_eq!(report.health_flag, Some(HealthState::Healthy));
        assert_eq!(report.dimensions.len(), 2);
    }

    #[tokio::test]
    async fn test_stale_heartbeat_reported_without_notify() {
        let (mut monitor, fx) = monitor(true);
        fx.store
            .record_activity(Dimension::Ingestion, T0 - 90)
            .await
            .unwrap();

        let report = check_once(&mut monitor, false, fx.clock.now()).await;
        assert_eq!(report.state, HealthState::Degraded);
        assert!(matches!(
            report.reasons[0],
            BreachReason::IngestionStalled {
                elapsed_secs: 90,
                limit_secs: 60
            }
        ));
        assert!(report.notified.is_none());
        assert!(fx.sender.recipients().is_empty());
    }

    #[tokio::test]
    async fn test_notify_dispatches_when_enabled() {
        let (mut monitor, fx) = monitor(true);
        fx.store.set_health_state(HealthState::Degraded).await.unwrap();

        let report = check_once(&mut monitor, true, fx.clock.now()).await;
        assert_eq!(report.notified.map(|r| r.delivered), Some(1));
        assert_eq!(fx.sender.recipients(), vec!["ops@example.com"]);
    }

    #[tokio::test]
    async fn test_notify_ignored_when_disabled() {
        let (mut monitor, fx) = monitor(false);
        fx.store.set_health_state(HealthState::Degraded).await.unwrap();

        let report = check_once(&mut monitor, true, fx.clock.now()).await;
        assert_eq!(report.state, HealthState::Degraded);
        assert!(report.notified.is_none());
        assert!(fx.sender.recipients().is_empty());
    }
}
