//! Background task supervision
//!
//! Every probe and the monitor run as an independent task holding a
//! cancellation token. Shutdown requests a cooperative stop and then waits,
//! bounded by a timeout, until each task has observably exited.

use crate::error::TaskError;
use crate::heartbeat::{IngestionProbe, MatchedProbe};
use crate::selfstate::SelfStateMonitor;

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

/// A spawned task with its stop signal
pub struct TaskHandle {
    name: String,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl TaskHandle {
    /// Spawn `task` with a fresh cancellation token
    pub fn spawn<F, Fut>(name: impl Into<String>, task: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::spawn_with_token(name, CancellationToken::new(), task)
    }

    fn spawn_with_token<F, Fut>(name: impl Into<String>, cancel: CancellationToken, task: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let handle = tokio::spawn(task(cancel.clone()));
        log::debug!("Spawned task '{}'", name);
        Self {
            name,
            cancel,
            handle,
        }
    }

    /// Task name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Request a stop and wait up to `limit` for the task to exit
    ///
    /// # Errors
    /// `TaskError::Panicked` if the task panicked, `TaskError::Timeout` if it
    /// did not exit in time (the task is then aborted).
    pub async fn stop(mut self, limit: Duration) -> Result<(), TaskError> {
        self.cancel.cancel();

        match timeout(limit, &mut self.handle).await {
            Ok(Ok(())) => {
                log::debug!("Task '{}' stopped", self.name);
                Ok(())
            }
            Ok(Err(e)) if e.is_cancelled() => Ok(()),
            Ok(Err(_)) => Err(TaskError::Panicked(self.name)),
            Err(_) => {
                self.handle.abort();
                Err(TaskError::Timeout {
                    name: self.name,
                    timeout_ms: limit.as_millis(),
                })
            }
        }
    }
}

/// Owner of all background tasks in a process
pub struct Supervisor {
    root: CancellationToken,
    tasks: Vec<TaskHandle>,
    shutdown_timeout: Duration,
}

impl Supervisor {
    /// Create a supervisor; each task gets `shutdown_timeout` to exit
    pub fn new(shutdown_timeout: Duration) -> Self {
        Self {
            root: CancellationToken::new(),
            tasks: Vec::new(),
            shutdown_timeout,
        }
    }

    /// Spawn a supervised task
    pub fn spawn<F, Fut>(&mut self, name: impl Into<String>, task: F)
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = TaskHandle::spawn_with_token(name, self.root.child_token(), task);
        self.tasks.push(handle);
    }

    /// Spawn the ingestion-activity probe
    pub fn spawn_ingestion_probe(&mut self, probe: IngestionProbe, period: Duration) {
        self.spawn("ingestion-heartbeat", move |cancel| probe.run(period, cancel));
    }

    /// Spawn the match-rate probe
    pub fn spawn_matched_probe(&mut self, probe: MatchedProbe, period: Duration) {
        self.spawn("matched-heartbeat", move |cancel| probe.run(period, cancel));
    }

    /// Spawn the self-state monitor
    pub fn spawn_monitor(&mut self, monitor: SelfStateMonitor) {
        self.spawn("selfstate-monitor", move |cancel| monitor.run(cancel));
    }

    /// Names of supervised tasks
    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name()).collect()
    }

    /// Stop every task and wait for all of them
    ///
    /// Returns the first terminal error; every task is still joined or
    /// aborted before returning.
    pub async fn shutdown(self) -> Result<(), TaskError> {
        log::info!("Stopping {} task(s)", self.tasks.len());
        self.root.cancel();

        let mut first_error = None;
        for task in self.tasks {
            if let Err(e) = task.stop(self.shutdown_timeout).await {
                log::error!("{}", e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_cooperative_stop() {
        let exited = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&exited);
        let task = TaskHandle::spawn("waiter", move |cancel| async move {
            cancel.cancelled().await;
            flag.store(true, Ordering::SeqCst);
        });

        task.stop(Duration::from_secs(1)).await.unwrap();
        assert!(exited.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_times_out_on_unresponsive_task() {
        let task = TaskHandle::spawn("stubborn", |_cancel| async move {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });

        let err = task.stop(Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, TaskError::Timeout { ref name, .. } if name == "stubborn"));
    }

    #[tokio::test]
    async fn test_panic_is_reported() {
        let task = TaskHandle::spawn("broken", |_cancel| async move {
            panic!("boom");
        });

        let err = task.stop(Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, TaskError::Panicked(name) if name == "broken"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_supervisor_stops_all_tasks() {
        let mut supervisor = Supervisor::new(Duration::from_secs(1));
        for name in ["a", "b", "c"] {
            supervisor.spawn(name, |cancel| async move { cancel.cancelled().await });
        }
        assert_eq!(supervisor.task_names(), vec!["a", "b", "c"]);
        supervisor.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_supervisor_reports_first_error_and_joins_rest() {
        let stopped = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stopped);

        let mut supervisor = Supervisor::new(Duration::from_secs(1));
        supervisor.spawn("stubborn", |_cancel| async move {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });
        supervisor.spawn("polite", move |cancel| async move {
            cancel.cancelled().await;
            flag.store(true, Ordering::SeqCst);
        });

        let err = supervisor.shutdown().await.unwrap_err();
        assert!(matches!(err, TaskError::Timeout { .. }));
        assert!(stopped.load(Ordering::SeqCst));
    }
}
