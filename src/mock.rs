//! Mock implementations for testing
//!
//! Provides a store with injectable failures, a manual clock and a recording
//! sender for unit testing without real infrastructure.

use crate::clock::Clock;
use crate::domain::{Contact, Dimension, HealthState};
use crate::error::{SendError, StoreError};
use crate::notify::Sender;
use crate::selfstate::{NoticeKind, SelfStateNotice};
use crate::store::{HealthStore, MemoryStore};

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory store whose reads and writes can be made to fail
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_health_reads: AtomicBool,
    health_writes: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every read fail with `StoreError::Unavailable`
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make only `health_state` reads fail, leaving heartbeats readable
    pub fn fail_health_reads(&self, fail: bool) {
        self.fail_health_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every write fail with `StoreError::Unavailable`
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `set_health_state` calls
    pub fn health_writes(&self) -> usize {
        self.health_writes.load(Ordering::SeqCst)
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("mock read failure".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("mock write failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl HealthStore for FlakyStore {
    async fn matched_count(&self) -> Result<i64, StoreError> {
        self.check_read()?;
        self.inner.matched_count().await
    }

    async fn add_matched(&self, count: i64) -> Result<i64, StoreError> {
        self.check_write()?;
        self.inner.add_matched(count).await
    }

    async fn last_activity(&self, dimension: Dimension) -> Result<Option<i64>, StoreError> {
        self.check_read()?;
        self.inner.last_activity(dimension).await
    }

    async fn record_activity(
        &self,
        dimension: Dimension,
        timestamp: i64,
    ) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.record_activity(dimension, timestamp).await
    }

    async fn health_state(&self) -> Result<HealthState, StoreError> {
        self.check_read()?;
        if self.fail_health_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("mock flag read failure".to_string()));
        }
        self.inner.health_state().await
    }

    async fn set_health_state(&self, state: HealthState) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.set_health_state(state).await?;
        self.health_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    /// Move the clock forward by `secs`
    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Sender that records deliveries instead of sending them
#[derive(Debug)]
pub struct RecordingSender {
    contact_type: String,
    failing_value: Option<String>,
    fail_all: AtomicBool,
    sent: Mutex<Vec<(String, NoticeKind)>>,
}

impl RecordingSender {
    pub fn new(contact_type: impl Into<String>) -> Self {
        Self {
            contact_type: contact_type.into(),
            failing_value: None,
            fail_all: AtomicBool::new(false),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Builder: fail deliveries to the contact with this value
    pub fn failing_for(mut self, value: impl Into<String>) -> Self {
        self.failing_value = Some(value.into());
        self
    }

    /// Fail every delivery
    pub fn fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Contact values that received a notice, in delivery order
    pub fn recipients(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(value, _)| value.clone())
            .collect()
    }

    /// Kinds of delivered notices, in delivery order
    pub fn kinds(&self) -> Vec<NoticeKind> {
        self.sent.lock().unwrap().iter().map(|(_, kind)| *kind).collect()
    }
}

#[async_trait]
impl Sender for RecordingSender {
    fn contact_type(&self) -> &str {
        &self.contact_type
    }

    async fn send(&self, contact: &Contact, notice: &SelfStateNotice) -> Result<(), SendError> {
        let fails = self.fail_all.load(Ordering::SeqCst)
            || self.failing_value.as_deref() == Some(contact.value.as_str());
        if fails {
            return Err(SendError::Delivery {
                contact: contact.to_string(),
                message: "mock delivery failure".to_string(),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((contact.value.clone(), notice.kind));
        Ok(())
    }
}
