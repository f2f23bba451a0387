//! Process-local baseline cache
//!
//! Holds the last observed value per named counter until it expires. Expired
//! entries are dropped on read, so a scheduling gap starts a fresh baseline
//! instead of comparing against an arbitrarily old value.

use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Multiplier applied to a probe's sampling interval to get its baseline TTL
pub const BASELINE_TTL_FACTOR: u32 = 2;

/// A cached counter value and the instant it stops being valid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaselineEntry {
    pub value: i64,
    pub expires_at: Instant,
}

impl BaselineEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Name → (value, expiry) map with lazy expiry
///
/// Owned by a single probe; no internal locking.
#[derive(Debug, Default)]
pub struct BaselineCache {
    entries: HashMap<String, BaselineEntry>,
}

impl BaselineCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// TTL for a probe sampling every `interval`
    pub fn ttl_for(interval: Duration) -> Duration {
        interval * BASELINE_TTL_FACTOR
    }

    /// Get a live value, dropping the entry if it has expired
    pub fn get(&mut self, name: &str) -> Option<i64> {
        let now = Instant::now();
        match self.entries.get(name) {
            Some(entry) if !entry.is_expired(now) => Some(entry.value),
            Some(_) => {
                log::debug!("Baseline '{}' expired", name);
                self.entries.remove(name);
                None
            }
            None => None,
        }
    }

    /// Store a value valid for `ttl` from now
    pub fn set(&mut self, name: &str, value: i64, ttl: Duration) {
        let entry = BaselineEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.insert(name.to_string(), entry);
    }

    /// Drop an entry regardless of expiry
    pub fn remove(&mut self, name: &str) {
        self.entries.remove(name);
    }
}
