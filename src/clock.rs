//! Wall-clock source
//!
//! Heartbeat timestamps cross process boundaries, so they are unix seconds
//! rather than monotonic instants.

use chrono::Utc;

/// Source of the current unix time in seconds
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// System wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}
