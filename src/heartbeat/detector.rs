//! Match-rate anomaly detection
//!
//! Compares the growth of the matched-metrics counter over one interval with
//! the growth over the interval before it. A drop to less than half the
//! previous rate is an anomaly.

use super::baseline::BaselineCache;
use std::time::Duration;

const COUNT_KEY: &str = "matched.count";
const DELTA_KEY: &str = "matched.delta";

/// Result of one observation of the matched counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchVerdict {
    /// Counter is zero; nothing to compare
    Skipped,
    /// No live baseline; the observation became the new baseline
    Baselined { count: i64 },
    /// Counter went backwards; baseline restarted
    CounterReset { previous: i64, current: i64 },
    /// Rate compared (or recorded) without anomaly
    Normal {
        delta: i64,
        previous_delta: Option<i64>,
    },
    /// Rate fell below half of the previous rate
    Anomaly { delta: i64, previous_delta: i64 },
}

impl MatchVerdict {
    /// Whether a rate comparison actually took place and passed
    pub fn is_verified_normal(&self) -> bool {
        matches!(
            self,
            Self::Normal {
                previous_delta: Some(_),
                ..
            }
        )
    }
}

/// Two-level baseline: last count and last per-interval delta
#[derive(Debug)]
pub struct MatchRateDetector {
    cache: BaselineCache,
    ttl: Duration,
}

impl MatchRateDetector {
    /// Create a detector for a probe sampling every `interval`
    pub fn new(interval: Duration) -> Self {
        Self {
            cache: BaselineCache::new(),
            ttl: BaselineCache::ttl_for(interval),
        }
    }

    /// Observe the current counter value
    pub fn observe(&mut self, current: i64) -> MatchVerdict {
        if current == 0 {
            return MatchVerdict::Skipped;
        }

        let Some(previous) = self.cache.get(COUNT_KEY) else {
            self.cache.remove(DELTA_KEY);
            self.cache.set(COUNT_KEY, current, self.ttl);
            return MatchVerdict::Baselined { count: current };
        };

        let delta = current - previous;
        if delta < 0 {
            self.cache.remove(DELTA_KEY);
            self.cache.set(COUNT_KEY, current, self.ttl);
            return MatchVerdict::CounterReset { previous, current };
        }

        let previous_delta = self.cache.get(DELTA_KEY);
        self.cache.set(COUNT_KEY, current, self.ttl);
        self.cache.set(DELTA_KEY, delta, self.ttl);

        match previous_delta {
            Some(prev) if is_rate_drop(delta, prev) => MatchVerdict::Anomaly {
                delta,
                previous_delta: prev,
            },
            Some(prev) if prev > 0 => MatchVerdict::Normal {
                delta,
                previous_delta: Some(prev),
            },
            _ => MatchVerdict::Normal {
                delta,
                previous_delta: None,
            },
        }
    }
}

/// `delta < 0.5 * previous`, strict, without floating point.
/// A non-positive previous rate is not a valid baseline.
fn is_rate_drop(delta: i64, previous: i64) -> bool {
    previous > 0 && delta.saturating_mul(2) < previous
}
