//! Process-local ingestion counters
//!
//! The ingestion engine increments these; the ingestion probe samples them.

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of the monotonically increasing "total received" counter
pub trait MetricsSource: Send + Sync {
    fn total_received(&self) -> u64;
}

/// Counters owned by the ingestion engine
#[derive(Debug, Default)]
pub struct FilterMetrics {
    total_received: AtomicU64,
}

impl FilterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `n` received metrics
    pub fn mark_received(&self, n: u64) {
        self.total_received.fetch_add(n, Ordering::Relaxed);
    }
}

impl MetricsSource for FilterMetrics {
    fn total_received(&self) -> u64 {
        self.total_received.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_received() {
        let metrics = FilterMetrics::new();
        assert_eq!(metrics.total_received(), 0);
        metrics.mark_received(3);
        metrics.mark_received(2);
        assert_eq!(metrics.total_received(), 5);
    }
}
