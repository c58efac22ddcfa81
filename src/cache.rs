//! Cache Accounting
//!
//! Running hit/miss/operation counters updated by explicit cache-event
//! recordings and read by the report generator.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::sample::CacheOp;

/// Point-in-time snapshot of the cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheCounters {
    pub hits: u64,
    pub misses: u64,
    pub operations: u64,
}

impl CacheCounters {
    /// Hit rate as a percentage of tracked lookups, 0 when none
    pub fn hit_rate(&self) -> f64 {
        let tracked = self.hits + self.misses;
        if tracked == 0 {
            0.0
        } else {
            self.hits as f64 / tracked as f64 * 100.0
        }
    }

    /// Miss ratio over all operations, 0 when none
    pub fn miss_ratio(&self) -> f64 {
        if self.operations == 0 {
            0.0
        } else {
            self.misses as f64 / self.operations as f64
        }
    }
}

/// Monotonically incremented cache counters, zeroed only by reset
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    operations: AtomicU64,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one cache operation and return the updated snapshot
    pub fn record(&self, operation: CacheOp) -> CacheCounters {
        self.operations.fetch_add(1, Ordering::Relaxed);
        match operation {
            CacheOp::Hit => {
                self.hits.fetch_add(1, Ordering::Relaxed);
            }
            CacheOp::Miss => {
                self.misses.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
        self.snapshot()
    }

    pub fn snapshot(&self) -> CacheCounters {
        CacheCounters {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            operations: self.operations.load(Ordering::Relaxed),
        }
    }

    /// Zero all three counters
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.operations.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_track_operations() {
        let stats = CacheStats::new();
        stats.record(CacheOp::Hit);
        stats.record(CacheOp::Hit);
        stats.record(CacheOp::Miss);
        stats.record(CacheOp::Set);

        let counters = stats.snapshot();
        assert_eq!(counters.hits, 2);
        assert_eq!(counters.misses, 1);
        assert_eq!(counters.operations, 4);
    }

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats::new();
        assert_eq!(stats.snapshot().hit_rate(), 0.0);

        stats.record(CacheOp::Hit);
        stats.record(CacheOp::Hit);
        stats.record(CacheOp::Miss);

        let rate = stats.snapshot().hit_rate();
        assert!((rate - 2.0 / 3.0 * 100.0).abs() < 0.001);
    }

    #[test]
    fn test_set_does_not_affect_hit_rate() {
        let stats = CacheStats::new();
        stats.record(CacheOp::Set);
        stats.record(CacheOp::Hit);

        let counters = stats.snapshot();
        assert_eq!(counters.operations, 2);
        assert_eq!(counters.hit_rate(), 100.0);
    }

    #[test]
    fn test_reset() {
        let stats = CacheStats::new();
        stats.record(CacheOp::Hit);
        stats.record(CacheOp::Miss);
        stats.reset();

        assert_eq!(stats.snapshot(), CacheCounters::default());
    }
}
