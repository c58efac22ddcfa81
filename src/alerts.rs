//! Alert Engine
//!
//! Threshold evaluation of recorded values and a bounded in-memory
//! alert log. The log caps at [`MAX_ALERTS`] entries with FIFO
//! eviction, independent of the age-based sweep. Alerts are never
//! resolved; only eviction and pruning remove them.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::VecDeque;
use uuid::Uuid;

use crate::cache::CacheCounters;
use crate::config::Thresholds;
use crate::sample::{now_ms, Metadata};

/// Maximum number of alerts retained
pub const MAX_ALERTS: usize = 100;

/// Cache events needed before the miss-ratio check applies
const CACHE_ALERT_MIN_OPERATIONS: u64 = 20;

/// Severity of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    Critical,
}

/// A generated notice that a value crossed a configured threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub kind: String,
    pub message: String,
    pub level: AlertLevel,
    pub timestamp_ms: i64,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

/// Bounded log of alerts, oldest first
#[derive(Debug, Default)]
pub struct AlertLog {
    alerts: VecDeque<Alert>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an alert, evicting the oldest entry past the cap
    pub fn push(&mut self, kind: &str, message: String, level: AlertLevel, metadata: Metadata) {
        self.alerts.push_back(Alert {
            id: Uuid::new_v4(),
            kind: kind.to_string(),
            message,
            level,
            timestamp_ms: now_ms(),
            active: true,
            metadata,
        });
        while self.alerts.len() > MAX_ALERTS {
            self.alerts.pop_front();
        }
    }

    /// Evaluate a timing against the duration thresholds.
    ///
    /// Critical is checked first; a duration at or above the critical
    /// threshold never also produces a warning for the same
    /// observation. Below the warning threshold nothing is appended.
    pub fn evaluate_timing(&mut self, name: &str, duration_ms: f64, thresholds: &Thresholds) {
        let mut metadata = Metadata::new();
        metadata.insert("metric".to_string(), json!(name));
        metadata.insert("duration_ms".to_string(), json!(duration_ms));

        if duration_ms >= thresholds.critical_ms {
            self.push(
                "timing",
                format!("critical duration in {name}: {duration_ms:.0}ms"),
                AlertLevel::Critical,
                metadata,
            );
        } else if duration_ms >= thresholds.warning_ms {
            self.push(
                "timing",
                format!("slow duration in {name}: {duration_ms:.0}ms"),
                AlertLevel::Warning,
                metadata,
            );
        }
    }

    /// Warn when used memory reaches the configured threshold
    pub fn evaluate_memory(&mut self, used_mb: f64, thresholds: &Thresholds) {
        if used_mb >= thresholds.memory_warning_mb {
            let mut metadata = Metadata::new();
            metadata.insert("used_mb".to_string(), json!(used_mb));
            self.push(
                "memory",
                format!("high memory usage: {used_mb:.1}MB"),
                AlertLevel::Warning,
                metadata,
            );
        }
    }

    /// Warn when the cache miss ratio reaches the configured threshold.
    /// Skipped until enough operations have accumulated to make the
    /// ratio meaningful.
    pub fn evaluate_cache(&mut self, cache: &str, counters: &CacheCounters, thresholds: &Thresholds) {
        if counters.operations < CACHE_ALERT_MIN_OPERATIONS {
            return;
        }
        let miss_ratio = counters.miss_ratio();
        if miss_ratio >= thresholds.cache_miss_warning {
            let mut metadata = Metadata::new();
            metadata.insert("cache".to_string(), json!(cache));
            metadata.insert("miss_ratio".to_string(), json!(miss_ratio));
            self.push(
                "cache",
                format!(
                    "elevated miss ratio for {cache}: {:.0}%",
                    miss_ratio * 100.0
                ),
                AlertLevel::Warning,
                metadata,
            );
        }
    }

    /// Owned snapshot of the log, oldest first
    pub fn snapshot(&self) -> Vec<Alert> {
        self.alerts.iter().cloned().collect()
    }

    /// Number of alerts still flagged active
    pub fn active_count(&self) -> usize {
        self.alerts.iter().filter(|alert| alert.active).count()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Drop alerts recorded at or before `now_ms - retention_period_ms`
    pub fn sweep(&mut self, now_ms: i64, retention_period_ms: u64) {
        let cutoff = now_ms - retention_period_ms as i64;
        self.alerts.retain(|alert| alert.timestamp_ms > cutoff);
    }

    pub fn clear(&mut self) {
        self.alerts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critical_excludes_warning() {
        let mut log = AlertLog::new();
        log.evaluate_timing("render", 1200.0, &Thresholds::default());

        let alerts = log.snapshot();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::Critical);
        assert_eq!(alerts[0].kind, "timing");
    }

    #[test]
    fn test_warning_band() {
        let mut log = AlertLog::new();
        log.evaluate_timing("render", 600.0, &Thresholds::default());

        let alerts = log.snapshot();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::Warning);
    }

    #[test]
    fn test_below_warning_is_silent() {
        let mut log = AlertLog::new();
        log.evaluate_timing("render", 499.0, &Thresholds::default());
        assert!(log.is_empty());
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut log = AlertLog::new();
        for i in 0..(MAX_ALERTS + 1) {
            log.push(
                "timing",
                format!("alert {i}"),
                AlertLevel::Warning,
                Metadata::new(),
            );
        }

        assert_eq!(log.len(), MAX_ALERTS);
        let alerts = log.snapshot();
        assert_eq!(alerts[0].message, "alert 1");
        assert_eq!(alerts[MAX_ALERTS - 1].message, format!("alert {MAX_ALERTS}"));
    }

    #[test]
    fn test_memory_threshold() {
        let mut log = AlertLog::new();
        let thresholds = Thresholds::default();
        log.evaluate_memory(149.9, &thresholds);
        assert!(log.is_empty());

        log.evaluate_memory(150.0, &thresholds);
        assert_eq!(log.len(), 1);
        assert_eq!(log.snapshot()[0].kind, "memory");
    }

    #[test]
    fn test_cache_warm_up_window() {
        let mut log = AlertLog::new();
        let thresholds = Thresholds::default();

        // All misses, but too few operations to evaluate
        let early = CacheCounters {
            hits: 0,
            misses: 10,
            operations: 10,
        };
        log.evaluate_cache("events", &early, &thresholds);
        assert!(log.is_empty());

        let later = CacheCounters {
            hits: 10,
            misses: 10,
            operations: 20,
        };
        log.evaluate_cache("events", &later, &thresholds);
        assert_eq!(log.len(), 1);
        assert_eq!(log.snapshot()[0].kind, "cache");
    }

    #[test]
    fn test_alerts_stay_active() {
        let mut log = AlertLog::new();
        log.evaluate_timing("render", 2000.0, &Thresholds::default());
        assert_eq!(log.active_count(), 1);
        assert!(log.snapshot().iter().all(|alert| alert.active));
    }
}
