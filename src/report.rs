//! Report Generator
//!
//! Assembles a point-in-time health snapshot from stored samples,
//! the alert log, and the cache counters. Pure read, no mutation.

use serde::{Deserialize, Serialize};

use crate::alerts::AlertLog;
use crate::cache::CacheCounters;
use crate::sample::Sample;
use crate::store::{MetricStore, QueryOptions};

/// Metric name external memory sources record under
pub const MEMORY_METRIC: &str = "memory.usage";

/// Prefix identifying error samples
const ERROR_PREFIX: &str = "error.";

/// Name substrings identifying timing samples
const TIMING_MARKERS: [&str; 2] = ["timing", "duration"];

/// On-demand aggregate snapshot of telemetry health
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// Time since construction or the last reset (ms)
    pub uptime_ms: u64,
    /// Total stored sample count
    pub total_metrics: usize,
    /// Mean value over timing-named samples
    pub average_response_time_ms: f64,
    /// Value of the most recent memory sample, 0 if none
    pub memory_usage_mb: f64,
    /// Cache hit percentage, 0 when no lookup was recorded
    pub cache_hit_rate: f64,
    /// Share of error-named samples, as a percentage
    pub error_rate: f64,
    /// Alerts still flagged active
    pub active_alerts: usize,
    /// When the snapshot was taken (epoch ms)
    pub last_updated_ms: i64,
}

impl PerformanceReport {
    pub(crate) fn assemble(
        store: &MetricStore,
        alerts: &AlertLog,
        cache: CacheCounters,
        uptime_ms: u64,
        now_ms: i64,
    ) -> Self {
        let samples = store.query(None, QueryOptions::default());
        let memory_usage_mb = store
            .query(
                Some(MEMORY_METRIC),
                QueryOptions {
                    limit: Some(1),
                    since_ms: None,
                },
            )
            .first()
            .map(|sample| sample.value)
            .unwrap_or(0.0);

        Self {
            uptime_ms,
            total_metrics: samples.len(),
            average_response_time_ms: average_response_time(&samples),
            memory_usage_mb,
            cache_hit_rate: cache.hit_rate(),
            error_rate: error_rate(&samples),
            active_alerts: alerts.active_count(),
            last_updated_ms: now_ms,
        }
    }
}

fn is_timing_name(name: &str) -> bool {
    TIMING_MARKERS.iter().any(|marker| name.contains(marker))
}

/// Mean value over samples whose name indicates a timing
fn average_response_time(samples: &[Sample]) -> f64 {
    let timings: Vec<f64> = samples
        .iter()
        .filter(|sample| is_timing_name(&sample.name))
        .map(|sample| sample.value)
        .collect();
    if timings.is_empty() {
        0.0
    } else {
        timings.iter().sum::<f64>() / timings.len() as f64
    }
}

/// Percentage of samples whose name carries the error prefix
fn error_rate(samples: &[Sample]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let errors = samples
        .iter()
        .filter(|sample| sample.name.starts_with(ERROR_PREFIX))
        .count();
    errors as f64 / samples.len() as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SamplePayload;

    fn gauge_at(timestamp_ms: i64, name: &str, value: f64) -> Sample {
        Sample::at(timestamp_ms, name, SamplePayload::Gauge { value })
    }

    #[test]
    fn test_average_response_time_filters_by_name() {
        let samples = vec![
            gauge_at(1, "render.duration", 100.0),
            gauge_at(2, "layout.timing", 300.0),
            gauge_at(3, "cache.events.hit", 999.0),
        ];
        assert!((average_response_time(&samples) - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_error_rate() {
        let samples = vec![
            gauge_at(1, "error.fetch", 0.0),
            gauge_at(2, "render.duration", 10.0),
            gauge_at(3, "render.duration", 20.0),
            gauge_at(4, "render.duration", 30.0),
        ];
        assert!((error_rate(&samples) - 25.0).abs() < f64::EPSILON);
        assert_eq!(error_rate(&[]), 0.0);
    }

    #[test]
    fn test_assemble_reads_latest_memory_sample() {
        let mut store = MetricStore::new();
        store.push(gauge_at(100, MEMORY_METRIC, 64.0), 10);
        store.push(gauge_at(200, MEMORY_METRIC, 96.0), 10);

        let report = PerformanceReport::assemble(
            &store,
            &AlertLog::new(),
            CacheCounters::default(),
            1234,
            200,
        );
        assert_eq!(report.memory_usage_mb, 96.0);
        assert_eq!(report.total_metrics, 2);
        assert_eq!(report.uptime_ms, 1234);
        assert_eq!(report.active_alerts, 0);
    }

    #[test]
    fn test_assemble_empty_store() {
        let report = PerformanceReport::assemble(
            &MetricStore::new(),
            &AlertLog::new(),
            CacheCounters::default(),
            0,
            0,
        );
        assert_eq!(report.total_metrics, 0);
        assert_eq!(report.memory_usage_mb, 0.0);
        assert_eq!(report.cache_hit_rate, 0.0);
        assert_eq!(report.error_rate, 0.0);
    }
}
