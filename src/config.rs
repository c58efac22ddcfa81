//! Telemetry Configuration
//!
//! Construction-time settings for the collector: sampling, retention,
//! alert thresholds, and feature gates. Values are not validated;
//! degenerate settings degrade behavior instead of failing.

use serde::{Deserialize, Serialize};

/// Thresholds that drive alert evaluation and latency banding
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Duration at or above which a timing is critical (ms)
    pub critical_ms: f64,
    /// Duration at or above which a timing warns (ms)
    pub warning_ms: f64,
    /// Duration below which a timing counts as optimal (ms)
    pub optimal_ms: f64,
    /// Used memory at or above which a warning fires (MB)
    pub memory_warning_mb: f64,
    /// Cache miss ratio at or above which a warning fires (0.0–1.0)
    pub cache_miss_warning: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            critical_ms: 1000.0,
            warning_ms: 500.0,
            optimal_ms: 100.0,
            memory_warning_mb: 150.0,
            cache_miss_warning: 0.3,
        }
    }
}

/// How a measured duration relates to the configured thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatencyBand {
    Optimal,
    Acceptable,
    Slow,
    Critical,
}

impl Thresholds {
    /// Classify a duration into a latency band
    pub fn classify(&self, duration_ms: f64) -> LatencyBand {
        if duration_ms >= self.critical_ms {
            LatencyBand::Critical
        } else if duration_ms >= self.warning_ms {
            LatencyBand::Slow
        } else if duration_ms >= self.optimal_ms {
            LatencyBand::Acceptable
        } else {
            LatencyBand::Optimal
        }
    }
}

/// Configuration for the telemetry collector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Master switch; a disabled collector records nothing
    pub enabled: bool,
    /// Admission probability for recordings (0.0–1.0); errors bypass it
    pub sample_rate: f64,
    /// Maximum samples retained per metric series
    pub max_metrics: usize,
    /// Age after which samples and alerts are swept (ms)
    pub retention_period_ms: u64,
    /// Evaluate thresholds and append alerts
    pub enable_alerts: bool,
    /// Alert thresholds
    pub thresholds: Thresholds,
    /// Accept memory samples
    pub enable_memory_monitoring: bool,
    /// Accept cache events
    pub enable_cache_monitoring: bool,
    /// Accept error recordings
    pub enable_error_tracking: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sample_rate: 1.0,
            max_metrics: 100,
            retention_period_ms: 300_000,
            enable_alerts: true,
            thresholds: Thresholds::default(),
            enable_memory_monitoring: true,
            enable_cache_monitoring: true,
            enable_error_tracking: true,
        }
    }
}

/// Partial configuration update, merged shallowly into an existing
/// [`TelemetryConfig`]. A provided `thresholds` replaces the whole
/// nested struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfigPatch {
    pub enabled: Option<bool>,
    pub sample_rate: Option<f64>,
    pub max_metrics: Option<usize>,
    pub retention_period_ms: Option<u64>,
    pub enable_alerts: Option<bool>,
    pub thresholds: Option<Thresholds>,
    pub enable_memory_monitoring: Option<bool>,
    pub enable_cache_monitoring: Option<bool>,
    pub enable_error_tracking: Option<bool>,
}

impl TelemetryConfig {
    /// Apply a shallow merge of `patch` onto `self`
    pub fn merge(&mut self, patch: TelemetryConfigPatch) {
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(sample_rate) = patch.sample_rate {
            self.sample_rate = sample_rate;
        }
        if let Some(max_metrics) = patch.max_metrics {
            self.max_metrics = max_metrics;
        }
        if let Some(retention) = patch.retention_period_ms {
            self.retention_period_ms = retention;
        }
        if let Some(enable_alerts) = patch.enable_alerts {
            self.enable_alerts = enable_alerts;
        }
        if let Some(thresholds) = patch.thresholds {
            self.thresholds = thresholds;
        }
        if let Some(memory) = patch.enable_memory_monitoring {
            self.enable_memory_monitoring = memory;
        }
        if let Some(cache) = patch.enable_cache_monitoring {
            self.enable_cache_monitoring = cache;
        }
        if let Some(errors) = patch.enable_error_tracking {
            self.enable_error_tracking = errors;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_bands() {
        let thresholds = Thresholds::default();
        assert_eq!(thresholds.classify(50.0), LatencyBand::Optimal);
        assert_eq!(thresholds.classify(100.0), LatencyBand::Acceptable);
        assert_eq!(thresholds.classify(499.0), LatencyBand::Acceptable);
        assert_eq!(thresholds.classify(500.0), LatencyBand::Slow);
        assert_eq!(thresholds.classify(1000.0), LatencyBand::Critical);
        assert_eq!(thresholds.classify(5000.0), LatencyBand::Critical);
    }

    #[test]
    fn test_merge_is_shallow() {
        let mut config = TelemetryConfig::default();
        let patch = TelemetryConfigPatch {
            max_metrics: Some(10),
            ..Default::default()
        };
        config.merge(patch);

        assert_eq!(config.max_metrics, 10);
        assert!(config.enabled);
        assert_eq!(config.thresholds, Thresholds::default());
    }

    #[test]
    fn test_merge_replaces_thresholds_wholesale() {
        let mut config = TelemetryConfig::default();
        let patch = TelemetryConfigPatch {
            thresholds: Some(Thresholds {
                critical_ms: 2000.0,
                warning_ms: 900.0,
                optimal_ms: 50.0,
                memory_warning_mb: 512.0,
                cache_miss_warning: 0.5,
            }),
            ..Default::default()
        };
        config.merge(patch);

        assert_eq!(config.thresholds.critical_ms, 2000.0);
        assert_eq!(config.thresholds.memory_warning_mb, 512.0);
    }

    #[test]
    fn test_empty_patch_is_noop() {
        let mut config = TelemetryConfig::default();
        config.merge(TelemetryConfigPatch::default());
        assert_eq!(config, TelemetryConfig::default());
    }
}
