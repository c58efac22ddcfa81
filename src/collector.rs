//! Telemetry Collector
//!
//! The single entry point composing the metric store, alert log, and
//! cache accounting. Recording never fails into instrumented code:
//! internal helpers return `Result`, the boundary logs and drops.
//!
//! The collector is an explicit value meant to be handed out from the
//! application's composition root; there is no process-wide instance.
//! Interior mutability (locks and atomics) makes it `Send + Sync`, so
//! multi-threaded hosts can share one collector behind an `Arc`
//! without extra locking.

use parking_lot::RwLock;
use serde_json::json;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::warn;

use crate::alerts::{Alert, AlertLevel, AlertLog};
use crate::cache::{CacheCounters, CacheStats};
use crate::config::{TelemetryConfig, TelemetryConfigPatch};
use crate::error::{Result, TelemetryError};
use crate::report::{PerformanceReport, MEMORY_METRIC};
use crate::sample::{now_ms, CacheOp, Metadata, Sample, SamplePayload};
use crate::sources::{MemorySample, MemorySampleSource, UnhandledErrorSource};
use crate::stats::MetricStatistics;
use crate::store::{MetricStore, QueryOptions};

/// In-memory performance telemetry for one widget instance
pub struct TelemetryCollector {
    config: RwLock<TelemetryConfig>,
    enabled: AtomicBool,
    store: RwLock<MetricStore>,
    alerts: RwLock<AlertLog>,
    cache: CacheStats,
    started: RwLock<Instant>,
}

impl TelemetryCollector {
    pub fn new(config: TelemetryConfig) -> Self {
        Self {
            enabled: AtomicBool::new(config.enabled),
            config: RwLock::new(config),
            store: RwLock::new(MetricStore::new()),
            alerts: RwLock::new(AlertLog::new()),
            cache: CacheStats::new(),
            started: RwLock::new(Instant::now()),
        }
    }

    // --------------- lifecycle ---------------

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
        self.config.write().enabled = enabled;
    }

    /// Shallow-merge a partial configuration update
    pub fn update_config(&self, patch: TelemetryConfigPatch) {
        let mut config = self.config.write();
        config.merge(patch);
        self.enabled.store(config.enabled, Ordering::Relaxed);
    }

    /// Current configuration snapshot
    pub fn config(&self) -> TelemetryConfig {
        self.config.read().clone()
    }

    /// Clear samples, alerts, and cache counters; restart the uptime
    /// clock. Configuration and the enabled flag survive.
    pub fn reset(&self) {
        self.store.write().clear();
        self.alerts.write().clear();
        self.cache.reset();
        *self.started.write() = Instant::now();
    }

    /// Prune samples and alerts older than the retention window.
    /// Driven by an external timer; the collector owns no scheduler.
    pub fn sweep(&self) {
        let retention = self.config.read().retention_period_ms;
        let now = now_ms();
        self.store.write().sweep(now, retention);
        self.alerts.write().sweep(now, retention);
    }

    // --------------- recording ---------------

    /// Record a prepared sample. Admission is gated by the enabled
    /// flag and the sample rate; failures are logged and dropped.
    pub fn record_sample(&self, sample: Sample) {
        if !self.is_enabled() {
            return;
        }
        let config = self.config.read().clone();
        if !sample_gate(config.sample_rate) {
            return;
        }
        self.submit(sample);
    }

    /// Record a timed operation and evaluate the duration thresholds
    pub fn record_timing(&self, name: &str, duration_ms: f64) {
        if !self.is_enabled() {
            return;
        }
        self.finish_measure(name, duration_ms, true, None);
    }

    /// Record a raw metric value
    pub fn record_metric(&self, name: &str, value: f64) {
        self.record_sample(Sample::new(name, SamplePayload::Gauge { value }));
    }

    /// Record a cache operation.
    ///
    /// Counters increment for every admitted event; the sample rate
    /// only thins the derived `cache.<name>.<op>` metric.
    pub fn record_cache_event(&self, cache: &str, operation: CacheOp) {
        if !self.is_enabled() {
            return;
        }
        let config = self.config.read().clone();
        if !config.enable_cache_monitoring {
            return;
        }

        let counters = self.cache.record(operation);
        if config.enable_alerts {
            self.alerts
                .write()
                .evaluate_cache(cache, &counters, &config.thresholds);
        }

        if !sample_gate(config.sample_rate) {
            return;
        }
        let sample = Sample::new(
            format!("cache.{cache}.{operation}"),
            SamplePayload::CacheEvent {
                cache: cache.to_string(),
                operation,
                hits: counters.hits,
                misses: counters.misses,
                operations: counters.operations,
            },
        );
        self.submit(sample);
    }

    /// Record a failure: an `error.<context>` sample plus a critical
    /// alert. Bypasses the sample-rate gate; losing error signals is
    /// never acceptable.
    pub fn record_error(&self, context: &str, error: impl fmt::Display) {
        if !self.is_enabled() {
            return;
        }
        let config = self.config.read().clone();
        if !config.enable_error_tracking {
            return;
        }

        let message = error.to_string();
        let sample = Sample::new(
            format!("error.{context}"),
            SamplePayload::Error {
                context: context.to_string(),
                message: message.clone(),
            },
        );
        self.submit(sample);

        if config.enable_alerts {
            let mut metadata = Metadata::new();
            metadata.insert("context".to_string(), json!(context));
            self.alerts.write().push(
                "error",
                format!("error in {context}: {message}"),
                AlertLevel::Critical,
                metadata,
            );
        }
    }

    /// Record a user interaction event under `interaction.<action>`
    pub fn record_interaction(&self, action: &str) {
        self.record_sample(Sample::new(
            format!("interaction.{action}"),
            SamplePayload::Interaction {
                action: action.to_string(),
            },
        ));
    }

    /// Record one memory observation under `memory.usage` and check
    /// the memory threshold
    pub fn record_memory_sample(&self, memory: MemorySample) {
        if !self.is_enabled() {
            return;
        }
        let config = self.config.read().clone();
        if !config.enable_memory_monitoring || !sample_gate(config.sample_rate) {
            return;
        }

        let mut metadata = Metadata::new();
        metadata.insert("total_mb".to_string(), json!(memory.total_mb));
        metadata.insert("limit_mb".to_string(), json!(memory.limit_mb));
        let sample = Sample::new(
            MEMORY_METRIC,
            SamplePayload::Gauge {
                value: memory.used_mb,
            },
        )
        .with_metadata(metadata);

        if self.submit(sample) && config.enable_alerts {
            self.alerts
                .write()
                .evaluate_memory(memory.used_mb, &config.thresholds);
        }
    }

    /// Pump one reading from a memory source into the collector
    pub fn poll_memory(&self, source: &mut dyn MemorySampleSource) {
        if let Some(memory) = source.sample() {
            self.record_memory_sample(memory);
        }
    }

    /// Pump captured failures from a host error hook
    pub fn drain_errors(&self, source: &mut dyn UnhandledErrorSource) {
        for captured in source.drain() {
            self.record_error(&captured.context, captured.message);
        }
    }

    // --------------- timed measurement ---------------

    /// Run `op`, recording its wall-clock duration under `name` on
    /// both paths. On `Err` the sample carries `success: false` and
    /// the error's text, and the error propagates unchanged. Disabled
    /// telemetry calls `op` directly with no instrumentation.
    pub fn measure<T, E, F>(&self, name: &str, op: F) -> std::result::Result<T, E>
    where
        F: FnOnce() -> std::result::Result<T, E>,
        E: fmt::Display,
    {
        if !self.is_enabled() {
            return op();
        }

        let started = Instant::now();
        let result = op();
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
        match &result {
            Ok(_) => self.finish_measure(name, duration_ms, true, None),
            Err(error) => self.finish_measure(name, duration_ms, false, Some(error.to_string())),
        }
        result
    }

    /// [`measure`](Self::measure) for infallible operations
    pub fn measure_ok<T, F>(&self, name: &str, op: F) -> T
    where
        F: FnOnce() -> T,
    {
        if !self.is_enabled() {
            return op();
        }

        let started = Instant::now();
        let value = op();
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.finish_measure(name, duration_ms, true, None);
        value
    }

    fn finish_measure(&self, name: &str, duration_ms: f64, success: bool, error: Option<String>) {
        let config = self.config.read().clone();
        if !sample_gate(config.sample_rate) {
            return;
        }

        let band = config.thresholds.classify(duration_ms);
        let mut metadata = Metadata::new();
        metadata.insert("band".to_string(), json!(band));
        let sample = Sample::new(
            name,
            SamplePayload::Timing {
                duration_ms,
                success,
                error,
            },
        )
        .with_metadata(metadata);

        if self.submit(sample) && config.enable_alerts {
            self.alerts
                .write()
                .evaluate_timing(name, duration_ms, &config.thresholds);
        }
    }

    // --------------- queries ---------------

    /// Snapshot query over stored samples
    pub fn query(&self, name: Option<&str>, options: QueryOptions) -> Vec<Sample> {
        self.store.read().query(name, options)
    }

    /// Aggregate statistics over a queried slice of one series
    pub fn statistics(&self, name: &str, options: QueryOptions) -> MetricStatistics {
        let samples = self.store.read().query(Some(name), options);
        MetricStatistics::from_samples(&samples)
    }

    /// Snapshot of the alert log, oldest first
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.read().snapshot()
    }

    /// Snapshot of the cache counters
    pub fn cache_counters(&self) -> CacheCounters {
        self.cache.snapshot()
    }

    /// Assemble the health report
    pub fn report(&self) -> PerformanceReport {
        let uptime_ms = self.started.read().elapsed().as_millis() as u64;
        PerformanceReport::assemble(
            &self.store.read(),
            &self.alerts.read(),
            self.cache.snapshot(),
            uptime_ms,
            now_ms(),
        )
    }

    // --------------- internals ---------------

    /// Store a sample; log and swallow failures. Returns whether the
    /// sample was stored.
    fn submit(&self, sample: Sample) -> bool {
        match self.try_record(sample) {
            Ok(()) => true,
            Err(error) => {
                warn!(error = %error, "dropped telemetry sample");
                false
            }
        }
    }

    fn try_record(&self, sample: Sample) -> Result<()> {
        if sample.name.is_empty() {
            return Err(TelemetryError::InvalidPayload(
                "empty metric name".to_string(),
            ));
        }
        let max_metrics = self.config.read().max_metrics;
        self.store.write().push(sample, max_metrics);
        Ok(())
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new(TelemetryConfig::default())
    }
}

/// Probabilistic admission by sample rate; 1.0 admits everything,
/// 0.0 admits nothing
fn sample_gate(rate: f64) -> bool {
    rate >= 1.0 || (rate > 0.0 && rand::random::<f64>() < rate)
}
