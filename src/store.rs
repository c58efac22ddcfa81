//! Metric Store
//!
//! Name-keyed sample series with per-name FIFO bounding and age-based
//! pruning. Storage order is chronological; queries reorder newest
//! first for consumption.

use std::collections::{HashMap, VecDeque};

use crate::sample::Sample;

/// Options for metric queries
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryOptions {
    /// Maximum number of samples to return (applied after ordering)
    pub limit: Option<usize>,
    /// Only samples recorded at or after this epoch-ms timestamp
    pub since_ms: Option<i64>,
}

/// In-memory store of metric series
#[derive(Debug, Default)]
pub struct MetricStore {
    series: HashMap<String, VecDeque<Sample>>,
}

impl MetricStore {
    pub fn new() -> Self {
        Self {
            series: HashMap::new(),
        }
    }

    /// Append a sample to its series, creating the series on first use
    /// and evicting the oldest entry once `max_series_len` is exceeded.
    pub fn push(&mut self, sample: Sample, max_series_len: usize) {
        let series = self
            .series
            .entry(sample.name.clone())
            .or_insert_with(VecDeque::new);
        series.push_back(sample);
        while series.len() > max_series_len {
            series.pop_front();
        }
    }

    /// Snapshot query: the named series (empty if unknown) or the
    /// concatenation of all series, filtered to `since_ms`, ordered
    /// newest first, truncated to `limit`. Results are owned clones;
    /// mutating them does not touch stored state.
    pub fn query(&self, name: Option<&str>, options: QueryOptions) -> Vec<Sample> {
        let mut results: Vec<Sample> = match name {
            Some(name) => self
                .series
                .get(name)
                .map(|series| series.iter().cloned().collect())
                .unwrap_or_default(),
            None => self
                .series
                .values()
                .flat_map(|series| series.iter().cloned())
                .collect(),
        };

        if let Some(since) = options.since_ms {
            results.retain(|sample| sample.timestamp_ms >= since);
        }
        results.sort_by(|a, b| b.timestamp_ms.cmp(&a.timestamp_ms));
        if let Some(limit) = options.limit {
            results.truncate(limit);
        }
        results
    }

    /// Total number of stored samples across all series
    pub fn len(&self) -> usize {
        self.series.values().map(|series| series.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Number of distinct series
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Drop samples recorded at or before `now_ms - retention_period_ms`
    /// and remove series that become empty.
    pub fn sweep(&mut self, now_ms: i64, retention_period_ms: u64) {
        let cutoff = now_ms - retention_period_ms as i64;
        self.series.retain(|_, series| {
            series.retain(|sample| sample.timestamp_ms > cutoff);
            !series.is_empty()
        });
    }

    pub fn clear(&mut self) {
        self.series.clear();
    }
}
