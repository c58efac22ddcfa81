//! Derived Statistics
//!
//! Aggregate views over a queried slice of the store.

use serde::{Deserialize, Serialize};

use crate::sample::Sample;

/// Aggregate statistics over a set of samples
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricStatistics {
    /// Number of samples in the queried slice
    pub count: usize,
    /// Mean of the finite values
    pub average: f64,
    /// Minimum finite value
    pub min: f64,
    /// Maximum finite value
    pub max: f64,
    /// Sum of the finite values
    pub total: f64,
}

impl MetricStatistics {
    /// Compute statistics over a slice of samples.
    ///
    /// Non-finite values are excluded from the arithmetic but still
    /// contribute to `count`; when no finite value exists the
    /// arithmetic fields stay zero while `count` reflects the raw
    /// sample count.
    pub fn from_samples(samples: &[Sample]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let count = samples.len();
        let finite: Vec<f64> = samples
            .iter()
            .map(|sample| sample.value)
            .filter(|value| value.is_finite())
            .collect();
        if finite.is_empty() {
            return Self {
                count,
                ..Self::default()
            };
        }

        let total: f64 = finite.iter().sum();
        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            count,
            average: total / finite.len() as f64,
            min,
            max,
            total,
        }
    }
}
