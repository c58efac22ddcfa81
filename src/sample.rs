//! Recorded Samples
//!
//! One sample per recorded observation, tagged by recording kind so
//! each kind carries only the fields it guarantees. A generic metadata
//! bag remains for forward compatibility.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::TelemetryError;

/// Forward-compatibility bag attached to samples and alerts
pub type Metadata = serde_json::Map<String, Value>;

/// Cache operation kinds accepted by cache-event recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheOp {
    Hit,
    Miss,
    Set,
    Evict,
    Clear,
}

impl CacheOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheOp::Hit => "hit",
            CacheOp::Miss => "miss",
            CacheOp::Set => "set",
            CacheOp::Evict => "evict",
            CacheOp::Clear => "clear",
        }
    }
}

impl fmt::Display for CacheOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheOp {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hit" => Ok(CacheOp::Hit),
            "miss" => Ok(CacheOp::Miss),
            "set" => Ok(CacheOp::Set),
            "evict" => Ok(CacheOp::Evict),
            "clear" => Ok(CacheOp::Clear),
            other => Err(TelemetryError::UnknownCacheOp(other.to_string())),
        }
    }
}

/// Payload of one recording, tagged by kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SamplePayload {
    /// A timed operation
    Timing {
        duration_ms: f64,
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// A raw metric value (including memory samples)
    Gauge { value: f64 },
    /// A cache operation with the counter snapshot at recording time
    CacheEvent {
        cache: String,
        operation: CacheOp,
        hits: u64,
        misses: u64,
        operations: u64,
    },
    /// A recorded failure
    Error { context: String, message: String },
    /// A user interaction event
    Interaction { action: String },
}

impl SamplePayload {
    /// The numeric value this payload contributes to its series.
    ///
    /// Timings contribute their duration, gauges their value, all
    /// other kinds contribute 0.
    pub fn value(&self) -> f64 {
        match self {
            SamplePayload::Timing { duration_ms, .. } => *duration_ms,
            SamplePayload::Gauge { value } => *value,
            _ => 0.0,
        }
    }
}

/// One recorded observation, immutable once appended to its series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub name: String,
    pub value: f64,
    pub timestamp_ms: i64,
    pub payload: SamplePayload,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl Sample {
    /// Build a sample stamped with the current wall-clock time
    pub fn new(name: impl Into<String>, payload: SamplePayload) -> Self {
        Self::at(now_ms(), name, payload)
    }

    /// Build a sample with an explicit timestamp
    pub fn at(timestamp_ms: i64, name: impl Into<String>, payload: SamplePayload) -> Self {
        let value = payload.value();
        Self {
            name: name.into(),
            value,
            timestamp_ms,
            payload,
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Current wall-clock time in epoch milliseconds
pub(crate) fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
