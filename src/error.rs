//! Error types for the telemetry core
//!
//! Recording entry points never surface these to instrumented code;
//! they are produced by internal helpers and logged at the boundary.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("invalid sample payload: {0}")]
    InvalidPayload(String),

    #[error("unknown cache operation: {0}")]
    UnknownCacheOp(String),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;
