//! Error types shared across the monitor.

use thiserror::Error;

use crate::ranges::{Axis, Tier};

/// Errors surfaced by configuration, lifecycle and reporting calls.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("invalid range for {tier}/{axis}: min {min} > max {max} or not finite")]
    InvalidRange {
        tier: Tier,
        axis: Axis,
        min: f64,
        max: f64,
    },

    #[error("invalid range bounds: min {min}, max {max}")]
    InvalidBounds { min: f64, max: f64 },

    #[error("unknown speed level '{0}' (expected 1 or 2)")]
    UnknownSpeedLevel(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid model prediction: {0}")]
    InvalidPrediction(String),

    #[error("session is still collecting; stop it before requesting a verdict")]
    SessionActive,

    #[error("no verdict yet: no session has been stopped")]
    NoVerdict,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MonitorError>;

/// A recoverable failure talking to the sensor source or acquisition control.
///
/// These never abort a session: a failed fetch skips the tick, a failed
/// control call is logged and the transition proceeds.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AcquisitionError {
    #[error("acquisition timed out")]
    Timeout,

    #[error("acquisition endpoint unavailable: {0}")]
    Unavailable(String),

    #[error("malformed acquisition payload: {0}")]
    Malformed(String),
}
