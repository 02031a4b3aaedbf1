//! Collaborator traits for the sensor feed and acquisition control.
//!
//! The controller polls a [`SensorSource`] once per tick and calls
//! [`AcquisitionControl`] exactly once on each start and stop transition.
//! Errors from either are recoverable (see [`AcquisitionError`]).

use serde::{Deserialize, Serialize};

use crate::error::{AcquisitionError, MonitorError, Result};
use crate::sample::AccelReading;

/// Maximum deviation of the confidence vector's sum from 1.0.
pub const CONFIDENCE_SUM_TOLERANCE: f64 = 0.05;

/// Trait every accelerometer feed implements.
pub trait SensorSource: Send {
    /// Fetch one 3-axis reading.
    fn read_accel(&mut self) -> std::result::Result<AccelReading, AcquisitionError>;

    /// Short identifier for logs.
    fn name(&self) -> &str {
        "sensor"
    }
}

/// Side-effecting begin/end calls around a collection session.
pub trait AcquisitionControl: Send {
    fn begin_acquisition(&mut self) -> std::result::Result<(), AcquisitionError>;

    /// End acquisition and return the external model's prediction for the
    /// collected signal.
    fn end_acquisition(&mut self) -> std::result::Result<ModelPrediction, AcquisitionError>;
}

/// Class predicted by the external model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredictedStatus {
    Normal,
    Anomalous,
    Failure,
}

impl PredictedStatus {
    pub const ALL: [PredictedStatus; 3] = [
        PredictedStatus::Normal,
        PredictedStatus::Anomalous,
        PredictedStatus::Failure,
    ];
}

impl std::fmt::Display for PredictedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Anomalous => write!(f, "anomalous"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

/// External model output: a class plus one probability per class, ordered
/// normal, anomalous, failure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPrediction {
    pub predicted_status: PredictedStatus,
    pub confidence: [f64; 3],
}

impl ModelPrediction {
    /// Check every probability lies in `[0, 1]` and the vector sums to ~1.
    pub fn validate(&self) -> Result<()> {
        if self
            .confidence
            .iter()
            .any(|p| !p.is_finite() || !(0.0..=1.0).contains(p))
        {
            return Err(MonitorError::InvalidPrediction(format!(
                "confidence values must lie in [0, 1], got {:?}",
                self.confidence
            )));
        }
        let sum: f64 = self.confidence.iter().sum();
        if (sum - 1.0).abs() > CONFIDENCE_SUM_TOLERANCE {
            return Err(MonitorError::InvalidPrediction(format!(
                "confidence sums to {sum:.3}, expected ~1.0"
            )));
        }
        Ok(())
    }

    /// Probability assigned to the predicted class.
    pub fn predicted_confidence(&self) -> f64 {
        let idx = PredictedStatus::ALL
            .iter()
            .position(|s| *s == self.predicted_status)
            .unwrap_or(0);
        self.confidence[idx]
    }
}
