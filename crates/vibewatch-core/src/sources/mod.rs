//! Concrete collaborator implementations.
//!
//! - [`SimulatedSensor`] / [`SimulatedAcquisition`]: synthetic feed and model
//!   for demos and bench runs without hardware.
//! - [`ReplaySensor`]: plays back a recorded list of readings.
//! - [`NoModelAcquisition`]: acquisition control with no model attached.

mod replay;
mod simulated;

pub use replay::ReplaySensor;
pub use simulated::{ANOMALY_PROBABILITY, SimulatedAcquisition, SimulatedSensor};

use crate::error::AcquisitionError;
use crate::source::{AcquisitionControl, ModelPrediction};

/// Acquisition control that accepts begin/end but never has a prediction.
#[derive(Debug, Default)]
pub struct NoModelAcquisition;

impl AcquisitionControl for NoModelAcquisition {
    fn begin_acquisition(&mut self) -> Result<(), AcquisitionError> {
        Ok(())
    }

    fn end_acquisition(&mut self) -> Result<ModelPrediction, AcquisitionError> {
        Err(AcquisitionError::Unavailable(
            "no prediction model attached".to_string(),
        ))
    }
}
