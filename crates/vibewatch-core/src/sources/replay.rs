use std::collections::VecDeque;
use std::path::Path;

use crate::error::{AcquisitionError, MonitorError, Result};
use crate::sample::AccelReading;
use crate::source::SensorSource;

/// Plays back a fixed sequence of readings, one per fetch.
///
/// Once the sequence is exhausted every fetch fails with
/// [`AcquisitionError::Unavailable`], which the controller treats as a
/// skipped tick.
pub struct ReplaySensor {
    queue: VecDeque<std::result::Result<AccelReading, AcquisitionError>>,
}

impl ReplaySensor {
    /// Replay a scripted mix of readings and failures.
    pub fn new(script: Vec<std::result::Result<AccelReading, AcquisitionError>>) -> Self {
        Self {
            queue: script.into(),
        }
    }

    pub fn from_readings(readings: Vec<AccelReading>) -> Self {
        Self::new(readings.into_iter().map(Ok).collect())
    }

    /// Load readings from a JSON array of `{"x": .., "y": .., "z": ..}` objects.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let readings: Vec<AccelReading> = serde_json::from_str(&raw)?;
        if readings.is_empty() {
            return Err(MonitorError::InvalidConfig(format!(
                "replay file {} contains no readings",
                path.display()
            )));
        }
        Ok(Self::from_readings(readings))
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl SensorSource for ReplaySensor {
    fn read_accel(&mut self) -> std::result::Result<AccelReading, AcquisitionError> {
        self.queue
            .pop_front()
            .unwrap_or_else(|| Err(AcquisitionError::Unavailable("replay exhausted".to_string())))
    }

    fn name(&self) -> &str {
        "replay"
    }
}
