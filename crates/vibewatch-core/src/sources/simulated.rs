use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::AcquisitionError;
use crate::ranges::{AxisRange, AxisRanges, RangeTable};
use crate::sample::AccelReading;
use crate::source::{AcquisitionControl, ModelPrediction, PredictedStatus, SensorSource};

/// Share of simulated readings drawn from the failure ranges.
pub const ANOMALY_PROBABILITY: f64 = 0.2;

/// Synthetic accelerometer.
///
/// Most readings are drawn uniformly inside the table's normal ranges; with
/// probability [`ANOMALY_PROBABILITY`] a reading is drawn from the failure
/// ranges instead.
pub struct SimulatedSensor {
    normal: AxisRanges,
    anomaly: AxisRanges,
    anomaly_probability: f64,
    rng: StdRng,
}

impl SimulatedSensor {
    pub fn new(table: &RangeTable) -> Self {
        Self::with_rng(table, StdRng::from_os_rng())
    }

    /// Deterministic feed for tests and reproducible runs.
    pub fn seeded(table: &RangeTable, seed: u64) -> Self {
        Self::with_rng(table, StdRng::seed_from_u64(seed))
    }

    fn with_rng(table: &RangeTable, rng: StdRng) -> Self {
        Self {
            normal: table.normal,
            anomaly: table.failure,
            anomaly_probability: ANOMALY_PROBABILITY,
            rng,
        }
    }

    /// Override the anomaly share, clamped to `[0, 1]`.
    pub fn with_anomaly_probability(mut self, p: f64) -> Self {
        self.anomaly_probability = if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 };
        self
    }

    fn draw(rng: &mut StdRng, range: &AxisRange) -> f64 {
        if range.min >= range.max {
            return range.min;
        }
        rng.random_range(range.min..=range.max)
    }
}

impl SensorSource for SimulatedSensor {
    fn read_accel(&mut self) -> Result<AccelReading, AcquisitionError> {
        let ranges = if self.rng.random_bool(self.anomaly_probability) {
            self.anomaly
        } else {
            self.normal
        };
        Ok(AccelReading::new(
            Self::draw(&mut self.rng, &ranges.x),
            Self::draw(&mut self.rng, &ranges.y),
            Self::draw(&mut self.rng, &ranges.z),
        ))
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

/// Stand-in for the remote model: `end_acquisition` returns a softmax over
/// random logits with the argmax as the predicted class.
pub struct SimulatedAcquisition {
    rng: StdRng,
    acquiring: bool,
}

impl SimulatedAcquisition {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            acquiring: false,
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            acquiring: false,
        }
    }

    pub fn is_acquiring(&self) -> bool {
        self.acquiring
    }
}

impl Default for SimulatedAcquisition {
    fn default() -> Self {
        Self::new()
    }
}

impl AcquisitionControl for SimulatedAcquisition {
    fn begin_acquisition(&mut self) -> Result<(), AcquisitionError> {
        self.acquiring = true;
        Ok(())
    }

    fn end_acquisition(&mut self) -> Result<ModelPrediction, AcquisitionError> {
        if !self.acquiring {
            return Err(AcquisitionError::Unavailable(
                "acquisition was never started".to_string(),
            ));
        }
        self.acquiring = false;

        let logits: [f64; 3] = [
            self.rng.random_range(-2.0..2.0),
            self.rng.random_range(-2.0..2.0),
            self.rng.random_range(-2.0..2.0),
        ];
        let confidence = softmax(logits);

        let best = (1..confidence.len()).fold(0, |best, i| {
            if confidence[i] > confidence[best] { i } else { best }
        });

        Ok(ModelPrediction {
            predicted_status: PredictedStatus::ALL[best],
            confidence,
        })
    }
}

fn softmax(logits: [f64; 3]) -> [f64; 3] {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exp = logits.map(|l| (l - max).exp());
    let sum: f64 = exp.iter().sum();
    exp.map(|e| e / sum)
}
