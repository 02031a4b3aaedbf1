//! # vibewatch-core
//!
//! **Vibration severity monitoring for a running appliance.**
//!
//! Classifies a 3-axis acceleration stream into severity levels against
//! per-axis threshold tables, keeps a short trend window, and reduces each
//! collection session to a weighted risk index and a three-tier verdict.
//!
//! ## Quick Start
//!
//! ```no_run
//! use vibewatch_core::{
//!     CollectionController, MonitorConfig, SimulatedAcquisition, SimulatedSensor,
//! };
//!
//! let config = MonitorConfig::default();
//! let table = config.range_table();
//! let controller = CollectionController::from_config(
//!     &config,
//!     Box::new(SimulatedSensor::new(&table)),
//!     Box::new(SimulatedAcquisition::new()),
//! );
//!
//! controller.start().unwrap();
//! std::thread::sleep(config.poll_interval() * 5);
//! let report = controller.stop().unwrap();
//! println!("{} (risk index {:.2})", report.verdict.tier, report.verdict.risk_index);
//! ```
//!
//! ## Architecture
//!
//! Sensor source → [`classify`] → [`SampleWindow`] + [`SessionAggregator`] → [`Verdict`]
//!
//! The [`CollectionController`] owns the whole chain and the sampling timer.
//! Sensor feeds implement [`SensorSource`]; the begin/end acquisition calls
//! and the external model's prediction come from an [`AcquisitionControl`].

pub mod aggregator;
pub mod classifier;
pub mod config;
pub mod controller;
pub mod error;
pub mod ranges;
pub mod sample;
pub mod source;
pub mod sources;
pub mod window;

pub use aggregator::{SessionAggregator, SessionCounts, Verdict, VerdictTier, risk_index};
pub use classifier::{ClassificationResult, Severity, classify, classify_axis};
pub use config::MonitorConfig;
pub use controller::{
    CollectionController, ControllerState, LiveStatus, MonitorSnapshot, Schedule, SessionReport,
    StartOutcome, TickOutcome,
};
pub use error::{AcquisitionError, MonitorError, Result};
pub use ranges::{Axis, AxisRange, AxisRanges, RangeTable, SpeedLevel, Tier};
pub use sample::{AccelReading, Sample};
pub use source::{AcquisitionControl, ModelPrediction, PredictedStatus, SensorSource};
pub use sources::{NoModelAcquisition, ReplaySensor, SimulatedAcquisition, SimulatedSensor};
pub use window::{SampleWindow, WINDOW_CAPACITY};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
