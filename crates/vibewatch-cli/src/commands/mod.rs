pub mod classify;
pub mod monitor;
pub mod ranges;
pub mod server;

use std::path::Path;
use std::time::Duration;

use vibewatch_core::{
    AcquisitionControl, MonitorConfig, MonitorError, NoModelAcquisition, Result, Severity,
    SimulatedAcquisition, SpeedLevel,
};

/// Load the config file (if any) and apply command-line overrides.
///
/// `--level` swaps the built-in table only when the file carries no
/// explicit `ranges`.
pub fn load_config(
    path: Option<&str>,
    level: Option<&str>,
    interval: Option<&str>,
) -> Result<MonitorConfig> {
    let mut config = MonitorConfig::load_or_default(path.map(Path::new))?;
    if let Some(level) = level {
        config.speed_level = level.parse::<SpeedLevel>()?;
    }
    if let Some(interval) = interval {
        config.poll_interval_ms = parse_duration(interval)?.as_millis() as u64;
    }
    config.validate()?;
    Ok(config)
}

/// Parse "250ms", "3s", "5m", "1h" or a bare number of seconds.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    let (numeric, multiplier) = if let Some(rest) = s.strip_suffix("ms") {
        (rest, 1u64)
    } else if let Some(rest) = s.strip_suffix('s') {
        (rest, 1000)
    } else if let Some(rest) = s.strip_suffix('m') {
        (rest, 60_000)
    } else if let Some(rest) = s.strip_suffix('h') {
        (rest, 3_600_000)
    } else {
        (s, 1000)
    };

    let value: u64 = numeric
        .trim()
        .parse()
        .map_err(|_| MonitorError::InvalidConfig(format!("invalid duration: {s}")))?;
    value
        .checked_mul(multiplier)
        .map(Duration::from_millis)
        .ok_or_else(|| MonitorError::InvalidConfig(format!("duration too large: {s}")))
}

/// Prediction model for a session: simulated unless disabled.
pub fn make_acquisition(attach_model: bool, seed: Option<u64>) -> Box<dyn AcquisitionControl> {
    match (attach_model, seed) {
        (false, _) => Box::new(NoModelAcquisition),
        (true, Some(seed)) => Box::new(SimulatedAcquisition::seeded(seed.wrapping_add(1))),
        (true, None) => Box::new(SimulatedAcquisition::new()),
    }
}

pub fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Normal => "✅",
        Severity::Alert => "⚠️",
        Severity::Failure => "🛑",
    }
}
