//! Static startup configuration.
//!
//! Loaded once from JSON before any session starts. The range table it
//! resolves to is handed to the controller by value and never changes for
//! the lifetime of that controller.
//!
//! ```json
//! {
//!   "speed_level": 2,
//!   "poll_interval_ms": 2500,
//!   "ranges": { "normal": { "x": {"min": 3.2, "max": 10.6}, ... }, ... }
//! }
//! ```
//!
//! `ranges` is optional; when absent the built-in table for `speed_level`
//! is used.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, Result};
use crate::ranges::{RangeTable, SpeedLevel};

/// Default polling interval.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    pub speed_level: SpeedLevel,
    pub poll_interval_ms: u64,
    /// Overrides the built-in table for `speed_level` when present.
    pub ranges: Option<RangeTable>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            speed_level: SpeedLevel::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            ranges: None,
        }
    }
}

impl MonitorConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            MonitorError::InvalidConfig(format!("failed to parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `path` if given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(MonitorError::InvalidConfig(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if let Some(table) = &self.ranges {
            table.validate()?;
        }
        Ok(())
    }

    /// The table sessions will classify against.
    pub fn range_table(&self) -> RangeTable {
        self.ranges
            .clone()
            .unwrap_or_else(|| RangeTable::for_level(self.speed_level))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
