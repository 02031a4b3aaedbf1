//! Per-axis, per-tier threshold tables.
//!
//! A [`RangeTable`] maps each [`Tier`] to one inclusive [`AxisRange`] per
//! [`Axis`]. Ranges of successive tiers may overlap on the same axis; the
//! classifier resolves overlaps, the table only stores bounds. Tables are
//! built once at startup and never mutated while a session runs.
//!
//! Built-in tables exist for each [`SpeedLevel`] of the appliance. They can be
//! replaced wholesale from configuration (see [`crate::config`]).

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, Result};

/// Acceleration measurement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in classification order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::X => write!(f, "x"),
            Self::Y => write!(f, "y"),
            Self::Z => write!(f, "z"),
        }
    }
}

/// Row key of a [`RangeTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Normal,
    Alert,
    Failure,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Normal, Tier::Alert, Tier::Failure];
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Alert => write!(f, "alert"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

/// Inclusive `[min, max]` bounds for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    /// Build a range, rejecting inverted or non-finite bounds.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        let range = Self { min, max };
        if !range.is_well_formed() {
            return Err(MonitorError::InvalidBounds { min, max });
        }
        Ok(range)
    }

    /// `true` when `min <= value <= max`. NaN is never contained.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn is_well_formed(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

impl std::fmt::Display for AxisRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:.2}, {:.2}]", self.min, self.max)
    }
}

/// One range per axis for a single tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRanges {
    pub x: AxisRange,
    pub y: AxisRange,
    pub z: AxisRange,
}

impl AxisRanges {
    pub fn get(&self, axis: Axis) -> &AxisRange {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

/// Threshold configuration: tier → axis → inclusive range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeTable {
    pub normal: AxisRanges,
    pub alert: AxisRanges,
    pub failure: AxisRanges,
}

impl RangeTable {
    /// Build a table and check every range is well formed.
    pub fn new(normal: AxisRanges, alert: AxisRanges, failure: AxisRanges) -> Result<Self> {
        let table = Self {
            normal,
            alert,
            failure,
        };
        table.validate()?;
        Ok(table)
    }

    /// Built-in table for a speed level.
    pub fn for_level(level: SpeedLevel) -> Self {
        match level {
            SpeedLevel::One => Self {
                normal: ranges([(1.5, 12.5), (-11.2, 0.9), (20.0, 20.1)]),
                alert: ranges([(1.6, 17.8), (-14.8, 4.1), (20.0, 20.1)]),
                failure: ranges([(-8.7, 20.0), (-15.5, 6.9), (18.0, 20.1)]),
            },
            SpeedLevel::Two => Self {
                normal: ranges([(3.2, 10.6), (-8.3, -2.0), (20.0, 20.1)]),
                alert: ranges([(1.2, 15.8), (-13.8, 2.4), (20.0, 20.1)]),
                failure: ranges([(0.3, 20.0), (-16.4, 6.2), (20.0, 20.1)]),
            },
        }
    }

    pub fn tier(&self, tier: Tier) -> &AxisRanges {
        match tier {
            Tier::Normal => &self.normal,
            Tier::Alert => &self.alert,
            Tier::Failure => &self.failure,
        }
    }

    pub fn range(&self, tier: Tier, axis: Axis) -> &AxisRange {
        self.tier(tier).get(axis)
    }

    /// Reject inverted or non-finite bounds anywhere in the table.
    ///
    /// Deserialized tables skip [`AxisRange::new`], so config loading calls
    /// this explicitly.
    pub fn validate(&self) -> Result<()> {
        for tier in Tier::ALL {
            for axis in Axis::ALL {
                let r = self.range(tier, axis);
                if !r.is_well_formed() {
                    return Err(MonitorError::InvalidRange {
                        tier,
                        axis,
                        min: r.min,
                        max: r.max,
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for RangeTable {
    fn default() -> Self {
        Self::for_level(SpeedLevel::default())
    }
}

fn ranges(bounds: [(f64, f64); 3]) -> AxisRanges {
    let [x, y, z] = bounds.map(|(min, max)| AxisRange { min, max });
    AxisRanges { x, y, z }
}

/// Appliance speed setting. Each level has its own built-in thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SpeedLevel {
    #[default]
    One,
    Two,
}

impl SpeedLevel {
    pub const ALL: [SpeedLevel; 2] = [SpeedLevel::One, SpeedLevel::Two];

    pub fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

impl std::fmt::Display for SpeedLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl TryFrom<u8> for SpeedLevel {
    type Error = MonitorError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(MonitorError::UnknownSpeedLevel(other.to_string())),
        }
    }
}

impl From<SpeedLevel> for u8 {
    fn from(level: SpeedLevel) -> Self {
        level.number()
    }
}

impl FromStr for SpeedLevel {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let trimmed = trimmed
            .strip_prefix("level")
            .map(str::trim)
            .unwrap_or(trimmed);
        trimmed
            .parse::<u8>()
            .map_err(|_| MonitorError::UnknownSpeedLevel(s.to_string()))
            .and_then(Self::try_from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // AxisRange tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_axis_range_inclusive_bounds() {
        let r = AxisRange::new(-1.0, 2.0).unwrap();
        assert!(r.contains(-1.0));
        assert!(r.contains(2.0));
        assert!(r.contains(0.5));
        assert!(!r.contains(2.0001));
        assert!(!r.contains(-1.0001));
    }

    #[test]
    fn test_axis_range_rejects_inverted() {
        assert!(AxisRange::new(3.0, 1.0).is_err());
    }

    #[test]
    fn test_axis_range_rejects_non_finite() {
        assert!(AxisRange::new(f64::NAN, 1.0).is_err());
        assert!(AxisRange::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_axis_range_never_contains_nan() {
        let r = AxisRange::new(-100.0, 100.0).unwrap();
        assert!(!r.contains(f64::NAN));
    }

    #[test]
    fn test_degenerate_range_contains_single_point() {
        let r = AxisRange::new(20.0, 20.0).unwrap();
        assert!(r.contains(20.0));
        assert!(!r.contains(20.01));
    }

    // -----------------------------------------------------------------------
    // RangeTable tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_builtin_tables_are_valid() {
        for level in SpeedLevel::ALL {
            RangeTable::for_level(level).validate().unwrap();
        }
    }

    #[test]
    fn test_range_lookup() {
        let t = RangeTable::for_level(SpeedLevel::One);
        let r = t.range(Tier::Alert, Axis::Y);
        assert_eq!(r.min, -14.8);
        assert_eq!(r.max, 4.1);
        assert_eq!(t.range(Tier::Failure, Axis::Z).min, 18.0);
    }

    #[test]
    fn test_levels_differ() {
        assert_ne!(
            RangeTable::for_level(SpeedLevel::One),
            RangeTable::for_level(SpeedLevel::Two)
        );
    }

    #[test]
    fn test_validate_reports_offending_cell() {
        let mut t = RangeTable::default();
        t.alert.y = AxisRange { min: 5.0, max: -5.0 };
        match t.validate() {
            Err(MonitorError::InvalidRange { tier, axis, .. }) => {
                assert_eq!(tier, Tier::Alert);
                assert_eq!(axis, Axis::Y);
            }
            other => panic!("expected InvalidRange, got {other:?}"),
        }
    }

    #[test]
    fn test_table_json_shape() {
        let t = RangeTable::for_level(SpeedLevel::Two);
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["normal"]["y"]["max"], -2.0);
        assert_eq!(v["failure"]["x"]["min"], 0.3);
    }

    // -----------------------------------------------------------------------
    // SpeedLevel tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_speed_level_parse() {
        assert_eq!("1".parse::<SpeedLevel>().unwrap(), SpeedLevel::One);
        assert_eq!(" 2 ".parse::<SpeedLevel>().unwrap(), SpeedLevel::Two);
        assert_eq!("level2".parse::<SpeedLevel>().unwrap(), SpeedLevel::Two);
        assert!("3".parse::<SpeedLevel>().is_err());
        assert!("fast".parse::<SpeedLevel>().is_err());
    }

    #[test]
    fn test_speed_level_serde_as_number() {
        assert_eq!(serde_json::to_string(&SpeedLevel::Two).unwrap(), "2");
        let lvl: SpeedLevel = serde_json::from_str("1").unwrap();
        assert_eq!(lvl, SpeedLevel::One);
        assert!(serde_json::from_str::<SpeedLevel>("9").is_err());
    }
}
