//! Sample → severity classification.
//!
//! Each axis is classified on its raw signed value with an exclusion rule
//! between overlapping tiers:
//!
//! ```text
//! alert   = in(alert)   && !in(normal)
//! failure = in(failure) && !alert
//! ```
//!
//! The axis severity is Failure if `failure`, Alert if `alert`, Normal
//! otherwise. A value outside every range is Normal. The sample's overall
//! severity is the maximum over x, y, z; the first axis (in that order)
//! reaching the maximum is reported as the trigger.

use serde::{Deserialize, Serialize};

use crate::ranges::{Axis, RangeTable, SpeedLevel};
use crate::sample::Sample;

/// Ordered severity of a single sample or axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Normal = 0,
    Alert = 1,
    Failure = 2,
}

impl Severity {
    /// Weight used by the risk index: 1, 2 or 3.
    pub fn code(self) -> u32 {
        self as u32 + 1
    }

    /// Operator-facing status line for a live reading at `level`.
    pub fn description(self, level: SpeedLevel) -> String {
        match self {
            Self::Normal => format!("Appliance running correctly at speed level {level}"),
            Self::Alert => format!("Elevated vibration detected at speed level {level}"),
            Self::Failure => format!("Critical vibration at speed level {level}"),
        }
    }

    pub fn recommendation(self) -> &'static str {
        match self {
            Self::Normal => "Continue normal use",
            Self::Alert => "Check the load and the blade assembly",
            Self::Failure => "Stop the appliance immediately",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Alert => write!(f, "alert"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

/// Outcome of classifying one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub severity: Severity,
    /// First axis reaching `severity`; `None` when the sample is Normal.
    pub axis_triggered: Option<Axis>,
    /// Independent per-axis severities, indexed x, y, z.
    pub axes: [Severity; 3],
}

impl ClassificationResult {
    pub fn axis_severity(&self, axis: Axis) -> Severity {
        self.axes[axis_index(axis)]
    }
}

fn axis_index(axis: Axis) -> usize {
    match axis {
        Axis::X => 0,
        Axis::Y => 1,
        Axis::Z => 2,
    }
}

/// Classify a single axis value.
pub fn classify_axis(axis: Axis, value: f64, table: &RangeTable) -> Severity {
    let alert = table.alert.get(axis).contains(value) && !table.normal.get(axis).contains(value);
    let failure = table.failure.get(axis).contains(value) && !alert;

    if failure {
        Severity::Failure
    } else if alert {
        Severity::Alert
    } else {
        Severity::Normal
    }
}

/// Classify a sample against `table`. Pure and deterministic.
pub fn classify(sample: &Sample, table: &RangeTable) -> ClassificationResult {
    let axes = Axis::ALL.map(|axis| classify_axis(axis, sample.axis(axis), table));

    let mut severity = Severity::Normal;
    let mut axis_triggered = None;
    for (axis, &s) in Axis::ALL.iter().zip(axes.iter()) {
        // Strict comparison keeps the first axis on ties.
        if s > severity {
            severity = s;
            axis_triggered = Some(*axis);
        }
    }

    ClassificationResult {
        severity,
        axis_triggered,
        axes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranges::{AxisRange, AxisRanges};

    /// Hand-built table with distinct zones per tier on every axis:
    /// normal [0,10], alert [5,20], failure [15,30].
    fn layered_table() -> RangeTable {
        let tier = |min, max| {
            let r = AxisRange::new(min, max).unwrap();
            AxisRanges { x: r, y: r, z: r }
        };
        RangeTable::new(tier(0.0, 10.0), tier(5.0, 20.0), tier(15.0, 30.0)).unwrap()
    }

    fn sample(x: f64, y: f64, z: f64) -> Sample {
        Sample::new(0, x, y, z)
    }

    // -----------------------------------------------------------------------
    // Severity tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_severity_order_and_codes() {
        assert!(Severity::Normal < Severity::Alert);
        assert!(Severity::Alert < Severity::Failure);
        assert_eq!(Severity::Normal.code(), 1);
        assert_eq!(Severity::Alert.code(), 2);
        assert_eq!(Severity::Failure.code(), 3);
    }

    #[test]
    fn test_severity_description_mentions_level() {
        let d = Severity::Alert.description(SpeedLevel::Two);
        assert!(d.contains("level 2"));
    }

    // -----------------------------------------------------------------------
    // Per-axis rule tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_axis_normal_only() {
        let t = layered_table();
        assert_eq!(classify_axis(Axis::X, 2.0, &t), Severity::Normal);
    }

    #[test]
    fn test_axis_normal_overlapping_alert_stays_normal() {
        // In normal ∩ alert: alert is excluded by normal, failure not hit.
        let t = layered_table();
        assert_eq!(classify_axis(Axis::X, 7.0, &t), Severity::Normal);
    }

    #[test]
    fn test_axis_alert_only() {
        let t = layered_table();
        assert_eq!(classify_axis(Axis::Y, 12.0, &t), Severity::Alert);
    }

    #[test]
    fn test_axis_alert_overlapping_failure_is_alert() {
        let t = layered_table();
        assert_eq!(classify_axis(Axis::Z, 17.0, &t), Severity::Alert);
    }

    #[test]
    fn test_axis_failure_only() {
        let t = layered_table();
        assert_eq!(classify_axis(Axis::X, 25.0, &t), Severity::Failure);
    }

    #[test]
    fn test_axis_outside_all_ranges_is_normal() {
        let t = layered_table();
        assert_eq!(classify_axis(Axis::X, -50.0, &t), Severity::Normal);
        assert_eq!(classify_axis(Axis::X, 99.0, &t), Severity::Normal);
    }

    #[test]
    fn test_axis_boundaries_are_inclusive() {
        let t = layered_table();
        // 10.0 is the normal max, so alert is excluded there.
        assert_eq!(classify_axis(Axis::X, 10.0, &t), Severity::Normal);
        assert_eq!(classify_axis(Axis::X, 20.0, &t), Severity::Alert);
        assert_eq!(classify_axis(Axis::X, 30.0, &t), Severity::Failure);
    }

    #[test]
    fn test_axis_normal_overlapping_failure_is_failure() {
        // Normal membership only suppresses alert, not failure.
        let r = |min, max| AxisRange::new(min, max).unwrap();
        let wide = AxisRanges {
            x: r(-10.0, 30.0),
            y: r(-10.0, 30.0),
            z: r(-10.0, 30.0),
        };
        let narrow = AxisRanges {
            x: r(0.0, 10.0),
            y: r(0.0, 10.0),
            z: r(0.0, 10.0),
        };
        let alert = AxisRanges {
            x: r(5.0, 20.0),
            y: r(5.0, 20.0),
            z: r(5.0, 20.0),
        };
        let t = RangeTable::new(narrow, alert, wide).unwrap();
        assert_eq!(classify_axis(Axis::X, 2.0, &t), Severity::Failure);
    }

    #[test]
    fn test_axis_uses_signed_value() {
        let t = layered_table();
        // |-25| would be failure under a magnitude rule.
        assert_eq!(classify_axis(Axis::X, -25.0, &t), Severity::Normal);
    }

    // -----------------------------------------------------------------------
    // Whole-sample tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_classify_all_normal() {
        let r = classify(&sample(1.0, 2.0, 3.0), &layered_table());
        assert_eq!(r.severity, Severity::Normal);
        assert_eq!(r.axis_triggered, None);
        assert_eq!(r.axes, [Severity::Normal; 3]);
    }

    #[test]
    fn test_classify_max_over_axes() {
        let r = classify(&sample(1.0, 12.0, 25.0), &layered_table());
        assert_eq!(r.severity, Severity::Failure);
        assert_eq!(r.axis_triggered, Some(Axis::Z));
        assert_eq!(r.axis_severity(Axis::Y), Severity::Alert);
    }

    #[test]
    fn test_classify_tie_picks_first_axis() {
        let r = classify(&sample(1.0, 12.0, 13.0), &layered_table());
        assert_eq!(r.severity, Severity::Alert);
        assert_eq!(r.axis_triggered, Some(Axis::Y));

        let r = classify(&sample(25.0, 26.0, 27.0), &layered_table());
        assert_eq!(r.axis_triggered, Some(Axis::X));
    }

    #[test]
    fn test_classify_equals_max_of_independent_axes() {
        let t = layered_table();
        let values = [-5.0, 0.0, 7.0, 10.0, 12.0, 17.0, 20.0, 25.0, 35.0];
        for &x in &values {
            for &y in &values {
                for &z in &values {
                    let r = classify(&sample(x, y, z), &t);
                    let expected = [
                        classify_axis(Axis::X, x, &t),
                        classify_axis(Axis::Y, y, &t),
                        classify_axis(Axis::Z, z, &t),
                    ]
                    .into_iter()
                    .max()
                    .unwrap();
                    assert_eq!(r.severity, expected, "sample ({x}, {y}, {z})");
                }
            }
        }
    }

    #[test]
    fn test_classify_builtin_level_one() {
        let t = RangeTable::for_level(SpeedLevel::One);
        // y = 3.0 lies in alert [-14.8, 4.1] but above normal's 0.9 max.
        // x = -5.0 lies only in failure; z = 25.0 lies outside every range.
        let r = classify(&sample(-5.0, 3.0, 25.0), &t);
        assert_eq!(r.axes, [Severity::Failure, Severity::Alert, Severity::Normal]);
        assert_eq!(r.severity, Severity::Failure);
        assert_eq!(r.axis_triggered, Some(Axis::X));
    }

    #[test]
    fn test_classify_is_deterministic() {
        let t = layered_table();
        let s = sample(6.0, 16.0, 29.0);
        assert_eq!(classify(&s, &t), classify(&s, &t));
    }
}
