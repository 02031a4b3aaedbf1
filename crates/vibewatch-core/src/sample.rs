//! Accelerometer readings and timestamped samples.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::ranges::Axis;

/// Raw 3-axis reading as returned by a sensor source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelReading {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl AccelReading {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A reading stamped with the wall-clock time it was taken.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    pub accel_x: f64,
    pub accel_y: f64,
    pub accel_z: f64,
}

impl Sample {
    pub fn new(timestamp_ms: u64, accel_x: f64, accel_y: f64, accel_z: f64) -> Self {
        Self {
            timestamp_ms,
            accel_x,
            accel_y,
            accel_z,
        }
    }

    /// Stamp a reading with the current time.
    pub fn from_reading(reading: AccelReading) -> Self {
        Self::new(now_ms(), reading.x, reading.y, reading.z)
    }

    pub fn axis(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.accel_x,
            Axis::Y => self.accel_y,
            Axis::Z => self.accel_z,
        }
    }

    /// Full ISO-8601 form of the timestamp.
    pub fn timestamp_iso(&self) -> String {
        format_iso8601(Duration::from_millis(self.timestamp_ms))
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Format a duration-since-epoch as `YYYY-MM-DDTHH:MM:SS.mmmZ` (UTC).
pub fn format_iso8601(since_epoch: Duration) -> String {
    let secs = since_epoch.as_secs();
    let (year, month, day) = civil_from_days(secs / 86_400);
    let tod = secs % 86_400;
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}.{:03}Z",
        tod / 3600,
        (tod / 60) % 60,
        tod % 60,
        since_epoch.subsec_millis()
    )
}

/// Days since 1970-01-01 to a proleptic Gregorian (year, month, day).
///
/// Counts in 400-year eras starting at 0000-03-01 so the leap day falls at
/// the end of each year.
fn civil_from_days(days: u64) -> (u64, u64, u64) {
    const DAYS_PER_ERA: u64 = 146_097;
    let z = days + 719_468;
    let era = z / DAYS_PER_ERA;
    let doe = z % DAYS_PER_ERA;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = era * 400 + yoe + u64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_accessor() {
        let s = Sample::new(0, 1.0, -2.0, 20.0);
        assert_eq!(s.axis(Axis::X), 1.0);
        assert_eq!(s.axis(Axis::Y), -2.0);
        assert_eq!(s.axis(Axis::Z), 20.0);
    }

    #[test]
    fn test_from_reading_stamps_time() {
        let before = now_ms();
        let s = Sample::from_reading(AccelReading::new(1.0, 2.0, 3.0));
        assert!(s.timestamp_ms >= before);
        assert_eq!((s.accel_x, s.accel_y, s.accel_z), (1.0, 2.0, 3.0));
    }

    #[test]
    fn test_format_iso8601_epoch() {
        assert_eq!(format_iso8601(Duration::ZERO), "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_format_iso8601_known_date() {
        // 2000-03-01 12:34:56 UTC, just past a leap day
        assert_eq!(
            format_iso8601(Duration::from_secs(951_914_096)),
            "2000-03-01T12:34:56.000Z"
        );
    }

    #[test]
    fn test_timestamp_iso_keeps_millis() {
        let s = Sample::new(946_684_800_999, 0.0, 0.0, 0.0);
        assert_eq!(s.timestamp_iso(), "2000-01-01T00:00:00.999Z");
    }

    #[test]
    fn test_civil_from_days_leap_rules() {
        // 1900 is not a leap year; 2000 and 2024 are.
        assert_eq!(civil_from_days(11_016), (2000, 2, 29));
        assert_eq!(civil_from_days(19_782), (2024, 2, 29));
        assert_eq!(civil_from_days(19_783), (2024, 3, 1));
        assert_eq!(civil_from_days(10_956), (1999, 12, 31));
    }
}
