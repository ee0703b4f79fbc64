//! Clock-of-day arithmetic shared by both engines.
//!
//! Every value is a wall-clock time with no date attached, held as minutes
//! since midnight. Overnight spans are handled in exactly one place,
//! [`minutes_between`], and everything else builds on it.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// Minutes in one day.
pub const MINUTES_PER_DAY: i64 = 1440;

/// A wall-clock time of day in the range `00:00..=23:59`.
///
/// Serializes as a zero-padded `"HH:mm"` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Midnight.
    pub const MIDNIGHT: Self = Self(0);

    /// Builds a time from hour and minute components.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_hm(hour: u32, minute: u32) -> Result<Self, ValidationError> {
        if hour > 23 {
            return Err(ValidationError::OutOfRange {
                field: "hour",
                value: i64::from(hour),
                min: 0,
                max: 23,
            });
        }
        if minute > 59 {
            return Err(ValidationError::OutOfRange {
                field: "minute",
                value: i64::from(minute),
                min: 0,
                max: 59,
            });
        }
        Ok(Self((hour * 60 + minute) as u16))
    }

    /// Normalizes any minute count into a time of day.
    ///
    /// Negative values and values past midnight wrap, so adding or removing
    /// whole days never changes the result.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub const fn from_minutes(minutes: i64) -> Self {
        Self(minutes.rem_euclid(MINUTES_PER_DAY) as u16)
    }

    /// Minutes since midnight (`0..1440`).
    pub const fn minutes(self) -> i64 {
        self.0 as i64
    }

    pub const fn hour(self) -> u32 {
        (self.0 / 60) as u32
    }

    pub const fn minute(self) -> u32 {
        (self.0 % 60) as u32
    }

    /// Truncates a `chrono` time to minute precision.
    pub fn from_naive_time(time: NaiveTime) -> Self {
        Self::from_minutes(i64::from(time.hour() * 60 + time.minute()))
    }

    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0).unwrap_or(NaiveTime::MIN)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTime {
            value: s.to_string(),
        };
        let bytes = s.as_bytes();
        if bytes.len() != 5 || bytes[2] != b':' {
            return Err(invalid());
        }
        let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
        if !digits.iter().all(u8::is_ascii_digit) {
            return Err(invalid());
        }
        let hour = u32::from(digits[0] - b'0') * 10 + u32::from(digits[1] - b'0');
        let minute = u32::from(digits[2] - b'0') * 10 + u32::from(digits[3] - b'0');
        Self::from_hm(hour, minute).map_err(|_| invalid())
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(time: TimeOfDay) -> Self {
        time.to_string()
    }
}

/// Minutes from `start` forward to `end`.
///
/// An `end` earlier than `start` is taken to be on the following day.
pub const fn minutes_between(start: TimeOfDay, end: TimeOfDay) -> i64 {
    let diff = end.minutes() - start.minutes();
    if diff < 0 { diff + MINUTES_PER_DAY } else { diff }
}

/// Shortest distance between two clock times in either direction.
pub fn circular_distance(a: TimeOfDay, b: TimeOfDay) -> i64 {
    minutes_between(a, b).min(minutes_between(b, a))
}

pub const fn add_minutes(time: TimeOfDay, delta: i64) -> TimeOfDay {
    TimeOfDay::from_minutes(time.minutes() + delta)
}

pub const fn is_before(a: TimeOfDay, b: TimeOfDay) -> bool {
    a.minutes() < b.minutes()
}

/// Inclusive membership test that understands overnight ranges.
///
/// When `end < start` the range wraps midnight and `t` is inside if it is at
/// or after `start` or at or before `end`.
pub const fn is_within_range(t: TimeOfDay, start: TimeOfDay, end: TimeOfDay) -> bool {
    let (t, start, end) = (t.minutes(), start.minutes(), end.minutes());
    if end < start {
        t >= start || t <= end
    } else {
        t >= start && t <= end
    }
}

/// Formats minutes as `"Xh Ym"`, or `"Ym"` under an hour.
/// Negative durations render as `0m`.
pub fn format_duration(minutes: i64) -> String {
    if minutes < 0 {
        return "0m".to_string();
    }
    let hours = minutes / 60;
    let minutes = minutes % 60;
    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    #[test]
    fn parse_and_display_roundtrip() {
        for s in ["00:00", "07:05", "12:30", "23:59"] {
            assert_eq!(t(s).to_string(), s);
        }
    }

    #[test]
    fn parse_rejects_malformed() {
        for s in ["7:00", "07:0", "24:00", "12:60", "ab:cd", "", "07-00", "07:00:00", "+1:00"] {
            assert!(s.parse::<TimeOfDay>().is_err(), "{s} should be rejected");
        }
    }

    #[test]
    fn from_minutes_roundtrips_every_minute() {
        for m in 0..MINUTES_PER_DAY {
            let time = TimeOfDay::from_minutes(m);
            assert_eq!(time.minutes(), m);
            assert_eq!(TimeOfDay::from_minutes(time.minutes()), time);
        }
    }

    #[test]
    fn from_minutes_ignores_whole_days() {
        let base = t("06:15");
        for days in -3..=3 {
            assert_eq!(
                TimeOfDay::from_minutes(base.minutes() + days * MINUTES_PER_DAY),
                base
            );
        }
        assert_eq!(TimeOfDay::from_minutes(-30), t("23:30"));
        assert_eq!(TimeOfDay::from_minutes(1500), t("01:00"));
    }

    #[test]
    fn minutes_between_handles_midnight() {
        assert_eq!(minutes_between(t("23:00"), t("07:00")), 480);
        assert_eq!(minutes_between(t("07:00"), t("23:00")), 960);
        for m in (0..MINUTES_PER_DAY).step_by(37) {
            let time = TimeOfDay::from_minutes(m);
            assert_eq!(minutes_between(time, time), 0);
        }
    }

    #[test]
    fn add_minutes_wraps() {
        assert_eq!(add_minutes(t("23:30"), 45), t("00:15"));
        assert_eq!(add_minutes(t("00:15"), -45), t("23:30"));
        assert_eq!(add_minutes(t("08:00"), 12 * 60), t("20:00"));
    }

    #[test]
    fn within_range_plain_and_overnight() {
        assert!(is_within_range(t("12:00"), t("08:00"), t("18:00")));
        assert!(is_within_range(t("08:00"), t("08:00"), t("18:00")));
        assert!(is_within_range(t("18:00"), t("08:00"), t("18:00")));
        assert!(!is_within_range(t("18:01"), t("08:00"), t("18:00")));

        assert!(is_within_range(t("23:30"), t("22:00"), t("06:00")));
        assert!(is_within_range(t("05:00"), t("22:00"), t("06:00")));
        assert!(!is_within_range(t("12:00"), t("22:00"), t("06:00")));
    }

    #[test]
    fn is_before_compares_clock_position() {
        assert!(is_before(t("06:00"), t("07:00")));
        assert!(!is_before(t("07:00"), t("07:00")));
        assert!(!is_before(t("23:00"), t("01:00")));
    }

    #[test]
    fn circular_distance_is_symmetric() {
        assert_eq!(circular_distance(t("23:50"), t("00:10")), 20);
        assert_eq!(circular_distance(t("00:10"), t("23:50")), 20);
        assert_eq!(circular_distance(t("08:00"), t("08:45")), 45);
    }

    #[test]
    fn serde_uses_hh_mm() {
        let json = serde_json::to_string(&t("06:05")).unwrap();
        assert_eq!(json, "\"06:05\"");
        let parsed: TimeOfDay = serde_json::from_str("\"21:40\"").unwrap();
        assert_eq!(parsed, t("21:40"));
        assert!(serde_json::from_str::<TimeOfDay>("\"9:40\"").is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0m");
        assert_eq!(format_duration(45), "45m");
        assert_eq!(format_duration(60), "1h 0m");
        assert_eq!(format_duration(615), "10h 15m");
        assert_eq!(format_duration(-5), "0m");
    }
}
