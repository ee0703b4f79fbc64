//! Sleep records, sleep preferences and the rolling sleep-debt aggregate.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::{MINUTES_PER_DAY, TimeOfDay};
use crate::error::EngineError;
use crate::types::ValidationError;

/// Default ideal sleep duration in minutes.
pub const DEFAULT_IDEAL_SLEEP_MINUTES: i64 = 480;

/// Recommended lower bound for the ideal sleep setting.
pub const MIN_RECOMMENDED_SLEEP_MINUTES: i64 = 180;

/// Recommended upper bound for the ideal sleep setting.
pub const MAX_RECOMMENDED_SLEEP_MINUTES: i64 = 840;

/// Deficit or surplus within this many minutes counts as balanced.
pub const DEBT_DEADBAND_MINUTES: i64 = 30;

/// One night of sleep, keyed by the calendar date of waking.
///
/// Records are replaced wholesale when re-saved under the same date; the
/// newest `updated_at` wins when logs are merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSleepRecord")]
pub struct SleepRecord {
    date: NaiveDate,
    bedtime: NaiveDateTime,
    wake_time: NaiveDateTime,
    duration_minutes: i64,
    updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawSleepRecord {
    date: NaiveDate,
    bedtime: NaiveDateTime,
    wake_time: NaiveDateTime,
    duration_minutes: i64,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RawSleepRecord> for SleepRecord {
    type Error = EngineError;

    fn try_from(raw: RawSleepRecord) -> Result<Self, Self::Error> {
        Self::from_parts(
            raw.date,
            raw.bedtime,
            raw.wake_time,
            raw.duration_minutes,
            raw.updated_at,
        )
    }
}

impl SleepRecord {
    /// Builds a record whose duration is the span between the two instants.
    pub fn new(
        bedtime: NaiveDateTime,
        wake_time: NaiveDateTime,
        now: DateTime<Utc>,
    ) -> Result<Self, EngineError> {
        let duration_minutes = (wake_time - bedtime).num_minutes();
        Self::from_parts(wake_time.date(), bedtime, wake_time, duration_minutes, now)
    }

    /// Builds a record from clock times for the night ending on `wake_date`.
    ///
    /// A bedtime at or after the wake clock time is placed on the previous day.
    pub fn for_night(
        wake_date: NaiveDate,
        bedtime: TimeOfDay,
        wake: TimeOfDay,
        now: DateTime<Utc>,
    ) -> Result<Self, EngineError> {
        let wake_time = wake_date.and_time(wake.to_naive_time());
        let bed_date = if bedtime >= wake {
            wake_date - Duration::days(1)
        } else {
            wake_date
        };
        let bedtime = bed_date.and_time(bedtime.to_naive_time());
        Self::new(bedtime, wake_time, now)
    }

    /// Builds a record with an explicit duration, validating every field.
    pub fn from_parts(
        date: NaiveDate,
        bedtime: NaiveDateTime,
        wake_time: NaiveDateTime,
        duration_minutes: i64,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, EngineError> {
        if duration_minutes < 0 {
            return Err(ValidationError::NegativeDuration {
                field: "duration_minutes",
                value: duration_minutes,
            }
            .into());
        }
        if duration_minutes > MINUTES_PER_DAY {
            return Err(ValidationError::OutOfRange {
                field: "duration_minutes",
                value: duration_minutes,
                min: 0,
                max: MINUTES_PER_DAY,
            }
            .into());
        }
        if date != wake_time.date() {
            return Err(EngineError::DateMismatch {
                date,
                wake: wake_time,
            });
        }
        if wake_time < bedtime {
            return Err(EngineError::WakeBeforeBedtime {
                bedtime,
                wake: wake_time,
            });
        }
        if wake_time - bedtime > Duration::minutes(MINUTES_PER_DAY) {
            return Err(EngineError::SleepSpanTooLong {
                bedtime,
                wake: wake_time,
            });
        }
        Ok(Self {
            date,
            bedtime,
            wake_time,
            duration_minutes,
            updated_at,
        })
    }

    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    pub const fn bedtime(&self) -> NaiveDateTime {
        self.bedtime
    }

    pub const fn wake_time(&self) -> NaiveDateTime {
        self.wake_time
    }

    pub const fn duration_minutes(&self) -> i64 {
        self.duration_minutes
    }

    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Clock time of waking.
    pub fn wake_clock(&self) -> TimeOfDay {
        TimeOfDay::from_naive_time(self.wake_time.time())
    }

    /// Clock time of going to bed.
    pub fn bedtime_clock(&self) -> TimeOfDay {
        TimeOfDay::from_naive_time(self.bedtime.time())
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn duration_hours(&self) -> f64 {
        self.duration_minutes as f64 / 60.0
    }
}

/// User sleep settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSleepPreferences")]
pub struct SleepPreferences {
    pub ideal_sleep_minutes: i64,
}

#[derive(Deserialize)]
struct RawSleepPreferences {
    ideal_sleep_minutes: i64,
}

impl TryFrom<RawSleepPreferences> for SleepPreferences {
    type Error = ValidationError;

    fn try_from(raw: RawSleepPreferences) -> Result<Self, Self::Error> {
        Self::new(raw.ideal_sleep_minutes)
    }
}

impl Default for SleepPreferences {
    fn default() -> Self {
        Self {
            ideal_sleep_minutes: DEFAULT_IDEAL_SLEEP_MINUTES,
        }
    }
}

impl SleepPreferences {
    /// Creates preferences, rejecting values outside one day.
    pub fn new(ideal_sleep_minutes: i64) -> Result<Self, ValidationError> {
        let prefs = Self {
            ideal_sleep_minutes,
        };
        prefs.validate()?;
        Ok(prefs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=MINUTES_PER_DAY).contains(&self.ideal_sleep_minutes) {
            return Err(ValidationError::OutOfRange {
                field: "ideal_sleep_minutes",
                value: self.ideal_sleep_minutes,
                min: 1,
                max: MINUTES_PER_DAY,
            });
        }
        Ok(())
    }

    /// Soft warnings for values that are valid but unusual.
    pub fn warnings(&self) -> Vec<String> {
        let minutes = self.ideal_sleep_minutes;
        if minutes < MIN_RECOMMENDED_SLEEP_MINUTES {
            vec![format!(
                "ideal sleep of {minutes} minutes is below the recommended minimum of {MIN_RECOMMENDED_SLEEP_MINUTES}"
            )]
        } else if minutes > MAX_RECOMMENDED_SLEEP_MINUTES {
            vec![format!(
                "ideal sleep of {minutes} minutes is above the recommended maximum of {MAX_RECOMMENDED_SLEEP_MINUTES}"
            )]
        } else {
            Vec::new()
        }
    }
}

/// Direction of the rolling sleep balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtStatus {
    Debt,
    Balanced,
    Surplus,
}

impl DebtStatus {
    pub const fn from_balance(total_minutes: i64) -> Self {
        if total_minutes < -DEBT_DEADBAND_MINUTES {
            Self::Debt
        } else if total_minutes > DEBT_DEADBAND_MINUTES {
            Self::Surplus
        } else {
            Self::Balanced
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debt => "debt",
            Self::Balanced => "balanced",
            Self::Surplus => "surplus",
        }
    }
}

/// Rolling surplus/deficit against the ideal duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepDebt {
    /// Sum of durations minus `days_tracked * ideal`. Negative means debt.
    pub total_debt_minutes: i64,
    pub days_tracked: usize,
    pub average_duration_minutes: i64,
    pub status: DebtStatus,
}

/// Aggregates the `window` most recent records (by date).
///
/// An empty input is balanced with zero days tracked.
pub fn calculate_sleep_debt(
    records: &[SleepRecord],
    ideal_sleep_minutes: i64,
    window: usize,
) -> SleepDebt {
    let mut recent: Vec<&SleepRecord> = records.iter().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent.truncate(window);

    let days_tracked = recent.len();
    if days_tracked == 0 {
        return SleepDebt {
            total_debt_minutes: 0,
            days_tracked: 0,
            average_duration_minutes: 0,
            status: DebtStatus::Balanced,
        };
    }

    let total_sleep: i64 = recent.iter().map(|r| r.duration_minutes).sum();
    let days = i64::try_from(days_tracked).unwrap_or(i64::MAX);
    let total_debt_minutes = total_sleep - days * ideal_sleep_minutes;

    SleepDebt {
        total_debt_minutes,
        days_tracked,
        average_duration_minutes: total_sleep / days,
        status: DebtStatus::from_balance(total_debt_minutes),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    pub(crate) fn night(date: &str, bed: &str, wake: &str) -> SleepRecord {
        SleepRecord::for_night(
            date.parse().unwrap(),
            bed.parse().unwrap(),
            wake.parse().unwrap(),
            now(),
        )
        .unwrap()
    }

    #[test]
    fn for_night_places_late_bedtime_on_previous_day() {
        let record = night("2025-03-02", "23:00", "07:00");
        assert_eq!(record.duration_minutes(), 480);
        assert_eq!(
            record.bedtime().date(),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
        assert_eq!(record.date(), NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());
    }

    #[test]
    fn for_night_keeps_after_midnight_bedtime_same_day() {
        let record = night("2025-03-02", "01:30", "08:00");
        assert_eq!(record.duration_minutes(), 390);
        assert_eq!(record.bedtime().date(), record.date());
    }

    #[test]
    fn rejects_negative_duration() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let bed = date.and_hms_opt(0, 0, 0).unwrap();
        let wake = date.and_hms_opt(7, 0, 0).unwrap();
        let err = SleepRecord::from_parts(date, bed, wake, -5, now()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::NegativeDuration { .. })
        ));
    }

    #[test]
    fn rejects_wake_before_bedtime() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let bed = date.and_hms_opt(7, 0, 0).unwrap();
        let wake = date.and_hms_opt(6, 0, 0).unwrap();
        let err = SleepRecord::new(bed, wake, now()).unwrap_err();
        assert!(matches!(err, EngineError::WakeBeforeBedtime { .. }));
    }

    #[test]
    fn rejects_date_other_than_wake_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let bed = date.and_hms_opt(23, 0, 0).unwrap();
        let wake = bed + Duration::hours(8);
        let err = SleepRecord::from_parts(date, bed, wake, 480, now()).unwrap_err();
        assert!(matches!(err, EngineError::DateMismatch { .. }));

        let json = r#"{
            "date": "2025-03-01",
            "bedtime": "2025-03-01T23:00:00",
            "wake_time": "2025-03-02T07:00:00",
            "duration_minutes": 480,
            "updated_at": "2025-03-02T07:00:00Z"
        }"#;
        assert!(serde_json::from_str::<SleepRecord>(json).is_err());
    }

    #[test]
    fn rejects_span_over_a_day() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let bed = date.and_hms_opt(7, 0, 0).unwrap();
        let wake = bed + Duration::minutes(MINUTES_PER_DAY + 1);
        let err = SleepRecord::from_parts(wake.date(), bed, wake, 600, now()).unwrap_err();
        assert!(matches!(err, EngineError::SleepSpanTooLong { .. }));
    }

    #[test]
    fn deserialization_validates() {
        let json = r#"{
            "date": "2025-03-02",
            "bedtime": "2025-03-02T07:00:00",
            "wake_time": "2025-03-02T06:00:00",
            "duration_minutes": 60,
            "updated_at": "2025-03-02T07:00:00Z"
        }"#;
        assert!(serde_json::from_str::<SleepRecord>(json).is_err());
    }

    #[test]
    fn preferences_deserialization_validates() {
        let parsed: SleepPreferences = serde_json::from_str(r#"{"ideal_sleep_minutes":450}"#).unwrap();
        assert_eq!(parsed.ideal_sleep_minutes, 450);
        assert!(serde_json::from_str::<SleepPreferences>(r#"{"ideal_sleep_minutes":0}"#).is_err());
        assert!(serde_json::from_str::<SleepPreferences>(r#"{"ideal_sleep_minutes":1441}"#).is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let record = night("2025-03-02", "22:45", "06:30");
        let json = serde_json::to_string(&record).unwrap();
        let parsed: SleepRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn sleep_debt_empty_is_balanced() {
        let debt = calculate_sleep_debt(&[], DEFAULT_IDEAL_SLEEP_MINUTES, 7);
        assert_eq!(debt.status, DebtStatus::Balanced);
        assert_eq!(debt.total_debt_minutes, 0);
        assert_eq!(debt.days_tracked, 0);
    }

    #[test]
    fn sleep_debt_uses_most_recent_window() {
        let records = vec![
            night("2025-03-01", "23:00", "07:00"),
            night("2025-03-02", "00:00", "06:00"),
            night("2025-03-03", "01:00", "06:00"),
        ];
        let debt = calculate_sleep_debt(&records, 480, 2);
        assert_eq!(debt.days_tracked, 2);
        assert_eq!(debt.total_debt_minutes, 360 + 300 - 960);
        assert_eq!(debt.average_duration_minutes, 330);
        assert_eq!(debt.status, DebtStatus::Debt);
    }

    #[test]
    fn sleep_debt_deadband() {
        assert_eq!(DebtStatus::from_balance(-30), DebtStatus::Balanced);
        assert_eq!(DebtStatus::from_balance(30), DebtStatus::Balanced);
        assert_eq!(DebtStatus::from_balance(-31), DebtStatus::Debt);
        assert_eq!(DebtStatus::from_balance(31), DebtStatus::Surplus);
    }

    #[test]
    fn preferences_validate_and_warn() {
        assert!(SleepPreferences::new(0).is_err());
        assert!(SleepPreferences::new(1441).is_err());
        assert!(SleepPreferences::new(480).unwrap().warnings().is_empty());
        assert_eq!(SleepPreferences::new(120).unwrap().warnings().len(), 1);
        assert_eq!(SleepPreferences::new(900).unwrap().warnings().len(), 1);
    }
}
