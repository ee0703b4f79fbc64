//! Logged eating events scored against the planned schedule.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::{TimeOfDay, circular_distance, is_within_range};
use crate::eating::{EatingWindow, MealWindow};
use crate::scoring::{is_within_window, meal_timing_score};
use crate::types::{MealLogId, MealSize, MealType, ValidationError};

/// Macronutrients in grams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Macros {
    pub protein_g: u32,
    pub carbs_g: u32,
    pub fat_g: u32,
}

/// Optional details supplied with a log entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<MealSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macros: Option<Macros>,
    /// Self-rated energy before eating, 1–10.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_before: Option<u8>,
    /// Self-rated energy after eating, 1–10.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_after: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl MealDetails {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("energy_before", self.energy_before),
            ("energy_after", self.energy_after),
        ] {
            if let Some(v) = value {
                if !(1..=10).contains(&v) {
                    return Err(ValidationError::OutOfRange {
                        field,
                        value: i64::from(v),
                        min: 1,
                        max: 10,
                    });
                }
            }
        }
        Ok(())
    }
}

/// An eating event. Timing fields are fixed at creation; only the notes can
/// change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMealLog")]
pub struct MealLog {
    id: MealLogId,
    timestamp: NaiveDateTime,
    meal_type: MealType,
    #[serde(flatten)]
    details: MealDetails,
    timing_score: u8,
    within_window: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawMealLog {
    id: MealLogId,
    timestamp: NaiveDateTime,
    meal_type: MealType,
    #[serde(flatten)]
    details: MealDetails,
    timing_score: u8,
    within_window: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RawMealLog> for MealLog {
    type Error = ValidationError;

    fn try_from(raw: RawMealLog) -> Result<Self, Self::Error> {
        raw.details.validate()?;
        if raw.timing_score > 100 {
            return Err(ValidationError::OutOfRange {
                field: "timing_score",
                value: i64::from(raw.timing_score),
                min: 0,
                max: 100,
            });
        }
        // A meal scores 100 exactly when it lands inside its window.
        if raw.within_window != (raw.timing_score == 100) {
            return Err(ValidationError::Inconsistent {
                record: "meal log",
                reason: "within_window disagrees with timing_score",
            });
        }
        if raw.updated_at < raw.created_at {
            return Err(ValidationError::Inconsistent {
                record: "meal log",
                reason: "updated_at precedes created_at",
            });
        }
        Ok(Self {
            id: raw.id,
            timestamp: raw.timestamp,
            meal_type: raw.meal_type,
            details: raw.details,
            timing_score: raw.timing_score,
            within_window: raw.within_window,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        })
    }
}

impl MealLog {
    /// Logs a meal eaten at `timestamp` against `schedule`.
    ///
    /// Main meals are scored against their own window. Snacks are scored
    /// against the nearest planned snack; when the schedule has none they are
    /// judged against the eating window as a whole.
    pub fn record(
        id: MealLogId,
        timestamp: NaiveDateTime,
        meal_type: MealType,
        details: MealDetails,
        schedule: &EatingWindow,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        details.validate()?;
        let eaten_at = TimeOfDay::from_naive_time(timestamp.time());
        let (timing_score, within_window) = match target_window(meal_type, eaten_at, schedule) {
            Some(window) => (
                meal_timing_score(eaten_at, window.optimal, window.flexibility_minutes),
                is_within_window(eaten_at, &window),
            ),
            None => score_against_eating_window(eaten_at, schedule),
        };
        Ok(Self {
            id,
            timestamp,
            meal_type,
            details,
            timing_score,
            within_window,
            created_at: now,
            updated_at: now,
        })
    }

    pub const fn id(&self) -> &MealLogId {
        &self.id
    }

    pub const fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub const fn meal_type(&self) -> MealType {
        self.meal_type
    }

    pub const fn details(&self) -> &MealDetails {
        &self.details
    }

    pub const fn timing_score(&self) -> u8 {
        self.timing_score
    }

    pub const fn within_window(&self) -> bool {
        self.within_window
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replaces the free-text notes.
    pub fn set_notes(&mut self, notes: Option<String>, now: DateTime<Utc>) {
        self.details.notes = notes.filter(|n| !n.trim().is_empty());
        self.updated_at = now;
    }
}

fn target_window(meal_type: MealType, eaten_at: TimeOfDay, schedule: &EatingWindow) -> Option<MealWindow> {
    match meal_type {
        MealType::Breakfast => Some(schedule.breakfast),
        MealType::Lunch => Some(schedule.lunch),
        MealType::Dinner => Some(schedule.dinner),
        MealType::Snack => schedule
            .snacks
            .iter()
            .min_by_key(|s| circular_distance(eaten_at, s.optimal))
            .copied(),
    }
}

fn score_against_eating_window(eaten_at: TimeOfDay, schedule: &EatingWindow) -> (u8, bool) {
    if is_within_range(eaten_at, schedule.start, schedule.end) {
        return (100, true);
    }
    let nearest = if circular_distance(eaten_at, schedule.start) <= circular_distance(eaten_at, schedule.end) {
        schedule.start
    } else {
        schedule.end
    };
    (meal_timing_score(eaten_at, nearest, 0), false)
}

/// How closely a set of logs followed the plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdherenceSummary {
    pub meals_logged: usize,
    pub average_timing_score: f64,
    /// Share of meals inside their window, 0.0–1.0.
    pub within_window_ratio: f64,
}

#[allow(clippy::cast_precision_loss)]
pub fn adherence_summary(logs: &[MealLog]) -> AdherenceSummary {
    if logs.is_empty() {
        return AdherenceSummary {
            meals_logged: 0,
            average_timing_score: 0.0,
            within_window_ratio: 0.0,
        };
    }
    let count = logs.len() as f64;
    let total: u32 = logs.iter().map(|l| u32::from(l.timing_score)).sum();
    let within = logs.iter().filter(|l| l.within_window).count() as f64;
    AdherenceSummary {
        meals_logged: logs.len(),
        average_timing_score: f64::from(total) / count,
        within_window_ratio: within / count,
    }
}
