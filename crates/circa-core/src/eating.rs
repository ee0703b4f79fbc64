//! Eating-window assembly.
//!
//! A single deterministic pipeline turns a [`UserProfile`] into meal windows,
//! eating/fasting durations, the metabolic-switch time, performance zones and
//! advice lines. All arithmetic runs in absolute minutes measured from the
//! midnight before waking, and is folded back to clock times at the end.

use serde::{Deserialize, Serialize};

use crate::clock::{MINUTES_PER_DAY, TimeOfDay, format_duration, minutes_between};
use crate::error::EngineError;
use crate::types::{Chronotype, MealType, UserGoal, ValidationError, WorkSchedule};

/// Default flexibility around a main meal.
pub const MAIN_MEAL_FLEXIBILITY_MINUTES: i64 = 30;

/// Flexibility around a snack.
pub const SNACK_FLEXIBILITY_MINUTES: i64 = 20;

/// Breakfast lands this long after waking before chronotype adjustment.
pub const BREAKFAST_AFTER_WAKE_MINUTES: i64 = 60;

/// Breakfast is never earlier than this long after waking.
pub const MIN_BREAKFAST_AFTER_WAKE_MINUTES: i64 = 30;

/// Wakes before this clock minute get the early-riser breakfast floor.
pub const EARLY_RISER_CUTOFF_MINUTE: i64 = 5 * 60;

/// Earliest breakfast for early risers.
pub const EARLY_RISER_BREAKFAST_MINUTE: i64 = 6 * 60;

/// Minimum gap between dinner and sleep.
pub const SLEEP_BUFFER_MINUTES: i64 = 180;

/// Latest clock time for dinner, for every work schedule.
pub const DINNER_CEILING_MINUTE: i64 = 22 * 60;

/// Lunch offset from breakfast.
pub const LUNCH_AFTER_BREAKFAST_MINUTES: i64 = 4 * 60;

/// Snacks are only scheduled for windows at least this long.
pub const SNACK_WINDOW_THRESHOLD_MINUTES: i64 = 10 * 60;

/// Snack offset from the preceding main meal.
pub const SNACK_AFTER_MEAL_MINUTES: i64 = 150;

/// Fasting time after dinner at which the metabolic switch is expected.
pub const METABOLIC_SWITCH_MINUTES: i64 = 12 * 60;

/// Inputs to the eating-window pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub wake_time: TimeOfDay,
    pub sleep_time: TimeOfDay,
    pub chronotype: Chronotype,
    pub goal: UserGoal,
    #[serde(default)]
    pub work_schedule: WorkSchedule,
    /// Explicit eating-window length in hours, overriding the goal default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_window_hours: Option<f64>,
}

impl UserProfile {
    /// Checks the fields that the type system cannot.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.wake_time == self.sleep_time {
            return Err(ValidationError::OutOfRange {
                field: "awake_minutes",
                value: 0,
                min: 1,
                max: MINUTES_PER_DAY - 1,
            });
        }
        if let Some(hours) = self.target_window_hours {
            if !hours.is_finite() || !(1.0..=20.0).contains(&hours) {
                #[allow(clippy::cast_possible_truncation)]
                let value = if hours.is_finite() { hours as i64 } else { 0 };
                return Err(ValidationError::OutOfRange {
                    field: "target_window_hours",
                    value,
                    min: 1,
                    max: 20,
                });
            }
        }
        Ok(())
    }

    /// Requested window length in minutes.
    #[allow(clippy::cast_possible_truncation)]
    pub fn target_window_minutes(&self) -> i64 {
        self.target_window_hours.map_or_else(
            || self.goal.default_window_minutes(),
            |hours| (hours * 60.0).round() as i64,
        )
    }
}

/// A planned meal with its tolerance band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealWindow {
    pub meal: MealType,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub optimal: TimeOfDay,
    pub flexibility_minutes: i64,
}

impl MealWindow {
    fn around(meal: MealType, optimal_minute: i64, flexibility_minutes: i64) -> Self {
        Self {
            meal,
            start: TimeOfDay::from_minutes(optimal_minute - flexibility_minutes),
            end: TimeOfDay::from_minutes(optimal_minute + flexibility_minutes),
            optimal: TimeOfDay::from_minutes(optimal_minute),
            flexibility_minutes,
        }
    }
}

/// Broad category of a performance zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneType {
    Mental,
    Physical,
    Recovery,
    Avoid,
}

/// Named performance zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceZoneKind {
    PeakMentalClarity,
    StableEnergy,
    PostMealDip,
    AthleticPerformance,
    Recovery,
}

impl PerformanceZoneKind {
    pub const fn zone_type(self) -> ZoneType {
        match self {
            Self::PeakMentalClarity | Self::StableEnergy => ZoneType::Mental,
            Self::PostMealDip => ZoneType::Avoid,
            Self::AthleticPerformance => ZoneType::Physical,
            Self::Recovery => ZoneType::Recovery,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::PeakMentalClarity => "Peak mental clarity",
            Self::StableEnergy => "Stable energy",
            Self::PostMealDip => "Post-meal dip",
            Self::AthleticPerformance => "Athletic performance",
            Self::Recovery => "Recovery",
        }
    }
}

/// An interval derived from meal times by fixed offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceZone {
    pub kind: PerformanceZoneKind,
    pub zone_type: ZoneType,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

/// The complete eating schedule for one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EatingWindow {
    pub breakfast: MealWindow,
    pub lunch: MealWindow,
    pub dinner: MealWindow,
    pub snacks: Vec<MealWindow>,
    /// Equals the optimal breakfast time.
    pub start: TimeOfDay,
    /// Equals the optimal dinner time.
    pub end: TimeOfDay,
    pub window_minutes: i64,
    pub fasting_minutes: i64,
    /// Window length that was asked for before the sleep buffer applied.
    pub target_window_minutes: i64,
    pub metabolic_switch: TimeOfDay,
    pub performance_zones: Vec<PerformanceZone>,
    pub recommendations: Vec<String>,
}

impl EatingWindow {
    #[allow(clippy::cast_precision_loss)]
    pub fn window_hours(&self) -> f64 {
        self.window_minutes as f64 / 60.0
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn fasting_hours(&self) -> f64 {
        self.fasting_minutes as f64 / 60.0
    }

    /// Whether the sleep buffer shortened the requested window.
    pub const fn was_capped(&self) -> bool {
        self.window_minutes < self.target_window_minutes
    }

    /// Every planned meal, snacks included, ordered from the window start.
    pub fn meals(&self) -> Vec<MealWindow> {
        let mut meals = vec![self.breakfast, self.lunch, self.dinner];
        meals.extend(self.snacks.iter().copied());
        let origin = self.start;
        meals.sort_by_key(|m| minutes_between(origin, m.optimal));
        meals
    }
}

/// Runs the eating-window pipeline for `profile`.
pub fn calculate_eating_window(profile: &UserProfile) -> Result<EatingWindow, EngineError> {
    profile.validate()?;

    let wake = profile.wake_time.minutes();
    let sleep = wake + minutes_between(profile.wake_time, profile.sleep_time);
    let target = profile.target_window_minutes();

    let mut breakfast = (wake + BREAKFAST_AFTER_WAKE_MINUTES
        + profile.chronotype.breakfast_offset_minutes())
    .max(wake + MIN_BREAKFAST_AFTER_WAKE_MINUTES);
    if wake < EARLY_RISER_CUTOFF_MINUTE {
        breakfast = breakfast.max(EARLY_RISER_BREAKFAST_MINUTE);
    }

    let ceiling = if breakfast < DINNER_CEILING_MINUTE {
        DINNER_CEILING_MINUTE
    } else {
        DINNER_CEILING_MINUTE + MINUTES_PER_DAY
    };
    let latest_dinner = (sleep - SLEEP_BUFFER_MINUTES).min(ceiling);
    let dinner = (breakfast + target).min(latest_dinner);
    if dinner <= breakfast {
        return Err(EngineError::NoEatingWindow {
            breakfast: TimeOfDay::from_minutes(breakfast),
            latest_dinner: TimeOfDay::from_minutes(latest_dinner),
        });
    }

    let window_minutes = dinner - breakfast;
    let lunch = breakfast + LUNCH_AFTER_BREAKFAST_MINUTES;

    let snacks = if window_minutes >= SNACK_WINDOW_THRESHOLD_MINUTES {
        vec![
            MealWindow::around(
                MealType::Snack,
                breakfast + SNACK_AFTER_MEAL_MINUTES,
                SNACK_FLEXIBILITY_MINUTES,
            ),
            MealWindow::around(
                MealType::Snack,
                lunch + SNACK_AFTER_MEAL_MINUTES,
                SNACK_FLEXIBILITY_MINUTES,
            ),
        ]
    } else {
        Vec::new()
    };

    let mut window = EatingWindow {
        breakfast: MealWindow::around(MealType::Breakfast, breakfast, MAIN_MEAL_FLEXIBILITY_MINUTES),
        lunch: MealWindow::around(MealType::Lunch, lunch, MAIN_MEAL_FLEXIBILITY_MINUTES),
        dinner: MealWindow::around(MealType::Dinner, dinner, MAIN_MEAL_FLEXIBILITY_MINUTES),
        snacks,
        start: TimeOfDay::from_minutes(breakfast),
        end: TimeOfDay::from_minutes(dinner),
        window_minutes,
        fasting_minutes: MINUTES_PER_DAY - window_minutes,
        target_window_minutes: target,
        metabolic_switch: TimeOfDay::from_minutes(dinner + METABOLIC_SWITCH_MINUTES),
        performance_zones: performance_zones(breakfast, lunch, dinner),
        recommendations: Vec::new(),
    };
    window.recommendations = recommendations(profile, &window);
    Ok(window)
}

fn zone(kind: PerformanceZoneKind, start: i64, end: i64) -> PerformanceZone {
    PerformanceZone {
        kind,
        zone_type: kind.zone_type(),
        start: TimeOfDay::from_minutes(start),
        end: TimeOfDay::from_minutes(end),
    }
}

/// Fixed-offset zones around the meal times.
///
/// The post-meal dip deliberately starts together with stable energy; both
/// are reported and callers decide how to present the overlap.
fn performance_zones(breakfast: i64, lunch: i64, dinner: i64) -> Vec<PerformanceZone> {
    vec![
        zone(PerformanceZoneKind::PeakMentalClarity, breakfast + 60, breakfast + 180),
        zone(PerformanceZoneKind::StableEnergy, lunch + 30, lunch + 120),
        zone(PerformanceZoneKind::PostMealDip, lunch + 30, lunch + 90),
        zone(PerformanceZoneKind::AthleticPerformance, dinner - 240, dinner - 60),
        zone(PerformanceZoneKind::Recovery, dinner, dinner + 120),
    ]
}

const fn goal_advice(goal: UserGoal) -> &'static str {
    match goal {
        UserGoal::MetabolicHealth => {
            "Keep the window tight and front-load calories; insulin sensitivity is highest early in the day."
        }
        UserGoal::MentalPerformance => {
            "Favour protein and healthy fats at breakfast and keep lunch light to soften the afternoon dip."
        }
        UserGoal::EnergyStability => {
            "Eat at consistent times and pair carbohydrates with protein or fibre to flatten glucose swings."
        }
        UserGoal::AthleticPerformance => {
            "Train in the athletic performance zone and refuel with protein and carbohydrates at dinner."
        }
        UserGoal::Flexibility => {
            "Use the wider window for social meals, but keep the last meal at least three hours before bed."
        }
    }
}

const fn chronotype_advice(chronotype: Chronotype) -> &'static str {
    match chronotype {
        Chronotype::Morning => {
            "As a morning type, make breakfast your largest meal and wind down eating early."
        }
        Chronotype::Intermediate => {
            "Your timing is balanced; anchor breakfast to your wake time every day."
        }
        Chronotype::Evening => {
            "As an evening type, a later breakfast is fine; avoid pushing dinner toward bedtime."
        }
    }
}

const fn work_schedule_advice(schedule: WorkSchedule) -> Option<&'static str> {
    match schedule {
        WorkSchedule::Standard => None,
        WorkSchedule::EarlyShift => {
            Some("On early shifts, pack breakfast so the first meal still lands on schedule.")
        }
        WorkSchedule::LateShift => {
            Some("On late shifts, make lunch the main meal and keep dinner small.")
        }
        WorkSchedule::NightShift => Some(
            "On night shifts, make breakfast the main meal; dinner still closes by 22:00.",
        ),
        WorkSchedule::Flexible => {
            Some("With a flexible schedule, protect the peak mental clarity zone for deep work.")
        }
    }
}

fn recommendations(profile: &UserProfile, window: &EatingWindow) -> Vec<String> {
    let mut lines = vec![
        goal_advice(profile.goal).to_string(),
        chronotype_advice(profile.chronotype).to_string(),
    ];
    if let Some(advice) = work_schedule_advice(profile.work_schedule) {
        lines.push(advice.to_string());
    }
    if window.was_capped() {
        lines.push(format!(
            "Dinner moved to {} to keep a {}-hour buffer before sleep.",
            window.end,
            SLEEP_BUFFER_MINUTES / 60
        ));
    }
    lines.push(format!(
        "Your eating window is {} ({} to {}).",
        format_duration(window.window_minutes),
        window.start,
        window.end
    ));
    lines.push(format!(
        "You fast for {}; the metabolic switch arrives around {}.",
        format_duration(window.fasting_minutes),
        window.metabolic_switch
    ));
    lines
}
