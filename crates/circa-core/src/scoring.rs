//! Where "now" sits relative to a schedule, and how well a meal matched it.

use serde::{Deserialize, Serialize};

use crate::clock::{TimeOfDay, circular_distance, is_within_range, minutes_between};
use crate::eating::{EatingWindow, MAIN_MEAL_FLEXIBILITY_MINUTES, METABOLIC_SWITCH_MINUTES, MealWindow};

/// Points lost per minute outside the flexibility band.
pub const PENALTY_PER_MINUTE: i64 = 2;

/// Scores a meal time against its optimal time on a 0–100 scale.
///
/// Deviation is the shorter way around the clock. Anything within
/// `flexibility_minutes` scores 100; beyond that each minute costs
/// [`PENALTY_PER_MINUTE`] points, floored at 0.
pub fn meal_timing_score(actual: TimeOfDay, optimal: TimeOfDay, flexibility_minutes: i64) -> u8 {
    let deviation = circular_distance(actual, optimal);
    let overshoot = (deviation - flexibility_minutes.max(0)).max(0);
    let score = (100 - overshoot * PENALTY_PER_MINUTE).max(0);
    u8::try_from(score).unwrap_or(0)
}

/// [`meal_timing_score`] with the default main-meal flexibility.
pub fn default_meal_timing_score(actual: TimeOfDay, optimal: TimeOfDay) -> u8 {
    meal_timing_score(actual, optimal, MAIN_MEAL_FLEXIBILITY_MINUTES)
}

/// Inclusive check against a meal window's flexibility band.
pub const fn is_within_window(time: TimeOfDay, window: &MealWindow) -> bool {
    is_within_range(time, window.start, window.end)
}

/// Position relative to the eating window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EatingStatus {
    PreBreakfast,
    Eating,
    PostDinner,
}

impl EatingStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PreBreakfast => "pre_breakfast",
            Self::Eating => "eating",
            Self::PostDinner => "post_dinner",
        }
    }
}

/// The boundary the schedule crosses next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextEventKind {
    WindowOpens,
    WindowCloses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextEvent {
    pub kind: NextEventKind,
    pub at: TimeOfDay,
    pub minutes_until: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub status: EatingStatus,
    pub message: String,
    pub next_event: NextEvent,
}

/// Reports where `now` falls relative to the eating window.
///
/// Inside `[start, end]` is eating. Outside a same-day window, before the
/// start is pre-breakfast and after the end is post-dinner. For a window that
/// wraps midnight the outside gap lies wholly between dinner and the next
/// breakfast, so it reads as post-dinner.
pub fn current_eating_status(now: TimeOfDay, window: &EatingWindow) -> StatusReport {
    if is_within_range(now, window.start, window.end) {
        let minutes_until = minutes_between(now, window.end);
        return StatusReport {
            status: EatingStatus::Eating,
            message: format!("Eating window open until {}.", window.end),
            next_event: NextEvent {
                kind: NextEventKind::WindowCloses,
                at: window.end,
                minutes_until,
            },
        };
    }

    let wraps = window.end < window.start;
    let status = if !wraps && now < window.start {
        EatingStatus::PreBreakfast
    } else {
        EatingStatus::PostDinner
    };
    let message = match status {
        EatingStatus::PreBreakfast => format!("Fasting; breakfast window opens at {}.", window.start),
        _ => format!("Eating window closed; next opens at {}.", window.start),
    };
    StatusReport {
        status,
        message,
        next_event: NextEvent {
            kind: NextEventKind::WindowOpens,
            at: window.start,
            minutes_until: minutes_between(now, window.start),
        },
    }
}

/// How far into the overnight fast `now` is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FastingProgress {
    pub fasting_minutes: i64,
    pub minutes_to_metabolic_switch: i64,
    pub metabolic_switch_reached: bool,
}

/// Fasting progress measured from the last planned dinner.
///
/// Zero while the eating window is open.
pub fn fasting_progress(now: TimeOfDay, window: &EatingWindow) -> FastingProgress {
    let fasting_minutes = if is_within_range(now, window.start, window.end) {
        0
    } else {
        minutes_between(window.end, now)
    };
    FastingProgress {
        fasting_minutes,
        minutes_to_metabolic_switch: (METABOLIC_SWITCH_MINUTES - fasting_minutes).max(0),
        metabolic_switch_reached: fasting_minutes >= METABOLIC_SWITCH_MINUTES,
    }
}
