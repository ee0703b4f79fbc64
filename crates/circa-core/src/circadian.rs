//! Two-process alertness model.
//!
//! Alertness is the product of a circadian drive (Process C), which depends
//! only on hours since waking, and a homeostatic sleep pressure (Process S),
//! which builds with time awake and starts higher after a short night.
//!
//! The curve shapes below are fixed policy, not per-user tunables.

use serde::{Deserialize, Serialize};

/// How strongly sleep pressure damps the circadian drive.
///
/// Pressure modulates the curve but can never remove more than a quarter of it.
pub const PRESSURE_DAMPING: f64 = 0.25;

/// Time constant of sleep-pressure build-up, in hours awake.
pub const PRESSURE_TIME_CONSTANT_HOURS: f64 = 18.0;

/// Initial pressure after a full night.
pub const MIN_INITIAL_PRESSURE: f64 = 0.05;

/// Initial pressure after no sleep at all.
pub const MAX_INITIAL_PRESSURE: f64 = 0.25;

/// Sleep needed for the minimum initial pressure.
pub const FULL_NIGHT_HOURS: f64 = 8.0;

pub const LOW_THRESHOLD: u8 = 30;
pub const MODERATE_THRESHOLD: u8 = 60;
pub const GOOD_THRESHOLD: u8 = 80;

const CIRCADIAN_BASELINE: f64 = 0.4;
const CIRCADIAN_FLOOR: f64 = 0.1;
const CIRCADIAN_CEILING: f64 = 1.0;

fn bell(x: f64, center: f64, width: f64) -> f64 {
    let d = x - center;
    (-(d * d) / (2.0 * width * width)).exp()
}

/// Process C: circadian drive as a function of hours since waking.
///
/// Built from a morning ramp peaking ~3h after waking, a slightly lower
/// afternoon peak ~10h in, a post-lunch dip centred ~7h in, an evening
/// decline from ~12h, and a sleep-inertia penalty during the first hour.
/// Clamped to `[0.1, 1.0]`.
pub fn circadian_drive(hours_awake: f64) -> f64 {
    let h = hours_awake.max(0.0);

    let morning = 0.5 * bell(h, 3.0, 2.0);
    let afternoon = 0.45 * bell(h, 10.0, 2.5);
    let post_lunch_dip = 0.2 * bell(h, 7.0, 1.0);
    let evening_decline = if h > 12.0 {
        0.4 * (1.0 - (-(h - 12.0) / 3.0).exp())
    } else {
        0.0
    };
    let sleep_inertia = if h < 1.0 { 0.3 * (1.0 - h) } else { 0.0 };

    (CIRCADIAN_BASELINE + morning + afternoon - post_lunch_dip - evening_decline - sleep_inertia)
        .clamp(CIRCADIAN_FLOOR, CIRCADIAN_CEILING)
}

/// Sleep pressure on waking, given last night's sleep.
///
/// Interpolates linearly from 0.25 after no sleep to 0.05 after a full
/// night; longer nights do not go below 0.05.
pub fn initial_pressure(prior_sleep_hours: f64) -> f64 {
    let shortfall = (FULL_NIGHT_HOURS - prior_sleep_hours.max(0.0)).max(0.0) / FULL_NIGHT_HOURS;
    (MIN_INITIAL_PRESSURE + shortfall * (MAX_INITIAL_PRESSURE - MIN_INITIAL_PRESSURE))
        .clamp(MIN_INITIAL_PRESSURE, MAX_INITIAL_PRESSURE)
}

/// Process S: homeostatic pressure after `hours_awake`, rising toward 1.
pub fn sleep_pressure(hours_awake: f64, prior_sleep_hours: f64) -> f64 {
    let start = initial_pressure(prior_sleep_hours);
    1.0 - (1.0 - start) * (-hours_awake.max(0.0) / PRESSURE_TIME_CONSTANT_HOURS).exp()
}

/// Combined productivity on a 0–100 scale.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn productivity(hours_awake: f64, prior_sleep_hours: f64) -> u8 {
    let drive = circadian_drive(hours_awake);
    let pressure = sleep_pressure(hours_awake, prior_sleep_hours);
    let value = (drive * (1.0 - pressure * PRESSURE_DAMPING) * 100.0).round();
    value.clamp(0.0, 100.0) as u8
}

/// Categorical reading of a productivity value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductivityZone {
    Sleep,
    Low,
    Moderate,
    Good,
    Peak,
}

impl ProductivityZone {
    /// Classifies an awake productivity value.
    ///
    /// Uses one table everywhere: low < 30 ≤ moderate < 60 ≤ good < 80 ≤ peak.
    pub const fn from_value(value: u8) -> Self {
        if value < LOW_THRESHOLD {
            Self::Low
        } else if value < MODERATE_THRESHOLD {
            Self::Moderate
        } else if value < GOOD_THRESHOLD {
            Self::Good
        } else {
            Self::Peak
        }
    }

    /// Classifies a point, forcing `Sleep` for asleep points.
    pub const fn classify(value: u8, asleep: bool) -> Self {
        if asleep { Self::Sleep } else { Self::from_value(value) }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sleep => "sleep",
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::Good => "good",
            Self::Peak => "peak",
        }
    }
}

impl std::fmt::Display for ProductivityZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
