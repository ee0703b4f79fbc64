//! Core scheduling engine for circa.
//!
//! This crate contains the pure logic for:
//! - Productivity curves: a two-process circadian model sampled across the day
//! - Sleep debt: rolling deficit against an ideal sleep duration
//! - Eating windows: chronotype- and goal-aware meal timing with fasting stats
//! - Scoring: meal timing scores and "where am I now" status lookups
//!
//! Nothing here reads the system clock; callers pass `now` explicitly.

pub mod circadian;
pub mod clock;
pub mod curve;
pub mod eating;
pub mod error;
pub mod history;
pub mod meal_log;
pub mod scoring;
pub mod sleep;
pub mod snapshot;
pub mod store;
pub mod types;

pub use circadian::ProductivityZone;
pub use clock::{TimeOfDay, format_duration};
pub use curve::{
    DayInsights, MelatoninWindow, PeakWindow, ProductivityCurve, ProductivityPoint,
    calculate_productivity_curve, day_insights, find_peak_window,
};
pub use eating::{EatingWindow, MealWindow, PerformanceZone, UserProfile, calculate_eating_window};
pub use error::EngineError;
pub use history::{NightSummary, summarize_history};
pub use meal_log::{AdherenceSummary, MealDetails, MealLog, Macros, adherence_summary};
pub use scoring::{
    EatingStatus, FastingProgress, StatusReport, current_eating_status, fasting_progress,
    meal_timing_score,
};
pub use sleep::{DebtStatus, SleepDebt, SleepPreferences, SleepRecord, calculate_sleep_debt};
pub use snapshot::{MergeStats, Snapshot, export_snapshot, import_snapshot};
pub use store::{MemoryStore, RecordStore, StoreError};
pub use types::{Chronotype, MealLogId, MealSize, MealType, UserGoal, ValidationError, WorkSchedule};
