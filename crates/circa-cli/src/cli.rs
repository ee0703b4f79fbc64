//! Command-line argument definitions.

use std::path::PathBuf;

use circa_core::{Chronotype, MealSize, MealType, TimeOfDay, UserGoal, WorkSchedule};
use clap::{Parser, Subcommand};

/// Circadian productivity and meal-timing planner.
///
/// Logs sleep, models the day's alertness curve and plans an eating window
/// around your chronotype and goals.
#[derive(Debug, Parser)]
#[command(name = "circa", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage the wake/sleep profile used for meal planning.
    #[command(subcommand)]
    Profile(ProfileAction),

    /// Manage sleep preferences.
    #[command(subcommand)]
    Prefs(PrefsAction),

    /// Log sleep and review sleep debt.
    #[command(subcommand)]
    Sleep(SleepAction),

    /// Show the productivity curve and insights for a logged night.
    Curve {
        /// Wake date of the night to use (defaults to the latest logged night).
        #[arg(long)]
        date: Option<String>,

        /// Time to evaluate "current" productivity at (HH:mm).
        #[arg(long)]
        now: Option<TimeOfDay>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Plan meals, check the eating window and log meals.
    #[command(subcommand)]
    Eat(EatAction),

    /// Write every stored record as a JSON snapshot to stdout.
    Export,

    /// Merge a JSON snapshot from stdin into the store.
    Import,

    /// Show database location and record counts.
    Status,
}

#[derive(Debug, Subcommand)]
pub enum ProfileAction {
    /// Create or replace the profile.
    Set {
        /// Usual wake time (HH:mm).
        #[arg(long)]
        wake: TimeOfDay,

        /// Usual sleep time (HH:mm).
        #[arg(long)]
        sleep: TimeOfDay,

        /// morning, intermediate or evening.
        #[arg(long)]
        chronotype: Chronotype,

        /// `metabolic_health`, `mental_performance`, `energy_stability`,
        /// `athletic_performance` or `flexibility`.
        #[arg(long)]
        goal: UserGoal,

        /// standard, `early_shift`, `late_shift`, `night_shift` or flexible.
        #[arg(long, default_value = "standard")]
        work_schedule: WorkSchedule,

        /// Eating-window length in hours, overriding the goal default.
        #[arg(long)]
        window_hours: Option<f64>,
    },

    /// Print the stored profile.
    Show {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum PrefsAction {
    /// Set the ideal nightly sleep.
    Set {
        /// Ideal sleep in minutes.
        #[arg(long)]
        ideal_sleep: i64,
    },

    /// Print the effective preferences.
    Show,
}

#[derive(Debug, Subcommand)]
pub enum SleepAction {
    /// Record a night of sleep.
    Log {
        /// Time you went to bed (HH:mm).
        #[arg(long)]
        bedtime: TimeOfDay,

        /// Time you woke up (HH:mm).
        #[arg(long)]
        wake: TimeOfDay,

        /// Date you woke up: YYYY-MM-DD, today, yesterday or "N days ago".
        #[arg(long)]
        date: Option<String>,
    },

    /// Show accumulated sleep debt.
    Debt {
        /// Number of most recent nights to include.
        #[arg(long)]
        days: Option<usize>,
    },

    /// Summarize every logged night.
    History {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum EatAction {
    /// Show the planned eating window.
    Plan {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show whether the eating window is open right now.
    Status {
        /// Time to evaluate at (HH:mm).
        #[arg(long)]
        now: Option<TimeOfDay>,
    },

    /// Log a meal and score its timing.
    Log {
        /// breakfast, lunch, dinner or snack.
        #[arg(long)]
        meal: MealType,

        /// Time eaten (HH:mm), defaults to now.
        #[arg(long)]
        at: Option<TimeOfDay>,

        /// Date eaten: YYYY-MM-DD, today, yesterday or "N days ago".
        #[arg(long)]
        date: Option<String>,

        /// light, moderate or large.
        #[arg(long)]
        size: Option<MealSize>,

        /// Protein in grams.
        #[arg(long)]
        protein: Option<u32>,

        /// Carbohydrates in grams.
        #[arg(long)]
        carbs: Option<u32>,

        /// Fat in grams.
        #[arg(long)]
        fat: Option<u32>,

        /// Energy before eating, 1-10.
        #[arg(long)]
        energy_before: Option<u8>,

        /// Energy after eating, 1-10.
        #[arg(long)]
        energy_after: Option<u8>,

        /// Free-text notes.
        #[arg(long)]
        notes: Option<String>,
    },

    /// Replace the notes on a logged meal.
    Note {
        /// Meal log ID.
        id: String,

        /// New notes; omit to clear.
        notes: Option<String>,
    },

    /// Summarize how closely logged meals followed the plan.
    Adherence {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}
