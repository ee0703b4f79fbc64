//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, Utc};
use circa_core::store::{RecordStore, load_preferences, load_profile};
use circa_core::{SleepPreferences, TimeOfDay, UserProfile};
use regex::Regex;

use crate::Config;

/// Pre-compiled regex for relative date parsing.
static RELATIVE_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(day|week)s?\s+ago$").unwrap());

/// Upper bound for relative dates (~100 years in days).
const MAX_RELATIVE_DAYS: i64 = 100 * 366;

/// The current instant, read once at the edge and passed down.
#[derive(Debug, Clone, Copy)]
pub struct Now {
    pub utc: DateTime<Utc>,
    pub local: NaiveDateTime,
}

impl Now {
    pub fn system() -> Self {
        Self {
            utc: Utc::now(),
            local: Local::now().naive_local(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.local.date()
    }

    pub fn time_of_day(&self) -> TimeOfDay {
        TimeOfDay::from_naive_time(self.local.time())
    }
}

/// Parse a date as `YYYY-MM-DD`, `today`, `yesterday` or relative.
///
/// Relative forms: "3 days ago", "1 week ago".
pub fn parse_date(s: &str, today: NaiveDate) -> Result<NaiveDate> {
    let trimmed = s.trim();
    match trimmed {
        "today" => return Ok(today),
        "yesterday" => return Ok(today - Duration::days(1)),
        _ => {}
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    let Some(caps) = RELATIVE_DATE_RE.captures(trimmed) else {
        anyhow::bail!(
            "Invalid date: {s}. Use YYYY-MM-DD, 'today', 'yesterday' or relative (e.g., '3 days ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative date")?;
    let days = match &caps[2] {
        "day" => n,
        "week" => n.saturating_mul(7),
        unit => anyhow::bail!("Unknown date unit: {unit}"),
    };
    if days > MAX_RELATIVE_DAYS {
        anyhow::bail!("Relative date too far back: {s}");
    }
    Ok(today - Duration::days(days))
}

/// Resolves an optional date argument, defaulting to today.
pub fn resolve_date(arg: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    arg.map_or(Ok(today), |s| parse_date(s, today))
}

/// Loads the profile or explains how to create one.
pub fn require_profile(store: &impl RecordStore) -> Result<UserProfile> {
    load_profile(store)
        .context("failed to load profile")?
        .context("no profile set; run `circa profile set` first")
}

/// Stored preferences, or the configured defaults.
pub fn effective_preferences(store: &impl RecordStore, config: &Config) -> Result<SleepPreferences> {
    match load_preferences(store).context("failed to load preferences")? {
        Some(prefs) => Ok(prefs),
        None => config
            .default_preferences()
            .context("invalid ideal_sleep_minutes in configuration"),
    }
}
