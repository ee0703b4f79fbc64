//! Profile commands.

use std::io::Write;

use anyhow::{Context, Result};
use circa_core::store::save_profile;
use circa_core::{UserProfile, calculate_eating_window, format_duration};
use circa_db::Database;

use super::util::require_profile;

/// Saves `profile` after checking it yields a usable eating window.
pub fn set<W: Write>(writer: &mut W, db: &mut Database, profile: &UserProfile) -> Result<()> {
    let window = calculate_eating_window(profile).context("profile does not produce an eating window")?;
    save_profile(db, profile).context("failed to save profile")?;

    writeln!(writer, "Profile saved.")?;
    writeln!(
        writer,
        "Eating window: {} to {} ({})",
        window.start,
        window.end,
        format_duration(window.window_minutes)
    )?;
    Ok(())
}

pub fn show<W: Write>(writer: &mut W, db: &Database, json: bool) -> Result<()> {
    let profile = require_profile(db)?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&profile)?)?;
        return Ok(());
    }

    writeln!(writer, "Wake time:      {}", profile.wake_time)?;
    writeln!(writer, "Sleep time:     {}", profile.sleep_time)?;
    writeln!(writer, "Chronotype:     {}", profile.chronotype)?;
    writeln!(writer, "Goal:           {}", profile.goal)?;
    writeln!(writer, "Work schedule:  {}", profile.work_schedule)?;
    writeln!(
        writer,
        "Window target:  {}",
        format_duration(profile.target_window_minutes())
    )?;
    Ok(())
}
