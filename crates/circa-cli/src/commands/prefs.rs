//! Sleep preference commands.

use std::io::Write;

use anyhow::{Context, Result};
use circa_core::store::save_preferences;
use circa_core::{SleepPreferences, format_duration};
use circa_db::Database;

use super::util::effective_preferences;
use crate::Config;

pub fn set<W: Write>(writer: &mut W, db: &mut Database, ideal_sleep_minutes: i64) -> Result<()> {
    let prefs = SleepPreferences::new(ideal_sleep_minutes).context("invalid ideal sleep")?;
    save_preferences(db, &prefs).context("failed to save preferences")?;

    writeln!(
        writer,
        "Ideal sleep set to {}.",
        format_duration(prefs.ideal_sleep_minutes)
    )?;
    for warning in prefs.warnings() {
        writeln!(writer, "Warning: {warning}")?;
    }
    Ok(())
}

pub fn show<W: Write>(writer: &mut W, db: &Database, config: &Config) -> Result<()> {
    let prefs = effective_preferences(db, config)?;
    writeln!(
        writer,
        "Ideal sleep: {} ({} minutes)",
        format_duration(prefs.ideal_sleep_minutes),
        prefs.ideal_sleep_minutes
    )?;
    Ok(())
}
