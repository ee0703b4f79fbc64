//! Eating-window commands: plan, live status, meal logging and adherence.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use circa_core::scoring::NextEventKind;
use circa_core::store::{list_meal_logs, load_meal_log, save_meal_log};
use circa_core::{
    EatingStatus, MealDetails, MealLog, MealLogId, MealType, TimeOfDay, adherence_summary,
    calculate_eating_window, current_eating_status, fasting_progress, format_duration,
};
use circa_db::Database;

use super::util::{Now, require_profile};

/// A meal as entered on the command line.
#[derive(Debug, Clone)]
pub struct MealEntry {
    pub id: MealLogId,
    pub meal: MealType,
    pub at: Option<TimeOfDay>,
    pub date: NaiveDate,
    pub details: MealDetails,
}

pub fn plan<W: Write>(writer: &mut W, db: &Database, json: bool) -> Result<()> {
    let profile = require_profile(db)?;
    let window = calculate_eating_window(&profile).context("failed to plan eating window")?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&window)?)?;
        return Ok(());
    }

    writeln!(
        writer,
        "Eating window: {} to {} ({})",
        window.start,
        window.end,
        format_duration(window.window_minutes)
    )?;
    writeln!(
        writer,
        "Fasting: {} (metabolic switch around {})",
        format_duration(window.fasting_minutes),
        window.metabolic_switch
    )?;

    writeln!(writer)?;
    writeln!(writer, "{:<11}{:<9}WINDOW", "MEAL", "OPTIMAL")?;
    for meal in window.meals() {
        writeln!(
            writer,
            "{:<11}{:<9}{}-{}",
            meal.meal.as_str(),
            meal.optimal.to_string(),
            meal.start,
            meal.end
        )?;
    }

    writeln!(writer)?;
    writeln!(writer, "Performance zones:")?;
    for zone in &window.performance_zones {
        writeln!(writer, "  {:<22}{}-{}", zone.kind.label(), zone.start, zone.end)?;
    }

    writeln!(writer)?;
    writeln!(writer, "Recommendations:")?;
    for line in &window.recommendations {
        writeln!(writer, "- {line}")?;
    }
    Ok(())
}

pub fn status<W: Write>(writer: &mut W, db: &Database, now: TimeOfDay) -> Result<()> {
    let profile = require_profile(db)?;
    let window = calculate_eating_window(&profile).context("failed to plan eating window")?;
    let report = current_eating_status(now, &window);

    writeln!(writer, "Status: {}", report.status.as_str())?;
    writeln!(writer, "{}", report.message)?;
    let verb = match report.next_event.kind {
        NextEventKind::WindowOpens => "Opens",
        NextEventKind::WindowCloses => "Closes",
    };
    writeln!(
        writer,
        "{verb} in {}.",
        format_duration(report.next_event.minutes_until)
    )?;

    if report.status != EatingStatus::Eating {
        let progress = fasting_progress(now, &window);
        if progress.metabolic_switch_reached {
            writeln!(
                writer,
                "Fasting for {}; metabolic switch reached.",
                format_duration(progress.fasting_minutes)
            )?;
        } else {
            writeln!(
                writer,
                "Fasting for {}; metabolic switch in {}.",
                format_duration(progress.fasting_minutes),
                format_duration(progress.minutes_to_metabolic_switch)
            )?;
        }
    }
    Ok(())
}

pub fn log<W: Write>(writer: &mut W, db: &mut Database, entry: MealEntry, now: &Now) -> Result<()> {
    let profile = require_profile(db)?;
    let window = calculate_eating_window(&profile).context("failed to plan eating window")?;

    let at = entry.at.unwrap_or_else(|| now.time_of_day());
    let timestamp = entry.date.and_time(at.to_naive_time());
    let meal_log = MealLog::record(entry.id, timestamp, entry.meal, entry.details, &window, now.utc)
        .context("invalid meal details")?;
    save_meal_log(db, &meal_log).context("failed to save meal log")?;

    writeln!(
        writer,
        "Logged {} at {} (score {}, {} window).",
        meal_log.meal_type(),
        at,
        meal_log.timing_score(),
        if meal_log.within_window() { "inside" } else { "outside" }
    )?;
    writeln!(writer, "ID: {}", meal_log.id())?;
    Ok(())
}

/// Replaces or clears the notes on a logged meal.
pub fn note<W: Write>(
    writer: &mut W,
    db: &mut Database,
    id: &str,
    notes: Option<String>,
    now: &Now,
) -> Result<()> {
    let id = MealLogId::new(id)?;
    let mut meal_log = load_meal_log(db, &id)
        .context("failed to load meal log")?
        .with_context(|| format!("no meal logged with ID {id}"))?;
    meal_log.set_notes(notes, now.utc);
    save_meal_log(db, &meal_log).context("failed to save meal log")?;

    match &meal_log.details().notes {
        Some(notes) => writeln!(writer, "Notes for {id}: {notes}")?,
        None => writeln!(writer, "Cleared notes for {id}.")?,
    }
    Ok(())
}

pub fn adherence<W: Write>(writer: &mut W, db: &Database, json: bool) -> Result<()> {
    let logs = list_meal_logs(db).context("failed to load meal logs")?;
    let summary = adherence_summary(&logs);

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&summary)?)?;
        return Ok(());
    }
    if summary.meals_logged == 0 {
        writeln!(writer, "No meals logged yet.")?;
        return Ok(());
    }

    writeln!(writer, "Meals logged: {}", summary.meals_logged)?;
    writeln!(
        writer,
        "Average timing score: {:.1}",
        summary.average_timing_score
    )?;
    writeln!(
        writer,
        "Within window: {:.0}%",
        summary.within_window_ratio * 100.0
    )?;
    Ok(())
}
