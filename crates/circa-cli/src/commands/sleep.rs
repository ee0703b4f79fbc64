//! Sleep logging, debt and history commands.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use circa_core::store::{list_sleep_records, load_sleep_record, save_sleep_record};
use circa_core::{
    DebtStatus, SleepPreferences, SleepRecord, TimeOfDay, calculate_sleep_debt, format_duration,
    summarize_history,
};
use circa_db::Database;

use super::util::Now;

/// Formats a signed minute count as `+Xh Ym` / `-Ym`.
pub fn format_signed(minutes: i64) -> String {
    let sign = if minutes < 0 { '-' } else { '+' };
    format!("{sign}{}", format_duration(minutes.abs()))
}

pub fn log<W: Write>(
    writer: &mut W,
    db: &mut Database,
    bedtime: TimeOfDay,
    wake: TimeOfDay,
    date: NaiveDate,
    now: &Now,
) -> Result<()> {
    let record = SleepRecord::for_night(date, bedtime, wake, now.utc).context("invalid sleep times")?;
    let replaced = load_sleep_record(db, date)
        .context("failed to read existing sleep record")?
        .is_some();
    save_sleep_record(db, &record).context("failed to save sleep record")?;

    writeln!(
        writer,
        "Logged {} of sleep for {} ({} to {}).",
        format_duration(record.duration_minutes()),
        record.date(),
        bedtime,
        wake
    )?;
    if replaced {
        writeln!(writer, "Replaced the previous record for {date}.")?;
    }
    Ok(())
}

pub fn debt<W: Write>(
    writer: &mut W,
    db: &Database,
    prefs: &SleepPreferences,
    window: usize,
) -> Result<()> {
    let records = list_sleep_records(db).context("failed to load sleep records")?;
    let debt = calculate_sleep_debt(&records, prefs.ideal_sleep_minutes, window);

    if debt.days_tracked == 0 {
        writeln!(writer, "No sleep logged yet.")?;
        return Ok(());
    }

    let nights = if debt.days_tracked == 1 {
        "night".to_string()
    } else {
        format!("{} nights", debt.days_tracked)
    };
    match debt.status {
        DebtStatus::Debt => writeln!(
            writer,
            "Sleep debt: {} over the last {nights}.",
            format_duration(-debt.total_debt_minutes)
        )?,
        DebtStatus::Surplus => writeln!(
            writer,
            "Sleep surplus: {} over the last {nights}.",
            format_duration(debt.total_debt_minutes)
        )?,
        DebtStatus::Balanced => writeln!(
            writer,
            "Sleep balanced over the last {nights} ({}).",
            format_signed(debt.total_debt_minutes)
        )?,
    }
    writeln!(
        writer,
        "Average sleep: {} (ideal {})",
        format_duration(debt.average_duration_minutes),
        format_duration(prefs.ideal_sleep_minutes)
    )?;
    Ok(())
}

pub fn history<W: Write>(
    writer: &mut W,
    db: &Database,
    prefs: &SleepPreferences,
    json: bool,
) -> Result<()> {
    let records = list_sleep_records(db).context("failed to load sleep records")?;
    let summaries = summarize_history(&records, prefs);

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&summaries)?)?;
        return Ok(());
    }
    if summaries.is_empty() {
        writeln!(writer, "No sleep logged yet.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "{:<12}{:<9}{:<10}{:<15}AVG",
        "DATE", "SLEPT", "VS IDEAL", "PEAK"
    )?;
    for night in &summaries {
        let peak = night
            .peak_window
            .map_or_else(|| "-".to_string(), |p| format!("{}-{}", p.start, p.end));
        let average = night
            .average_productivity
            .map_or_else(|| "-".to_string(), |avg| format!("{avg:.1}"));
        writeln!(
            writer,
            "{:<12}{:<9}{:<10}{:<15}{average}",
            night.date.to_string(),
            format_duration(night.duration_minutes),
            format_signed(night.deviation_minutes),
            peak
        )?;
    }
    Ok(())
}
