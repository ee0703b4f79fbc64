//! Productivity curve and day insights for a logged night.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use circa_core::store::list_sleep_records;
use circa_core::{DayInsights, DebtStatus, SleepPreferences, TimeOfDay, day_insights, format_duration};
use circa_db::Database;

use super::sleep::format_signed;

/// Points per hour on the five-minute curve.
const POINTS_PER_HOUR: usize = 12;

/// Width of the value bar at 100.
const BAR_WIDTH: usize = 20;

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    prefs: &SleepPreferences,
    debt_window: usize,
    date: Option<NaiveDate>,
    now: TimeOfDay,
    json: bool,
) -> Result<()> {
    let records = list_sleep_records(db).context("failed to load sleep records")?;
    let record = match date {
        Some(date) => records
            .iter()
            .find(|r| r.date() == date)
            .with_context(|| format!("no sleep logged for {date}"))?,
        None => records
            .iter()
            .max_by_key(|r| r.date())
            .context("no sleep logged yet; run `circa sleep log` first")?,
    };
    let history: Vec<_> = records
        .iter()
        .filter(|r| r.date() <= record.date())
        .cloned()
        .collect();
    let insights = day_insights(record, &history, prefs, debt_window, now);

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&insights)?)?;
        return Ok(());
    }

    writeln!(
        writer,
        "Night of {}: {} asleep ({} to {})",
        record.date(),
        format_duration(record.duration_minutes()),
        record.bedtime_clock(),
        record.wake_clock()
    )?;
    write_summary(writer, &insights, now)?;
    writeln!(writer)?;
    write_hourly(writer, &insights)?;
    Ok(())
}

fn write_summary<W: Write>(writer: &mut W, insights: &DayInsights, now: TimeOfDay) -> Result<()> {
    match insights.peak_window {
        Some(peak) if peak.above_threshold => writeln!(
            writer,
            "Peak window: {} to {} (peak {})",
            peak.start, peak.end, peak.peak_value
        )?,
        Some(peak) => writeln!(
            writer,
            "Best point: {} ({}); no stretch reaches the peak zone",
            peak.start, peak.peak_value
        )?,
        None => writeln!(writer, "Peak window: -")?,
    }
    writeln!(writer, "Optimal bedtime: {}", insights.optimal_bedtime)?;
    writeln!(
        writer,
        "Melatonin window: {} to {}",
        insights.melatonin_window.start, insights.melatonin_window.end
    )?;
    if let Some(current) = insights.current {
        writeln!(writer, "At {now}: {} ({})", current.value, current.zone)?;
    }

    let debt = &insights.sleep_debt;
    let status = match debt.status {
        DebtStatus::Debt => "in debt",
        DebtStatus::Balanced => "balanced",
        DebtStatus::Surplus => "in surplus",
    };
    writeln!(
        writer,
        "Sleep debt: {status} ({} over {} night{})",
        format_signed(debt.total_debt_minutes),
        debt.days_tracked,
        if debt.days_tracked == 1 { "" } else { "s" }
    )?;
    Ok(())
}

fn write_hourly<W: Write>(writer: &mut W, insights: &DayInsights) -> Result<()> {
    writeln!(writer, "{:<7}{:>5}  {:<BAR_WIDTH$}  ZONE", "TIME", "VALUE", "")?;
    for point in insights.curve.points.iter().step_by(POINTS_PER_HOUR) {
        let bar = "#".repeat(usize::from(point.value) * BAR_WIDTH / 100);
        writeln!(
            writer,
            "{:<7}{:>5}  {bar:<BAR_WIDTH$}  {}",
            point.time.to_string(),
            point.value,
            point.zone
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use circa_core::SleepRecord;
    use circa_core::store::save_sleep_record;
    use insta::assert_snapshot;

    use crate::commands::sleep::tests::fixed_now;

    fn seeded() -> Database {
        let mut db = Database::open_in_memory().unwrap();
        for (date, bed) in [("2025-03-02", "01:00"), ("2025-03-03", "23:00")] {
            let record = SleepRecord::for_night(
                date.parse().unwrap(),
                bed.parse().unwrap(),
                "07:00".parse().unwrap(),
                fixed_now().utc,
            )
            .unwrap();
            save_sleep_record(&mut db, &record).unwrap();
        }
        db
    }

    #[test]
    fn latest_night_report() {
        let db = seeded();
        let mut output = Vec::new();
        run(
            &mut output,
            &db,
            &SleepPreferences::default(),
            7,
            None,
            "10:00".parse().unwrap(),
            false,
        )
        .unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        Night of 2025-03-03: 8h 0m asleep (23:00 to 07:00)
        Peak window: 08:55 to 11:10 (peak 86)
        Optimal bedtime: 23:00
        Melatonin window: 21:00 to 23:00
        At 10:00: 86 (peak)
        Sleep debt: in debt (-2h 0m over 2 nights)

        TIME   VALUE                        ZONE
        05:00      0                        sleep
        06:00      0                        sleep
        07:00     26  #####                 low
        08:00     69  #############         good
        09:00     81  ################      peak
        10:00     86  #################     peak
        11:00     81  ################      peak
        12:00     69  #############         good
        13:00     52  ##########            moderate
        14:00     44  ########              moderate
        15:00     57  ###########           moderate
        16:00     71  ##############        good
        17:00     75  ###############       good
        18:00     72  ##############        good
        19:00     63  ############          good
        20:00     44  ########              moderate
        21:00     28  #####                 low
        22:00     18  ###                   low
        23:00     11  ##                    low
        00:00      8  #                     low
        ");
    }

    #[test]
    fn specific_date_only_counts_earlier_nights_for_debt() {
        let db = seeded();
        let mut output = Vec::new();
        run(
            &mut output,
            &db,
            &SleepPreferences::default(),
            7,
            Some("2025-03-02".parse().unwrap()),
            "09:00".parse().unwrap(),
            true,
        )
        .unwrap();

        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(value["sleep_debt"]["days_tracked"], 1);
        assert_eq!(value["sleep_debt"]["total_debt_minutes"], -120);
        assert_eq!(value["curve"]["points"].as_array().unwrap().len(), 240);
        assert_eq!(value["peak_window"]["start"], "09:00");
    }

    #[test]
    fn missing_night_is_an_error() {
        let db = seeded();
        let err = run(
            &mut Vec::new(),
            &db,
            &SleepPreferences::default(),
            7,
            Some("2024-01-01".parse().unwrap()),
            "09:00".parse().unwrap(),
            false,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "no sleep logged for 2024-01-01");
    }

    #[test]
    fn empty_store_explains() {
        let db = Database::open_in_memory().unwrap();
        let err = run(
            &mut Vec::new(),
            &db,
            &SleepPreferences::default(),
            7,
            None,
            "09:00".parse().unwrap(),
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("circa sleep log"));
    }
}
