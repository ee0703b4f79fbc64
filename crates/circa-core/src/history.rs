//! Per-night summaries across the sleep log.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::curve::{PeakWindow, calculate_productivity_curve, find_peak_window};
use crate::sleep::{SleepPreferences, SleepRecord};

/// One night and the day that followed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NightSummary {
    pub date: NaiveDate,
    pub duration_minutes: i64,
    /// Duration minus the ideal; negative means short.
    pub deviation_minutes: i64,
    pub peak_window: Option<PeakWindow>,
    pub average_productivity: Option<f64>,
}

/// Summarizes every record, newest first.
///
/// Each night builds its own curve, so the work is spread across threads.
pub fn summarize_history(records: &[SleepRecord], prefs: &SleepPreferences) -> Vec<NightSummary> {
    let mut summaries: Vec<NightSummary> = records
        .par_iter()
        .map(|record| {
            let curve = calculate_productivity_curve(record);
            NightSummary {
                date: record.date(),
                duration_minutes: record.duration_minutes(),
                deviation_minutes: record.duration_minutes() - prefs.ideal_sleep_minutes,
                peak_window: find_peak_window(&curve),
                average_productivity: curve.average_awake_value(),
            }
        })
        .collect();

    summaries.sort_by(|a, b| b.date.cmp(&a.date));
    summaries
}
