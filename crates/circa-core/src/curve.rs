//! Productivity curve generation and day insights.
//!
//! A curve covers the "day" from 05:00 through 01:00 the next morning at
//! five-minute resolution. Points before the wake time are asleep.

use serde::{Deserialize, Serialize};

use crate::circadian::{GOOD_THRESHOLD, ProductivityZone, productivity};
use crate::clock::{TimeOfDay, add_minutes, minutes_between};
use crate::sleep::{SleepDebt, SleepPreferences, SleepRecord, calculate_sleep_debt};

/// First minute of the curve frame (05:00).
pub const CURVE_START_MINUTE: i64 = 5 * 60;

/// End of the curve frame, exclusive (25:00, i.e. 01:00 the next day).
pub const CURVE_END_MINUTE: i64 = 25 * 60;

/// Spacing between curve points.
pub const CURVE_STEP_MINUTES: i64 = 5;

/// Length of the melatonin window before the optimal bedtime.
pub const MELATONIN_WINDOW_MINUTES: i64 = 120;

/// One sample of the productivity curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductivityPoint {
    pub time: TimeOfDay,
    pub value: u8,
    pub zone: ProductivityZone,
}

/// A full day of productivity samples for one night of sleep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductivityCurve {
    pub points: Vec<ProductivityPoint>,
}

/// Builds the curve for a recorded night.
pub fn calculate_productivity_curve(record: &SleepRecord) -> ProductivityCurve {
    productivity_curve(record.wake_clock(), record.duration_minutes())
}

/// Builds the curve from a wake time and last night's sleep duration.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn productivity_curve(wake: TimeOfDay, sleep_minutes: i64) -> ProductivityCurve {
    let prior_sleep_hours = sleep_minutes as f64 / 60.0;
    let wake_minute = wake.minutes();

    let points = (CURVE_START_MINUTE..CURVE_END_MINUTE)
        .step_by(CURVE_STEP_MINUTES.unsigned_abs() as usize)
        .map(|frame_minute| {
            let time = TimeOfDay::from_minutes(frame_minute);
            if frame_minute < wake_minute {
                return ProductivityPoint {
                    time,
                    value: 0,
                    zone: ProductivityZone::Sleep,
                };
            }
            let hours_awake = minutes_between(wake, time) as f64 / 60.0;
            let value = productivity(hours_awake, prior_sleep_hours);
            ProductivityPoint {
                time,
                value,
                zone: ProductivityZone::classify(value, false),
            }
        })
        .collect();

    ProductivityCurve { points }
}

impl ProductivityCurve {
    /// The point closest to `now` by minute-of-day; earlier points win ties.
    pub fn nearest(&self, now: TimeOfDay) -> Option<&ProductivityPoint> {
        self.points
            .iter()
            .min_by_key(|p| (p.time.minutes() - now.minutes()).abs())
    }

    /// Mean value of the awake points, or `None` if the whole frame is asleep.
    #[allow(clippy::cast_precision_loss)]
    pub fn average_awake_value(&self) -> Option<f64> {
        let awake: Vec<u8> = self
            .points
            .iter()
            .filter(|p| p.zone != ProductivityZone::Sleep)
            .map(|p| p.value)
            .collect();
        if awake.is_empty() {
            return None;
        }
        let total: u32 = awake.iter().map(|&v| u32::from(v)).sum();
        Some(f64::from(total) / awake.len() as f64)
    }
}

/// The best stretch of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakWindow {
    pub start: TimeOfDay,
    /// Time of the last point in the run (inclusive).
    pub end: TimeOfDay,
    pub peak_value: u8,
    /// Whether the run reaches the good threshold, as opposed to being the
    /// single best point.
    pub above_threshold: bool,
}

/// Finds the longest contiguous run at or above the good threshold.
///
/// Ties go to the earliest run. Without any qualifying point, falls back to
/// the first globally maximal point. Returns `None` only for an empty curve.
pub fn find_peak_window(curve: &ProductivityCurve) -> Option<PeakWindow> {
    let points = &curve.points;
    let mut best: Option<(usize, usize)> = None;
    let mut run_start: Option<usize> = None;

    for idx in 0..=points.len() {
        let qualifies = points
            .get(idx)
            .is_some_and(|p| p.zone != ProductivityZone::Sleep && p.value >= GOOD_THRESHOLD);
        match (qualifies, run_start) {
            (true, None) => run_start = Some(idx),
            (false, Some(start)) => {
                let len = idx - start;
                if best.is_none_or(|(s, e)| len > e - s) {
                    best = Some((start, idx));
                }
                run_start = None;
            }
            _ => {}
        }
    }

    if let Some((start, end)) = best {
        let run = &points[start..end];
        let peak_value = run.iter().map(|p| p.value).max().unwrap_or(0);
        return Some(PeakWindow {
            start: run[0].time,
            end: run[run.len() - 1].time,
            peak_value,
            above_threshold: true,
        });
    }

    let mut max: Option<&ProductivityPoint> = None;
    for point in points {
        if max.is_none_or(|m| point.value > m.value) {
            max = Some(point);
        }
    }
    max.map(|p| PeakWindow {
        start: p.time,
        end: p.time,
        peak_value: p.value,
        above_threshold: false,
    })
}

/// Bedtime that yields the ideal duration before waking at `wake`.
pub const fn optimal_bedtime(wake: TimeOfDay, ideal_sleep_minutes: i64) -> TimeOfDay {
    add_minutes(wake, -ideal_sleep_minutes)
}

/// Interval before bedtime in which melatonin is expected to rise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MelatoninWindow {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

/// The fixed-length window ending exactly at `bedtime`.
pub const fn melatonin_window(bedtime: TimeOfDay) -> MelatoninWindow {
    MelatoninWindow {
        start: add_minutes(bedtime, -MELATONIN_WINDOW_MINUTES),
        end: bedtime,
    }
}

/// Everything the day view needs, derived from one night and recent history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayInsights {
    pub curve: ProductivityCurve,
    pub peak_window: Option<PeakWindow>,
    pub optimal_bedtime: TimeOfDay,
    pub melatonin_window: MelatoninWindow,
    pub current: Option<ProductivityPoint>,
    pub sleep_debt: SleepDebt,
}

/// Assembles insights for `record`, evaluating the current point at `now`.
///
/// `history` feeds the sleep-debt aggregate over the `debt_window` most
/// recent nights and may or may not include `record` itself.
pub fn day_insights(
    record: &SleepRecord,
    history: &[SleepRecord],
    prefs: &SleepPreferences,
    debt_window: usize,
    now: TimeOfDay,
) -> DayInsights {
    let curve = calculate_productivity_curve(record);
    let peak_window = find_peak_window(&curve);
    let optimal_bedtime = optimal_bedtime(record.wake_clock(), prefs.ideal_sleep_minutes);
    let current = curve.nearest(now).copied();

    DayInsights {
        peak_window,
        optimal_bedtime,
        melatonin_window: melatonin_window(optimal_bedtime),
        current,
        sleep_debt: calculate_sleep_debt(history, prefs.ideal_sleep_minutes, debt_window),
        curve,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sleep::tests::night;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn point(time: &str, value: u8) -> ProductivityPoint {
        ProductivityPoint {
            time: t(time),
            value,
            zone: ProductivityZone::from_value(value),
        }
    }

    #[test]
    fn curve_has_240_points_from_five_am() {
        let curve = productivity_curve(t("07:00"), 480);
        assert_eq!(curve.points.len(), 240);
        assert_eq!(curve.points[0].time, t("05:00"));
        assert_eq!(curve.points[239].time, t("00:55"));
    }

    #[test]
    fn points_before_wake_are_asleep_and_only_those() {
        let record = night("2025-03-02", "23:00", "07:00");
        let curve = calculate_productivity_curve(&record);
        for (idx, p) in curve.points.iter().enumerate() {
            let frame_minute = CURVE_START_MINUTE + i64::try_from(idx).unwrap() * CURVE_STEP_MINUTES;
            if frame_minute < 7 * 60 {
                assert_eq!(p.value, 0);
                assert_eq!(p.zone, ProductivityZone::Sleep);
            } else {
                assert_ne!(p.zone, ProductivityZone::Sleep, "{} asleep", p.time);
            }
        }
    }

    #[test]
    fn values_stay_in_range_for_many_nights() {
        for wake_hour in 0..24 {
            for sleep in [0, 180, 360, 480, 600, 900] {
                let curve = productivity_curve(TimeOfDay::from_hm(wake_hour, 0).unwrap(), sleep);
                assert!(curve.points.iter().all(|p| p.value <= 100));
                for p in &curve.points {
                    if p.zone != ProductivityZone::Sleep {
                        assert_eq!(p.zone, ProductivityZone::from_value(p.value));
                    }
                }
            }
        }
    }

    #[test]
    fn post_lunch_dip_sits_between_peaks() {
        let record = night("2025-03-02", "23:00", "07:00");
        let curve = calculate_productivity_curve(&record);
        let morning = curve.nearest(t("10:00")).unwrap().value;
        let dip = curve.nearest(t("14:00")).unwrap().value;
        let afternoon = curve.nearest(t("17:00")).unwrap().value;
        assert!(dip < morning, "dip {dip} vs morning {morning}");
        assert!(dip < afternoon, "dip {dip} vs afternoon {afternoon}");
    }

    #[test]
    fn early_wake_before_frame_has_no_sleep_points() {
        let curve = productivity_curve(t("04:00"), 420);
        assert!(curve.points.iter().all(|p| p.zone != ProductivityZone::Sleep));
    }

    #[test]
    fn peak_window_is_longest_run() {
        let curve = ProductivityCurve {
            points: vec![
                point("08:00", 81),
                point("08:05", 70),
                point("08:10", 85),
                point("08:15", 90),
                point("08:20", 82),
                point("08:25", 40),
            ],
        };
        let peak = find_peak_window(&curve).unwrap();
        assert_eq!(peak.start, t("08:10"));
        assert_eq!(peak.end, t("08:20"));
        assert_eq!(peak.peak_value, 90);
        assert!(peak.above_threshold);
    }

    #[test]
    fn peak_window_ties_go_to_earliest_run() {
        let curve = ProductivityCurve {
            points: vec![
                point("08:00", 80),
                point("08:05", 80),
                point("08:10", 10),
                point("08:15", 95),
                point("08:20", 95),
            ],
        };
        let peak = find_peak_window(&curve).unwrap();
        assert_eq!(peak.start, t("08:00"));
        assert_eq!(peak.end, t("08:05"));
    }

    #[test]
    fn peak_window_falls_back_to_first_max() {
        let curve = ProductivityCurve {
            points: vec![point("08:00", 50), point("08:05", 72), point("08:10", 72)],
        };
        let peak = find_peak_window(&curve).unwrap();
        assert_eq!(peak.start, t("08:05"));
        assert_eq!(peak.end, t("08:05"));
        assert!(!peak.above_threshold);
        assert!(find_peak_window(&ProductivityCurve { points: vec![] }).is_none());
    }

    #[test]
    fn real_curve_peak_is_mid_morning() {
        let curve = productivity_curve(t("07:00"), 480);
        let peak = find_peak_window(&curve).unwrap();
        assert!(peak.above_threshold);
        assert!(peak.start > t("08:30") && peak.end < t("11:30"), "{peak:?}");
    }

    #[test]
    fn optimal_bedtime_and_melatonin() {
        let bedtime = optimal_bedtime(t("07:00"), 480);
        assert_eq!(bedtime, t("23:00"));
        let window = melatonin_window(bedtime);
        assert_eq!(window.end, bedtime);
        assert_eq!(minutes_between(window.start, window.end), MELATONIN_WINDOW_MINUTES);
        assert_eq!(optimal_bedtime(t("06:00"), 540), t("21:00"));
    }

    #[test]
    fn nearest_picks_closest_point() {
        let curve = productivity_curve(t("07:00"), 480);
        assert_eq!(curve.nearest(t("12:02")).unwrap().time, t("12:00"));
        assert_eq!(curve.nearest(t("12:03")).unwrap().time, t("12:05"));
        assert_eq!(curve.nearest(t("00:20")).unwrap().time, t("00:20"));
    }

    #[test]
    fn insights_tie_everything_together() {
        let record = night("2025-03-02", "00:30", "07:00");
        let prefs = SleepPreferences::default();
        let insights = day_insights(&record, std::slice::from_ref(&record), &prefs, 7, t("09:58"));
        assert_eq!(insights.optimal_bedtime, t("23:00"));
        assert_eq!(insights.melatonin_window.start, t("21:00"));
        assert_eq!(insights.current.unwrap().time, t("10:00"));
        assert_eq!(insights.sleep_debt.total_debt_minutes, 390 - 480);
        assert_eq!(insights.curve.points.len(), 240);
    }
}
