//! Engine error taxonomy.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::clock::TimeOfDay;
use crate::types::ValidationError;

/// Errors returned by the scheduling engine.
///
/// Every computation either returns a complete result or one of these; the
/// engine never returns partial structures and never logs on failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Malformed input rejected at the boundary.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Wake time precedes bedtime.
    #[error("wake time {wake} precedes bedtime {bedtime}")]
    WakeBeforeBedtime {
        bedtime: NaiveDateTime,
        wake: NaiveDateTime,
    },

    /// More than a day passed between bedtime and wake time.
    #[error("wake time {wake} is more than 24h after bedtime {bedtime}")]
    SleepSpanTooLong {
        bedtime: NaiveDateTime,
        wake: NaiveDateTime,
    },

    /// A sleep record is keyed by a date other than its wake date.
    #[error("sleep record dated {date} but wake time is {wake}")]
    DateMismatch { date: NaiveDate, wake: NaiveDateTime },

    /// The sleep buffer leaves no room to eat after breakfast.
    #[error("no room for an eating window: breakfast at {breakfast}, latest dinner at {latest_dinner}")]
    NoEatingWindow {
        breakfast: TimeOfDay,
        latest_dinner: TimeOfDay,
    },
}
