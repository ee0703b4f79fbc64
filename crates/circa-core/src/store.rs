//! The narrow key/value persistence contract and typed accessors on top of it.
//!
//! Values are opaque JSON documents. Keys follow a fixed scheme:
//!
//! | Key                  | Value              |
//! |----------------------|--------------------|
//! | `profile`            | [`UserProfile`]    |
//! | `preferences`        | [`SleepPreferences`] |
//! | `sleep:<YYYY-MM-DD>` | [`SleepRecord`]    |
//! | `meal:<id>`          | [`MealLog`]        |
//!
//! Every value read back is validated; a stored document that no longer
//! satisfies the domain rules surfaces as [`StoreError::Invalid`] instead of
//! being trusted.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::eating::UserProfile;
use crate::meal_log::MealLog;
use crate::sleep::{SleepPreferences, SleepRecord};
use crate::types::MealLogId;

pub const PROFILE_KEY: &str = "profile";
pub const PREFERENCES_KEY: &str = "preferences";
pub const SLEEP_PREFIX: &str = "sleep:";
pub const MEAL_PREFIX: &str = "meal:";

/// Errors crossing the storage boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store failed.
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A stored document is not valid JSON for its key.
    #[error("corrupt value under '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A stored document parsed but violates a domain rule.
    #[error("invalid value under '{key}': {message}")]
    Invalid { key: String, message: String },
}

impl StoreError {
    /// Wraps a backend-specific error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }
}

/// Minimal key/value persistence used by the engine's callers.
pub trait RecordStore {
    /// Returns the value under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Inserts or replaces the value under `key`.
    fn save(&mut self, key: &str, value: &Value) -> Result<(), StoreError>;

    /// Lists keys starting with `prefix`, in ascending order.
    fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

/// In-process store backed by a `BTreeMap`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.records.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &Value) -> Result<(), StoreError> {
        debug!(key, "saving record");
        self.records.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .records
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }
}

pub fn sleep_key(date: NaiveDate) -> String {
    format!("{SLEEP_PREFIX}{}", date.format("%Y-%m-%d"))
}

pub fn meal_key(id: &MealLogId) -> String {
    format!("{MEAL_PREFIX}{id}")
}

fn encode<T: Serialize>(key: &str, value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(|source| StoreError::Corrupt {
        key: key.to_string(),
        source,
    })
}

fn decode<T: DeserializeOwned>(key: &str, value: Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|source| StoreError::Corrupt {
        key: key.to_string(),
        source,
    })
}

fn load_typed<T: DeserializeOwned>(
    store: &(impl RecordStore + ?Sized),
    key: &str,
) -> Result<Option<T>, StoreError> {
    store.load(key)?.map(|value| decode(key, value)).transpose()
}

fn list_typed<T: DeserializeOwned>(
    store: &(impl RecordStore + ?Sized),
    prefix: &str,
) -> Result<Vec<T>, StoreError> {
    let mut items = Vec::new();
    for key in store.keys(prefix)? {
        if let Some(item) = load_typed(store, &key)? {
            items.push(item);
        }
    }
    Ok(items)
}

/// Loads the stored profile, validating it.
pub fn load_profile(store: &(impl RecordStore + ?Sized)) -> Result<Option<UserProfile>, StoreError> {
    let profile: Option<UserProfile> = load_typed(store, PROFILE_KEY)?;
    if let Some(profile) = &profile {
        profile.validate().map_err(|err| StoreError::Invalid {
            key: PROFILE_KEY.to_string(),
            message: err.to_string(),
        })?;
    }
    Ok(profile)
}

pub fn save_profile(store: &mut (impl RecordStore + ?Sized), profile: &UserProfile) -> Result<(), StoreError> {
    profile.validate().map_err(|err| StoreError::Invalid {
        key: PROFILE_KEY.to_string(),
        message: err.to_string(),
    })?;
    store.save(PROFILE_KEY, &encode(PROFILE_KEY, profile)?)
}

/// Loads stored preferences. Out-of-range values fail to decode and surface
/// as [`StoreError::Corrupt`].
pub fn load_preferences(
    store: &(impl RecordStore + ?Sized),
) -> Result<Option<SleepPreferences>, StoreError> {
    load_typed(store, PREFERENCES_KEY)
}

/// Saves preferences. Values outside the recommended range are stored with a
/// warning.
pub fn save_preferences(
    store: &mut (impl RecordStore + ?Sized),
    prefs: &SleepPreferences,
) -> Result<(), StoreError> {
    prefs.validate().map_err(|err| StoreError::Invalid {
        key: PREFERENCES_KEY.to_string(),
        message: err.to_string(),
    })?;
    for warning in prefs.warnings() {
        warn!(ideal_sleep_minutes = prefs.ideal_sleep_minutes, "{warning}");
    }
    store.save(PREFERENCES_KEY, &encode(PREFERENCES_KEY, prefs)?)
}

/// Saves a sleep record, replacing any record for the same date.
pub fn save_sleep_record(
    store: &mut (impl RecordStore + ?Sized),
    record: &SleepRecord,
) -> Result<(), StoreError> {
    let key = sleep_key(record.date());
    store.save(&key, &encode(&key, record)?)
}

pub fn load_sleep_record(
    store: &(impl RecordStore + ?Sized),
    date: NaiveDate,
) -> Result<Option<SleepRecord>, StoreError> {
    load_typed(store, &sleep_key(date))
}

/// All sleep records in ascending date order.
pub fn list_sleep_records(store: &(impl RecordStore + ?Sized)) -> Result<Vec<SleepRecord>, StoreError> {
    list_typed(store, SLEEP_PREFIX)
}

pub fn save_meal_log(store: &mut (impl RecordStore + ?Sized), log: &MealLog) -> Result<(), StoreError> {
    let key = meal_key(log.id());
    store.save(&key, &encode(&key, log)?)
}

pub fn load_meal_log(
    store: &(impl RecordStore + ?Sized),
    id: &MealLogId,
) -> Result<Option<MealLog>, StoreError> {
    load_typed(store, &meal_key(id))
}

/// All meal logs ordered by timestamp.
pub fn list_meal_logs(store: &(impl RecordStore + ?Sized)) -> Result<Vec<MealLog>, StoreError> {
    let mut logs: Vec<MealLog> = list_typed(store, MEAL_PREFIX)?;
    logs.sort_by(|a, b| a.timestamp().cmp(&b.timestamp()).then_with(|| a.id().cmp(b.id())));
    Ok(logs)
}
