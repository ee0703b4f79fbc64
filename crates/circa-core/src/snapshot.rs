//! Whole-store export and merge-on-import.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::eating::UserProfile;
use crate::meal_log::MealLog;
use crate::sleep::{SleepPreferences, SleepRecord};
use crate::store::{
    PREFERENCES_KEY, PROFILE_KEY, RecordStore, StoreError, list_meal_logs, list_sleep_records,
    load_meal_log, load_preferences, load_profile, load_sleep_record, meal_key, save_meal_log,
    save_preferences, save_profile, save_sleep_record, sleep_key,
};

/// Snapshot format version written by [`export_snapshot`].
pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything in a store, as one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    #[serde(default)]
    pub profile: Option<UserProfile>,
    #[serde(default)]
    pub preferences: Option<SleepPreferences>,
    #[serde(default)]
    pub sleep_records: Vec<SleepRecord>,
    #[serde(default)]
    pub meal_logs: Vec<MealLog>,
}

/// What an import changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStats {
    pub sleep_added: usize,
    pub sleep_updated: usize,
    pub sleep_skipped: usize,
    pub meals_added: usize,
    pub meals_updated: usize,
    pub meals_skipped: usize,
    pub profile_replaced: bool,
    pub preferences_replaced: bool,
}

enum Outcome {
    Added,
    Updated,
    Skipped,
}

/// Newer `updated_at` wins; a tie keeps what is already stored.
fn resolve(stored: Option<DateTime<Utc>>, incoming: DateTime<Utc>) -> Outcome {
    match stored {
        None => Outcome::Added,
        Some(existing) if incoming > existing => Outcome::Updated,
        Some(_) => Outcome::Skipped,
    }
}

fn invalid(key: impl Into<String>, message: impl std::fmt::Display) -> StoreError {
    StoreError::Invalid {
        key: key.into(),
        message: message.to_string(),
    }
}

/// Checks everything a snapshot would write.
fn validate_snapshot(snapshot: &Snapshot) -> Result<(), StoreError> {
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(invalid(
            "snapshot",
            format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                snapshot.version
            ),
        ));
    }
    if let Some(profile) = &snapshot.profile {
        profile.validate().map_err(|err| invalid(PROFILE_KEY, err))?;
    }
    if let Some(prefs) = &snapshot.preferences {
        prefs.validate().map_err(|err| invalid(PREFERENCES_KEY, err))?;
    }

    let mut dates = HashSet::new();
    for record in &snapshot.sleep_records {
        if !dates.insert(record.date()) {
            return Err(invalid(sleep_key(record.date()), "appears more than once"));
        }
    }
    let mut ids = HashSet::new();
    for log in &snapshot.meal_logs {
        if !ids.insert(log.id()) {
            return Err(invalid(meal_key(log.id()), "appears more than once"));
        }
        log.details()
            .validate()
            .map_err(|err| invalid(meal_key(log.id()), err))?;
    }
    Ok(())
}

/// Reads the whole store into a snapshot stamped `now`.
pub fn export_snapshot(store: &(impl RecordStore + ?Sized), now: DateTime<Utc>) -> Result<Snapshot, StoreError> {
    Ok(Snapshot {
        version: SNAPSHOT_VERSION,
        exported_at: now,
        profile: load_profile(store)?,
        preferences: load_preferences(store)?,
        sleep_records: list_sleep_records(store)?,
        meal_logs: list_meal_logs(store)?,
    })
}

/// Merges `snapshot` into `store`.
///
/// Sleep records merge by date and meal logs by id. Profile and preferences
/// carry no timestamp, so a snapshot that includes them replaces the stored
/// ones. Every record is validated and every merge decision made before the
/// first write, so a rejected snapshot leaves the store untouched.
pub fn import_snapshot(
    store: &mut (impl RecordStore + ?Sized),
    snapshot: &Snapshot,
) -> Result<MergeStats, StoreError> {
    validate_snapshot(snapshot)?;

    let mut stats = MergeStats::default();
    let mut sleep_writes = Vec::new();
    for record in &snapshot.sleep_records {
        let stored = load_sleep_record(store, record.date())?;
        match resolve(stored.map(|r| r.updated_at()), record.updated_at()) {
            Outcome::Added => {
                sleep_writes.push(record);
                stats.sleep_added += 1;
            }
            Outcome::Updated => {
                sleep_writes.push(record);
                stats.sleep_updated += 1;
            }
            Outcome::Skipped => stats.sleep_skipped += 1,
        }
    }

    let mut meal_writes = Vec::new();
    for log in &snapshot.meal_logs {
        let stored = load_meal_log(store, log.id())?;
        match resolve(stored.map(|l| l.updated_at()), log.updated_at()) {
            Outcome::Added => {
                meal_writes.push(log);
                stats.meals_added += 1;
            }
            Outcome::Updated => {
                meal_writes.push(log);
                stats.meals_updated += 1;
            }
            Outcome::Skipped => stats.meals_skipped += 1,
        }
    }

    if let Some(profile) = &snapshot.profile {
        save_profile(store, profile)?;
        stats.profile_replaced = true;
    }
    if let Some(prefs) = &snapshot.preferences {
        save_preferences(store, prefs)?;
        stats.preferences_replaced = true;
    }
    for record in sleep_writes {
        save_sleep_record(store, record)?;
    }
    for log in meal_writes {
        save_meal_log(store, log)?;
    }

    info!(
        sleep_added = stats.sleep_added,
        sleep_updated = stats.sleep_updated,
        sleep_skipped = stats.sleep_skipped,
        meals_added = stats.meals_added,
        meals_updated = stats.meals_updated,
        meals_skipped = stats.meals_skipped,
        "snapshot merged"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eating::tests::profile;
    use crate::meal_log::tests::log;
    use crate::sleep::tests::now;
    use crate::store::MemoryStore;
    use crate::types::{Chronotype, MealType, UserGoal};
    use chrono::{Duration, TimeZone};

    fn record_at(date: &str, bed: &str, wake: &str, updated: DateTime<Utc>) -> SleepRecord {
        SleepRecord::for_night(date.parse().unwrap(), bed.parse().unwrap(), wake.parse().unwrap(), updated)
            .unwrap()
    }

    fn populated() -> MemoryStore {
        let mut store = MemoryStore::new();
        save_profile(
            &mut store,
            &profile("07:00", "23:00", Chronotype::Evening, UserGoal::MentalPerformance),
        )
        .unwrap();
        save_preferences(&mut store, &SleepPreferences::new(450).unwrap()).unwrap();
        save_sleep_record(&mut store, &record_at("2025-03-01", "23:00", "07:00", now())).unwrap();
        save_sleep_record(&mut store, &record_at("2025-03-02", "23:30", "07:00", now())).unwrap();
        save_meal_log(&mut store, &log("m1", "08:00", MealType::Breakfast)).unwrap();
        save_meal_log(&mut store, &log("m2", "12:30", MealType::Lunch)).unwrap();
        store
    }

    #[test]
    fn export_then_import_into_empty_store_reproduces_it() {
        let source = populated();
        let exported_at = Utc.with_ymd_and_hms(2025, 3, 5, 9, 0, 0).unwrap();
        let snapshot = export_snapshot(&source, exported_at).unwrap();
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert_eq!(snapshot.sleep_records.len(), 2);
        assert_eq!(snapshot.meal_logs.len(), 2);

        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: Snapshot = serde_json::from_str(&json).unwrap();

        let mut target = MemoryStore::new();
        let stats = import_snapshot(&mut target, &parsed).unwrap();
        assert_eq!(stats.sleep_added, 2);
        assert_eq!(stats.meals_added, 2);
        assert!(stats.profile_replaced);
        assert!(stats.preferences_replaced);

        assert_eq!(export_snapshot(&target, exported_at).unwrap(), snapshot);
    }

    #[test]
    fn newer_updated_at_wins() {
        let mut store = populated();
        let later = now() + Duration::hours(1);
        let earlier = now() - Duration::hours(1);
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            exported_at: later,
            profile: None,
            preferences: None,
            sleep_records: vec![
                record_at("2025-03-01", "22:00", "07:00", later),
                record_at("2025-03-02", "21:00", "07:00", earlier),
                record_at("2025-03-03", "23:00", "06:00", earlier),
            ],
            meal_logs: vec![],
        };

        let stats = import_snapshot(&mut store, &snapshot).unwrap();
        assert_eq!(
            stats,
            MergeStats {
                sleep_added: 1,
                sleep_updated: 1,
                sleep_skipped: 1,
                ..MergeStats::default()
            }
        );

        let records = list_sleep_records(&store).unwrap();
        assert_eq!(records[0].duration_minutes(), 540);
        assert_eq!(records[1].duration_minutes(), 450);
        assert_eq!(records[2].duration_minutes(), 420);
    }

    #[test]
    fn tie_keeps_stored_value() {
        let mut store = populated();
        let mut incoming = log("m1", "08:00", MealType::Breakfast);
        let stamp = incoming.updated_at();
        incoming.set_notes(Some("imported".to_string()), stamp);
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            exported_at: now(),
            profile: None,
            preferences: None,
            sleep_records: vec![],
            meal_logs: vec![incoming],
        };

        let stats = import_snapshot(&mut store, &snapshot).unwrap();
        assert_eq!(stats.meals_skipped, 1);
        let id = crate::types::MealLogId::new("m1").unwrap();
        assert!(load_meal_log(&store, &id).unwrap().unwrap().details().notes.is_none());
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let mut store = MemoryStore::new();
        let snapshot = Snapshot {
            version: 99,
            exported_at: now(),
            profile: None,
            preferences: None,
            sleep_records: vec![],
            meal_logs: vec![],
        };
        let err = import_snapshot(&mut store, &snapshot).unwrap_err();
        assert!(err.to_string().contains("unsupported snapshot version 99"));
        assert!(store.is_empty());
    }

    #[test]
    fn rejected_import_leaves_store_untouched() {
        let mut store = populated();
        let before = export_snapshot(&store, now()).unwrap();
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            exported_at: now(),
            profile: Some(profile("09:00", "01:00", Chronotype::Morning, UserGoal::Flexibility)),
            preferences: Some(SleepPreferences {
                ideal_sleep_minutes: 0,
            }),
            sleep_records: vec![record_at("2025-03-03", "22:00", "06:00", now())],
            meal_logs: vec![log("m9", "18:00", MealType::Dinner)],
        };

        let err = import_snapshot(&mut store, &snapshot).unwrap_err();
        assert!(matches!(err, StoreError::Invalid { ref key, .. } if key == PREFERENCES_KEY));
        assert_eq!(export_snapshot(&store, now()).unwrap(), before);
    }

    #[test]
    fn duplicate_dates_are_rejected_before_writing() {
        let mut store = MemoryStore::new();
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            exported_at: now(),
            profile: Some(profile("07:00", "23:00", Chronotype::Intermediate, UserGoal::Flexibility)),
            preferences: None,
            sleep_records: vec![
                record_at("2025-03-02", "23:00", "07:00", now()),
                record_at("2025-03-02", "22:00", "06:00", now()),
            ],
            meal_logs: vec![],
        };
        let err = import_snapshot(&mut store, &snapshot).unwrap_err();
        assert!(err.to_string().contains("sleep:2025-03-02"));
        assert!(store.is_empty());
    }

    #[test]
    fn snapshot_with_out_of_range_preferences_fails_to_parse() {
        let json = r#"{
            "version": 1,
            "exported_at": "2025-03-05T09:00:00Z",
            "preferences": { "ideal_sleep_minutes": 0 }
        }"#;
        assert!(serde_json::from_str::<Snapshot>(json).is_err());
    }

    #[test]
    fn snapshot_with_invalid_sleep_record_fails_to_parse() {
        let json = r#"{
            "version": 1,
            "exported_at": "2025-03-05T09:00:00Z",
            "sleep_records": [{
                "date": "2025-03-02",
                "bedtime": "2025-03-01T23:00:00",
                "wake_time": "2025-03-02T07:00:00",
                "duration_minutes": -5,
                "updated_at": "2025-03-02T12:00:00Z"
            }]
        }"#;
        assert!(serde_json::from_str::<Snapshot>(json).is_err());
    }
}
