//! Storage layer for circa.
//!
//! Provides a SQLite-backed [`RecordStore`] using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! A single `records` table holds every value as opaque JSON text under its
//! string key. The `kind` column is the key prefix before the first `:`
//! (`profile`, `preferences`, `sleep`, `meal`) and exists for status queries.
//!
//! `updated_at` is the write time in ISO 8601 UTC with millisecond precision
//! (e.g., `2025-03-02T07:15:00.000Z`), so lexicographic order matches
//! chronological order.

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use circa_core::store::{RecordStore, StoreError};
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored value is not valid JSON.
    #[error("invalid JSON under key {key}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// Record count and latest write for one key kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindSummary {
    pub kind: String,
    pub count: i64,
    pub last_updated: String,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- records: one JSON document per key
            -- kind: key prefix ('profile', 'preferences', 'sleep', 'meal')
            -- updated_at: ISO 8601 write time (e.g., '2025-03-02T07:15:00.000Z')
            CREATE TABLE IF NOT EXISTS records (
                key TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_records_kind ON records(kind);
            ",
        )?;
        Ok(())
    }

    /// Returns the raw JSON document under `key`.
    pub fn get(&self, key: &str) -> Result<Option<Value>, DbError> {
        let text: Option<String> = self
            .conn
            .query_row("SELECT value FROM records WHERE key = ?", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        text.map(|text| {
            serde_json::from_str(&text).map_err(|source| DbError::Json {
                key: key.to_string(),
                source,
            })
        })
        .transpose()
    }

    /// Inserts or replaces the document under `key`.
    pub fn put(&mut self, key: &str, value: &Value) -> Result<(), DbError> {
        let text = serde_json::to_string(value).map_err(|source| DbError::Json {
            key: key.to_string(),
            source,
        })?;
        let updated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        self.conn.execute(
            "
            INSERT INTO records (key, kind, value, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(key) DO UPDATE SET
                kind = excluded.kind,
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
            params![key, kind_of(key), text, updated_at],
        )?;
        debug!(key, "stored record");
        Ok(())
    }

    /// Lists keys with the given prefix, in ascending order.
    pub fn list_keys(&self, prefix: &str) -> Result<Vec<String>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT key FROM records
            WHERE substr(key, 1, length(?1)) = ?1
            ORDER BY key ASC
            ",
        )?;
        let rows = stmt.query_map(params![prefix], |row| row.get(0))?;
        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }
        Ok(keys)
    }

    /// Counts records per kind, with the latest write time of each.
    pub fn kind_summaries(&self) -> Result<Vec<KindSummary>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT kind, COUNT(*), MAX(updated_at)
            FROM records
            GROUP BY kind
            ORDER BY kind ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(KindSummary {
                kind: row.get(0)?,
                count: row.get(1)?,
                last_updated: row.get(2)?,
            })
        })?;
        let mut summaries = Vec::new();
        for row in rows {
            summaries.push(row?);
        }
        Ok(summaries)
    }
}

impl RecordStore for Database {
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.get(key).map_err(StoreError::backend)
    }

    fn save(&mut self, key: &str, value: &Value) -> Result<(), StoreError> {
        self.put(key, value).map_err(StoreError::backend)
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.list_keys(prefix).map_err(StoreError::backend)
    }
}

fn kind_of(key: &str) -> &str {
    key.split_once(':').map_or(key, |(kind, _)| kind)
}
