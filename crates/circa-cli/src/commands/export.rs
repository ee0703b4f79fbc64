//! Export command for dumping the store as a JSON snapshot.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use circa_core::export_snapshot;
use circa_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &Database, now: DateTime<Utc>) -> Result<()> {
    let snapshot = export_snapshot(db, now).context("failed to read records for export")?;
    serde_json::to_writer_pretty(&mut *writer, &snapshot).context("failed to write snapshot")?;
    writeln!(writer)?;
    Ok(())
}
