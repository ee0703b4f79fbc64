//! Import command for merging a JSON snapshot into the local `SQLite` store.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use circa_core::{MergeStats, Snapshot, import_snapshot};
use circa_db::Database;

pub fn run<R: Read, W: Write>(reader: R, writer: &mut W, db: &mut Database) -> Result<MergeStats> {
    let snapshot = parse_snapshot(reader)?;
    let stats = import_snapshot(db, &snapshot).context("failed to merge snapshot")?;

    writeln!(
        writer,
        "Sleep records: {} added, {} updated, {} unchanged",
        stats.sleep_added, stats.sleep_updated, stats.sleep_skipped
    )?;
    writeln!(
        writer,
        "Meal logs: {} added, {} updated, {} unchanged",
        stats.meals_added, stats.meals_updated, stats.meals_skipped
    )?;
    if stats.profile_replaced {
        writeln!(writer, "Profile replaced.")?;
    }
    if stats.preferences_replaced {
        writeln!(writer, "Preferences replaced.")?;
    }
    Ok(stats)
}

fn parse_snapshot<R: Read>(mut reader: R) -> Result<Snapshot> {
    let mut input = String::new();
    reader
        .read_to_string(&mut input)
        .context("failed to read snapshot")?;
    if input.trim().is_empty() {
        anyhow::bail!("no snapshot on input");
    }
    serde_json::from_str(&input).context("invalid snapshot JSON")
}
