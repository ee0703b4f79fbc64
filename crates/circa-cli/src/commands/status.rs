//! Status command for showing what the store holds.

use std::io::Write;

use anyhow::Result;

use circa_db::Database;

use crate::Config;

pub fn run<W: Write>(writer: &mut W, db: &Database, config: &Config) -> Result<()> {
    let kinds = db.kind_summaries()?;

    writeln!(writer, "circa status")?;
    writeln!(writer, "Database: {}", config.database_path.display())?;

    if kinds.is_empty() {
        writeln!(writer, "No records stored.")?;
        return Ok(());
    }

    writeln!(writer, "Records:")?;
    for kind in kinds {
        writeln!(
            writer,
            "- {}: {} (last updated {})",
            kind.kind, kind.count, kind.last_updated
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    use insta::assert_snapshot;
    use serde_json::json;

    fn config() -> Config {
        Config {
            database_path: PathBuf::from("/data/circa.db"),
            ..Config::default()
        }
    }

    #[test]
    fn status_on_empty_store() {
        let db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        run(&mut output, &db, &config()).unwrap();
        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        circa status
        Database: /data/circa.db
        No records stored.
        ");
    }

    #[test]
    fn status_counts_records_by_kind() {
        let mut db = Database::open_in_memory().unwrap();
        db.put("profile", &json!({})).unwrap();
        db.put("meal:a", &json!({})).unwrap();
        db.put("meal:b", &json!({})).unwrap();

        let mut output = Vec::new();
        run(&mut output, &db, &config()).unwrap();
        let output = String::from_utf8(output).unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[3].starts_with("- meal: 2 (last updated "));
        assert!(lines[4].starts_with("- profile: 1 (last updated "));
    }
}
