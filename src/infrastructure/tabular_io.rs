//! Tabular input and output for batches
//!
//! Identifiers come from the first column of a CSV file. Results are written
//! as CSV, one row per record with the union of all keys as columns, or as JSON.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::domain::{BatchResult, Identifier};

/// Read identifiers from the first column of a CSV file.
///
/// Values are trimmed and blank cells are skipped. Rows may have differing
/// lengths; only the first cell matters.
pub fn read_identifiers(path: &Path, has_header: bool) -> Result<Vec<Identifier>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(has_header)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open identifier file {}", path.display()))?;

    let mut identifiers = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("Malformed row {} in {}", index + 1, path.display()))?;
        if let Some(value) = row.get(0).map(str::trim) {
            if !value.is_empty() {
                identifiers.push(value.to_string());
            }
        }
    }

    info!("📥 Read {} identifiers from {}", identifiers.len(), path.display());
    Ok(identifiers)
}

/// Write records as CSV using [`BatchResult::columns`] as the header row
pub fn write_records_csv(path: &Path, result: &BatchResult) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(result.columns())?;
    for row in result.rows() {
        writer.write_record(&row)?;
    }
    writer.flush()?;

    info!("💾 Wrote {} records to {}", result.records.len(), path.display());
    Ok(())
}

/// Write the whole batch result, records and failures, as pretty JSON
pub fn write_records_json(path: &Path, result: &BatchResult) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), result)?;

    info!("💾 Wrote {} records to {}", result.records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FetchFailure, UserRecord};
    use std::fs;

    fn sample_result() -> BatchResult {
        let mut alice = UserRecord::new("A1");
        alice.insert("Name", "Alice");
        alice.insert("Email", "a@x.com");
        let mut bob = UserRecord::new("B2");
        bob.insert("Status", "Active");

        BatchResult {
            records: vec![alice, bob],
            failures: vec![FetchFailure::new("C3", "SectionNotFound", "No 'User properties' section found")],
        }
    }

    #[test]
    fn test_read_identifiers_skips_header_and_blanks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.csv");
        fs::write(&path, "user_id,note\n A1 ,first\n,blank\nB2\n  \nA1,dup\n").unwrap();

        let ids = read_identifiers(&path, true).unwrap();
        assert_eq!(ids, vec!["A1", "B2", "A1"]);
    }

    #[test]
    fn test_read_identifiers_without_header_keeps_first_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.csv");
        fs::write(&path, "A1\nB2\n").unwrap();

        let ids = read_identifiers(&path, false).unwrap();
        assert_eq!(ids, vec!["A1", "B2"]);
    }

    #[test]
    fn test_read_identifiers_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_identifiers(&dir.path().join("absent.csv"), true).is_err());
    }

    #[test]
    fn test_write_csv_uses_column_union() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_records_csv(&path, &sample_result()).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "queried_user_id,Name,Email,Status\nA1,Alice,a@x.com,\nB2,,,Active\n"
        );
    }

    #[test]
    fn test_write_json_includes_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_records_json(&path, &sample_result()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["records"][0]["queried_user_id"], "A1");
        assert_eq!(value["records"][1]["Status"], "Active");
        assert_eq!(value["failures"][0]["reason"], "SectionNotFound");
    }
}
