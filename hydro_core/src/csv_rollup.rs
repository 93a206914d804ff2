//! CSV rollup for archiving journal entries.
//!
//! Moves the journal into an append-only CSV archive without losing data:
//! the CSV is synced before the journal is renamed out of the way.

use crate::lock::LockGuard;
use crate::{IntakeEntry, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::Path;
use uuid::Uuid;

/// A row in the CSV archive
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CsvRow {
    id: String,
    amount_ml: u32,
    timestamp: String,
}

impl From<&IntakeEntry> for CsvRow {
    fn from(entry: &IntakeEntry) -> Self {
        CsvRow {
            id: entry.id.to_string(),
            amount_ml: entry.amount_ml,
            timestamp: entry.timestamp.to_rfc3339(),
        }
    }
}

impl TryFrom<CsvRow> for IntakeEntry {
    type Error = crate::Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| crate::Error::Other(format!("Invalid UUID: {}", e)))?;

        let timestamp = DateTime::parse_from_rfc3339(&row.timestamp)
            .map_err(|e| crate::Error::Other(format!("Invalid date: {}", e)))?
            .with_timezone(&Utc);

        Ok(IntakeEntry {
            id,
            amount_ml: row.amount_ml,
            timestamp,
        })
    }
}

/// Roll up journal entries into the CSV archive and rotate the journal
///
/// 1. Reads all entries from the journal
/// 2. Appends them to the CSV file (with headers if the file is new)
/// 3. Syncs the CSV to disk
/// 4. Renames the journal to `.jsonl.processed`
///
/// The journal's sidecar lock is held throughout, so no drink can be
/// appended between the read and the rename.
///
/// Returns the number of entries archived.
pub fn journal_to_csv_and_archive(journal_path: &Path, csv_path: &Path) -> Result<usize> {
    let _rotation = LockGuard::exclusive(journal_path)?;
    let mut entries = crate::journal::read_entries(journal_path)?;

    if entries.is_empty() {
        tracing::info!("No entries in journal to roll up");
        return Ok(0);
    }

    // Archive in chronological order
    entries.reverse();

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for entry in &entries {
        writer.serialize(CsvRow::from(entry))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Wrote {} entries to CSV", entries.len());

    let processed_path = journal_path.with_extension("jsonl.processed");
    std::fs::rename(journal_path, &processed_path)?;

    tracing::info!("Archived journal to {:?}", processed_path);

    Ok(entries.len())
}

/// Read every entry from the CSV archive
///
/// Rows that fail to parse are skipped with a warning.
pub fn read_archive(path: &Path) -> Result<Vec<IntakeEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut entries = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        match result {
            Ok(row) => match IntakeEntry::try_from(row) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!("Failed to parse CSV row: {}", e),
            },
            Err(e) => tracing::warn!("Failed to deserialize CSV row: {}", e),
        }
    }

    Ok(entries)
}

/// Remove rotated journal files
///
/// Deletes every `.processed` file in the given directory.
pub fn cleanup_processed_journals(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.extension().is_some_and(|ext| ext == "processed") {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed processed journal: {:?}", path);
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed journal files", count);
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::{IntakeSink, JsonlJournal};
    use std::fs::File;

    #[test]
    fn test_rollup_creates_csv_and_rotates_journal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let journal_path = temp_dir.path().join("intake.jsonl");
        let csv_path = temp_dir.path().join("intake.csv");

        let mut journal = JsonlJournal::new(&journal_path);
        for amount in [120, 240, 355] {
            journal.append(&IntakeEntry::now(amount)).unwrap();
        }

        let count = journal_to_csv_and_archive(&journal_path, &csv_path).unwrap();
        assert_eq!(count, 3);

        assert!(csv_path.exists());
        assert!(!journal_path.exists());
        assert!(journal_path.with_extension("jsonl.processed").exists());

        let archived = read_archive(&csv_path).unwrap();
        let total: u32 = archived.iter().map(|e| e.amount_ml).sum();
        assert_eq!(total, 715);
    }

    #[test]
    fn test_rollup_appends_without_repeating_headers() {
        let temp_dir = tempfile::tempdir().unwrap();
        let journal_path = temp_dir.path().join("intake.jsonl");
        let csv_path = temp_dir.path().join("intake.csv");

        JsonlJournal::new(&journal_path)
            .append(&IntakeEntry::now(100))
            .unwrap();
        assert_eq!(journal_to_csv_and_archive(&journal_path, &csv_path).unwrap(), 1);

        JsonlJournal::new(&journal_path)
            .append(&IntakeEntry::now(200))
            .unwrap();
        assert_eq!(journal_to_csv_and_archive(&journal_path, &csv_path).unwrap(), 1);

        let reader = csv::Reader::from_path(&csv_path).unwrap();
        assert_eq!(reader.into_records().count(), 2);

        let contents = std::fs::read_to_string(&csv_path).unwrap();
        assert_eq!(contents.matches("id,amount_ml,timestamp").count(), 1);
    }

    #[test]
    fn test_empty_journal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let journal_path = temp_dir.path().join("intake.jsonl");
        let csv_path = temp_dir.path().join("intake.csv");
        File::create(&journal_path).unwrap();

        assert_eq!(journal_to_csv_and_archive(&journal_path, &csv_path).unwrap(), 0);
        assert!(journal_path.exists());
        assert!(!csv_path.exists());
    }

    #[test]
    fn test_cleanup_processed_journals() {
        let temp_dir = tempfile::tempdir().unwrap();

        File::create(temp_dir.path().join("a.jsonl.processed")).unwrap();
        File::create(temp_dir.path().join("b.jsonl.processed")).unwrap();
        File::create(temp_dir.path().join("intake.jsonl")).unwrap();

        assert_eq!(cleanup_processed_journals(temp_dir.path()).unwrap(), 2);
        assert!(temp_dir.path().join("intake.jsonl").exists());
        assert!(!temp_dir.path().join("a.jsonl.processed").exists());
    }

    #[test]
    fn test_rollup_during_appends_loses_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let journal_path = temp_dir.path().join("journal/intake.jsonl");
        let csv_path = temp_dir.path().join("intake.csv");

        let writer = {
            let journal_path = journal_path.clone();
            std::thread::spawn(move || {
                let mut journal = JsonlJournal::new(&journal_path);
                for _ in 0..200 {
                    journal.append(&IntakeEntry::now(10)).unwrap();
                }
            })
        };

        let mut archived = 0;
        while !writer.is_finished() {
            if journal_path.exists() {
                archived += journal_to_csv_and_archive(&journal_path, &csv_path).unwrap();
            }
        }
        writer.join().unwrap();

        let in_archive = read_archive(&csv_path).unwrap();
        let in_journal = crate::journal::read_entries(&journal_path).unwrap();
        assert_eq!(in_archive.len(), archived);
        assert_eq!(in_archive.len() + in_journal.len(), 200);
    }
}
