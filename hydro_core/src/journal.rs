//! Intake journal for drink events.
//!
//! Entries are appended to a JSONL (JSON Lines) file with file locking
//! so concurrent `hydro drink` invocations never interleave lines. Writers
//! also hold the journal's sidecar lock, which rollup takes for the whole
//! archive-and-rotate cycle.

use crate::lock::LockGuard;
use crate::{IntakeEntry, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Destination for recorded drinks
pub trait IntakeSink {
    fn append(&mut self, entry: &IntakeEntry) -> Result<()>;
}

/// JSONL-based intake sink with file locking
pub struct JsonlJournal {
    path: PathBuf,
}

impl JsonlJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl IntakeSink for JsonlJournal {
    fn append(&mut self, entry: &IntakeEntry) -> Result<()> {
        self.ensure_parent_dir()?;
        let _rotation = LockGuard::exclusive(&self.path)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(entry)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended {}ml entry {} to journal", entry.amount_ml, entry.id);
        Ok(())
    }
}

/// Read all entries from a journal file, newest first
///
/// Malformed lines are skipped with a warning.
pub fn read_entries(path: &Path) -> Result<Vec<IntakeEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut entries = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<IntakeEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!("Failed to parse journal entry at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;

    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    tracing::debug!("Read {} entries from journal", entries.len());
    Ok(entries)
}
