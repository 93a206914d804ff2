//! Intake history and daily aggregates.
//!
//! Entries are loaded from both the live journal and the CSV archive. Days
//! are calendar days in the caller's time zone, so "today" matches the
//! user's wall clock.

use crate::{IntakeEntry, Result};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

pub const WEEKLY_DAYS: u32 = 7;
pub const MONTHLY_DAYS: u32 = 30;
/// Longest window the CLI will print
pub const MAX_HISTORY_DAYS: u32 = 366;

/// Total intake for one calendar day
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub amount_ml: u32,
}

/// Load every entry from the journal and the archive
///
/// Returns entries sorted newest first, deduplicated by id.
pub fn load_entries(journal_path: &Path, csv_path: &Path) -> Result<Vec<IntakeEntry>> {
    let mut entries = Vec::new();
    let mut seen_ids = HashSet::new();

    for entry in crate::journal::read_entries(journal_path)? {
        if seen_ids.insert(entry.id) {
            entries.push(entry);
        }
    }
    let journal_count = entries.len();

    for entry in crate::csv_rollup::read_archive(csv_path)? {
        if seen_ids.insert(entry.id) {
            entries.push(entry);
        }
    }

    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    tracing::debug!(
        "Loaded {} entries ({} from journal, {} archived)",
        entries.len(),
        journal_count,
        entries.len() - journal_count
    );

    Ok(entries)
}

fn local_date<Tz: TimeZone>(timestamp: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    timestamp.with_timezone(tz).date_naive()
}

/// Entries recorded on `day`
pub fn entries_on<'a, Tz: TimeZone>(
    entries: &'a [IntakeEntry],
    day: NaiveDate,
    tz: &Tz,
) -> Vec<&'a IntakeEntry> {
    entries
        .iter()
        .filter(|e| local_date(&e.timestamp, tz) == day)
        .collect()
}

/// Sum of intake on `day`, saturating at `u32::MAX`
pub fn total_on<Tz: TimeZone>(entries: &[IntakeEntry], day: NaiveDate, tz: &Tz) -> u32 {
    entries_on(entries, day, tz)
        .iter()
        .fold(0u32, |total, e| total.saturating_add(e.amount_ml))
}

/// Daily totals for the `days` calendar days ending on `end`, oldest first
///
/// Days without entries are included with a zero total. The window stops
/// at the earliest representable date.
pub fn daily_totals<Tz: TimeZone>(
    entries: &[IntakeEntry],
    end: NaiveDate,
    days: u32,
    tz: &Tz,
) -> Vec<DailyTotal> {
    let mut totals: Vec<DailyTotal> = (0..days)
        .map_while(|offset| end.checked_sub_signed(Duration::days(i64::from(offset))))
        .map(|date| DailyTotal {
            date,
            amount_ml: total_on(entries, date, tz),
        })
        .collect();
    totals.reverse();
    totals
}

pub fn weekly_totals<Tz: TimeZone>(
    entries: &[IntakeEntry],
    end: NaiveDate,
    tz: &Tz,
) -> Vec<DailyTotal> {
    daily_totals(entries, end, WEEKLY_DAYS, tz)
}

pub fn monthly_totals<Tz: TimeZone>(
    entries: &[IntakeEntry],
    end: NaiveDate,
    tz: &Tz,
) -> Vec<DailyTotal> {
    daily_totals(entries, end, MONTHLY_DAYS, tz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::{IntakeSink, JsonlJournal};
    use chrono::{FixedOffset, TimeZone};

    fn entry_at(amount_ml: u32, y: i32, m: u32, d: u32, h: u32) -> IntakeEntry {
        IntakeEntry::at(amount_ml, Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap())
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_total_on_day() {
        let entries = vec![
            entry_at(250, 2024, 5, 2, 8),
            entry_at(355, 2024, 5, 2, 13),
            entry_at(500, 2024, 5, 1, 22),
        ];
        assert_eq!(total_on(&entries, day(2024, 5, 2), &Utc), 605);
        assert_eq!(total_on(&entries, day(2024, 5, 1), &Utc), 500);
        assert_eq!(total_on(&entries, day(2024, 5, 3), &Utc), 0);
    }

    #[test]
    fn test_days_follow_time_zone() {
        // 22:00 UTC on May 1st is already May 2nd at UTC+3
        let entries = vec![entry_at(500, 2024, 5, 1, 22)];
        let plus_three = FixedOffset::east_opt(3 * 3600).unwrap();
        assert_eq!(total_on(&entries, day(2024, 5, 2), &plus_three), 500);
        assert_eq!(total_on(&entries, day(2024, 5, 1), &plus_three), 0);
    }

    #[test]
    fn test_weekly_totals_include_empty_days() {
        let entries = vec![
            entry_at(1000, 2024, 5, 7, 9),
            entry_at(400, 2024, 5, 3, 9),
            entry_at(900, 2024, 4, 20, 9),
        ];
        let totals = weekly_totals(&entries, day(2024, 5, 7), &Utc);
        assert_eq!(totals.len(), 7);
        assert_eq!(totals[0].date, day(2024, 5, 1));
        assert_eq!(totals[6].date, day(2024, 5, 7));
        assert_eq!(totals[6].amount_ml, 1000);
        assert_eq!(totals[2].amount_ml, 400);
        let sum: u32 = totals.iter().map(|t| t.amount_ml).sum();
        assert_eq!(sum, 1400);
    }

    #[test]
    fn test_monthly_window_length() {
        let totals = monthly_totals(&[], day(2024, 3, 1), &Utc);
        assert_eq!(totals.len(), 30);
        assert_eq!(totals[0].date, day(2024, 1, 31));
    }

    #[test]
    fn test_load_entries_deduplicates_across_journal_and_archive() {
        let temp_dir = tempfile::tempdir().unwrap();
        let journal_path = temp_dir.path().join("intake.jsonl");
        let csv_path = temp_dir.path().join("intake.csv");

        let archived = entry_at(300, 2024, 5, 1, 9);
        JsonlJournal::new(&journal_path).append(&archived).unwrap();
        crate::csv_rollup::journal_to_csv_and_archive(&journal_path, &csv_path).unwrap();

        // Same entry written again to a fresh journal, plus a new one
        let mut journal = JsonlJournal::new(&journal_path);
        journal.append(&archived).unwrap();
        journal.append(&entry_at(200, 2024, 5, 2, 9)).unwrap();

        let entries = load_entries(&journal_path, &csv_path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].amount_ml, 200);
        assert_eq!(entries.iter().filter(|e| e.id == archived.id).count(), 1);
    }

    #[test]
    fn test_total_saturates_instead_of_overflowing() {
        let entries = vec![
            entry_at(u32::MAX, 2024, 5, 1, 8),
            entry_at(u32::MAX, 2024, 5, 1, 9),
            entry_at(250, 2024, 5, 1, 10),
        ];
        assert_eq!(total_on(&entries, day(2024, 5, 1), &Utc), u32::MAX);
    }

    #[test]
    fn test_window_stops_at_earliest_date() {
        let end = NaiveDate::MIN.succ_opt().unwrap().succ_opt().unwrap();
        let totals = daily_totals(&[], end, 10, &Utc);
        assert_eq!(totals.len(), 3);
        assert_eq!(totals[0].date, NaiveDate::MIN);
        assert_eq!(totals[2].date, end);
    }
}
