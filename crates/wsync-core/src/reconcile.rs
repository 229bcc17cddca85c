//! Reconciliation of local entries against exported worklogs.
//!
//! # Algorithm Summary
//!
//! 1. Drop running entries; they are never exported while the timer is active
//! 2. An entry is already synced if some exported record is linked to it
//!    (same correlation tag, same start date); otherwise it is exported
//! 3. Exported records without any correlation tag are orphans. They are
//!    reported only; nothing here deletes them
//! 4. Tagged records linked to none of the given entries are unmatched: the
//!    local entry was deleted or moved out of the window. Also report-only
//! 5. Export candidates are ordered by start time, earliest first

use serde::Serialize;

use crate::correlation;
use crate::entry::{ExportedRecord, TimeEntry};

/// Outcome of comparing one window of local and remote data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    /// Finished entries with no linked worklog, earliest first.
    pub to_export: Vec<TimeEntry>,

    /// Finished entries that already have a linked worklog.
    pub already_synced: Vec<TimeEntry>,

    /// Worklogs that carry no correlation tag.
    pub orphaned: Vec<ExportedRecord>,

    /// Entries skipped because their timer is still running.
    pub running: Vec<TimeEntry>,

    /// Tagged worklogs whose entry is not among the fetched entries.
    pub unmatched: Vec<ExportedRecord>,
}

impl Reconciliation {
    /// Whether there is nothing to export.
    pub fn is_up_to_date(&self) -> bool {
        self.to_export.is_empty()
    }
}

/// Computes the export plan for one window.
pub fn reconcile(entries: Vec<TimeEntry>, exported: &[ExportedRecord]) -> Reconciliation {
    let mut result = Reconciliation::default();

    for entry in entries {
        if entry.is_running() {
            tracing::debug!(entry_id = %entry.id, "skipping running entry");
            result.running.push(entry);
            continue;
        }

        if exported
            .iter()
            .any(|record| correlation::is_linked(record, &entry))
        {
            result.already_synced.push(entry);
        } else {
            result.to_export.push(entry);
        }
    }

    result.to_export.sort_by_key(|entry| entry.interval.start);

    result.orphaned = exported
        .iter()
        .filter(|record| !correlation::has_any_tag(&record.description))
        .cloned()
        .collect();

    result.unmatched = exported
        .iter()
        .filter(|record| correlation::has_any_tag(&record.description))
        .filter(|record| {
            !result
                .to_export
                .iter()
                .chain(&result.already_synced)
                .chain(&result.running)
                .any(|entry| correlation::is_linked(record, entry))
        })
        .cloned()
        .collect();
    for record in &result.unmatched {
        tracing::debug!(
            remote_id = %record.remote_id,
            entry_id = correlation::extract_id(&record.description).unwrap_or_default(),
            "worklog tag matches no local entry"
        );
    }

    tracing::debug!(
        to_export = result.to_export.len(),
        already_synced = result.already_synced.len(),
        orphaned = result.orphaned.len(),
        unmatched = result.unmatched.len(),
        running = result.running.len(),
        "reconciled window"
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    use crate::entry::Interval;
    use crate::types::{EntryId, RemoteId};

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, minute, 0).unwrap()
    }

    fn finished(
        id: &str,
        description: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> TimeEntry {
        TimeEntry::new(EntryId::new(id).unwrap(), description, Interval::closed(start, end))
            .with_task("ABC-1")
    }

    fn running(id: &str, start: DateTime<Utc>) -> TimeEntry {
        TimeEntry::new(EntryId::new(id).unwrap(), "Ongoing", Interval::running(start))
    }

    fn record(remote_id: &str, description: &str, day: u32) -> ExportedRecord {
        ExportedRecord {
            remote_id: RemoteId::new(remote_id).unwrap(),
            description: description.to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            duration_seconds: 3600,
        }
    }

    #[test]
    fn unexported_entry_is_planned() {
        let entries = vec![finished("e1", "Work", at(15, 9, 0), at(15, 11, 30))];
        let plan = reconcile(entries, &[]);
        assert_eq!(plan.to_export.len(), 1);
        assert_eq!(plan.to_export[0].duration_seconds(), 9000);
        assert!(plan.already_synced.is_empty());
    }

    #[test]
    fn linked_entry_is_already_synced() {
        let entries = vec![finished("e1", "Work", at(15, 9, 0), at(15, 11, 30))];
        let exported = vec![record("100", "Work [cid:e1]", 15)];
        let plan = reconcile(entries, &exported);
        assert!(plan.is_up_to_date());
        assert_eq!(plan.already_synced.len(), 1);
        assert!(plan.orphaned.is_empty());
    }

    #[test]
    fn tag_on_other_day_does_not_count() {
        let entries = vec![finished("e1", "Work", at(15, 9, 0), at(15, 11, 30))];
        let exported = vec![record("100", "Work [cid:e1]", 16)];
        let plan = reconcile(entries, &exported);
        assert_eq!(plan.to_export.len(), 1);
    }

    #[test]
    fn running_entries_are_never_planned() {
        let entries = vec![
            running("r1", at(15, 8, 0)),
            finished("e1", "Work", at(15, 9, 0), at(15, 10, 0)),
            running("r2", at(16, 8, 0)),
        ];
        let plan = reconcile(entries, &[]);
        assert!(plan.to_export.iter().all(|entry| !entry.is_running()));
        assert_eq!(plan.to_export.len(), 1);
        assert_eq!(plan.running.len(), 2);
    }

    #[test]
    fn untagged_records_are_orphaned() {
        let exported = vec![
            record("100", "Logged by hand", 15),
            record("101", "Work [cid:gone]", 15),
        ];
        let plan = reconcile(Vec::new(), &exported);
        assert_eq!(plan.orphaned.len(), 1);
        assert_eq!(plan.orphaned[0].remote_id.as_str(), "100");
    }

    #[test]
    fn tagged_records_without_entry_are_unmatched() {
        let entries = vec![finished("e1", "Work", at(15, 9, 0), at(15, 10, 0))];
        let exported = vec![
            record("100", "Work [cid:e1]", 15),
            record("101", "Work [cid:gone]", 15),
            record("102", "Logged by hand", 15),
            record("103", "Work [cid:e1]", 16),
        ];
        let plan = reconcile(entries, &exported);

        let unmatched: Vec<&str> = plan
            .unmatched
            .iter()
            .map(|record| record.remote_id.as_str())
            .collect();
        assert_eq!(unmatched, vec!["101", "103"]);
        assert_eq!(
            correlation::extract_id(&plan.unmatched[0].description),
            Some("gone")
        );
        assert_eq!(plan.already_synced.len(), 1);
    }

    #[test]
    fn candidates_are_sorted_by_start() {
        let entries = vec![
            finished("late", "b", at(16, 9, 0), at(16, 10, 0)),
            finished("early", "a", at(15, 9, 0), at(15, 10, 0)),
            finished("middle", "c", at(15, 13, 0), at(15, 14, 0)),
        ];
        let plan = reconcile(entries, &[]);
        let ids: Vec<&str> = plan.to_export.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "middle", "late"]);
    }
}
