//! Correlation tags linking remote worklogs back to local entries.
//!
//! The tag `[cid:<entry id>]` is appended to every exported description. It is
//! the only record of what has been exported: re-running a sync finds the tag
//! in the remote store and skips the entry.

use crate::entry::{ExportedRecord, TimeEntry};
use crate::types::EntryId;

const TAG_PREFIX: &str = "[cid:";
const TAG_SUFFIX: char = ']';

/// Renders the correlation tag for an entry ID.
pub fn tag_for(id: &EntryId) -> String {
    format!("{TAG_PREFIX}{id}{TAG_SUFFIX}")
}

/// Appends the correlation tag to a description.
///
/// Apply once, after any `[rem:...]` directive has been removed. A blank
/// description yields the bare tag with no leading space.
pub fn tag(description: &str, id: &EntryId) -> String {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return tag_for(id);
    }
    format!("{trimmed} {}", tag_for(id))
}

/// Whether `record` was exported from `entry`.
///
/// Requires the exact tag and the same start date. Dates match at day
/// granularity because the remote store keeps only the date.
pub fn is_linked(record: &ExportedRecord, entry: &TimeEntry) -> bool {
    record.description.contains(&tag_for(&entry.id)) && record.start_date == entry.start_date()
}

/// Whether a description carries any correlation tag at all.
pub fn has_any_tag(description: &str) -> bool {
    description.contains(TAG_PREFIX)
}

/// Returns the entry ID of the first correlation tag in a description.
pub fn extract_id(description: &str) -> Option<&str> {
    let start = description.find(TAG_PREFIX)? + TAG_PREFIX.len();
    let rest = &description[start..];
    let end = rest.find(TAG_SUFFIX)?;
    let id = &rest[..end];
    (!id.is_empty()).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{NaiveDate, TimeZone, Utc};

    use crate::entry::Interval;
    use crate::types::RemoteId;

    fn entry(id: &str, day: u32) -> TimeEntry {
        let start = Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, day, 10, 0, 0).unwrap();
        TimeEntry::new(EntryId::new(id).unwrap(), "Work", Interval::closed(start, end))
    }

    fn record(description: &str, day: u32) -> ExportedRecord {
        ExportedRecord {
            remote_id: RemoteId::new("1").unwrap(),
            description: description.to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            duration_seconds: 3600,
        }
    }

    #[test]
    fn tag_trims_and_appends() {
        let id = EntryId::new("e1").unwrap();
        assert_eq!(tag("  Work  ", &id), "Work [cid:e1]");
        assert_eq!(tag("", &id), "[cid:e1]");
    }

    #[test]
    fn blank_description_tag_still_links() {
        let mut blank = entry("e1", 15);
        blank.description = "   ".to_string();
        let tagged = record(&tag(&blank.description, &blank.id), 15);
        assert_eq!(tagged.description, "[cid:e1]");
        assert!(is_linked(&tagged, &blank));
        assert_eq!(extract_id(&tagged.description), Some("e1"));
    }

    #[test]
    fn tagged_record_links_to_its_entry_only() {
        for id in ["e1", "65a1f0c2e4b0", "x-y_z"] {
            let own = entry(id, 15);
            let tagged = record(&tag(&own.description, &own.id), 15);
            assert!(is_linked(&tagged, &own));
            assert!(!is_linked(&tagged, &entry("other", 15)));
        }
    }

    #[test]
    fn prefix_ids_do_not_link() {
        let tagged = record("Work [cid:e10]", 15);
        assert!(!is_linked(&tagged, &entry("e1", 15)));
    }

    #[test]
    fn link_requires_same_start_date() {
        let tagged = record("Work [cid:e1]", 16);
        assert!(!is_linked(&tagged, &entry("e1", 15)));
    }

    #[test]
    fn detects_any_tag() {
        assert!(has_any_tag("Meeting [cid:abc]"));
        assert!(!has_any_tag("Meeting logged by hand"));
    }

    #[test]
    fn extracts_first_id() {
        assert_eq!(extract_id("Work [cid:e1] [cid:e2]"), Some("e1"));
        assert_eq!(extract_id("Work [cid:]"), None);
        assert_eq!(extract_id("Work [cid:e1"), None);
        assert_eq!(extract_id("Work"), None);
    }
}
