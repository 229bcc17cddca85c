//! Export plan items and the worklog create payload.

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Serialize, Serializer};

use crate::correlation;
use crate::entry::TimeEntry;
use crate::remaining;
use crate::types::{AccountId, IssueId};

/// An entry ready for export, with its final description and remaining estimate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPlanItem {
    pub entry: TimeEntry,
    /// Directive removed, correlation tag appended.
    pub resolved_description: String,
    pub remaining_seconds: Option<i64>,
}

impl ExportPlanItem {
    /// Builds the export item for a finished entry.
    ///
    /// `issue_remaining` is the issue's own remaining estimate string.
    pub fn build(entry: TimeEntry, issue_remaining: Option<&str>) -> Self {
        let resolved = remaining::resolve(&entry.description, issue_remaining);
        let resolved_description = correlation::tag(&resolved.description, &entry.id);
        Self {
            entry,
            resolved_description,
            remaining_seconds: Some(resolved.remaining_seconds),
        }
    }

    /// Converts the item into the create request body.
    ///
    /// # Panics
    ///
    /// Panics if the entry is still running.
    pub fn into_payload(self, author: AccountId, issue_id: IssueId) -> WorklogPayload {
        let start = self.entry.interval.start;
        let start_time = start.time().with_nanosecond(0).unwrap_or(NaiveTime::MIN);
        WorklogPayload {
            author_account_id: author,
            description: self.resolved_description,
            issue_id,
            start_date: start.date_naive(),
            start_time,
            time_spent_seconds: self.entry.duration_seconds(),
            remaining_estimate_seconds: self.remaining_seconds,
        }
    }
}

/// Body of a worklog create request.
///
/// Field names and formats are fixed by the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorklogPayload {
    pub author_account_id: AccountId,
    pub description: String,
    #[serde(serialize_with = "serialize_issue_id")]
    pub issue_id: IssueId,
    #[serde(serialize_with = "serialize_date")]
    pub start_date: NaiveDate,
    #[serde(serialize_with = "serialize_time")]
    pub start_time: NaiveTime,
    pub time_spent_seconds: i64,
    pub remaining_estimate_seconds: Option<i64>,
}

// Numeric issue IDs go out as JSON numbers; the API rejects quoted ones.
fn serialize_issue_id<S: Serializer>(id: &IssueId, serializer: S) -> Result<S::Ok, S::Error> {
    match id.as_str().parse::<u64>() {
        Ok(numeric) => serializer.serialize_u64(numeric),
        Err(_) => serializer.serialize_str(id.as_str()),
    }
}

fn serialize_date<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&date.format("%Y-%m-%d"))
}

fn serialize_time<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&time.format("%H:%M:%S"))
}
