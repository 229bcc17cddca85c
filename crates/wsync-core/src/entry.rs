//! Snapshots of local time entries and remote worklogs.
//!
//! Both are read-only views fetched once per run. Nothing here is written back
//! to local storage.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{EntryId, RemoteId};

/// The span covered by a time entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,

    /// `None` while the timer is still running.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

impl Interval {
    /// Creates a finished interval.
    pub const fn closed(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// Creates an interval whose timer is still running.
    pub const fn running(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }
}

/// A time entry recorded in the local time tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: EntryId,

    /// Free text; may embed a `[rem:...]` directive.
    #[serde(default)]
    pub description: String,

    /// Reference to the tracker task, resolved to an issue on export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_ref: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_ref: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<String>,

    pub interval: Interval,
}

impl TimeEntry {
    /// Creates an entry with only the fields reconciliation cares about.
    pub fn new(id: EntryId, description: impl Into<String>, interval: Interval) -> Self {
        Self {
            id,
            description: description.into(),
            task_ref: None,
            project_ref: None,
            entry_type: None,
            interval,
        }
    }

    /// Sets the task reference.
    #[must_use]
    pub fn with_task(mut self, task_ref: impl Into<String>) -> Self {
        self.task_ref = Some(task_ref.into());
        self
    }

    pub const fn is_running(&self) -> bool {
        self.interval.end.is_none()
    }

    /// UTC calendar date the entry started on.
    pub fn start_date(&self) -> NaiveDate {
        self.interval.start.date_naive()
    }

    /// Elapsed time, or `None` while running.
    pub fn duration(&self) -> Option<Duration> {
        self.interval.end.map(|end| end - self.interval.start)
    }

    /// Elapsed whole seconds.
    ///
    /// # Panics
    ///
    /// Panics if the entry is still running. Callers must filter running
    /// entries first; a running timer has no duration to export.
    pub fn duration_seconds(&self) -> i64 {
        match self.duration() {
            Some(duration) => duration.num_seconds(),
            None => panic!("duration requested for running time entry {}", self.id),
        }
    }
}

/// A worklog previously written to the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedRecord {
    pub remote_id: RemoteId,

    /// Free text; contains a correlation tag when this engine created it.
    #[serde(default)]
    pub description: String,

    pub start_date: NaiveDate,

    pub duration_seconds: i64,
}
