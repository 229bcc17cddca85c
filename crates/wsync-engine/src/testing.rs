//! In-memory collaborators for engine tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use tokio_util::sync::CancellationToken;

use wsync_core::{
    EntryId, ExportedRecord, Interval, IssueId, RemoteId, SyncWindow, TimeEntry, WorklogPayload,
};

use crate::error::ApiError;
use crate::service::{EntrySource, IssueResolver, ResolvedIssue, WorklogStore};

/// A finished entry on 2024-01-`day` starting at `hour`:00.
pub fn entry(
    id: &str,
    description: &str,
    task: &str,
    day: u32,
    hour: u32,
    minutes: i64,
) -> TimeEntry {
    let start = Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap();
    TimeEntry::new(
        EntryId::new(id).unwrap(),
        description,
        Interval::closed(start, start + Duration::minutes(minutes)),
    )
    .with_task(task)
}

/// A running entry on 2024-01-`day` starting at `hour`:00.
pub fn running_entry(id: &str, task: &str, day: u32, hour: u32) -> TimeEntry {
    let start = Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap();
    TimeEntry::new(EntryId::new(id).unwrap(), "Ongoing", Interval::running(start)).with_task(task)
}

pub fn record(remote_id: &str, description: &str, day: u32) -> ExportedRecord {
    ExportedRecord {
        remote_id: RemoteId::new(remote_id).unwrap(),
        description: description.to_string(),
        start_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
        duration_seconds: 3600,
    }
}

fn check(cancel: &CancellationToken) -> Result<(), ApiError> {
    if cancel.is_cancelled() {
        return Err(ApiError::Cancelled);
    }
    Ok(())
}

#[derive(Default)]
pub struct FakeEntrySource {
    entries: Vec<TimeEntry>,
    fail: bool,
}

impl FakeEntrySource {
    pub const fn new(entries: Vec<TimeEntry>) -> Self {
        Self {
            entries,
            fail: false,
        }
    }

    pub const fn failing() -> Self {
        Self {
            entries: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl EntrySource for FakeEntrySource {
    async fn fetch_entries(
        &self,
        _window: &SyncWindow,
        cancel: &CancellationToken,
    ) -> Result<Vec<TimeEntry>, ApiError> {
        check(cancel)?;
        if self.fail {
            return Err(ApiError::Status {
                status: 503,
                message: "time tracker unavailable".to_string(),
            });
        }
        Ok(self.entries.clone())
    }
}

#[derive(Default)]
pub struct FakeResolver {
    issues: HashMap<String, ResolvedIssue>,
    fail: bool,
}

impl FakeResolver {
    pub fn with_issue(task: &str, issue_id: &str, remaining: Option<&str>) -> Self {
        let mut issues = HashMap::new();
        issues.insert(
            task.to_string(),
            ResolvedIssue {
                issue_id: IssueId::new(issue_id).unwrap(),
                remaining_estimate: remaining.map(str::to_string),
            },
        );
        Self {
            issues,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            issues: HashMap::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl IssueResolver for FakeResolver {
    async fn resolve(
        &self,
        task_ref: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<ResolvedIssue>, ApiError> {
        check(cancel)?;
        if self.fail {
            return Err(ApiError::InvalidResponse("issue lookup broke".to_string()));
        }
        Ok(self.issues.get(task_ref).cloned())
    }
}

#[derive(Default)]
struct StoreState {
    records: Vec<ExportedRecord>,
    created: Vec<WorklogPayload>,
    create_calls: usize,
    delete_calls: usize,
    next_id: u64,
}

/// Worklog store that keeps created worklogs in memory.
///
/// `fail_create_on` / `fail_delete_on` make the n-th call (1-based) fail.
#[derive(Default)]
pub struct FakeStore {
    state: Mutex<StoreState>,
    fail_create_on: Option<usize>,
    fail_delete_on: Option<usize>,
}

impl FakeStore {
    pub fn with_records(records: Vec<ExportedRecord>) -> Self {
        let store = Self::default();
        store.state().records = records;
        store
    }

    pub fn failing_create_on(call: usize) -> Self {
        Self {
            fail_create_on: Some(call),
            ..Self::default()
        }
    }

    pub fn failing_delete_on(call: usize) -> Self {
        Self {
            fail_delete_on: Some(call),
            ..Self::default()
        }
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap()
    }

    pub fn created(&self) -> Vec<WorklogPayload> {
        self.state().created.clone()
    }

    pub fn records(&self) -> Vec<ExportedRecord> {
        self.state().records.clone()
    }

    pub fn create_calls(&self) -> usize {
        self.state().create_calls
    }

    pub fn delete_calls(&self) -> usize {
        self.state().delete_calls
    }
}

#[async_trait]
impl WorklogStore for FakeStore {
    async fn list(
        &self,
        window: &SyncWindow,
        cancel: &CancellationToken,
    ) -> Result<Vec<ExportedRecord>, ApiError> {
        check(cancel)?;
        let state = self.state();
        Ok(state
            .records
            .iter()
            .filter(|r| window.first_date() <= r.start_date && r.start_date <= window.last_date())
            .cloned()
            .collect())
    }

    async fn create(
        &self,
        payload: &WorklogPayload,
        cancel: &CancellationToken,
    ) -> Result<RemoteId, ApiError> {
        check(cancel)?;
        let mut state = self.state();
        state.create_calls += 1;
        if self.fail_create_on == Some(state.create_calls) {
            return Err(ApiError::Status {
                status: 400,
                message: "worklog rejected".to_string(),
            });
        }
        state.next_id += 1;
        let remote_id = RemoteId::new(format!("w{}", state.next_id)).unwrap();
        state.records.push(ExportedRecord {
            remote_id: remote_id.clone(),
            description: payload.description.clone(),
            start_date: payload.start_date,
            duration_seconds: payload.time_spent_seconds,
        });
        state.created.push(payload.clone());
        Ok(remote_id)
    }

    async fn delete(
        &self,
        remote_id: &RemoteId,
        cancel: &CancellationToken,
    ) -> Result<(), ApiError> {
        check(cancel)?;
        let mut state = self.state();
        state.delete_calls += 1;
        if self.fail_delete_on == Some(state.delete_calls) {
            return Err(ApiError::Status {
                status: 403,
                message: "not allowed".to_string(),
            });
        }
        state.records.retain(|r| &r.remote_id != remote_id);
        Ok(())
    }
}
