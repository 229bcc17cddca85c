//! Collaborator interfaces consumed by the engine.
//!
//! Each trait has one HTTP implementation in `wsync-http` and in-memory fakes
//! in tests. Implementations own their rate limiting; the engine only passes
//! the cancellation token through.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use wsync_core::{ExportedRecord, IssueId, RemoteId, SyncWindow, TimeEntry, WorklogPayload};

use crate::error::ApiError;

/// An issue that a time entry's task maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIssue {
    pub issue_id: IssueId,
    /// The issue's remaining estimate in tracker notation, e.g. `"3h 20m"`.
    pub remaining_estimate: Option<String>,
}

/// Source of local time entries.
#[async_trait]
pub trait EntrySource: Send + Sync {
    /// All entries starting inside `window`, running ones included.
    async fn fetch_entries(
        &self,
        window: &SyncWindow,
        cancel: &CancellationToken,
    ) -> Result<Vec<TimeEntry>, ApiError>;
}

/// Maps a task reference to an issue in the tracker.
#[async_trait]
pub trait IssueResolver: Send + Sync {
    /// Returns `None` when the task has no matching issue.
    async fn resolve(
        &self,
        task_ref: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<ResolvedIssue>, ApiError>;
}

/// The remote worklog store.
#[async_trait]
pub trait WorklogStore: Send + Sync {
    /// Worklogs dated inside `window`.
    async fn list(
        &self,
        window: &SyncWindow,
        cancel: &CancellationToken,
    ) -> Result<Vec<ExportedRecord>, ApiError>;

    async fn create(
        &self,
        payload: &WorklogPayload,
        cancel: &CancellationToken,
    ) -> Result<RemoteId, ApiError>;

    async fn delete(&self, remote_id: &RemoteId, cancel: &CancellationToken)
    -> Result<(), ApiError>;
}
