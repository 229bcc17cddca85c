//! Sequential export of planned entries.
//!
//! Entries are exported one at a time. A failure for one entry is recorded
//! and the batch moves on; only cancellation stops it early. Orphan deletion
//! is the opposite: the first failed delete aborts the cleanup.

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use wsync_core::{AccountId, EntryId, ExportPlanItem, ExportedRecord, RemoteId, TimeEntry};

use crate::error::{ApiError, SyncError};
use crate::service::{IssueResolver, WorklogStore};

/// What happened to one export candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemStatus {
    /// Created remotely.
    Exported { remote_id: RemoteId },
    /// No issue could be found for the entry's task.
    SkippedUnmapped { reason: String },
    /// The issue lookup or the create call failed.
    Failed { error: String },
}

/// Per-entry detail in an [`ExecutionReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemOutcome {
    pub entry_id: EntryId,
    /// The description as submitted, or the original one if nothing was sent.
    pub description: String,
    pub duration_seconds: i64,
    #[serde(flatten)]
    pub status: ItemStatus,
}

/// Aggregate result of an execute call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub deleted: usize,
    pub items: Vec<ItemOutcome>,
    pub deleted_ids: Vec<RemoteId>,
}

impl ExecutionReport {
    fn record(&mut self, outcome: ItemOutcome) {
        match outcome.status {
            ItemStatus::Exported { .. } => self.succeeded += 1,
            ItemStatus::SkippedUnmapped { .. } => self.skipped += 1,
            ItemStatus::Failed { .. } => self.failed += 1,
        }
        self.items.push(outcome);
    }

    /// Whether any entry failed to export.
    pub const fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Submits export candidates and orphan deletions.
pub struct ExportExecutor<'a> {
    resolver: &'a dyn IssueResolver,
    store: &'a dyn WorklogStore,
    author: &'a AccountId,
}

impl<'a> ExportExecutor<'a> {
    pub fn new(
        resolver: &'a dyn IssueResolver,
        store: &'a dyn WorklogStore,
        author: &'a AccountId,
    ) -> Self {
        Self {
            resolver,
            store,
            author,
        }
    }

    /// Exports each candidate in order, recording every outcome.
    ///
    /// # Panics
    ///
    /// Panics if a candidate is still running. [`reconcile`] never plans a
    /// running entry, so only a hand-built candidate list can reach this.
    ///
    /// [`reconcile`]: wsync_core::reconcile
    pub async fn export(
        &self,
        candidates: &[TimeEntry],
        cancel: &CancellationToken,
    ) -> Result<ExecutionReport, SyncError> {
        let mut report = ExecutionReport::default();
        for entry in candidates {
            let outcome = self.export_one(entry, cancel).await?;
            report.record(outcome);
        }
        info!(
            succeeded = report.succeeded,
            skipped = report.skipped,
            failed = report.failed,
            "export finished"
        );
        Ok(report)
    }

    async fn export_one(
        &self,
        entry: &TimeEntry,
        cancel: &CancellationToken,
    ) -> Result<ItemOutcome, SyncError> {
        let duration_seconds = entry.duration_seconds();

        let Some(task_ref) = entry.task_ref.as_deref() else {
            warn!(entry_id = %entry.id, "entry has no task, skipping");
            return Ok(outcome(
                entry,
                entry.description.clone(),
                duration_seconds,
                ItemStatus::SkippedUnmapped {
                    reason: "entry has no task".to_string(),
                },
            ));
        };

        let issue = match self.resolver.resolve(task_ref, cancel).await {
            Ok(Some(issue)) => issue,
            Ok(None) => {
                warn!(entry_id = %entry.id, task_ref, "no issue for task, skipping");
                return Ok(outcome(
                    entry,
                    entry.description.clone(),
                    duration_seconds,
                    ItemStatus::SkippedUnmapped {
                        reason: format!("no issue found for task '{task_ref}'"),
                    },
                ));
            }
            Err(ApiError::Cancelled) => return Err(SyncError::Cancelled),
            Err(err) => {
                warn!(entry_id = %entry.id, task_ref, error = %err, "issue lookup failed");
                return Ok(outcome(
                    entry,
                    entry.description.clone(),
                    duration_seconds,
                    ItemStatus::Failed {
                        error: err.to_string(),
                    },
                ));
            }
        };

        let item = ExportPlanItem::build(entry.clone(), issue.remaining_estimate.as_deref());
        let description = item.resolved_description.clone();
        let payload = item.into_payload(self.author.clone(), issue.issue_id);

        match self.store.create(&payload, cancel).await {
            Ok(remote_id) => {
                info!(entry_id = %entry.id, %remote_id, "exported entry");
                Ok(outcome(
                    entry,
                    description,
                    duration_seconds,
                    ItemStatus::Exported { remote_id },
                ))
            }
            Err(ApiError::Cancelled) => Err(SyncError::Cancelled),
            Err(err) => {
                warn!(entry_id = %entry.id, error = %err, "export failed");
                Ok(outcome(
                    entry,
                    description,
                    duration_seconds,
                    ItemStatus::Failed {
                        error: err.to_string(),
                    },
                ))
            }
        }
    }

    /// Deletes orphaned worklogs, stopping at the first failure.
    pub async fn delete_orphans(
        &self,
        orphans: &[ExportedRecord],
        cancel: &CancellationToken,
    ) -> Result<Vec<RemoteId>, SyncError> {
        let mut deleted = Vec::with_capacity(orphans.len());
        for record in orphans {
            match self.store.delete(&record.remote_id, cancel).await {
                Ok(()) => {
                    info!(remote_id = %record.remote_id, "deleted orphaned worklog");
                    deleted.push(record.remote_id.clone());
                }
                Err(ApiError::Cancelled) => return Err(SyncError::Cancelled),
                Err(source) => {
                    return Err(SyncError::Delete {
                        remote_id: record.remote_id.clone(),
                        source,
                    });
                }
            }
        }
        Ok(deleted)
    }
}

fn outcome(
    entry: &TimeEntry,
    description: String,
    duration_seconds: i64,
    status: ItemStatus,
) -> ItemOutcome {
    ItemOutcome {
        entry_id: entry.id.clone(),
        description,
        duration_seconds,
        status,
    }
}
