//! The plan / execute façade.
//!
//! `plan` only reads: it fetches both sides of the window and reconciles
//! them. `execute` writes: it exports the planned entries and, if asked,
//! deletes orphaned worklogs. Correctness rests entirely on the correlation
//! tags stored in the remote descriptions, so running the pair twice over an
//! unchanged window exports nothing the second time.

use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use wsync_core::{AccountId, Reconciliation, SyncWindow, reconcile};

use crate::error::SyncError;
use crate::executor::{ExecutionReport, ExportExecutor};
use crate::service::{EntrySource, IssueResolver, WorklogStore};

/// A reconciled window, ready to execute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncPlan {
    pub window: SyncWindow,
    #[serde(flatten)]
    pub reconciliation: Reconciliation,
}

/// Reconciles and exports time entries for one worklog author.
pub struct Synchronizer {
    entries: Arc<dyn EntrySource>,
    resolver: Arc<dyn IssueResolver>,
    store: Arc<dyn WorklogStore>,
    author: AccountId,
}

impl Synchronizer {
    pub fn new(
        entries: Arc<dyn EntrySource>,
        resolver: Arc<dyn IssueResolver>,
        store: Arc<dyn WorklogStore>,
        author: AccountId,
    ) -> Self {
        Self {
            entries,
            resolver,
            store,
            author,
        }
    }

    /// Fetches both sides of `window` and computes what to export.
    pub async fn plan(
        &self,
        window: SyncWindow,
        cancel: &CancellationToken,
    ) -> Result<SyncPlan, SyncError> {
        let entries = self
            .entries
            .fetch_entries(&window, cancel)
            .await
            .map_err(|err| SyncError::transport("fetch time entries", err))?;
        let fetched = entries.len();
        let entries: Vec<_> = entries
            .into_iter()
            .filter(|entry| window.contains(entry.interval.start))
            .collect();
        if entries.len() != fetched {
            debug!(
                dropped = fetched - entries.len(),
                "ignoring entries starting outside the window"
            );
        }

        let exported = self
            .store
            .list(&window, cancel)
            .await
            .map_err(|err| SyncError::transport("list worklogs", err))?;

        let reconciliation = reconcile(entries, &exported);
        info!(
            to_export = reconciliation.to_export.len(),
            already_synced = reconciliation.already_synced.len(),
            orphaned = reconciliation.orphaned.len(),
            running = reconciliation.running.len(),
            "planned sync"
        );

        Ok(SyncPlan {
            window,
            reconciliation,
        })
    }

    /// Exports the plan's candidates; deletes orphans only if `cleanup_orphaned`.
    pub async fn execute(
        &self,
        plan: &SyncPlan,
        cleanup_orphaned: bool,
        cancel: &CancellationToken,
    ) -> Result<ExecutionReport, SyncError> {
        let executor =
            ExportExecutor::new(self.resolver.as_ref(), self.store.as_ref(), &self.author);
        let mut report = executor
            .export(&plan.reconciliation.to_export, cancel)
            .await?;

        let orphaned = &plan.reconciliation.orphaned;
        if cleanup_orphaned && !orphaned.is_empty() {
            info!(count = orphaned.len(), "deleting orphaned worklogs");
            report.deleted_ids = executor.delete_orphans(orphaned, cancel).await?;
            report.deleted = report.deleted_ids.len();
        } else if !orphaned.is_empty() {
            debug!(count = orphaned.len(), "orphan cleanup disabled, leaving worklogs");
        }

        Ok(report)
    }
}
