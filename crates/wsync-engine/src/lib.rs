//! Export engine for worklog sync.
//!
//! Ties the pure reconciliation in `wsync-core` to remote services:
//! - Sliding-window rate limiting for outbound requests
//! - Page-number and cursor pagination helpers
//! - Collaborator traits for the time tracker, issue tracker and worklog store
//! - Sequential export with per-item failure accounting

mod error;
mod executor;
pub mod paging;
pub mod rate_limit;
mod service;
mod sync;
#[cfg(test)]
mod testing;

pub use error::{ApiError, BoxError, Cancelled, SyncError};
pub use executor::{ExecutionReport, ExportExecutor, ItemOutcome, ItemStatus};
pub use paging::{CursorPage, fetch_by_cursor, fetch_by_page};
pub use rate_limit::RateLimiter;
pub use service::{EntrySource, IssueResolver, ResolvedIssue, WorklogStore};
pub use sync::{SyncPlan, Synchronizer};
pub use tokio_util::sync::CancellationToken;
