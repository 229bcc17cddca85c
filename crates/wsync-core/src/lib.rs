//! Core domain logic for worklog sync.
//!
//! This crate contains the pure, synchronous parts of the sync engine:
//! - Data model: local time entries and exported worklogs
//! - Duration strings in the issue tracker's workday notation
//! - Correlation tags that make exports idempotent
//! - Remaining-estimate directives
//! - Reconciliation: deciding which entries still need exporting

pub mod correlation;
pub mod duration;
mod entry;
mod payload;
mod reconcile;
pub mod remaining;
mod types;
mod window;

pub use duration::{format_duration, parse_duration};
pub use entry::{ExportedRecord, Interval, TimeEntry};
pub use payload::{ExportPlanItem, WorklogPayload};
pub use reconcile::{Reconciliation, reconcile};
pub use types::{AccountId, EntryId, IssueId, RemoteId, UserId, ValidationError, WorkspaceId};
pub use window::SyncWindow;
