//! Engine error types.

use thiserror::Error;

use wsync_core::RemoteId;

/// Boxed transport-level cause.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A suspension point observed cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Errors reported by collaborator services.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Request(#[source] BoxError),
    /// The API answered with a non-success status.
    #[error("API error (status {status}): {message}")]
    Status { status: u16, message: String },
    /// The response body could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// Cancelled while waiting for rate budget or a response.
    #[error("request cancelled")]
    Cancelled,
}

impl From<Cancelled> for ApiError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}

/// Errors that abort a plan or execute call.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("sync cancelled")]
    Cancelled,
    /// A fetch needed for planning failed.
    #[error("failed to {operation}: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: ApiError,
    },
    /// Orphan cleanup failed; remaining deletions were not attempted.
    #[error("failed to delete orphaned worklog {remote_id}: {source}")]
    Delete {
        remote_id: RemoteId,
        #[source]
        source: ApiError,
    },
}

impl SyncError {
    /// Wraps a planning fetch failure, keeping cancellation distinct.
    pub(crate) fn transport(operation: &'static str, source: ApiError) -> Self {
        match source {
            ApiError::Cancelled => Self::Cancelled,
            source => Self::Transport { operation, source },
        }
    }
}
