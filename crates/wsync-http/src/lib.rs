//! HTTP implementations of the sync engine's collaborators.
//!
//! Provides one client per remote API:
//! - [`ClockifyClient`]: local time entries (page-number paging)
//! - [`JiraClient`]: task to issue resolution with remaining estimates
//! - [`TempoClient`]: the worklog store (cursor paging)
//!
//! Every client owns a [`RateLimiter`] and waits on it before each request.

use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use wsync_engine::{ApiError, CancellationToken, RateLimiter};

pub mod clockify;
pub mod jira;
pub mod tempo;

pub use clockify::ClockifyClient;
pub use jira::{JiraClient, extract_issue_key};
pub use tempo::TempoClient;

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while constructing a client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A required credential or identifier was missing or blank.
    #[error("invalid {field}: {reason}")]
    InvalidCredential {
        field: &'static str,
        reason: &'static str,
    },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

fn require(field: &'static str, value: &str) -> Result<(), ClientError> {
    if value.is_empty() {
        return Err(ClientError::InvalidCredential {
            field,
            reason: "cannot be empty",
        });
    }
    if value.trim().is_empty() {
        return Err(ClientError::InvalidCredential {
            field,
            reason: "cannot be whitespace-only",
        });
    }
    Ok(())
}

fn build_http() -> Result<reqwest::Client, ClientError> {
    reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .map_err(ClientError::ClientBuild)
}

fn trim_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

fn request_error(err: reqwest::Error) -> ApiError {
    ApiError::Request(Box::new(err))
}

/// Waits for rate budget, sends the request and reads the body.
///
/// Cancellation is honoured both while waiting and while the request is in
/// flight.
async fn send(
    limiter: &RateLimiter,
    request: RequestBuilder,
    cancel: &CancellationToken,
) -> Result<(StatusCode, String), ApiError> {
    limiter.wait_if_needed(cancel).await?;
    exchange(request, cancel).await
}

/// Sends without consulting the limiter; paging helpers already did.
async fn exchange(
    request: RequestBuilder,
    cancel: &CancellationToken,
) -> Result<(StatusCode, String), ApiError> {
    let exchange = async {
        let response = request.send().await.map_err(request_error)?;
        let status = response.status();
        let body = response.text().await.map_err(request_error)?;
        Ok::<_, ApiError>((status, body))
    };

    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ApiError::Cancelled),
        result = exchange => result,
    }
}

/// Turns a non-success status into [`ApiError::Status`].
fn ensure_success(status: StatusCode, body: &str) -> Result<(), ApiError> {
    if status.is_success() {
        return Ok(());
    }
    let message = parse_error_message(body).unwrap_or_else(|| {
        if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("no response body").to_string()
        } else {
            body.trim().to_string()
        }
    });
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|err| ApiError::InvalidResponse(err.to_string()))
}

/// Extracts a human-readable message from the error shapes the APIs use.
///
/// Handles `{"message": ...}`, `{"errorMessages": [...]}` and
/// `{"errors": [{"message": ...}]}`.
fn parse_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    if let Some(message) = value.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }
    if let Some(messages) = value.get("errorMessages").and_then(Value::as_array) {
        let joined = messages
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("; ");
        if !joined.is_empty() {
            return Some(joined);
        }
    }
    if let Some(errors) = value.get("errors").and_then(Value::as_array) {
        let joined = errors
            .iter()
            .filter_map(|error| error.get("message").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("; ");
        if !joined.is_empty() {
            return Some(joined);
        }
    }
    None
}
