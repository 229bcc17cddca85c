//! Issue tracker client: resolves tasks to issues.
//!
//! Task names in the time tracker start with (or contain) an issue key such
//! as `ABC-123`. The key is looked up to get the numeric issue ID the
//! worklog API wants and the issue's current remaining estimate.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use async_trait::async_trait;
use regex::Regex;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use wsync_core::IssueId;
use wsync_engine::{ApiError, CancellationToken, IssueResolver, RateLimiter, ResolvedIssue};

use crate::{ClientError, build_http, ensure_success, parse_json, require, send, trim_base_url};

static ISSUE_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z][A-Z0-9_]+-\d+)\b").unwrap());

/// Returns the first issue key in a task reference.
pub fn extract_issue_key(task_ref: &str) -> Option<&str> {
    ISSUE_KEY_RE
        .captures(task_ref)
        .and_then(|caps| caps.get(1))
        .map(|key| key.as_str())
}

/// Issue tracker REST client.
///
/// Lookups are cached per key for the lifetime of the client, so a batch of
/// entries on the same issue costs one request.
pub struct JiraClient {
    http: reqwest::Client,
    base_url: String,
    email: String,
    api_token: String,
    limiter: Arc<RateLimiter>,
    cache: Mutex<HashMap<String, Option<ResolvedIssue>>>,
}

impl fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraClient")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("api_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl JiraClient {
    /// Creates a client using basic auth with `email` and `api_token`.
    pub fn new(
        base_url: &str,
        email: impl Into<String>,
        api_token: impl Into<String>,
        limiter: Arc<RateLimiter>,
    ) -> Result<Self, ClientError> {
        let email = email.into();
        let api_token = api_token.into();
        require("issue tracker base URL", base_url)?;
        require("issue tracker email", &email)?;
        require("issue tracker API token", &api_token)?;

        Ok(Self {
            http: build_http()?,
            base_url: trim_base_url(base_url),
            email,
            api_token,
            limiter,
            cache: Mutex::new(HashMap::new()),
        })
    }

    fn issue_url(&self, key: &str) -> String {
        format!("{}/rest/api/3/issue/{key}", self.base_url)
    }

    fn cached(&self, key: &str) -> Option<Option<ResolvedIssue>> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn remember(&self, key: &str, issue: Option<ResolvedIssue>) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), issue);
    }

    async fn lookup(
        &self,
        key: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<ResolvedIssue>, ApiError> {
        let request = self
            .http
            .get(self.issue_url(key))
            .basic_auth(&self.email, Some(&self.api_token))
            .query(&[("fields", "timetracking")]);

        let (status, body) = send(&self.limiter, request, cancel).await?;
        if status == StatusCode::NOT_FOUND {
            debug!(key, "issue not found");
            return Ok(None);
        }
        ensure_success(status, &body)?;
        let raw: RawIssue = parse_json(&body)?;
        raw.into_resolved().map(Some)
    }
}

#[async_trait]
impl IssueResolver for JiraClient {
    async fn resolve(
        &self,
        task_ref: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<ResolvedIssue>, ApiError> {
        let Some(key) = extract_issue_key(task_ref) else {
            debug!(task_ref, "task has no issue key");
            return Ok(None);
        };
        if let Some(cached) = self.cached(key) {
            return Ok(cached);
        }

        let issue = self.lookup(key, cancel).await?;
        self.remember(key, issue.clone());
        Ok(issue)
    }
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    id: String,
    #[serde(default)]
    fields: RawFields,
}

#[derive(Debug, Default, Deserialize)]
struct RawFields {
    #[serde(default)]
    timetracking: RawTimeTracking,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTimeTracking {
    #[serde(default)]
    remaining_estimate: Option<String>,
}

impl RawIssue {
    fn into_resolved(self) -> Result<ResolvedIssue, ApiError> {
        let issue_id = IssueId::new(self.id)
            .map_err(|err| ApiError::InvalidResponse(format!("issue: {err}")))?;
        Ok(ResolvedIssue {
            issue_id,
            remaining_estimate: self.fields.timetracking.remaining_estimate,
        })
    }
}
