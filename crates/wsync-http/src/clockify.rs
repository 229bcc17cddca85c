//! Time tracker client: the source of local time entries.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use tracing::debug;

use wsync_core::{EntryId, Interval, SyncWindow, TimeEntry, UserId, WorkspaceId};
use wsync_engine::{ApiError, CancellationToken, EntrySource, RateLimiter, fetch_by_page};

use crate::{ClientError, build_http, ensure_success, exchange, parse_json, require, trim_base_url};

/// Public API root.
pub const DEFAULT_BASE_URL: &str = "https://api.clockify.me/api/v1";

/// Entries requested per page.
const PAGE_SIZE: usize = 50;

/// Time tracker API client bound to one workspace and user.
///
/// # Thread Safety
///
/// The client is safe to share across tasks. Requests from every clone of
/// the shared limiter count against the same budget.
pub struct ClockifyClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    workspace: WorkspaceId,
    user: UserId,
    limiter: Arc<RateLimiter>,
}

impl fmt::Debug for ClockifyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClockifyClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("workspace", &self.workspace)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl ClockifyClient {
    /// Creates a client for `workspace`/`user` authenticated by `api_key`.
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        workspace: WorkspaceId,
        user: UserId,
        limiter: Arc<RateLimiter>,
    ) -> Result<Self, ClientError> {
        let api_key = api_key.into();
        require("time tracker API key", &api_key)?;
        require("time tracker base URL", base_url)?;

        Ok(Self {
            http: build_http()?,
            base_url: trim_base_url(base_url),
            api_key,
            workspace,
            user,
            limiter,
        })
    }

    fn entries_url(&self) -> String {
        format!(
            "{}/workspaces/{}/user/{}/time-entries",
            self.base_url, self.workspace, self.user
        )
    }

    async fn fetch_page(
        &self,
        window: &SyncWindow,
        page: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<TimeEntry>, ApiError> {
        let request = self
            .http
            .get(self.entries_url())
            .header("X-Api-Key", &self.api_key)
            .query(&[
                ("start", format_instant(window.start())),
                ("end", format_instant(window.end())),
                ("page", page.to_string()),
                ("page-size", PAGE_SIZE.to_string()),
                ("hydrated", "true".to_string()),
            ]);

        let (status, body) = exchange(request, cancel).await?;
        ensure_success(status, &body)?;
        let raw: Vec<RawTimeEntry> = parse_json(&body)?;
        raw.into_iter().map(RawTimeEntry::into_entry).collect()
    }
}

#[async_trait]
impl EntrySource for ClockifyClient {
    async fn fetch_entries(
        &self,
        window: &SyncWindow,
        cancel: &CancellationToken,
    ) -> Result<Vec<TimeEntry>, ApiError> {
        let entries = fetch_by_page(&self.limiter, cancel, PAGE_SIZE, |page| {
            self.fetch_page(window, page, cancel)
        })
        .await?;
        debug!(count = entries.len(), "fetched time entries");
        Ok(entries)
    }
}

fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTimeEntry {
    id: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    task_id: Option<String>,
    #[serde(default)]
    project_id: Option<String>,
    #[serde(rename = "type", default)]
    entry_type: Option<String>,
    time_interval: RawInterval,
    /// Present when requested with `hydrated=true`.
    #[serde(default)]
    task: Option<RawTask>,
}

#[derive(Debug, Deserialize)]
struct RawInterval {
    start: DateTime<Utc>,
    #[serde(default)]
    end: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RawTask {
    name: String,
}

impl RawTimeEntry {
    fn into_entry(self) -> Result<TimeEntry, ApiError> {
        let id = EntryId::new(self.id)
            .map_err(|err| ApiError::InvalidResponse(format!("time entry: {err}")))?;
        // Task names carry the issue key; fall back to the bare task ID.
        let task_ref = self.task.map(|task| task.name).or(self.task_id);
        Ok(TimeEntry {
            id,
            description: self.description.unwrap_or_default(),
            task_ref,
            project_ref: self.project_id,
            entry_type: self.entry_type,
            interval: Interval {
                start: self.time_interval.start,
                end: self.time_interval.end,
            },
        })
    }
}
