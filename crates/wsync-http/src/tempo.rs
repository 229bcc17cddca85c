//! Worklog store client.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use wsync_core::{AccountId, ExportedRecord, RemoteId, SyncWindow, WorklogPayload};
use wsync_engine::{
    ApiError, CancellationToken, CursorPage, RateLimiter, WorklogStore, fetch_by_cursor,
};

use crate::{
    ClientError, build_http, ensure_success, exchange, parse_json, require, send, trim_base_url,
};

/// Public API root.
pub const DEFAULT_BASE_URL: &str = "https://api.tempo.io/4";

/// Worklogs requested per page.
const PAGE_LIMIT: u32 = 50;

/// Worklog API client for one author account.
pub struct TempoClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
    account: AccountId,
    limiter: Arc<RateLimiter>,
}

impl fmt::Debug for TempoClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TempoClient")
            .field("base_url", &self.base_url)
            .field("api_token", &"[REDACTED]")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

impl TempoClient {
    /// Creates a client listing worklogs authored by `account`.
    pub fn new(
        base_url: &str,
        api_token: impl Into<String>,
        account: AccountId,
        limiter: Arc<RateLimiter>,
    ) -> Result<Self, ClientError> {
        let api_token = api_token.into();
        require("worklog API token", &api_token)?;
        require("worklog base URL", base_url)?;

        Ok(Self {
            http: build_http()?,
            base_url: trim_base_url(base_url),
            api_token,
            account,
            limiter,
        })
    }

    fn list_url(&self) -> String {
        format!("{}/worklogs/user/{}", self.base_url, self.account)
    }

    fn worklogs_url(&self) -> String {
        format!("{}/worklogs", self.base_url)
    }

    /// Fetches one page: the first from the list URL, later ones from `next`.
    async fn fetch_page(
        &self,
        window: &SyncWindow,
        next: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<CursorPage<ExportedRecord, String>, ApiError> {
        let request = match next {
            Some(url) => self.http.get(url),
            None => self.http.get(self.list_url()).query(&[
                ("from", format_date(window.first_date())),
                ("to", format_date(window.last_date())),
                ("limit", PAGE_LIMIT.to_string()),
            ]),
        }
        .bearer_auth(&self.api_token);

        let (status, body) = exchange(request, cancel).await?;
        ensure_success(status, &body)?;
        parse_json::<RawWorklogPage>(&body)?.into_page()
    }
}

#[async_trait]
impl WorklogStore for TempoClient {
    async fn list(
        &self,
        window: &SyncWindow,
        cancel: &CancellationToken,
    ) -> Result<Vec<ExportedRecord>, ApiError> {
        let records = fetch_by_cursor(&self.limiter, cancel, |next| {
            self.fetch_page(window, next, cancel)
        })
        .await?;
        debug!(count = records.len(), "fetched worklogs");
        Ok(records)
    }

    async fn create(
        &self,
        payload: &WorklogPayload,
        cancel: &CancellationToken,
    ) -> Result<RemoteId, ApiError> {
        let request = self
            .http
            .post(self.worklogs_url())
            .bearer_auth(&self.api_token)
            .json(payload);

        let (status, body) = send(&self.limiter, request, cancel).await?;
        ensure_success(status, &body)?;
        let created: RawCreated = parse_json(&body)?;
        remote_id(created.tempo_worklog_id)
    }

    async fn delete(
        &self,
        remote_id: &RemoteId,
        cancel: &CancellationToken,
    ) -> Result<(), ApiError> {
        let request = self
            .http
            .delete(format!("{}/{remote_id}", self.worklogs_url()))
            .bearer_auth(&self.api_token);

        let (status, body) = send(&self.limiter, request, cancel).await?;
        ensure_success(status, &body)
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn remote_id(id: u64) -> Result<RemoteId, ApiError> {
    RemoteId::new(id.to_string()).map_err(|err| ApiError::InvalidResponse(err.to_string()))
}

#[derive(Debug, Deserialize)]
struct RawWorklogPage {
    #[serde(default)]
    results: Vec<RawWorklog>,
    #[serde(default)]
    metadata: RawMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct RawMetadata {
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWorklog {
    tempo_worklog_id: u64,
    #[serde(default)]
    description: Option<String>,
    start_date: NaiveDate,
    #[serde(default)]
    time_spent_seconds: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCreated {
    tempo_worklog_id: u64,
}

impl RawWorklogPage {
    fn into_page(self) -> Result<CursorPage<ExportedRecord, String>, ApiError> {
        let items = self
            .results
            .into_iter()
            .map(|raw| {
                Ok(ExportedRecord {
                    remote_id: remote_id(raw.tempo_worklog_id)?,
                    description: raw.description.unwrap_or_default(),
                    start_date: raw.start_date,
                    duration_seconds: raw.time_spent_seconds,
                })
            })
            .collect::<Result<Vec<_>, ApiError>>()?;
        let next = self.metadata.next.filter(|url| !url.trim().is_empty());
        Ok(CursorPage { items, next })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};

    fn client() -> TempoClient {
        TempoClient::new(
            DEFAULT_BASE_URL,
            "tempo-secret",
            AccountId::new("557058:me").unwrap(),
            Arc::new(RateLimiter::default_api()),
        )
        .unwrap()
    }

    #[test]
    fn client_debug_redacts_token() {
        let debug = format!("{:?}", client());
        assert!(!debug.contains("tempo-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn client_rejects_blank_token() {
        let result = TempoClient::new(
            DEFAULT_BASE_URL,
            " ",
            AccountId::new("557058:me").unwrap(),
            Arc::new(RateLimiter::default_api()),
        );
        assert!(matches!(result, Err(ClientError::InvalidCredential { .. })));
    }

    #[test]
    fn urls_are_built_from_base() {
        let client = client();
        assert_eq!(
            client.list_url(),
            "https://api.tempo.io/4/worklogs/user/557058:me"
        );
        assert_eq!(client.worklogs_url(), "https://api.tempo.io/4/worklogs");
    }

    #[test]
    fn parses_page_with_next_link() {
        let json = r#"{
            "self": "https://api.tempo.io/4/worklogs/user/me?offset=0&limit=50",
            "metadata": {"count": 2, "offset": 0, "limit": 50, "next": "https://api.tempo.io/4/worklogs/user/me?offset=50&limit=50"},
            "results": [
                {"tempoWorklogId": 4711, "description": "Work [cid:e1]", "startDate": "2024-01-15", "startTime": "09:00:00", "timeSpentSeconds": 9000},
                {"tempoWorklogId": 4712, "startDate": "2024-01-16", "timeSpentSeconds": 600}
            ]
        }"#;
        let page = parse_json::<RawWorklogPage>(json).unwrap().into_page().unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].remote_id.as_str(), "4711");
        assert_eq!(page.items[0].description, "Work [cid:e1]");
        assert_eq!(
            page.items[0].start_date,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert_eq!(page.items[1].description, "");
        assert_eq!(
            page.next.as_deref(),
            Some("https://api.tempo.io/4/worklogs/user/me?offset=50&limit=50")
        );
    }

    #[test]
    fn last_page_has_no_next() {
        let json = r#"{"metadata": {"count": 0, "offset": 0, "limit": 50}, "results": []}"#;
        let page = parse_json::<RawWorklogPage>(json).unwrap().into_page().unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.next, None);
    }

    #[test]
    fn parses_created_worklog_id() {
        let created: RawCreated =
            parse_json(r#"{"tempoWorklogId": 9001, "issue": {"id": 10042}}"#).unwrap();
        assert_eq!(remote_id(created.tempo_worklog_id).unwrap().as_str(), "9001");
    }

    #[test]
    fn window_dates_are_inclusive() {
        let window = SyncWindow::around(Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap(), 1);
        assert_eq!(format_date(window.first_date()), "2024-01-14");
        assert_eq!(format_date(window.last_date()), "2024-01-16");
    }
}
