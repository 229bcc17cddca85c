//! Builds the HTTP-backed synchronizer from configuration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;

use wsync_core::{AccountId, SyncWindow, UserId, WorkspaceId};
use wsync_engine::{CancellationToken, RateLimiter, Synchronizer};
use wsync_http::{ClockifyClient, JiraClient, TempoClient};

use crate::Config;
use crate::config::require;

fn per_second(requests: usize) -> Arc<RateLimiter> {
    Arc::new(RateLimiter::new(requests, Duration::from_secs(1)))
}

/// Connects the time tracker, issue tracker and worklog clients.
///
/// Fails if any credential or identifier is missing.
pub fn synchronizer(config: &Config) -> Result<Synchronizer> {
    let clockify = &config.clockify;
    let entries = ClockifyClient::new(
        &clockify.base_url,
        require(clockify.api_key.as_ref(), "clockify.api_key")?,
        WorkspaceId::new(require(
            clockify.workspace_id.as_ref(),
            "clockify.workspace_id",
        )?)?,
        UserId::new(require(clockify.user_id.as_ref(), "clockify.user_id")?)?,
        per_second(clockify.requests_per_second),
    )
    .context("failed to create time tracker client")?;

    let jira = &config.jira;
    let resolver = JiraClient::new(
        require(jira.base_url.as_ref(), "jira.base_url")?,
        require(jira.email.as_ref(), "jira.email")?,
        require(jira.api_token.as_ref(), "jira.api_token")?,
        Arc::new(RateLimiter::default_api()),
    )
    .context("failed to create issue tracker client")?;

    let tempo = &config.tempo;
    let author = AccountId::new(require(tempo.account_id.as_ref(), "tempo.account_id")?)?;
    let store = TempoClient::new(
        &tempo.base_url,
        require(tempo.api_token.as_ref(), "tempo.api_token")?,
        author.clone(),
        per_second(tempo.requests_per_second),
    )
    .context("failed to create worklog client")?;

    Ok(Synchronizer::new(
        Arc::new(entries),
        Arc::new(resolver),
        Arc::new(store),
        author,
    ))
}

/// The window ending today plus `days` on either side.
pub fn window(config: &Config, days: Option<u32>) -> SyncWindow {
    SyncWindow::around(Utc::now(), days.unwrap_or(config.sync.window_days))
}

/// Returns a token that is cancelled on Ctrl-C.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling");
            token.cancel();
        }
    });
    cancel
}
