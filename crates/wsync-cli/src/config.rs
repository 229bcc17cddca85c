//! Configuration loading and management.
//!
//! Layers, later wins: built-in defaults, `config.toml` in the platform
//! config directory, the `--config` file, then `WSYNC_*` environment
//! variables with `__` separating the section from the key
//! (`WSYNC_TEMPO__API_TOKEN` sets `tempo.api_token`).

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use wsync_engine::rate_limit::DEFAULT_MAX_REQUESTS;

/// Default days reconciled on each side of today.
pub const DEFAULT_WINDOW_DAYS: u32 = 14;

const ENV_PREFIX: &str = "WSYNC_";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub clockify: ClockifyConfig,
    pub jira: JiraConfig,
    pub tempo: TempoConfig,
    pub sync: SyncConfig,
}

/// Time tracker connection.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockifyConfig {
    pub api_key: Option<String>,
    pub workspace_id: Option<String>,
    pub user_id: Option<String>,
    pub base_url: String,
    pub requests_per_second: usize,
}

/// Issue tracker connection.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JiraConfig {
    /// Site root, e.g. `https://example.atlassian.net`.
    pub base_url: Option<String>,
    pub email: Option<String>,
    pub api_token: Option<String>,
}

/// Worklog API connection.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TempoConfig {
    pub api_token: Option<String>,
    /// Account the worklogs are authored by.
    pub account_id: Option<String>,
    pub base_url: String,
    pub requests_per_second: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub window_days: u32,
    pub cleanup_orphaned: bool,
}

impl Default for ClockifyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            workspace_id: None,
            user_id: None,
            base_url: wsync_http::clockify::DEFAULT_BASE_URL.to_string(),
            requests_per_second: DEFAULT_MAX_REQUESTS,
        }
    }
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            account_id: None,
            base_url: wsync_http::tempo::DEFAULT_BASE_URL.to_string(),
            requests_per_second: DEFAULT_MAX_REQUESTS,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            cleanup_orphaned: false,
        }
    }
}

const fn redacted(secret: Option<&String>) -> &'static str {
    match secret {
        Some(_) => "[REDACTED]",
        None => "<unset>",
    }
}

impl fmt::Debug for ClockifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClockifyConfig")
            .field("api_key", &redacted(self.api_key.as_ref()))
            .field("workspace_id", &self.workspace_id)
            .field("user_id", &self.user_id)
            .field("base_url", &self.base_url)
            .field("requests_per_second", &self.requests_per_second)
            .finish()
    }
}

impl fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraConfig")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("api_token", &redacted(self.api_token.as_ref()))
            .finish()
    }
}

impl fmt::Debug for TempoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TempoConfig")
            .field("api_token", &redacted(self.api_token.as_ref()))
            .field("account_id", &self.account_id)
            .field("base_url", &self.base_url)
            .field("requests_per_second", &self.requests_per_second)
            .finish()
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment.extract()
    }
}

/// Returns a required value, or an error naming the key and its variable.
pub fn require<'a>(value: Option<&'a String>, key: &str) -> Result<&'a str> {
    match value.map(|v| v.trim()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => bail!(
            "missing configuration value `{key}` (set it in config.toml or {})",
            env_var_name(key)
        ),
    }
}

/// `tempo.api_token` -> `WSYNC_TEMPO__API_TOKEN`.
fn env_var_name(key: &str) -> String {
    format!("{ENV_PREFIX}{}", key.replace('.', "__").to_ascii_uppercase())
}

/// Returns the platform-specific config directory for wsync.
///
/// On Linux: `~/.config/wsync`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("wsync"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use tempfile::NamedTempFile;

    #[test]
    fn test_dirs_config_path_ends_with_wsync() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "wsync");
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.sync.window_days, 14);
        assert!(!config.sync.cleanup_orphaned);
        assert_eq!(config.clockify.base_url, "https://api.clockify.me/api/v1");
        assert_eq!(config.tempo.base_url, "https://api.tempo.io/4");
        assert_eq!(config.tempo.requests_per_second, 10);
        assert!(config.jira.base_url.is_none());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[clockify]
api_key = "ck"
workspace_id = "ws1"
user_id = "u1"

[jira]
base_url = "https://example.atlassian.net"
email = "me@example.com"
api_token = "jt"

[tempo]
api_token = "tt"
account_id = "557058:me"
requests_per_second = 4

[sync]
window_days = 3
cleanup_orphaned = true
"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.clockify.api_key.as_deref(), Some("ck"));
        assert_eq!(config.clockify.base_url, "https://api.clockify.me/api/v1");
        assert_eq!(config.jira.email.as_deref(), Some("me@example.com"));
        assert_eq!(config.tempo.requests_per_second, 4);
        assert_eq!(config.sync.window_days, 3);
        assert!(config.sync.cleanup_orphaned);
    }

    #[test]
    fn test_load_from_invalid_file_fails() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[sync]\nwindow_days = \"soon\"").unwrap();
        file.flush().unwrap();

        assert!(Config::load_from(Some(file.path())).is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = Config::default();
        config.clockify.api_key = Some("clockify-secret".to_string());
        config.jira.api_token = Some("jira-secret".to_string());
        config.tempo.api_token = Some("tempo-secret".to_string());

        let debug = format!("{config:?}");
        assert!(!debug.contains("clockify-secret"));
        assert!(!debug.contains("jira-secret"));
        assert!(!debug.contains("tempo-secret"));
        assert_eq!(debug.matches("[REDACTED]").count(), 3);
    }

    #[test]
    fn test_require_names_missing_key() {
        let err = require(None, "tempo.api_token").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("`tempo.api_token`"));
        assert!(message.contains("WSYNC_TEMPO__API_TOKEN"));

        let blank = "  ".to_string();
        assert!(require(Some(&blank), "jira.email").is_err());

        let value = " ws1 ".to_string();
        assert_eq!(require(Some(&value), "clockify.workspace_id").unwrap(), "ws1");
    }
}
