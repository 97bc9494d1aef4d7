//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use wl_core::{AnomalyPolicy, HourlyRate};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// OAuth access token for the Google Calendar API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Base URL of the Google Calendar v3 API.
    pub api_base_url: String,

    /// Default hourly rate when `--rate` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<HourlyRate>,

    /// Default policy for events that end before they start.
    #[serde(default)]
    pub on_anomaly: AnomalyPolicy,

    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("api_base_url", &self.api_base_url)
            .field("hourly_rate", &self.hourly_rate)
            .field("on_anomaly", &self.on_anomaly)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_token: None,
            api_base_url: wl_gcal::GOOGLE_CALENDAR_API_BASE.to_string(),
            hourly_rate: None,
            on_anomaly: AnomalyPolicy::default(),
            request_timeout_secs: wl_gcal::DEFAULT_TIMEOUT.as_secs(),
        }
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

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (WL_*)
        figment = figment.merge(Env::prefixed("WL_"));

        figment.extract()
    }

    /// Returns the access token, or an error naming where to set it.
    pub fn require_access_token(&self) -> anyhow::Result<&str> {
        self.access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "missing Google Calendar access token (set WL_ACCESS_TOKEN or config.toml)"
                )
            })
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Returns the platform-specific config directory for wl.
///
/// On Linux: `~/.config/wl`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("wl"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_dirs_config_path_ends_with_wl() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "wl");
    }

    #[test]
    fn test_default_config_targets_google() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "https://www.googleapis.com/calendar/v3");
        assert_eq!(config.on_anomaly, AnomalyPolicy::Clamp);
        assert!(config.access_token.is_none());
        assert!(config.hourly_rate.is_none());
    }

    #[test]
    fn test_config_file_values_are_loaded() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
access_token = "ya29.file-token"
api_base_url = "http://127.0.0.1:9999"
hourly_rate = 42.5
on_anomaly = "abort"
request_timeout_secs = 5
"#
        )
        .unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.access_token.as_deref(), Some("ya29.file-token"));
        assert_eq!(config.api_base_url, "http://127.0.0.1:9999");
        assert_eq!(config.hourly_rate.map(HourlyRate::value), Some(42.5));
        assert_eq!(config.on_anomaly, AnomalyPolicy::Abort);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_negative_rate_in_config_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "hourly_rate = -10.0").unwrap();
        assert!(Config::load_from(Some(file.path())).is_err());
    }

    #[test]
    fn test_debug_redacts_access_token() {
        let config = Config {
            access_token: Some("ya29.secret".to_string()),
            ..Config::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("ya29.secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_blank_access_token_is_missing() {
        let config = Config {
            access_token: Some("   ".to_string()),
            ..Config::default()
        };
        assert!(config.require_access_token().is_err());
    }
}
