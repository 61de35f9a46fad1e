//! Configuration file parser for ~/.config/cinerank/config.toml.
//!
//! The config file is optional. A missing or empty file yields `Config::default()`,
//! which points at the live chart and reproduces the stock request headers and
//! retry timings. Unknown keys are accepted but logged, since they are usually typos.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::retry::RetryPolicy;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid URL for `{key}`: {reason}")]
    InvalidUrl { key: &'static str, reason: String },
}

// ============================================================================
// Configuration
// ============================================================================

pub const DEFAULT_CHART_URL: &str = "https://www.imdb.com/chart/top/";
pub const DEFAULT_SITE_URL: &str = "https://www.imdb.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
pub const DEFAULT_DATA_FILE: &str = "movie_data.json";

/// Runtime settings for the movie manager and the command-line front end.
///
/// Every field has a default, so a config file may name any subset of keys.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Page listing the ranked chart.
    pub chart_url: String,

    /// Site root used for search, title and plot summary pages.
    pub site_url: String,

    pub user_agent: String,
    pub accept_language: String,

    /// Attempts per title lookup, including the first.
    pub max_attempts: u32,

    /// Fixed pause between failed lookup attempts.
    pub retry_delay_secs: f64,

    /// Pause between successful lookups during a bulk fetch.
    pub pacing_secs: f64,

    /// Chart size used when a bulk fetch has to discover the chart first.
    pub default_limit: u32,

    /// Per-request timeout. 0 leaves requests unbounded.
    pub request_timeout_secs: u64,

    /// JSON cache location.
    pub data_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chart_url: DEFAULT_CHART_URL.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            max_attempts: 3,
            retry_delay_secs: 2.0,
            pacing_secs: 1.0,
            default_limit: 10,
            request_timeout_secs: 30,
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
        }
    }
}

impl Config {
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 10] = [
        "chart_url",
        "site_url",
        "user_agent",
        "accept_language",
        "max_attempts",
        "retry_delay_secs",
        "pacing_secs",
        "default_limit",
        "request_timeout_secs",
        "data_file",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing or empty file → `Ok(Config::default())`
    /// - Invalid TOML or wrong value types → `Err(ConfigError::Parse)`
    /// - Unparseable `chart_url` / `site_url` → `Err(ConfigError::InvalidUrl)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        tracing::info!(path = %path.display(), chart = %config.chart_url, "Loaded configuration");
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [("chart_url", &self.chart_url), ("site_url", &self.site_url)] {
            let parsed = url::Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
                key,
                reason: e.to_string(),
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidUrl {
                    key,
                    reason: format!("unsupported scheme `{}`", parsed.scheme()),
                });
            }
        }
        Ok(())
    }

    /// Retry policy for title lookups built from `max_attempts` and `retry_delay_secs`.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, secs(self.retry_delay_secs))
    }

    pub fn pacing(&self) -> Duration {
        secs(self.pacing_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

/// Negative or non-finite values collapse to zero rather than panicking in
/// `Duration::from_secs_f64`.
fn secs(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_secs_f64(value)
    } else {
        Duration::ZERO
    }
}

/// Default config location: `$HOME/.config/cinerank/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("cinerank")
            .join("config.toml"),
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.chart_url, DEFAULT_CHART_URL);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_policy().delay(), Duration::from_secs(2));
        assert_eq!(config.pacing(), Duration::from_secs(1));
        assert_eq!(config.default_limit, 10);
        assert_eq!(config.data_file, PathBuf::from("movie_data.json"));
    }

    #[test]
    fn test_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.site_url, DEFAULT_SITE_URL);
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let (_dir, path) = write_config("  \n\n ");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.max_attempts, 3);
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let (_dir, path) = write_config("max_attempts = 5\npacing_secs = 0.25\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.pacing(), Duration::from_millis(250));
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_full_config() {
        let (_dir, path) = write_config(
            r#"
chart_url = "http://127.0.0.1:9000/chart/top/"
site_url = "http://127.0.0.1:9000"
user_agent = "cinerank-test"
accept_language = "de-DE"
max_attempts = 1
retry_delay_secs = 0
pacing_secs = 0
default_limit = 25
request_timeout_secs = 0
data_file = "/tmp/movies.json"
"#,
        );
        let config = Config::load(&path).unwrap();
        assert_eq!(config.chart_url, "http://127.0.0.1:9000/chart/top/");
        assert_eq!(config.accept_language, "de-DE");
        assert_eq!(config.default_limit, 25);
        assert_eq!(config.retry_policy().max_attempts(), 1);
        assert_eq!(config.retry_policy().delay(), Duration::ZERO);
        assert!(config.request_timeout().is_none());
        assert_eq!(config.data_file, PathBuf::from("/tmp/movies.json"));
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let (_dir, path) = write_config("this is not [valid toml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let (_dir, path) = write_config("max_attempts = \"three\"\n");
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let (_dir, path) = write_config("default_limit = 3\nposter_size = \"large\"\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.default_limit, 3);
    }

    #[test]
    fn test_bad_url_rejected() {
        let (_dir, path) = write_config("chart_url = \"ftp://example.com/chart\"\n");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { key: "chart_url", .. }));
    }

    #[test]
    fn test_too_large_file_rejected() {
        let (_dir, path) = write_config(&"#".repeat(1_048_577));
        assert!(matches!(Config::load(&path), Err(ConfigError::TooLarge(_))));
    }

    #[test]
    fn test_negative_durations_clamp_to_zero() {
        let config = Config {
            retry_delay_secs: -4.0,
            pacing_secs: f64::NAN,
            ..Config::default()
        };
        assert_eq!(config.retry_policy().delay(), Duration::ZERO);
        assert_eq!(config.pacing(), Duration::ZERO);
    }
}
