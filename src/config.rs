//! Configuration file parser for ~/.config/newsfeed/config.toml.
//!
//! The config file is optional. A missing or empty file yields
//! `Config::default()`; unknown keys are accepted but logged, since they are
//! usually typos.
use crate::api::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::feed::{ScreenKind, ScreenSettings, DEFAULT_POLL_INTERVAL};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

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

    #[error("Invalid config value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

// ============================================================================
// Configuration
// ============================================================================

const KNOWN_KEYS: [&str; 6] = [
    "base_url",
    "request_timeout_secs",
    "poll_interval_secs",
    "poll_popular",
    "skip_overlapping_polls",
    "theme",
];

/// Top-level application configuration.
///
/// Every field has a default, so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API root; the feed lives at `{base_url}/news-feeds`.
    pub base_url: String,

    /// Upper bound on one request including the body read.
    pub request_timeout_secs: u64,

    /// Poll period in seconds. 0 = manual refresh only.
    pub poll_interval_secs: u64,

    /// Whether the Popular screen polls too. It does not by default.
    pub poll_popular: bool,

    /// Skip a poll tick while the previous load is still in flight.
    pub skip_overlapping_polls: bool,

    /// Theme variant name ("dark" or "light").
    pub theme: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            poll_popular: false,
            skip_overlapping_polls: false,
            theme: "dark".to_string(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Longest accepted poll period.
    pub const MAX_POLL_INTERVAL_SECS: u64 = 86_400;

    /// `$HOME/.config/newsfeed/config.toml`, or `None` when HOME is unset.
    pub fn default_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME")?;
        Some(
            PathBuf::from(home)
                .join(".config")
                .join("newsfeed")
                .join("config.toml"),
        )
    }

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    ///
    /// Values are not validated here; call [`Config::validate`] after applying
    /// command-line overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check size before reading so a corrupted file cannot exhaust memory
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

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            base_url = %config.base_url,
            poll_interval_secs = config.poll_interval_secs,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Reject values the client cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = url::Url::parse(&self.base_url).map_err(|e| ConfigError::Invalid {
            key: "base_url",
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                key: "base_url",
                reason: format!("unsupported scheme `{}`", url.scheme()),
            });
        }
        if self.poll_interval_secs > Self::MAX_POLL_INTERVAL_SECS {
            return Err(ConfigError::Invalid {
                key: "poll_interval_secs",
                reason: format!("must be at most {} (one day)", Self::MAX_POLL_INTERVAL_SECS),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "request_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `None` when polling is disabled.
    pub fn poll_interval(&self) -> Option<Duration> {
        (self.poll_interval_secs > 0).then(|| Duration::from_secs(self.poll_interval_secs))
    }

    /// Screen settings derived from this config.
    pub fn screen_settings(&self, kind: ScreenKind) -> ScreenSettings {
        let polls = match kind {
            ScreenKind::Latest => true,
            ScreenKind::Popular => self.poll_popular,
        };
        ScreenSettings {
            poll_interval: if polls { self.poll_interval() } else { None },
            skip_overlapping_polls: self.skip_overlapping_polls,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("newsfeed_config_test_{}", name));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://your-api.ru/api/guest");
        assert_eq!(config.request_timeout_secs, 15);
        assert_eq!(config.poll_interval_secs, 60);
        assert!(!config.poll_popular);
        assert!(!config.skip_overlapping_polls);
        assert_eq!(config.theme, "dark");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/newsfeed_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_empty_file_returns_default() {
        let path = write_config("empty", "   \n  \n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());
        cleanup(&path);
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let path = write_config("partial", "poll_interval_secs = 30\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.poll_interval_secs, 30);
        assert_eq!(config.request_timeout_secs, 15);
        assert_eq!(config.theme, "dark");
        cleanup(&path);
    }

    #[test]
    fn test_full_config() {
        let content = r#"
base_url = "https://news.example.com/api/guest"
request_timeout_secs = 5
poll_interval_secs = 0
poll_popular = true
skip_overlapping_polls = true
theme = "light"
"#;
        let path = write_config("full", content);
        let config = Config::load(&path).unwrap();
        assert_eq!(config.base_url, "https://news.example.com/api/guest");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.poll_interval(), None);
        assert!(config.poll_popular);
        assert!(config.skip_overlapping_polls);
        assert_eq!(config.theme, "light");
        cleanup(&path);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let path = write_config("invalid", "this is not [valid toml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
        cleanup(&path);
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let path = write_config("unknown", "theme = \"dark\"\nrefresh_minutes = 5\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.theme, "dark");
        cleanup(&path);
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let path = write_config("wrongtype", "poll_interval_secs = \"often\"\n");
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
        cleanup(&path);
    }

    #[test]
    fn test_too_large_file_rejected() {
        let path = write_config("too_large", &"a".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));
        cleanup(&path);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config {
            base_url: "ftp://news.example.com".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { key: "base_url", .. })
        ));

        let config = Config {
            base_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                key: "request_timeout_secs",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_bounds_poll_interval() {
        let config = Config {
            poll_interval_secs: Config::MAX_POLL_INTERVAL_SECS,
            ..Config::default()
        };
        assert!(config.validate().is_ok());

        let config = Config {
            poll_interval_secs: u64::MAX,
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "poll_interval_secs",
                ..
            }
        ));
        assert!(err.to_string().contains("at most 86400"));
    }

    #[test]
    fn test_screen_settings() {
        let config = Config::default();
        assert_eq!(
            config.screen_settings(ScreenKind::Latest).poll_interval,
            Some(Duration::from_secs(60))
        );
        assert_eq!(config.screen_settings(ScreenKind::Popular).poll_interval, None);

        let config = Config {
            poll_popular: true,
            poll_interval_secs: 0,
            skip_overlapping_polls: true,
            ..Config::default()
        };
        let settings = config.screen_settings(ScreenKind::Popular);
        assert_eq!(settings.poll_interval, None);
        assert!(settings.skip_overlapping_polls);
    }
}
