//! Configuration file parser for ~/.config/devread/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are ignored by serde, though we log a warning for each so
//! typos don't go unnoticed.
use crate::api::{parse_base_url, ApiError, DEFAULT_BASE_URL};
use crate::state::DEFAULT_RETRY_DELAY;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable that overrides `api_base_url`.
pub const BASE_URL_ENV: &str = "DEVREAD_API_BASE_URL";

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

    #[error("Invalid api_base_url: {0}")]
    InvalidBaseUrl(#[from] ApiError),
}

// ============================================================================
// Configuration Struct
// ============================================================================

/// Session configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the content API, e.g. `https://dev.to/api`.
    pub api_base_url: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Delay before retrying a failed fresh listing fetch, in milliseconds.
    pub retry_delay_ms: u64,

    /// Maximum number of cached full articles. Unset or 0 = unbounded.
    pub detail_cache_capacity: Option<usize>,

    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 30,
            retry_delay_ms: DEFAULT_RETRY_DELAY.as_millis() as u64,
            detail_cache_capacity: None,
            user_agent: concat!("devread/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 5] = [
        "api_base_url",
        "request_timeout_secs",
        "retry_delay_ms",
        "detail_cache_capacity",
        "user_agent",
    ];

    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults. Anything else goes through
    /// [`Config::from_toml`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let Some(content) = read_bounded(path, Self::MAX_FILE_SIZE)? else {
            tracing::debug!(path = %path.display(), "No config file found, using defaults");
            return Ok(Self::default());
        };
        let config = Self::from_toml(&content)?;
        tracing::info!(path = %path.display(), base_url = %config.api_base_url, "Loaded configuration");
        Ok(config)
    }

    /// Parse and validate config text. Blank text yields the defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        if let Ok(table) = content.parse::<toml::Table>() {
            table
                .keys()
                .filter(|key| !Self::KNOWN_KEYS.contains(&key.as_str()))
                .for_each(|key| tracing::warn!(key = %key, "Unknown key in config file, ignoring"));
        }
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Settings that deserialize fine but cannot be used.
    fn validate(&self) -> Result<(), ConfigError> {
        parse_base_url(&self.api_base_url)?;
        Ok(())
    }

    /// Apply `DEVREAD_API_BASE_URL` on top of the file value.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_base_url_override(std::env::var(BASE_URL_ENV).ok())
    }

    fn with_base_url_override(mut self, base_url: Option<String>) -> Result<Self, ConfigError> {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            tracing::debug!(base_url = %url, "API base URL overridden by environment");
            self.api_base_url = url;
            self.validate()?;
        }
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn cache_capacity(&self) -> Option<NonZeroUsize> {
        self.detail_cache_capacity.and_then(NonZeroUsize::new)
    }
}

/// Read at most `limit` bytes of `path`; `None` when the file doesn't exist.
fn read_bounded(path: &Path, limit: u64) -> Result<Option<String>, ConfigError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ConfigError::Io(e)),
    };
    let mut bytes = Vec::new();
    file.take(limit + 1).read_to_end(&mut bytes)?;
    if bytes.len() as u64 > limit {
        return Err(ConfigError::TooLarge(format!(
            "Config file exceeds {limit} bytes"
        )));
    }
    String::from_utf8(bytes)
        .map(Some)
        .map_err(|e| ConfigError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("devread_config_test_{name}"));
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
        assert_eq!(config.api_base_url, "https://dev.to/api");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.retry_delay(), DEFAULT_RETRY_DELAY);
        assert!(config.cache_capacity().is_none());
        assert!(config.user_agent.starts_with("devread/"));
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/devread_test_nonexistent_config.toml");
        assert_eq!(Config::load(path).unwrap(), Config::default());
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let path = write_config("whitespace", "   \n  \n  ");
        assert_eq!(Config::load(&path).unwrap(), Config::default());
        cleanup(&path);
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let path = write_config("partial", "retry_delay_ms = 250\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.retry_delay(), Duration::from_millis(250));
        assert_eq!(config.api_base_url, "https://dev.to/api");
        cleanup(&path);
    }

    #[test]
    fn test_full_config() {
        let path = write_config(
            "full",
            r#"
api_base_url = "http://localhost:4000/api"
request_timeout_secs = 5
retry_delay_ms = 10
detail_cache_capacity = 64
user_agent = "custom/1.0"
"#,
        );
        let config = Config::load(&path).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:4000/api");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.cache_capacity().map(NonZeroUsize::get), Some(64));
        assert_eq!(config.user_agent, "custom/1.0");
        cleanup(&path);
    }

    #[test]
    fn test_zero_capacity_means_unbounded() {
        let path = write_config("zero_cap", "detail_cache_capacity = 0\n");
        assert!(Config::load(&path).unwrap().cache_capacity().is_none());
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
    fn test_insecure_base_url_rejected() {
        let path = write_config("insecure", "api_base_url = \"http://dev.to/api\"\n");
        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::InvalidBaseUrl(ApiError::InsecureBaseUrl))
        ));
        cleanup(&path);
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let path = write_config("unknown", "retry_delay_ms = 5\ntheme = \"dark\"\n");
        assert_eq!(Config::load(&path).unwrap().retry_delay_ms, 5);
        cleanup(&path);
    }

    #[test]
    fn test_too_large_file_rejected() {
        let path = write_config("too_large", &"a".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        cleanup(&path);
    }

    #[test]
    fn test_from_toml_validates_without_a_file() {
        let config = Config::from_toml("request_timeout_secs = 0\n").unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
        assert!(matches!(
            Config::from_toml("api_base_url = \"http://example.com\"\n"),
            Err(ConfigError::InvalidBaseUrl(ApiError::InsecureBaseUrl))
        ));
    }

    #[test]
    fn test_non_utf8_file_is_io_error() {
        let dir = std::env::temp_dir().join("devread_config_test_non_utf8");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Io(_))));
        cleanup(&path);
    }

    #[test]
    fn test_base_url_override() {
        let config = Config::default()
            .with_base_url_override(Some("http://127.0.0.1:9999".to_string()))
            .unwrap();
        assert_eq!(config.api_base_url, "http://127.0.0.1:9999");

        let config = Config::default().with_base_url_override(Some("  ".to_string())).unwrap();
        assert_eq!(config.api_base_url, "https://dev.to/api");

        assert!(Config::default()
            .with_base_url_override(Some("ftp://example.com".to_string()))
            .is_err());
    }
}
