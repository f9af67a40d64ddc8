//! Client configuration.
//!
//! The configuration is the mapping `{ url, api_key, url_v1?, api_version? }`
//! plus transport and logging tuning. It can be built in code or loaded from
//! TOML; `validate` turns it into a `ResolvedConfig` the client can use.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{KoboError, KoboResult};

/// Client configuration as supplied by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the asset API (e.g. "https://eu.kobotoolbox.org").
    #[serde(default)]
    pub url: Option<String>,

    /// API token sent as `Authorization: Token <api_key>`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the legacy submission/media API (e.g. "https://kc-eu.kobotoolbox.org").
    #[serde(default)]
    pub url_v1: Option<String>,

    /// API version selector, "v2" when absent.
    #[serde(default)]
    pub api_version: Option<String>,

    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,

    /// Accept invalid TLS certificates (self-hosted servers).
    #[serde(default)]
    pub accept_invalid_certs: bool,

    /// Directory for transient submission files; the system temp dir when absent.
    #[serde(default)]
    pub temp_dir: Option<String>,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for log files. If empty, logs go to the console only.
    #[serde(default)]
    pub directory: String,

    /// Enable JSON structured logging output.
    #[serde(default)]
    pub json_output: bool,
}

/// Validated configuration with normalized URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Asset API base URL without trailing slash.
    pub base_url: String,
    /// API token.
    pub api_key: String,
    /// Legacy API base URL without trailing slash.
    pub legacy_base_url: Option<String>,
    /// API version selector.
    pub api_version: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Accept invalid TLS certificates.
    pub accept_invalid_certs: bool,
    /// Directory for transient submission files.
    pub temp_dir: Option<PathBuf>,
}

fn default_timeout() -> u64 {
    constants::DEFAULT_TIMEOUT_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
            json_output: false,
        }
    }
}

impl ClientConfig {
    /// Create a configuration with the two mandatory values.
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            api_key: Some(api_key.into()),
            timeout_ms: default_timeout(),
            ..Self::default()
        }
    }

    /// Set the legacy API base URL.
    pub fn with_legacy_url(mut self, url_v1: impl Into<String>) -> Self {
        self.url_v1 = Some(url_v1.into());
        self
    }

    /// Set the API version selector.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Set the directory transient submission files are written to.
    pub fn with_temp_dir(mut self, dir: impl Into<String>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> KoboResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> KoboResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Save configuration to a specific file path.
    pub fn save_to_file(&self, path: &Path) -> KoboResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| KoboError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> KoboResult<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| KoboError::Config("could not determine config directory".into()))?;
        Ok(dir.join(constants::APP_NAME).join("config.toml"))
    }

    /// Check the mandatory values and normalize URLs.
    ///
    /// No network access happens here.
    pub fn validate(&self) -> KoboResult<ResolvedConfig> {
        let url = non_blank(self.url.as_deref())
            .ok_or_else(|| KoboError::Config("configuration must include a URL".into()))?;
        let api_key = non_blank(self.api_key.as_deref())
            .ok_or_else(|| KoboError::Config("configuration must include an API key".into()))?;

        let base_url = normalize_base_url(url)?;
        let legacy_base_url = non_blank(self.url_v1.as_deref())
            .map(normalize_base_url)
            .transpose()?;

        let api_version = non_blank(self.api_version.as_deref())
            .unwrap_or(constants::DEFAULT_API_VERSION)
            .to_string();

        Ok(ResolvedConfig {
            base_url,
            api_key: api_key.to_string(),
            legacy_base_url,
            api_version,
            timeout: Duration::from_millis(self.timeout_ms),
            accept_invalid_certs: self.accept_invalid_certs,
            temp_dir: non_blank(self.temp_dir.as_deref()).map(PathBuf::from),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Strip trailing slashes and check the URL is absolute http(s).
pub fn normalize_base_url(address: &str) -> KoboResult<String> {
    let trimmed = address.trim().trim_end_matches('/');
    let parsed = url::Url::parse(trimmed)
        .map_err(|e| KoboError::Config(format!("invalid URL {trimmed:?}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(KoboError::Config(format!(
            "unsupported URL scheme {other:?} in {trimmed:?}"
        ))),
    }
}
