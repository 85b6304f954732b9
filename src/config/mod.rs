//! Configuration management for the Govee hygrometer bridge
//!
//! The only value the bridge cannot run without is the vendor API key.
//! Everything else has a default and can be overridden from a TOML file or
//! from `GOVEE_*` environment variables.

use crate::error::{GoveeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::{env, fmt, time::Duration};
use url::Url;

/// Default vendor API host
pub const DEFAULT_BASE_URL: &str = "https://openapi.api.govee.com";

/// Bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BridgeConfig {
    /// Govee cloud API configuration
    pub govee: GoveeConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Govee cloud API configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoveeConfig {
    /// Key sent in the `Govee-API-Key` header
    pub api_key: String,

    /// API host, e.g. "https://openapi.api.govee.com"
    pub base_url: Url,

    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Extra attempts after a transient failure
    pub max_retries: u32,

    /// Base delay between attempts, multiplied by the attempt number
    #[serde(with = "humantime_serde")]
    pub retry_delay: Duration,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable structured JSON logging
    pub json_format: bool,

    /// Log to file (path)
    pub file: Option<String>,
}

impl Default for GoveeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: Duration::from_secs(10),
            max_retries: 1,
            retry_delay: Duration::from_millis(250),
        }
    }
}

impl fmt::Debug for GoveeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoveeConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .finish()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            file: None,
        }
    }
}

impl GoveeConfig {
    /// Config pointing at `base_url` with the given key, other fields defaulted
    pub fn new(api_key: impl Into<String>, base_url: Url) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: normalize_base_url(base_url),
            ..Self::default()
        }
    }
}

/// Endpoint paths are joined onto the base URL, which replaces its last
/// segment unless the path ends with a slash.
pub fn normalize_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

impl BridgeConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load a TOML file, then let environment variables override it
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Toml))
            .build()
            .map_err(|e| {
                GoveeError::config(format!("Failed to read {}: {e}", path.display()))
            })?;

        let mut config: Self = settings
            .try_deserialize()
            .map_err(|e| GoveeError::config(format!("Invalid {}: {e}", path.display())))?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(api_key) = env::var("GOVEE_API_KEY") {
            self.govee.api_key = api_key;
        }

        if let Ok(url) = env::var("GOVEE_BASE_URL") {
            self.govee.base_url = url
                .parse()
                .map_err(|e| GoveeError::config(format!("Invalid GOVEE_BASE_URL: {e}")))?;
        }

        if let Ok(timeout) = env::var("GOVEE_TIMEOUT") {
            self.govee.timeout = Duration::from_secs(
                timeout
                    .parse()
                    .map_err(|e| GoveeError::config(format!("Invalid GOVEE_TIMEOUT: {e}")))?,
            );
        }

        if let Ok(retries) = env::var("GOVEE_MAX_RETRIES") {
            self.govee.max_retries = retries
                .parse()
                .map_err(|e| GoveeError::config(format!("Invalid GOVEE_MAX_RETRIES: {e}")))?;
        }

        if let Ok(level) = env::var("RUST_LOG") {
            self.logging.level = level;
        }

        self.govee.base_url = normalize_base_url(self.govee.base_url.clone());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.govee.api_key.trim().is_empty() {
            return Err(GoveeError::config(
                "API key is required. Set GOVEE_API_KEY or govee.api_key",
            ));
        }

        if self.govee.base_url.scheme() != "http" && self.govee.base_url.scheme() != "https" {
            return Err(GoveeError::config("Base URL must use http or https scheme"));
        }

        if self.govee.timeout.is_zero() {
            return Err(GoveeError::config("Timeout must be greater than zero"));
        }

        Ok(())
    }
}
