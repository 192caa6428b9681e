//! Client configuration
//!
//! Settings come from an optional YAML file, then environment variables
//! (a `.env` file is honoured). The Alchemy key only ever comes from the
//! environment.

use crate::infrastructure::client::{BackendConfig, RestConfig, SdkConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_API_URL: &str = "https://api.x.immutable.com";
pub const DEFAULT_COINBASE_URL: &str = "https://api.coinbase.com";

pub const ENV_API_URL: &str = "IMX_API_URL";
pub const ENV_ALCHEMY_KEY: &str = "ALCHEMY_API_KEY";
pub const ENV_SHORTCUT_LOCATION: &str = "IMX_SHORTCUT_LOCATION";
pub const ENV_COINBASE_URL: &str = "COINBASE_API_URL";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarMissing(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Settings shared by the backends, the price cache and the binary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Immutable X API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Coinbase API base URL (spot prices)
    #[serde(default = "default_coinbase_url")]
    pub coinbase_url: String,

    /// JSON file with collection shortcuts
    #[serde(default)]
    pub shortcuts_path: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Per-request HTTP timeout
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// How long a spot price stays fresh
    #[serde(default = "default_price_ttl_secs")]
    pub price_ttl_secs: u64,

    /// Stop a listing after this many pages (unbounded when unset)
    #[serde(default)]
    pub max_pages: Option<usize>,

    /// Alchemy key from .env (not in YAML)
    #[serde(skip)]
    pub alchemy_key: Option<String>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_coinbase_url() -> String {
    DEFAULT_COINBASE_URL.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_price_ttl_secs() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            coinbase_url: default_coinbase_url(),
            shortcuts_path: None,
            log_level: default_log_level(),
            request_timeout_secs: default_timeout_secs(),
            price_ttl_secs: default_price_ttl_secs(),
            max_pages: None,
            alchemy_key: None,
        }
    }
}

impl ClientConfig {
    /// Build configuration from the environment only
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // Don't fail if .env doesn't exist

        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file, then apply environment overrides
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let yaml_content = std::fs::read_to_string(config_path)?;
        let mut config: ClientConfig = serde_yaml::from_str(&yaml_content)?;

        dotenv::dotenv().ok();
        config.apply_overrides(|key| std::env::var(key).ok());

        config.validate()?;
        Ok(config)
    }

    /// Load the YAML file when it exists, otherwise fall back to the environment
    pub fn load_or_env(config_path: impl AsRef<Path>) -> Result<Self> {
        let path = config_path.as_ref();
        if path.exists() {
            info!("Loading configuration from {:?}", path);
            Self::load(path)
        } else {
            Self::from_env()
        }
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production, a map in tests). Empty values count as unset.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_API_URL) {
            info!("Overriding API URL from environment variable");
            self.api_url = url;
        }

        if let Some(url) = get(ENV_COINBASE_URL) {
            self.coinbase_url = url;
        }

        if let Some(path) = get(ENV_SHORTCUT_LOCATION) {
            self.shortcuts_path = Some(PathBuf::from(path));
        }

        if let Some(level) = get(ENV_LOG_LEVEL) {
            self.log_level = level;
        }

        self.alchemy_key = get(ENV_ALCHEMY_KEY);
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "api_url cannot be empty".to_string(),
            ));
        }

        if self.coinbase_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "coinbase_url cannot be empty".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.max_pages == Some(0) {
            return Err(ConfigError::ValidationError(
                "max_pages must be greater than 0 when set".to_string(),
            ));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "log_level must be one of: {}",
                valid_levels.join(", ")
            )));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn price_ttl(&self) -> Duration {
        Duration::from_secs(self.price_ttl_secs)
    }

    /// Pick the backend: SDK when an Alchemy key is present, REST otherwise
    pub fn backend_config(&self) -> BackendConfig {
        match &self.alchemy_key {
            Some(key) => BackendConfig::Sdk(SdkConfig {
                alchemy_key: key.clone(),
                api_url: self.api_url.clone(),
                eth_rpc_url: None,
                timeout: self.request_timeout(),
            }),
            None => BackendConfig::Rest(RestConfig {
                base_url: self.api_url.clone(),
                timeout: self.request_timeout(),
            }),
        }
    }

    /// Log configuration summary
    pub fn log(&self) {
        info!("Configuration loaded:");
        info!("  API URL: {}", self.api_url);
        info!("  Coinbase URL: {}", self.coinbase_url);
        info!(
            "  Backend: {}",
            if self.alchemy_key.is_some() { "sdk (alchemy)" } else { "rest" }
        );
        info!("  Shortcuts: {:?}", self.shortcuts_path);
        info!("  Request timeout: {} seconds", self.request_timeout_secs);
        info!("  Price TTL: {} seconds", self.price_ttl_secs);
        info!("  Log level: {}", self.log_level);
    }
}
