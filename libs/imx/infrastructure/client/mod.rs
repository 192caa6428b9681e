//! Immutable X API clients
//!
//! Two interchangeable backends implement [`MarketplaceBackend`]:
//!
//! - **REST**: plain HTTP against the public API, used when no credential is set
//! - **SDK**: credentialed session (Alchemy-backed Ethereum provider plus
//!   fluent request builders), used when an Alchemy key is configured
//!
//! Both fetch exactly one page per call; the pagination engine drives them.

pub mod http;
pub mod params;
pub mod rest;
pub mod sdk;

pub use params::QueryParams;
pub use rest::RestBackend;
pub use sdk::SdkBackend;

use crate::domain::{
    Asset, AssetFilters, Collection, CollectionFilters, Continuation, Order, OrderFilters, Page,
};
use crate::infrastructure::config::ConfigError;
use crate::infrastructure::shortcuts::ShortcutResolver;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Page size requested for assets and collections
pub const MAX_PAGE_SIZE: usize = 200;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Deserialization failed: {0}")]
    DeserializeFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Backend session not started")]
    NotStarted,

    #[error("Ethereum provider error: {0}")]
    Provider(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Which backend variant is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Rest,
    Sdk,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Rest => f.write_str("rest"),
            BackendKind::Sdk => f.write_str("sdk"),
        }
    }
}

/// Contract shared by both backends
#[async_trait]
pub trait MarketplaceBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Open the backend session. Repeated calls are no-ops.
    async fn start(&self) -> Result<()>;

    /// Release the backend session. Safe when never started.
    async fn stop(&self);

    /// Fetch one asset. `token_address` may be a shortcut alias.
    async fn get_asset(&self, token_address: &str, token_id: &str, include_fees: bool)
        -> Result<Asset>;

    /// Fetch one collection. `address` may be a shortcut alias.
    async fn get_collection(&self, address: &str) -> Result<Collection>;

    async fn get_order(&self, order_id: &str, include_fees: bool) -> Result<Order>;

    /// Fetch a single page of assets
    async fn list_assets(
        &self,
        filters: &AssetFilters,
        continuation: &Continuation,
    ) -> Result<Page<Asset>>;

    /// Fetch a single page of collections
    async fn list_collections(
        &self,
        filters: &CollectionFilters,
        continuation: &Continuation,
    ) -> Result<Page<Collection>>;

    /// Fetch a single page of orders
    async fn list_orders(
        &self,
        filters: &OrderFilters,
        continuation: &Continuation,
    ) -> Result<Page<Order>>;
}

/// Shared handle to whichever backend was selected
pub type SharedBackend = Arc<dyn MarketplaceBackend>;

/// REST backend settings
#[derive(Debug, Clone)]
pub struct RestConfig {
    pub base_url: String,
    pub timeout: Duration,
}

/// SDK backend settings
#[derive(Clone)]
pub struct SdkConfig {
    pub alchemy_key: String,
    pub api_url: String,
    /// Overrides the Alchemy mainnet endpoint derived from the key
    pub eth_rpc_url: Option<String>,
    pub timeout: Duration,
}

impl SdkConfig {
    pub fn rpc_url(&self) -> String {
        match &self.eth_rpc_url {
            Some(url) => url.clone(),
            None => format!("https://eth-mainnet.g.alchemy.com/v2/{}", self.alchemy_key),
        }
    }
}

impl fmt::Debug for SdkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdkConfig")
            .field("alchemy_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("eth_rpc_url", &self.eth_rpc_url.as_ref().map(|_| "<set>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Backend selection, decided once at construction
#[derive(Debug, Clone)]
pub enum BackendConfig {
    Rest(RestConfig),
    Sdk(SdkConfig),
}

/// Build the backend described by `config`
pub fn new_backend(
    config: BackendConfig,
    shortcuts: Arc<ShortcutResolver>,
) -> std::result::Result<SharedBackend, ConfigError> {
    match config {
        BackendConfig::Rest(rest) => {
            if rest.base_url.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "REST backend requires a base URL".to_string(),
                ));
            }
            Ok(Arc::new(RestBackend::new(rest, shortcuts)?))
        }
        BackendConfig::Sdk(sdk) => {
            if sdk.alchemy_key.trim().is_empty() {
                return Err(ConfigError::EnvVarMissing(
                    crate::infrastructure::config::ENV_ALCHEMY_KEY.to_string(),
                ));
            }
            Ok(Arc::new(SdkBackend::new(sdk, shortcuts)))
        }
    }
}

/// Build the reqwest client used by both backends
pub(crate) fn build_http_client(timeout: Duration) -> std::result::Result<reqwest::Client, ConfigError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| ConfigError::ValidationError(format!("could not build HTTP client: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shortcuts() -> Arc<ShortcutResolver> {
        Arc::new(ShortcutResolver::builtin())
    }

    #[test]
    fn test_new_backend_rest() {
        let backend = new_backend(
            BackendConfig::Rest(RestConfig {
                base_url: "http://localhost".to_string(),
                timeout: Duration::from_secs(5),
            }),
            shortcuts(),
        )
        .unwrap();
        assert_eq!(backend.kind(), BackendKind::Rest);
    }

    #[test]
    fn test_new_backend_sdk() {
        let backend = new_backend(
            BackendConfig::Sdk(SdkConfig {
                alchemy_key: "key".to_string(),
                api_url: "http://localhost".to_string(),
                eth_rpc_url: None,
                timeout: Duration::from_secs(5),
            }),
            shortcuts(),
        )
        .unwrap();
        assert_eq!(backend.kind(), BackendKind::Sdk);
    }

    #[test]
    fn test_sdk_without_key_is_config_error() {
        let result = new_backend(
            BackendConfig::Sdk(SdkConfig {
                alchemy_key: " ".to_string(),
                api_url: "http://localhost".to_string(),
                eth_rpc_url: None,
                timeout: Duration::from_secs(5),
            }),
            shortcuts(),
        );
        assert!(matches!(result, Err(ConfigError::EnvVarMissing(_))));
    }

    #[test]
    fn test_sdk_config_debug_redacts_key() {
        let config = SdkConfig {
            alchemy_key: "super-secret".to_string(),
            api_url: "http://localhost".to_string(),
            eth_rpc_url: None,
            timeout: Duration::from_secs(5),
        };
        assert!(!format!("{:?}", config).contains("super-secret"));
        assert!(config.rpc_url().ends_with("/v2/super-secret"));
    }
}
