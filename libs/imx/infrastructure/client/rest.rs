//! REST backend
//!
//! Direct HTTP against the public Immutable X API. Needs no credential, so
//! `start` and `stop` have nothing to do.

use super::http::{join_url, send_json};
use super::params::{asset_params, collection_params, order_params, QueryParams};
use super::{BackendKind, MarketplaceBackend, RestConfig, Result};
use crate::domain::{
    Asset, AssetFilters, Collection, CollectionFilters, Continuation, Order, OrderFilters, Page,
    Record, ResourceKind,
};
use crate::infrastructure::config::ConfigError;
use crate::infrastructure::shortcuts::ShortcutResolver;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::debug;

/// REST client for the Immutable X public API
pub struct RestBackend {
    base_url: String,
    client: Client,
    shortcuts: Arc<ShortcutResolver>,
}

impl RestBackend {
    /// Create new REST backend
    pub fn new(
        config: RestConfig,
        shortcuts: Arc<ShortcutResolver>,
    ) -> std::result::Result<Self, ConfigError> {
        Ok(Self {
            base_url: config.base_url,
            client: super::build_http_client(config.timeout)?,
            shortcuts,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_page<T: Record>(&self, params: QueryParams) -> Result<Page<T>> {
        let url = join_url(&self.base_url, T::KIND.path());

        debug!("GET {} with {} params", url, params.len());

        let request = self.client.get(&url).query(&params);
        send_json(request, &T::KIND.to_string()).await
    }
}

#[async_trait]
impl MarketplaceBackend for RestBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Rest
    }

    async fn start(&self) -> Result<()> {
        Ok(())
    }

    async fn stop(&self) {}

    async fn get_asset(
        &self,
        token_address: &str,
        token_id: &str,
        include_fees: bool,
    ) -> Result<Asset> {
        let token_address = self.shortcuts.resolve(token_address);

        debug!(
            "fetching asset id {} from collection {} (with fees: {})",
            token_id, token_address, include_fees
        );

        let url = join_url(
            &self.base_url,
            &format!("{}/{}/{}", ResourceKind::Asset.path(), token_address, token_id),
        );

        let mut params = QueryParams::new();
        params.set_flag("include_fees", include_fees);

        send_json(self.client.get(&url).query(&params), "asset").await
    }

    async fn get_collection(&self, address: &str) -> Result<Collection> {
        let address = self.shortcuts.resolve(address);

        debug!("fetching collection {}", address);

        let url = join_url(
            &self.base_url,
            &format!("{}/{}", ResourceKind::Collection.path(), address),
        );

        send_json(self.client.get(&url), "collection").await
    }

    async fn get_order(&self, order_id: &str, include_fees: bool) -> Result<Order> {
        debug!("fetching order {} (with fees: {})", order_id, include_fees);

        let url = join_url(
            &self.base_url,
            &format!("{}/{}", ResourceKind::Order.path(), order_id),
        );

        let mut params = QueryParams::new();
        params.set_flag("include_fees", include_fees);

        send_json(self.client.get(&url).query(&params), "order").await
    }

    async fn list_assets(
        &self,
        filters: &AssetFilters,
        continuation: &Continuation,
    ) -> Result<Page<Asset>> {
        self.fetch_page(asset_params(filters, continuation, &self.shortcuts))
            .await
    }

    async fn list_collections(
        &self,
        filters: &CollectionFilters,
        continuation: &Continuation,
    ) -> Result<Page<Collection>> {
        self.fetch_page(collection_params(filters, continuation, &self.shortcuts))
            .await
    }

    async fn list_orders(
        &self,
        filters: &OrderFilters,
        continuation: &Continuation,
    ) -> Result<Page<Order>> {
        self.fetch_page(order_params(filters, continuation, &self.shortcuts))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_rest_backend_creation() {
        let backend = RestBackend::new(
            RestConfig {
                base_url: "https://api.x.immutable.com".to_string(),
                timeout: Duration::from_secs(30),
            },
            Arc::new(ShortcutResolver::empty()),
        )
        .unwrap();
        assert_eq!(backend.base_url(), "https://api.x.immutable.com");
        assert_eq!(backend.kind(), BackendKind::Rest);
    }

    #[tokio::test]
    async fn test_start_and_stop_are_noops() {
        let backend = RestBackend::new(
            RestConfig {
                base_url: "http://localhost".to_string(),
                timeout: Duration::from_secs(1),
            },
            Arc::new(ShortcutResolver::empty()),
        )
        .unwrap();

        backend.stop().await;
        assert!(backend.start().await.is_ok());
        assert!(backend.start().await.is_ok());
        backend.stop().await;
        backend.stop().await;
    }
}
