//! Application Facade
//!
//! Wires configuration, shortcuts, the selected backend, the paginator and
//! the price cache into one handle for binaries.

use super::pagination::{ListResult, Paginator};
use crate::domain::{Asset, AssetFilters, Collection, CollectionFilters, Order, OrderFilters};
use crate::infrastructure::client::{self, new_backend, SharedBackend};
use crate::infrastructure::coinbase::{CoinbaseClient, CryptoSymbol, FiatSymbol, SpotPriceCache};
use crate::infrastructure::{ClientConfig, ShortcutResolver, ShutdownManager};
use std::sync::Arc;
use tracing::info;

/// Everything a command needs to talk to the marketplace
pub struct ImxApp {
    pub config: ClientConfig,
    pub shortcuts: Arc<ShortcutResolver>,
    pub backend: SharedBackend,
    pub prices: SpotPriceCache,
    pub shutdown: ShutdownManager,
    paginator: Paginator,
}

impl ImxApp {
    /// Build the app from configuration. The backend is not started yet.
    pub fn new(config: ClientConfig) -> anyhow::Result<Self> {
        let shortcuts = Arc::new(ShortcutResolver::load(config.shortcuts_path.as_deref()));
        let backend = new_backend(config.backend_config(), Arc::clone(&shortcuts))?;
        let coinbase = CoinbaseClient::new(config.coinbase_url.clone(), config.request_timeout())?;
        let prices = SpotPriceCache::with_ttl(Arc::new(coinbase), config.price_ttl());

        Ok(Self::from_parts(config, shortcuts, backend, prices))
    }

    pub fn from_parts(
        config: ClientConfig,
        shortcuts: Arc<ShortcutResolver>,
        backend: SharedBackend,
        prices: SpotPriceCache,
    ) -> Self {
        let shutdown = ShutdownManager::new();
        let paginator = Paginator::new(Arc::clone(&backend))
            .with_shutdown(shutdown.clone())
            .with_max_pages(config.max_pages);

        Self {
            config,
            shortcuts,
            backend,
            prices,
            shutdown,
            paginator,
        }
    }

    /// Start the backend session and install the Ctrl+C handler
    pub async fn start(&self) -> client::Result<()> {
        self.shutdown.spawn_signal_handler();
        self.backend.start().await?;
        info!("{} backend ready", self.backend.kind());
        Ok(())
    }

    pub async fn stop(&self) {
        self.backend.stop().await;
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    pub async fn list_assets(&self, filters: AssetFilters) -> ListResult<Asset> {
        self.paginator.list_assets(filters).await
    }

    pub async fn list_collections(&self, filters: CollectionFilters) -> ListResult<Collection> {
        self.paginator.list_collections(filters).await
    }

    pub async fn list_orders(&self, filters: OrderFilters) -> ListResult<Order> {
        self.paginator.list_orders(filters).await
    }

    pub async fn spot_price(&self, crypto: Option<CryptoSymbol>, fiat: Option<FiatSymbol>) -> f64 {
        self.prices.spot_price(crypto, fiat).await
    }
}
