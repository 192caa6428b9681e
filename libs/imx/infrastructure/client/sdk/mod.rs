//! SDK backend
//!
//! Credentialed session: an Alchemy-backed Ethereum provider plus an HTTP
//! session that issues fluent list/get requests against the Immutable X API.
//! Filters are applied through the request builders in [`request`].

pub mod request;

pub use request::{GetRequest, ListRequest};

use super::{BackendKind, ClientError, MarketplaceBackend, Result, SdkConfig, MAX_PAGE_SIZE};
use crate::domain::filters::non_empty;
use crate::domain::{
    parse_metadata, Asset, AssetFilters, Collection, CollectionFilters, Continuation, Order,
    OrderFilters, Page, Record, ResourceKind,
};
use crate::infrastructure::shortcuts::ShortcutResolver;
use async_trait::async_trait;
use ethers::providers::{Http, Middleware, Provider};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

/// Live session state, present between `start` and `stop`
pub struct SdkSession {
    api_url: String,
    http: reqwest::Client,
    eth: Arc<Provider<Http>>,
    chain_id: u64,
}

impl SdkSession {
    pub fn list<T: Record>(&self) -> ListRequest<'_, T> {
        ListRequest::new(self)
    }

    pub fn get_asset(&self, token_address: &str, token_id: &str) -> GetRequest<'_, Asset> {
        GetRequest::new(
            self,
            format!("{}/{}/{}", ResourceKind::Asset.path(), token_address, token_id),
        )
    }

    pub fn get_collection(&self, address: &str) -> GetRequest<'_, Collection> {
        GetRequest::new(self, format!("{}/{}", ResourceKind::Collection.path(), address))
    }

    pub fn get_order(&self, order_id: &str) -> GetRequest<'_, Order> {
        GetRequest::new(self, format!("{}/{}", ResourceKind::Order.path(), order_id))
    }

    /// Ethereum JSON-RPC provider opened with the Alchemy key
    pub fn eth_provider(&self) -> Arc<Provider<Http>> {
        Arc::clone(&self.eth)
    }

    /// Chain id reported by the provider when the session was opened
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }
}

/// Backend that requires `start` before any request
pub struct SdkBackend {
    config: SdkConfig,
    shortcuts: Arc<ShortcutResolver>,
    session: RwLock<Option<Arc<SdkSession>>>,
}

impl SdkBackend {
    pub fn new(config: SdkConfig, shortcuts: Arc<ShortcutResolver>) -> Self {
        Self {
            config,
            shortcuts,
            session: RwLock::new(None),
        }
    }

    pub fn is_started(&self) -> bool {
        self.session.read().is_some()
    }

    /// Current session, or [`ClientError::NotStarted`]
    pub fn session(&self) -> Result<Arc<SdkSession>> {
        self.session.read().clone().ok_or(ClientError::NotStarted)
    }

    /// Open the provider and check the key with an `eth_chainId` call
    async fn open_session(&self) -> Result<SdkSession> {
        if self.config.alchemy_key.trim().is_empty() {
            return Err(ClientError::Provider("no alchemy api key provided".to_string()));
        }

        let eth = Provider::<Http>::try_from(self.config.rpc_url().as_str())
            .map_err(|e| ClientError::Provider(e.to_string()))?;

        let chain_id = eth
            .get_chainid()
            .await
            .map_err(|e| ClientError::Provider(format!("credential check failed: {}", e)))?
            .as_u64();

        let http = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .build()?;

        Ok(SdkSession {
            api_url: self.config.api_url.clone(),
            http,
            eth: Arc::new(eth),
            chain_id,
        })
    }

    /// Build the asset list request for one page
    pub fn asset_request<'a>(
        &self,
        session: &'a SdkSession,
        filters: &AssetFilters,
        continuation: &Continuation,
    ) -> ListRequest<'a, Asset> {
        let mut req = session
            .list::<Asset>()
            .page_size(MAX_PAGE_SIZE)
            .order_by(non_empty(&filters.order_by).unwrap_or("updated_at"));

        if let Some(collection) = non_empty(&filters.collection) {
            req = req.collection(self.shortcuts.resolve(collection));
        }

        if filters.buy_orders {
            req = req.buy_orders(true);
        }

        if let Some(direction) = non_empty(&filters.direction) {
            req = req.direction(direction);
        }

        if filters.include_fees {
            req = req.include_fees(true);
        }

        if let Some(metadata) = parse_metadata(&filters.metadata) {
            req = req.metadata(metadata);
        }

        if let Some(name) = non_empty(&filters.name) {
            req = req.name(name);
        }

        if filters.sell_orders {
            req = req.sell_orders(true);
        }

        if let Some(status) = non_empty(&filters.status) {
            req = req.status(status);
        }

        if let Some(ts) = non_empty(&filters.updated_max_timestamp) {
            req = req.updated_max_timestamp(ts);
        }

        if let Some(ts) = non_empty(&filters.updated_min_timestamp) {
            req = req.updated_min_timestamp(ts);
        }

        if let Some(user) = non_empty(&filters.user) {
            req = req.user(user);
        }

        if let Some(cursor) = non_empty(&continuation.cursor) {
            req = req.cursor(cursor);
        }

        // Sweep boundary last so it wins over the caller's max timestamp
        if let Some(before) = non_empty(&continuation.before) {
            req = req.updated_max_timestamp(before);
        }

        req
    }

    /// Build the collection list request for one page
    pub fn collection_request<'a>(
        &self,
        session: &'a SdkSession,
        filters: &CollectionFilters,
        continuation: &Continuation,
    ) -> ListRequest<'a, Collection> {
        let mut req = session.list::<Collection>().page_size(MAX_PAGE_SIZE);

        if let Some(blacklist) = non_empty(&filters.blacklist) {
            req = req.blacklist(self.shortcuts.resolve_list(blacklist));
        }

        if let Some(direction) = non_empty(&filters.direction) {
            req = req.direction(direction);
        }

        if let Some(keyword) = non_empty(&filters.keyword) {
            req = req.keyword(keyword);
        }

        if let Some(order_by) = non_empty(&filters.order_by) {
            req = req.order_by(order_by);
        }

        if let Some(whitelist) = non_empty(&filters.whitelist) {
            req = req.whitelist(self.shortcuts.resolve_list(whitelist));
        }

        if let Some(cursor) = non_empty(&continuation.cursor) {
            req = req.cursor(cursor);
        }

        req
    }

    /// Build the order list request for one page
    pub fn order_request<'a>(
        &self,
        session: &'a SdkSession,
        filters: &OrderFilters,
        continuation: &Continuation,
    ) -> ListRequest<'a, Order> {
        let mut req = session.list::<Order>();

        if let Some(v) = non_empty(&filters.auxiliary_fee_percentages) {
            req = req.auxiliary_fee_percentages(v);
        }
        if let Some(v) = non_empty(&filters.auxiliary_fee_recipients) {
            req = req.auxiliary_fee_recipients(v);
        }
        if let Some(v) = non_empty(&filters.buy_asset_id) {
            req = req.buy_asset_id(v);
        }
        if let Some(v) = non_empty(&filters.buy_max_quantity) {
            req = req.buy_max_quantity(v);
        }
        if let Some(v) = non_empty(&filters.buy_metadata) {
            req = req.buy_metadata(v);
        }
        if let Some(v) = non_empty(&filters.buy_min_quantity) {
            req = req.buy_min_quantity(v);
        }
        if let Some(v) = non_empty(&filters.buy_token_address) {
            req = req.buy_token_address(self.shortcuts.resolve(v));
        }
        if let Some(v) = non_empty(&filters.buy_token_id) {
            req = req.buy_token_id(v);
        }
        if let Some(v) = non_empty(&filters.buy_token_name) {
            req = req.buy_token_name(v);
        }
        if let Some(v) = non_empty(&filters.buy_token_type) {
            req = req.buy_token_type(v);
        }
        if let Some(v) = non_empty(&filters.direction) {
            req = req.direction(v);
        }
        if filters.include_fees {
            req = req.include_fees(true);
        }
        if let Some(v) = non_empty(&filters.max_timestamp) {
            req = req.max_timestamp(v);
        }
        if let Some(v) = non_empty(&filters.min_timestamp) {
            req = req.min_timestamp(v);
        }
        if let Some(v) = non_empty(&filters.order_by) {
            req = req.order_by(v);
        }
        if filters.page_size > 0 {
            req = req.page_size(filters.page_size);
        }
        if let Some(v) = non_empty(&filters.sell_asset_id) {
            req = req.sell_asset_id(v);
        }
        if let Some(v) = non_empty(&filters.sell_max_quantity) {
            req = req.sell_max_quantity(v);
        }
        if let Some(v) = non_empty(&filters.sell_metadata) {
            req = req.sell_metadata(v);
        }
        if let Some(v) = non_empty(&filters.sell_min_quantity) {
            req = req.sell_min_quantity(v);
        }
        if let Some(v) = non_empty(&filters.sell_token_address) {
            req = req.sell_token_address(self.shortcuts.resolve(v));
        }
        if let Some(v) = non_empty(&filters.sell_token_id) {
            req = req.sell_token_id(v);
        }
        if let Some(v) = non_empty(&filters.sell_token_name) {
            req = req.sell_token_name(v);
        }
        if let Some(v) = non_empty(&filters.sell_token_type) {
            req = req.sell_token_type(v);
        }
        if let Some(v) = non_empty(&filters.status) {
            req = req.status(v);
        }
        if let Some(v) = non_empty(&filters.updated_max_timestamp) {
            req = req.updated_max_timestamp(v);
        }
        if let Some(v) = non_empty(&filters.updated_min_timestamp) {
            req = req.updated_min_timestamp(v);
        }
        if let Some(v) = non_empty(&filters.user) {
            req = req.user(v);
        }
        if let Some(cursor) = non_empty(&continuation.cursor) {
            req = req.cursor(cursor);
        }
        if let Some(before) = non_empty(&continuation.before) {
            req = req.updated_max_timestamp(before);
        }

        req
    }
}

#[async_trait]
impl MarketplaceBackend for SdkBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Sdk
    }

    async fn start(&self) -> Result<()> {
        if self.is_started() {
            return Ok(());
        }

        let session = Arc::new(self.open_session().await?);
        let chain_id = session.chain_id();

        {
            let mut guard = self.session.write();
            // another caller may have won the race while we were building
            if guard.is_none() {
                *guard = Some(session);
                info!("SDK session started on chain {}", chain_id);
            }
        }

        Ok(())
    }

    async fn stop(&self) {
        if self.session.write().take().is_some() {
            info!("SDK session stopped");
        }
    }

    async fn get_asset(
        &self,
        token_address: &str,
        token_id: &str,
        include_fees: bool,
    ) -> Result<Asset> {
        let session = self.session()?;
        let token_address = self.shortcuts.resolve(token_address);

        debug!(
            "fetching asset id {} from collection {} (with fees: {})",
            token_id, token_address, include_fees
        );

        session
            .get_asset(token_address, token_id)
            .include_fees(include_fees)
            .send()
            .await
    }

    async fn get_collection(&self, address: &str) -> Result<Collection> {
        let session = self.session()?;
        let address = self.shortcuts.resolve(address);

        debug!("fetching collection {}", address);

        session.get_collection(address).send().await
    }

    async fn get_order(&self, order_id: &str, include_fees: bool) -> Result<Order> {
        let session = self.session()?;

        debug!("fetching order {} (with fees: {})", order_id, include_fees);

        session
            .get_order(order_id)
            .include_fees(include_fees)
            .send()
            .await
    }

    async fn list_assets(
        &self,
        filters: &AssetFilters,
        continuation: &Continuation,
    ) -> Result<Page<Asset>> {
        let session = self.session()?;
        self.asset_request(&session, filters, continuation)
            .send()
            .await
    }

    async fn list_collections(
        &self,
        filters: &CollectionFilters,
        continuation: &Continuation,
    ) -> Result<Page<Collection>> {
        let session = self.session()?;
        self.collection_request(&session, filters, continuation)
            .send()
            .await
    }

    async fn list_orders(
        &self,
        filters: &OrderFilters,
        continuation: &Continuation,
    ) -> Result<Page<Order>> {
        let session = self.session()?;
        self.order_request(&session, filters, continuation)
            .send()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::client::params::{asset_params, collection_params, order_params};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn backend_with_rpc(rpc_url: &str) -> SdkBackend {
        SdkBackend::new(
            SdkConfig {
                alchemy_key: "test-key".to_string(),
                api_url: "http://localhost:1".to_string(),
                eth_rpc_url: Some(rpc_url.to_string()),
                timeout: Duration::from_secs(1),
            },
            Arc::new(ShortcutResolver::builtin()),
        )
    }

    /// JSON-RPC node that answers every call with chain id 1
    async fn rpc_node() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(|req: &Request| {
                let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap_or_default();
                ResponseTemplate::new(200).set_body_json(json!({
                    "jsonrpc": "2.0",
                    "id": body["id"].clone(),
                    "result": "0x1"
                }))
            })
            .mount(&server)
            .await;
        server
    }

    async fn backend() -> (MockServer, SdkBackend) {
        let node = rpc_node().await;
        let backend = backend_with_rpc(&node.uri());
        (node, backend)
    }

    #[tokio::test]
    async fn test_requests_fail_before_start() {
        let backend = backend_with_rpc("http://localhost:8545");
        let result = backend
            .list_assets(&AssetFilters::default(), &Continuation::default())
            .await;
        assert!(matches!(result, Err(ClientError::NotStarted)));
    }

    #[tokio::test]
    async fn test_start_is_idempotent_and_stop_is_safe() {
        let (_node, backend) = backend().await;

        backend.stop().await;
        assert!(!backend.is_started());

        backend.start().await.unwrap();
        let first = backend.session().unwrap();
        backend.start().await.unwrap();
        let second = backend.session().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        backend.stop().await;
        assert!(!backend.is_started());
        backend.stop().await;
        assert!(matches!(backend.session(), Err(ClientError::NotStarted)));
    }

    #[tokio::test]
    async fn test_asset_request_matches_rest_params() {
        let (_node, backend) = backend().await;
        backend.start().await.unwrap();
        let session = backend.session().unwrap();
        let shortcuts = ShortcutResolver::builtin();

        let filters = AssetFilters {
            collection: Some("hero".to_string()),
            buy_orders: true,
            metadata: vec!["Rarity=Epic".to_string()],
            user: Some("0xuser".to_string()),
            updated_max_timestamp: Some("2022-12-31T00:00:00Z".to_string()),
            ..Default::default()
        };
        let continuation = Continuation {
            cursor: Some("c1".to_string()),
            before: Some("2022-06-01T00:00:00Z".to_string()),
        };

        let sdk = backend.asset_request(&session, &filters, &continuation);
        let rest = asset_params(&filters, &continuation, &shortcuts);
        assert_eq!(sdk.params().sorted(), rest.sorted());
    }

    #[tokio::test]
    async fn test_empty_filters_match_rest_params() {
        let (_node, backend) = backend().await;
        backend.start().await.unwrap();
        let session = backend.session().unwrap();
        let shortcuts = ShortcutResolver::builtin();
        let none = Continuation::default();

        assert_eq!(
            backend.asset_request(&session, &AssetFilters::default(), &none).params().sorted(),
            asset_params(&AssetFilters::default(), &none, &shortcuts).sorted()
        );
        assert_eq!(
            backend
                .collection_request(&session, &CollectionFilters::default(), &none)
                .params()
                .sorted(),
            collection_params(&CollectionFilters::default(), &none, &shortcuts).sorted()
        );
        assert!(backend
            .order_request(&session, &OrderFilters::default(), &none)
            .params()
            .is_empty());
    }

    #[tokio::test]
    async fn test_order_request_matches_rest_params() {
        let (_node, backend) = backend().await;
        backend.start().await.unwrap();
        let session = backend.session().unwrap();
        let shortcuts = ShortcutResolver::builtin();

        let filters = OrderFilters {
            buy_token_address: Some("portal".to_string()),
            sell_token_type: Some("ERC721".to_string()),
            include_fees: true,
            page_size: 10,
            status: Some("filled".to_string()),
            ..Default::default()
        };
        let continuation = Continuation {
            cursor: Some("next".to_string()),
            before: None,
        };

        let sdk = backend.order_request(&session, &filters, &continuation);
        let rest = order_params(&filters, &continuation, &shortcuts);
        assert_eq!(sdk.params().sorted(), rest.sorted());
    }

    #[tokio::test]
    async fn test_collection_request_resolves_whitelist() {
        let (_node, backend) = backend().await;
        backend.start().await.unwrap();
        let session = backend.session().unwrap();

        let filters = CollectionFilters {
            whitelist: Some("hero".to_string()),
            keyword: Some("bitverse".to_string()),
            ..Default::default()
        };

        let req = backend.collection_request(&session, &filters, &Continuation::default());
        assert_eq!(
            req.params().get("whitelist"),
            Some("0x6465ef3009f3c474774f4afb607a5d600ea71d95")
        );
        assert_eq!(req.params().get("keyword"), Some("bitverse"));
    }

    #[tokio::test]
    async fn test_start_checks_credentials_with_the_node() {
        let (node, backend) = backend().await;
        backend.start().await.unwrap();

        let session = backend.session().unwrap();
        assert_eq!(session.chain_id(), 1);
        assert_eq!(Arc::strong_count(&session.eth_provider()), 2);
        assert!(!node.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_start_fails_when_node_rejects_key() {
        let node = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&node)
            .await;

        let backend = backend_with_rpc(&node.uri());
        let result = backend.start().await;

        assert!(matches!(result, Err(ClientError::Provider(_))));
        assert!(!backend.is_started());
    }
}
