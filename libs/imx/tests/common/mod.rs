//! Common test utilities for imx integration tests
//!
//! A scripted in-memory backend plus record fixtures.

#![allow(dead_code)]

use async_trait::async_trait;
use imx::infrastructure::client::{BackendKind, ClientError, MarketplaceBackend, Result};
use imx::{
    Asset, AssetFilters, Collection, CollectionFilters, Continuation, Order, OrderFilters, Page,
};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::VecDeque;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

/// One scripted response
pub enum Step<T> {
    Page(Page<T>),
    Fail(ClientError),
}

/// Backend that replays scripted pages and records every continuation it saw.
/// Running out of script yields an empty page.
#[derive(Default)]
pub struct ScriptedBackend {
    assets: Mutex<VecDeque<Step<Asset>>>,
    collections: Mutex<VecDeque<Step<Collection>>>,
    orders: Mutex<VecDeque<Step<Order>>>,
    calls: Mutex<Vec<Continuation>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset_pages(self, pages: Vec<Page<Asset>>) -> Self {
        self.assets.lock().extend(pages.into_iter().map(Step::Page));
        self
    }

    pub fn with_collection_pages(self, pages: Vec<Page<Collection>>) -> Self {
        self.collections.lock().extend(pages.into_iter().map(Step::Page));
        self
    }

    pub fn with_order_pages(self, pages: Vec<Page<Order>>) -> Self {
        self.orders.lock().extend(pages.into_iter().map(Step::Page));
        self
    }

    pub fn with_asset_failure(self, error: ClientError) -> Self {
        self.assets.lock().push_back(Step::Fail(error));
        self
    }

    pub fn calls(&self) -> Vec<Continuation> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn next<T>(&self, queue: &Mutex<VecDeque<Step<T>>>, continuation: &Continuation) -> Result<Page<T>> {
        self.calls.lock().push(continuation.clone());
        match queue.lock().pop_front() {
            Some(Step::Page(page)) => Ok(page),
            Some(Step::Fail(error)) => Err(error),
            None => Ok(empty_page()),
        }
    }
}

#[async_trait]
impl MarketplaceBackend for ScriptedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Rest
    }

    async fn start(&self) -> Result<()> {
        Ok(())
    }

    async fn stop(&self) {}

    async fn get_asset(&self, _token_address: &str, _token_id: &str, _include_fees: bool) -> Result<Asset> {
        Err(ClientError::ApiError("not scripted".to_string()))
    }

    async fn get_collection(&self, _address: &str) -> Result<Collection> {
        Err(ClientError::ApiError("not scripted".to_string()))
    }

    async fn get_order(&self, _order_id: &str, _include_fees: bool) -> Result<Order> {
        Err(ClientError::ApiError("not scripted".to_string()))
    }

    async fn list_assets(&self, _filters: &AssetFilters, continuation: &Continuation) -> Result<Page<Asset>> {
        self.next(&self.assets, continuation)
    }

    async fn list_collections(
        &self,
        _filters: &CollectionFilters,
        continuation: &Continuation,
    ) -> Result<Page<Collection>> {
        self.next(&self.collections, continuation)
    }

    async fn list_orders(&self, _filters: &OrderFilters, continuation: &Continuation) -> Result<Page<Order>> {
        self.next(&self.orders, continuation)
    }
}

pub fn empty_page<T>() -> Page<T> {
    Page {
        result: Vec::new(),
        cursor: String::new(),
        remaining: 0,
    }
}

pub fn page<T>(result: Vec<T>, cursor: &str, remaining: i64) -> Page<T> {
    Page {
        result,
        cursor: cursor.to_string(),
        remaining,
    }
}

pub mod fixtures {
    //! Record fixtures

    use super::*;

    pub fn asset(token_id: &str, updated_at: &str) -> Asset {
        serde_json::from_value(json!({
            "token_address": "0x6465ef3009f3c474774f4afb607a5d600ea71d95",
            "token_id": token_id,
            "id": format!("0xid{}", token_id),
            "status": "imx",
            "name": format!("Hero #{}", token_id),
            "updated_at": updated_at,
        }))
        .unwrap()
    }

    pub fn asset_without_timestamp(token_id: &str) -> Asset {
        serde_json::from_value(json!({
            "token_address": "0x6465ef3009f3c474774f4afb607a5d600ea71d95",
            "token_id": token_id,
        }))
        .unwrap()
    }

    pub fn collection(address: &str, name: &str) -> Collection {
        serde_json::from_value(json!({
            "address": address,
            "name": name,
            "updated_at": "2022-01-01T00:00:00Z",
        }))
        .unwrap()
    }

    pub fn order(order_id: i64, updated_timestamp: &str) -> Order {
        serde_json::from_value(json!({
            "order_id": order_id,
            "status": "active",
            "user": "0xuser",
            "buy": {"type": "ETH", "data": {"quantity_with_fees": "1000000000000000000", "decimals": 18}},
            "updated_timestamp": updated_timestamp,
        }))
        .unwrap()
    }

    pub fn token_ids(assets: &[Asset]) -> Vec<&str> {
        assets.iter().map(|a| a.token_id.as_str()).collect()
    }
}
