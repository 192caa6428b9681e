//! Filter to query-parameter mapping
//!
//! Each set filter becomes exactly one parameter; unset filters are left
//! out. Address-shaped filters go through the shortcut table first.

use super::MAX_PAGE_SIZE;
use crate::domain::filters::non_empty;
use crate::domain::{parse_metadata, AssetFilters, CollectionFilters, Continuation, OrderFilters};
use crate::infrastructure::shortcuts::ShortcutResolver;
use serde::Serialize;

/// Ordered query parameters with "last set wins" semantics per key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryParams(Vec<(&'static str, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing any previous value
    pub fn set(&mut self, key: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Set `key` only when `value` is non-empty
    pub fn set_opt(&mut self, key: &'static str, value: &Option<String>) {
        if let Some(v) = non_empty(value) {
            self.set(key, v);
        }
    }

    /// Set `key=true` only when `flag` is set
    pub fn set_flag(&mut self, key: &'static str, flag: bool) {
        if flag {
            self.set(key, "true");
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.0.iter().map(|(k, _)| *k).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parameters sorted by key, for order-insensitive comparison
    pub fn sorted(&self) -> Vec<(&'static str, String)> {
        let mut params = self.0.clone();
        params.sort();
        params
    }
}

/// Cursor and sweep boundary. The boundary is applied last so it wins over
/// a caller supplied `updated_max_timestamp`.
fn apply_continuation(params: &mut QueryParams, continuation: &Continuation) {
    params.set_opt("cursor", &continuation.cursor);
    params.set_opt("updated_max_timestamp", &continuation.before);
}

/// Parameters for `/v1/assets`
pub fn asset_params(
    filters: &AssetFilters,
    continuation: &Continuation,
    shortcuts: &ShortcutResolver,
) -> QueryParams {
    let mut params = QueryParams::new();

    params.set("page_size", MAX_PAGE_SIZE.to_string());
    params.set(
        "order_by",
        non_empty(&filters.order_by).unwrap_or("updated_at"),
    );

    if let Some(collection) = non_empty(&filters.collection) {
        params.set("collection", shortcuts.resolve(collection));
    }

    params.set_flag("buy_orders", filters.buy_orders);
    params.set_opt("direction", &filters.direction);
    params.set_flag("include_fees", filters.include_fees);

    if let Some(metadata) = parse_metadata(&filters.metadata) {
        params.set("metadata", metadata);
    }

    params.set_opt("name", &filters.name);
    params.set_flag("sell_orders", filters.sell_orders);
    params.set_opt("status", &filters.status);
    params.set_opt("updated_max_timestamp", &filters.updated_max_timestamp);
    params.set_opt("updated_min_timestamp", &filters.updated_min_timestamp);
    params.set_opt("user", &filters.user);

    apply_continuation(&mut params, continuation);
    params
}

/// Parameters for `/v1/collections`
pub fn collection_params(
    filters: &CollectionFilters,
    continuation: &Continuation,
    shortcuts: &ShortcutResolver,
) -> QueryParams {
    let mut params = QueryParams::new();

    params.set("page_size", MAX_PAGE_SIZE.to_string());

    if let Some(blacklist) = non_empty(&filters.blacklist) {
        params.set("blacklist", shortcuts.resolve_list(blacklist));
    }

    params.set_opt("direction", &filters.direction);
    params.set_opt("keyword", &filters.keyword);
    params.set_opt("order_by", &filters.order_by);

    if let Some(whitelist) = non_empty(&filters.whitelist) {
        params.set("whitelist", shortcuts.resolve_list(whitelist));
    }

    // collections have no updated-at bound, only the cursor applies
    params.set_opt("cursor", &continuation.cursor);
    params
}

/// Parameters for `/v1/orders`
pub fn order_params(
    filters: &OrderFilters,
    continuation: &Continuation,
    shortcuts: &ShortcutResolver,
) -> QueryParams {
    let mut params = QueryParams::new();

    params.set_opt("auxiliary_fee_percentages", &filters.auxiliary_fee_percentages);
    params.set_opt("auxiliary_fee_recipients", &filters.auxiliary_fee_recipients);
    params.set_opt("buy_asset_id", &filters.buy_asset_id);
    params.set_opt("buy_max_quantity", &filters.buy_max_quantity);
    params.set_opt("buy_metadata", &filters.buy_metadata);
    params.set_opt("buy_min_quantity", &filters.buy_min_quantity);

    if let Some(address) = non_empty(&filters.buy_token_address) {
        params.set("buy_token_address", shortcuts.resolve(address));
    }

    params.set_opt("buy_token_id", &filters.buy_token_id);
    params.set_opt("buy_token_name", &filters.buy_token_name);
    params.set_opt("buy_token_type", &filters.buy_token_type);
    params.set_opt("direction", &filters.direction);
    params.set_flag("include_fees", filters.include_fees);
    params.set_opt("max_timestamp", &filters.max_timestamp);
    params.set_opt("min_timestamp", &filters.min_timestamp);
    params.set_opt("order_by", &filters.order_by);

    if filters.page_size > 0 {
        params.set("page_size", filters.page_size.to_string());
    }

    params.set_opt("sell_asset_id", &filters.sell_asset_id);
    params.set_opt("sell_max_quantity", &filters.sell_max_quantity);
    params.set_opt("sell_metadata", &filters.sell_metadata);
    params.set_opt("sell_min_quantity", &filters.sell_min_quantity);

    if let Some(address) = non_empty(&filters.sell_token_address) {
        params.set("sell_token_address", shortcuts.resolve(address));
    }

    params.set_opt("sell_token_id", &filters.sell_token_id);
    params.set_opt("sell_token_name", &filters.sell_token_name);
    params.set_opt("sell_token_type", &filters.sell_token_type);
    params.set_opt("status", &filters.status);
    params.set_opt("updated_max_timestamp", &filters.updated_max_timestamp);
    params.set_opt("updated_min_timestamp", &filters.updated_min_timestamp);
    params.set_opt("user", &filters.user);

    apply_continuation(&mut params, continuation);
    params
}
