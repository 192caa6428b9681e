//! Listing filters and continuation state
//!
//! Filter fields mirror the upstream list endpoints. Empty strings, `None`
//! and `false` all mean "not set" and are never sent.

use std::collections::BTreeMap;
use tracing::debug;

/// Continuation parameters carried between page requests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Continuation {
    /// Opaque cursor from the previous page
    pub cursor: Option<String>,

    /// Upper `updated_at` bound used by the backward sweep
    pub before: Option<String>,
}

impl Continuation {
    pub fn is_empty(&self) -> bool {
        self.cursor.is_none() && self.before.is_none()
    }
}

/// Filters for `/v1/assets`
#[derive(Debug, Clone, Default)]
pub struct AssetFilters {
    pub buy_orders: bool,
    /// Collection address or shortcut alias
    pub collection: Option<String>,
    pub direction: Option<String>,
    pub include_fees: bool,
    /// `key=value` items, grouped into a JSON object when sent
    pub metadata: Vec<String>,
    pub name: Option<String>,
    pub order_by: Option<String>,
    pub sell_orders: bool,
    pub status: Option<String>,
    pub updated_max_timestamp: Option<String>,
    pub updated_min_timestamp: Option<String>,
    pub user: Option<String>,
}

/// Filters for `/v1/collections`
#[derive(Debug, Clone, Default)]
pub struct CollectionFilters {
    /// Comma separated addresses or aliases to exclude
    pub blacklist: Option<String>,
    pub direction: Option<String>,
    pub keyword: Option<String>,
    pub order_by: Option<String>,
    /// Comma separated addresses or aliases to include
    pub whitelist: Option<String>,
}

/// Filters for `/v1/orders`
#[derive(Debug, Clone, Default)]
pub struct OrderFilters {
    pub auxiliary_fee_percentages: Option<String>,
    pub auxiliary_fee_recipients: Option<String>,
    pub buy_asset_id: Option<String>,
    pub buy_max_quantity: Option<String>,
    pub buy_metadata: Option<String>,
    pub buy_min_quantity: Option<String>,
    pub buy_token_address: Option<String>,
    pub buy_token_id: Option<String>,
    pub buy_token_name: Option<String>,
    pub buy_token_type: Option<String>,
    pub direction: Option<String>,
    pub include_fees: bool,
    pub max_timestamp: Option<String>,
    pub min_timestamp: Option<String>,
    pub order_by: Option<String>,
    /// Maximum number of orders to collect. 0 means no cap.
    pub page_size: usize,
    pub sell_asset_id: Option<String>,
    pub sell_max_quantity: Option<String>,
    pub sell_metadata: Option<String>,
    pub sell_min_quantity: Option<String>,
    pub sell_token_address: Option<String>,
    pub sell_token_id: Option<String>,
    pub sell_token_name: Option<String>,
    pub sell_token_type: Option<String>,
    pub status: Option<String>,
    pub updated_max_timestamp: Option<String>,
    pub updated_min_timestamp: Option<String>,
    pub user: Option<String>,
}

/// Returns the value when it is set and not blank
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Group `key=value` items into the JSON object the metadata filter expects.
///
/// Items without `=` are logged and skipped. Returns `None` when nothing
/// usable is left, so the parameter can be omitted.
pub fn parse_metadata(items: &[String]) -> Option<String> {
    let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

    for item in items {
        match item.split_once('=') {
            Some((key, value)) => grouped.entry(key).or_default().push(value),
            None => {
                debug!("could not parse metadata item {} into a key=value pair", item);
                continue;
            }
        }
    }

    if grouped.is_empty() {
        return None;
    }

    match serde_json::to_string(&grouped) {
        Ok(json) => Some(json),
        Err(e) => {
            debug!("skipping metadata filter, could not convert to json: {}", e);
            None
        }
    }
}
