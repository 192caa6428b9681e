//! Marketplace record types
//!
//! Records are kept close to the upstream payload: the fields this crate
//! reads are typed, everything else is preserved in `extra` so JSON output
//! round-trips whatever the API sent.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// =============================================================================
// ResourceKind
// =============================================================================

/// The three listable resource types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Asset,
    Collection,
    Order,
}

impl ResourceKind {
    /// API path for list and single-record requests
    pub fn path(&self) -> &'static str {
        match self {
            ResourceKind::Asset => "/v1/assets",
            ResourceKind::Collection => "/v1/collections",
            ResourceKind::Order => "/v1/orders",
        }
    }

    /// Whether a listing sweeps backwards by `updated_max_timestamp` once
    /// the cursor is exhausted. Orders and collections are forward-only.
    pub fn has_time_boundary(&self) -> bool {
        matches!(self, ResourceKind::Asset)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Asset => "assets",
            ResourceKind::Collection => "collections",
            ResourceKind::Order => "orders",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Record
// =============================================================================

/// Common view over every record type the listing engine accumulates
pub trait Record: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static {
    const KIND: ResourceKind;

    fn record_id(&self) -> Option<String>;

    fn record_status(&self) -> Option<&str>;

    /// Raw "updated at" timestamp as sent by the API
    fn updated_at(&self) -> Option<&str>;
}

// =============================================================================
// Page
// =============================================================================

/// One page of a list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub result: Vec<T>,

    /// Continuation token for the next page
    #[serde(default)]
    pub cursor: String,

    /// Records left after this page (as reported by the API)
    #[serde(default)]
    pub remaining: i64,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.result.is_empty()
    }
}

// =============================================================================
// Asset
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetCollection {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
}

/// An asset (NFT) as returned by `/v1/assets`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    #[serde(default)]
    pub token_address: String,

    #[serde(default)]
    pub token_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default)]
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<AssetCollection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Asset {
    /// Rarity attribute from the asset metadata, if it is a string
    pub fn rarity(&self) -> Option<&str> {
        self.metadata.as_ref()?.get("Rarity")?.as_str()
    }
}

impl Record for Asset {
    const KIND: ResourceKind = ResourceKind::Asset;

    fn record_id(&self) -> Option<String> {
        self.id.clone().filter(|id| !id.is_empty())
    }

    fn record_status(&self) -> Option<&str> {
        Some(self.status.as_str()).filter(|s| !s.is_empty())
    }

    fn updated_at(&self) -> Option<&str> {
        self.updated_at.as_deref()
    }
}

// =============================================================================
// Collection
// =============================================================================

/// A collection as returned by `/v1/collections`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_owner_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Collection {
    const KIND: ResourceKind = ResourceKind::Collection;

    fn record_id(&self) -> Option<String> {
        Some(self.address.clone()).filter(|a| !a.is_empty())
    }

    fn record_status(&self) -> Option<&str> {
        None
    }

    fn updated_at(&self) -> Option<&str> {
        self.updated_at.as_deref()
    }
}

// =============================================================================
// Order
// =============================================================================

/// Token details on one side of an order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_with_fees: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One side (buy or sell) of an order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderSide {
    #[serde(rename = "type", default)]
    pub token_type: String,

    #[serde(default)]
    pub data: TokenData,
}

/// An order as returned by `/v1/orders`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub order_id: i64,

    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub sell: OrderSide,

    #[serde(default)]
    pub buy: OrderSide,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_sold: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_timestamp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_timestamp: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Order {
    /// Buy-side quantity including fees, scaled by the token decimals.
    ///
    /// Returns 0 when the quantity or decimals are missing or unparsable.
    pub fn price_with_fees(&self) -> f64 {
        let data = &self.buy.data;
        let (Some(quantity), Some(decimals)) = (data.quantity_with_fees.as_deref(), data.decimals)
        else {
            return 0.0;
        };

        match quantity.parse::<u128>() {
            Ok(amount) => amount as f64 * 10f64.powi(-(decimals as i32)),
            Err(_) => 0.0,
        }
    }
}

impl Record for Order {
    const KIND: ResourceKind = ResourceKind::Order;

    fn record_id(&self) -> Option<String> {
        Some(self.order_id.to_string())
    }

    fn record_status(&self) -> Option<&str> {
        Some(self.status.as_str()).filter(|s| !s.is_empty())
    }

    fn updated_at(&self) -> Option<&str> {
        self.updated_timestamp.as_deref()
    }
}
