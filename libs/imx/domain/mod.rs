//! Domain Layer
//!
//! Record types and listing filters. No I/O happens here.

pub mod filters;
pub mod models;

pub use filters::{parse_metadata, AssetFilters, CollectionFilters, Continuation, OrderFilters};
pub use models::{
    Asset, AssetCollection, Collection, Order, OrderSide, Page, Record, ResourceKind, TokenData,
};
