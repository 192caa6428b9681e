//! Immutable X marketplace client
//!
//! Lists assets, collections and orders from the Immutable X API through a
//! REST or SDK backend, following cursors and timestamp sweeps until the
//! upstream runs dry.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{
    ImxApp, ListResult, OutputFormat, PageQuery, PaginationError, PaginationFailure, Paginator,
    QueryConfig,
};
pub use domain::{
    Asset, AssetFilters, Collection, CollectionFilters, Continuation, Order, OrderFilters, Page,
    Record, ResourceKind,
};
pub use infrastructure::{
    init_tracing, init_tracing_with_level, new_backend, BackendConfig, BackendKind, ClientConfig,
    ClientError, ConfigError, CryptoSymbol, FiatSymbol, MarketplaceBackend, SharedBackend,
    ShortcutResolver, ShutdownManager, SpotPriceCache,
};
