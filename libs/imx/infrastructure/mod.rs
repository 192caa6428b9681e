//! Infrastructure layer: API clients, configuration, price cache, logging

pub mod client;
pub mod coinbase;
pub mod config;
pub mod logging;
pub mod shortcuts;
pub mod shutdown;

pub use client::{
    new_backend, BackendConfig, BackendKind, ClientError, MarketplaceBackend, RestBackend,
    RestConfig, SdkBackend, SdkConfig, SharedBackend,
};
pub use coinbase::{CoinbaseClient, CryptoSymbol, FiatSymbol, SpotPriceCache, SpotPriceSource};
pub use config::{ClientConfig, ConfigError};
pub use logging::{init_tracing, init_tracing_with_level};
pub use shortcuts::{Shortcut, ShortcutResolver};
pub use shutdown::ShutdownManager;
