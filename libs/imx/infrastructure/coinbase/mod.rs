//! Coinbase spot prices
//!
//! [`CoinbaseClient`] fetches a single crypto/fiat spot price.
//! [`SpotPriceCache`] keeps the last price per pair for a short TTL and never
//! surfaces an error to callers.

pub mod cache;
pub mod client;

pub use cache::{CachedPrice, SpotPriceCache, DEFAULT_PRICE_TTL};
pub use client::CoinbaseClient;

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PriceError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid price '{0}'")]
    InvalidPrice(String),
}

pub type Result<T> = std::result::Result<T, PriceError>;

/// Supported crypto currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CryptoSymbol {
    #[default]
    Eth,
    Imx,
    Usdc,
}

impl CryptoSymbol {
    pub fn as_str(&self) -> &'static str {
        match self {
            CryptoSymbol::Eth => "ETH",
            CryptoSymbol::Imx => "IMX",
            CryptoSymbol::Usdc => "USDC",
        }
    }
}

impl fmt::Display for CryptoSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CryptoSymbol {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ETH" => Ok(CryptoSymbol::Eth),
            "IMX" => Ok(CryptoSymbol::Imx),
            "USDC" => Ok(CryptoSymbol::Usdc),
            other => Err(format!("unsupported crypto symbol: {}", other)),
        }
    }
}

/// Supported fiat currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FiatSymbol {
    #[default]
    Usd,
    Eur,
    Gbp,
}

impl FiatSymbol {
    pub fn as_str(&self) -> &'static str {
        match self {
            FiatSymbol::Usd => "USD",
            FiatSymbol::Eur => "EUR",
            FiatSymbol::Gbp => "GBP",
        }
    }
}

impl fmt::Display for FiatSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FiatSymbol {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USD" => Ok(FiatSymbol::Usd),
            "EUR" => Ok(FiatSymbol::Eur),
            "GBP" => Ok(FiatSymbol::Gbp),
            other => Err(format!("unsupported fiat symbol: {}", other)),
        }
    }
}

/// Anything that can quote a spot price for a pair
#[async_trait]
pub trait SpotPriceSource: Send + Sync {
    async fn fetch_spot(&self, crypto: CryptoSymbol, fiat: FiatSymbol) -> Result<f64>;
}
