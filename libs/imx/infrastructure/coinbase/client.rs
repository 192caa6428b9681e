//! Coinbase spot price client

use super::{CryptoSymbol, FiatSymbol, PriceError, Result, SpotPriceSource};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct SpotResponse {
    data: SpotData,
}

#[derive(Debug, Deserialize)]
struct SpotData {
    amount: String,
}

/// Client for `GET /v2/prices/{CRYPTO}-{FIAT}/spot`
pub struct CoinbaseClient {
    base_url: String,
    client: Client,
}

impl CoinbaseClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    pub fn spot_url(&self, crypto: CryptoSymbol, fiat: FiatSymbol) -> String {
        format!(
            "{}/v2/prices/{}-{}/spot",
            self.base_url.trim_end_matches('/'),
            crypto,
            fiat
        )
    }
}

#[async_trait]
impl SpotPriceSource for CoinbaseClient {
    async fn fetch_spot(&self, crypto: CryptoSymbol, fiat: FiatSymbol) -> Result<f64> {
        let url = self.spot_url(crypto, fiat);

        debug!("Fetching {}-{} spot price from {}", crypto, fiat, url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PriceError::ApiError(format!(
                "Failed to fetch spot price ({}): {}",
                status, error_text
            )));
        }

        let body: SpotResponse = response
            .json()
            .await
            .map_err(|e| PriceError::ApiError(format!("Failed to parse spot price: {}", e)))?;

        body.data
            .amount
            .trim()
            .parse::<f64>()
            .map_err(|_| PriceError::InvalidPrice(body.data.amount.clone()))
    }
}
