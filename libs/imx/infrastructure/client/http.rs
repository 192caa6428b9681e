//! Response handling shared by both backends

use super::{ClientError, Result};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::warn;

/// Send a request and decode a JSON body, mapping failures onto [`ClientError`]
pub(crate) async fn send_json<T>(request: RequestBuilder, what: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let response = request.send().await?;

    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        warn!("Rate limit exceeded while fetching {}", what);
        return Err(ClientError::RateLimitExceeded);
    }

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ClientError::ApiError(format!(
            "Failed to fetch {} ({}): {}",
            what, status, error_text
        )));
    }

    response
        .json()
        .await
        .map_err(|e| ClientError::DeserializeFailed(e.to_string()))
}

/// Join a base URL and a path without doubling the slash
pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
