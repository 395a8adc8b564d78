//! HTTP helper shared by providers
//!
//! Performs a request and classifies the outcome, so a provider only has to
//! deal with the happy path. Every failure becomes
//! [`AssetError::ProviderRequest`].

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{AssetError, AssetResult};

pub(crate) const USER_AGENT: &str = concat!("asset-providers/", env!("CARGO_PKG_VERSION"));

/// Default upstream timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin wrapper over a `reqwest` client with provider error classification
#[derive(Debug, Clone)]
pub struct RemoteClient {
    client: Client,
}

impl RemoteClient {
    /// Build a client with the given upstream timeout
    pub fn new(timeout: Duration) -> AssetResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AssetError::request(None, format!("HTTP client error: {e}")))?;
        Ok(Self { client })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Send `request` and return the body of a 2xx response
    pub async fn send(&self, request: RequestBuilder) -> AssetResult<String> {
        let response = request.send().await.map_err(classify_transport)?;

        let status = response.status();
        debug!(url = %response.url(), status = status.as_u16(), "provider response");

        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown status");
            return Err(AssetError::request(
                Some(status.as_u16()),
                format!("{}: {}", status.as_u16(), reason),
            ));
        }

        response.text().await.map_err(|e| {
            AssetError::request(
                Some(status.as_u16()),
                format!("could not read response body: {e}"),
            )
        })
    }

    /// GET `url` with query parameters and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> AssetResult<T> {
        let body = self.send(self.client.get(url).query(params)).await?;
        serde_json::from_str(&body)
            .map_err(|e| AssetError::request(None, format!("malformed upstream payload: {e}")))
    }
}

fn classify_transport(err: reqwest::Error) -> AssetError {
    let status = err.status().map(|s| s.as_u16());
    if err.is_timeout() {
        AssetError::request(status, format!("request timed out: {err}"))
    } else {
        AssetError::request(status, err.to_string())
    }
}
