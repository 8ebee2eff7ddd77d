//! Client used by the map view to call this service's own proxy endpoint.

use crate::error::{AppError, Result};
use crate::models::LocationsQuery;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

/// Path of the proxy endpoint, relative to the service root.
pub const PROXY_PATH: &str = "/api/openaq";

#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: Client,
    base_url: String,
}

impl ProxyClient {
    /// `base_url` is the root the proxy endpoint is served under, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint_url(&self, query: &LocationsQuery) -> Result<Url> {
        let raw = format!(
            "{}{}?country={}&limit={}",
            self.base_url,
            PROXY_PATH,
            urlencoding::encode(&query.country),
            urlencoding::encode(&query.limit)
        );
        Url::parse(&raw).map_err(|e| AppError::Config(format!("invalid proxy URL {}: {}", raw, e)))
    }

    /// GETs the proxy endpoint and parses the body as JSON.
    ///
    /// Non-2xx statuses are errors here, unlike in the proxy itself.
    pub async fn get_locations(&self, query: &LocationsQuery) -> Result<Value> {
        let url = self.endpoint_url(query)?;
        debug!("Requesting locations from proxy at {}", url);

        let response = self.client.get(url).send().await?.error_for_status()?;
        let body: Value = response.json().await?;
        Ok(body)
    }
}
