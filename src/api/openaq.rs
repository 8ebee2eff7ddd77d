//! Provides a client for interacting with the OpenAQ v3 API.
//!
//! The proxy endpoint does not interpret upstream responses beyond their status
//! code, so this client hands back the raw status and body bytes and leaves the
//! relay decision to the caller.

use crate::error::{AppError, Result};
use crate::models::LocationsQuery;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use tracing::{debug, error};

/// Default base URL of the OpenAQ v3 API.
pub const BASE_URL: &str = "https://api.openaq.org/v3";

/// Environment variable holding the optional OpenAQ API key.
pub const API_KEY_ENV: &str = "OPENAQ_API_KEY";

/// Header the API key is sent in.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Reads the API key from the process environment.
///
/// Looked up on every request rather than cached, so rotating the key does not
/// need a restart. An unset or empty variable means "no key".
pub fn api_key_from_env() -> Option<String> {
    std::env::var(API_KEY_ENV).ok().filter(|key| !key.is_empty())
}

/// An upstream response, before any interpretation of its body.
///
/// The body is kept as the exact bytes received, with no charset decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl UpstreamResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// An asynchronous client for fetching data from the OpenAQ API v3.
#[derive(Debug, Clone)]
pub struct OpenAQClient {
    client: Client,
    base_url: String,
}

impl OpenAQClient {
    /// Creates a new `OpenAQClient` against the default OpenAQ v3 base URL.
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Creates a new `OpenAQClient` with a custom base URL (a mirror, or a mock server in tests).
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the `/locations` URL for a query.
    ///
    /// Values are percent-encoded the way `encodeURIComponent` does it, without
    /// any other validation.
    pub fn locations_url(&self, query: &LocationsQuery) -> Result<Url> {
        let raw = format!(
            "{}/locations?country={}&limit={}",
            self.base_url,
            urlencoding::encode(&query.country),
            urlencoding::encode(&query.limit)
        );
        Url::parse(&raw).map_err(|e| AppError::Config(format!("invalid upstream URL {}: {}", raw, e)))
    }

    /// Fetches one page of locations.
    ///
    /// Corresponds to the `/v3/locations` endpoint of the OpenAQ API. Any
    /// status code, success or not, is returned as data; only transport
    /// failures are errors.
    pub async fn fetch_locations(
        &self,
        query: &LocationsQuery,
        api_key: Option<&str>,
    ) -> Result<UpstreamResponse> {
        let url = self.locations_url(query)?;
        debug!(
            "Fetching locations for country {:?} (limit {:?}) from {}",
            query.country,
            query.limit,
            url.host_str().unwrap_or("unknown host")
        );

        let mut request = self.client.get(url);
        if let Some(key) = api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await.map_err(|e| {
            error!("Error fetching locations for {}: {}", query.country, e);
            AppError::from(e)
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;

        debug!("Upstream answered {} ({} bytes)", status, body.len());
        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}

impl Default for OpenAQClient {
    fn default() -> Self {
        Self::new()
    }
}
