//! Application state shared by the HTTP handlers.

use std::net::SocketAddr;

use crate::api::{OpenAQClient, ProxyClient};
use crate::cli::Cli;
use crate::view::MapLoader;

/// Shared application state. Read-only after startup.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Client for the upstream OpenAQ API, used by the proxy endpoint.
    pub upstream: OpenAQClient,

    /// Mounts a map view for each page request.
    pub map: MapLoader,
}

impl AppState {
    pub fn new(upstream: OpenAQClient, map: MapLoader) -> Self {
        Self { upstream, map }
    }

    /// Builds the state from parsed command line options and the resolved listen address.
    pub fn from_cli(cli: &Cli, listen: SocketAddr) -> Self {
        let upstream = OpenAQClient::with_base_url(&cli.upstream_url);
        let proxy = ProxyClient::new(&cli.proxy_base_url(listen));
        Self::new(upstream, MapLoader::new(proxy, cli.icon_base_url.clone()))
    }
}
