//! Command line and environment configuration.
//!
//! Every option can also be set through an environment variable, and a `.env`
//! file is loaded before parsing. The OpenAQ API key is deliberately not an
//! option: the proxy reads it from the environment on each request.

use crate::api::BASE_URL;
use crate::error::{AppError, Result};
use crate::view::DEFAULT_ICON_BASE_URL;
use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;

/// Web map of OpenAQ air quality monitoring locations
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Address to listen on
    #[arg(short, long, default_value = "0.0.0.0:3000", env = "OPENAQ_MAP_LISTEN")]
    pub listen: String,

    /// Base URL of the OpenAQ v3 API
    #[arg(long, default_value = BASE_URL, env = "OPENAQ_UPSTREAM_URL")]
    pub upstream_url: String,

    /// URL the map view reaches the proxy endpoint under (default: derived from --listen)
    #[arg(long, env = "OPENAQ_MAP_PROXY_URL")]
    pub proxy_url: Option<String>,

    /// Base URL of the Leaflet marker icon images
    #[arg(long, default_value = DEFAULT_ICON_BASE_URL, env = "OPENAQ_MAP_ICON_BASE_URL")]
    pub icon_base_url: String,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "OPENAQ_MAP_LOG_JSON")]
    pub log_json: bool,

    /// Also write logs to daily-rotated files in this directory
    #[arg(long, env = "OPENAQ_MAP_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|e| AppError::Config(format!("invalid listen address {:?}: {}", self.listen, e)))
    }

    /// Base URL for the proxy endpoint as seen from this process.
    ///
    /// An unspecified listen address (`0.0.0.0`, `::`) is reached through loopback.
    pub fn proxy_base_url(&self, listen: SocketAddr) -> String {
        if let Some(url) = &self.proxy_url {
            return url.clone();
        }

        let ip = match listen.ip() {
            IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
            ip => ip,
        };
        format!("http://{}", SocketAddr::new(ip, listen.port()))
    }
}
