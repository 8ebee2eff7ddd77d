//! Deferred construction of the map view.
//!
//! Nothing map-related is built at startup: each page request mounts a fresh
//! `MapView`, and the Leaflet map itself is only instantiated by the page
//! script in the browser. Leaflet's default marker icon URLs are process-wide
//! configuration, set once before the first render and never torn down.

use std::sync::OnceLock;

use serde::Serialize;
use tracing::info;

use crate::api::ProxyClient;
use crate::view::MapView;

/// Where Leaflet 1.9.4 publishes its marker images.
pub const DEFAULT_ICON_BASE_URL: &str = "https://unpkg.com/leaflet@1.9.4/dist/images";

/// Leaflet `L.Icon.Default` options; field names match Leaflet's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerIcons {
    pub icon_url: String,
    pub icon_retina_url: String,
    pub shadow_url: String,
}

impl MarkerIcons {
    pub fn from_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            icon_url: format!("{}/marker-icon.png", base),
            icon_retina_url: format!("{}/marker-icon-2x.png", base),
            shadow_url: format!("{}/marker-shadow.png", base),
        }
    }
}

static DEFAULT_ICONS: OnceLock<MarkerIcons> = OnceLock::new();

/// Sets the default marker icons, once per process.
///
/// Later calls are no-ops and return the configuration from the first call.
pub fn init_default_icons(base_url: &str) -> &'static MarkerIcons {
    DEFAULT_ICONS.get_or_init(|| {
        let icons = MarkerIcons::from_base_url(base_url);
        info!("Default marker icons served from {}", base_url);
        icons
    })
}

/// Mounts map views on demand.
#[derive(Debug, Clone)]
pub struct MapLoader {
    proxy: ProxyClient,
    icon_base_url: String,
}

impl MapLoader {
    pub fn new(proxy: ProxyClient, icon_base_url: impl Into<String>) -> Self {
        Self {
            proxy,
            icon_base_url: icon_base_url.into(),
        }
    }

    /// Builds a new view and runs its one load.
    pub async fn mount(&self) -> MapView {
        let mut view = MapView::new();
        view.load(&self.proxy).await;
        view
    }

    /// Mounts a view and renders it as a full page.
    pub async fn render(&self) -> String {
        let icons = init_default_icons(&self.icon_base_url);
        self.mount().await.render(icons)
    }
}
