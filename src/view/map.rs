//! The map view: one fetch from the proxy endpoint per mount, then a Leaflet
//! page with one marker per location that has usable coordinates.

use crate::api::ProxyClient;
use crate::error::Result;
use crate::models::{normalize_locations, results_of, LocationsQuery, NormalizedLocation, PopupContent};
use crate::view::MarkerIcons;
use crate::view::page::{LOADING_HTML, MAP_CONFIG_PLACEHOLDER, MAP_PAGE_HTML};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info};

/// Query the map view always sends to the proxy.
pub const MAP_COUNTRY: &str = "US";
pub const MAP_LIMIT: &str = "200";

/// Initial map center (San Francisco) and zoom.
pub const DEFAULT_CENTER: [f64; 2] = [37.7749, -122.4194];
pub const DEFAULT_ZOOM: u8 = 4;

pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str =
    r#"&copy; <a href="https://www.openstreetmap.org/">OpenStreetMap</a>"#;

#[derive(Debug, Clone, PartialEq)]
pub enum MapState {
    Loading,
    Ready(Vec<NormalizedLocation>),
}

/// A marker as handed to the page script.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub key: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub title: Option<String>,
    pub lines: Vec<String>,
    /// The upstream record, only for popups without a parameter summary.
    /// The page logs it to the console when the popup opens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

impl From<&NormalizedLocation> for Marker {
    fn from(location: &NormalizedLocation) -> Self {
        let popup = location.popup();
        let raw = match popup {
            PopupContent::NoData => {
                debug!("No parameter summary for location {}", location.record);
                Some(location.record.clone())
            },
            _ => None,
        };
        Self {
            key: location.key(),
            lat: location.coordinates.latitude,
            lon: location.coordinates.longitude,
            title: location.title(),
            lines: popup.lines(),
            raw,
        }
    }
}

#[derive(Serialize)]
struct TileLayer {
    url: &'static str,
    attribution: &'static str,
}

#[derive(Serialize)]
struct MapConfig<'a> {
    center: [f64; 2],
    zoom: u8,
    tiles: TileLayer,
    icons: &'a MarkerIcons,
    markers: Vec<Marker>,
}

#[derive(Debug)]
pub struct MapView {
    state: MapState,
}

impl MapView {
    pub fn new() -> Self {
        Self {
            state: MapState::Loading,
        }
    }

    pub fn state(&self) -> &MapState {
        &self.state
    }

    /// Locations currently shown; empty while loading.
    pub fn locations(&self) -> &[NormalizedLocation] {
        match &self.state {
            MapState::Loading => &[],
            MapState::Ready(locations) => locations,
        }
    }

    /// Performs the view's single fetch and moves to `Ready`.
    ///
    /// Always ends in `Ready`: failures are logged and leave the view with no
    /// locations. Calling this again once `Ready` does nothing.
    pub async fn load(&mut self, proxy: &ProxyClient) {
        if let MapState::Ready(_) = self.state {
            return;
        }

        let locations = match fetch_locations(proxy).await {
            Ok(locations) => {
                info!("Loaded {} air quality locations", locations.len());
                locations
            },
            Err(e) => {
                error!("Failed to fetch OpenAQ v3 data: {}", e);
                Vec::new()
            },
        };
        self.state = MapState::Ready(locations);
    }

    pub fn markers(&self) -> Vec<Marker> {
        self.locations().iter().map(Marker::from).collect()
    }

    /// Renders the view: a text placeholder while loading, the full map page once ready.
    pub fn render(&self, icons: &MarkerIcons) -> String {
        match self.state() {
            MapState::Loading => LOADING_HTML.to_string(),
            MapState::Ready(_) => {
                let config = MapConfig {
                    center: DEFAULT_CENTER,
                    zoom: DEFAULT_ZOOM,
                    tiles: TileLayer {
                        url: TILE_URL,
                        attribution: TILE_ATTRIBUTION,
                    },
                    icons,
                    markers: self.markers(),
                };
                MAP_PAGE_HTML.replace(MAP_CONFIG_PLACEHOLDER, &embed_json(&config))
            },
        }
    }
}

impl Default for MapView {
    fn default() -> Self {
        Self::new()
    }
}

async fn fetch_locations(proxy: &ProxyClient) -> Result<Vec<NormalizedLocation>> {
    let body = proxy
        .get_locations(&LocationsQuery::new(MAP_COUNTRY, MAP_LIMIT))
        .await?;
    Ok(normalize_locations(results_of(&body)?))
}

/// Serializes a value for a `<script type="application/json">` block.
///
/// `<` only ever occurs inside JSON strings, where the `\u003c` escape is
/// equivalent and cannot close the surrounding script element.
fn embed_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace('<', "\\u003c")
}
