//! Defines data structures for the application.
//!
//! Includes:
//! - The proxy's query parameters (`LocationsQuery`).
//! - Normalization of loosely-typed OpenAQ v3 `/locations` results into
//!   `NormalizedLocation`s with resolved coordinates.
//! - Popup content derived from each location (`PopupContent`, `ParameterSummary`).
//!
//! Upstream records are kept as raw `serde_json::Value`s: the v3 schema has been
//! observed in several shapes, so every field is looked up defensively.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Country used when the caller does not pass one.
pub const DEFAULT_COUNTRY: &str = "US";
/// Page size used when the caller does not pass one.
pub const DEFAULT_LIMIT: &str = "50";
/// Number of parameter lines shown in a marker popup.
pub const MAX_PARAMETER_SUMMARIES: usize = 5;
/// Shown in a popup when a location carries neither `parameters` nor `latest`.
/// The raw record is written to the browser console when such a popup opens.
pub const NO_DATA_NOTICE: &str = "No parameter summary available — inspect console for raw object";

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

fn default_limit() -> String {
    DEFAULT_LIMIT.to_string()
}

/// Query parameters accepted by the proxy endpoint.
///
/// Both values are opaque strings: no range or allow-list checks are applied,
/// they are only percent-encoded into the upstream URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LocationsQuery {
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_limit")]
    pub limit: String,
}

impl Default for LocationsQuery {
    fn default() -> Self {
        Self {
            country: default_country(),
            limit: default_limit(),
        }
    }
}

impl LocationsQuery {
    pub fn new(country: impl Into<String>, limit: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            limit: limit.into(),
        }
    }

    /// Builds a query from decoded query-string pairs.
    ///
    /// The first occurrence of each parameter is used; later duplicates and
    /// unknown parameters are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut country = None;
        let mut limit = None;
        for (name, value) in pairs {
            match name.as_str() {
                "country" if country.is_none() => country = Some(value),
                "limit" if limit.is_none() => limit = Some(value),
                _ => {},
            }
        }
        Self {
            country: country.unwrap_or_else(default_country),
            limit: limit.unwrap_or_else(default_limit),
        }
    }
}

/// A resolved latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Resolves a location record's coordinates.
///
/// Each axis is resolved independently, taking the first numeric candidate:
///
/// | axis      | 1st                     | 2nd               | 3rd                    | 4th                  |
/// |-----------|-------------------------|-------------------|------------------------|----------------------|
/// | latitude  | `coordinates.latitude`  | `coordinates.lat` | `coordinates[1]`       | top-level `latitude` |
/// | longitude | `coordinates.longitude` | `coordinates.lon` | `coordinates[0]`       | top-level `longitude`|
///
/// The array form is `[longitude, latitude]`. Returns `None` if either axis
/// stays unresolved.
pub fn resolve_coordinates(record: &Value) -> Option<Coordinates> {
    let coords = record.get("coordinates");

    let axis = |long: &str, short: &str, index: usize| -> Option<f64> {
        coords
            .and_then(|c| c.get(long))
            .and_then(Value::as_f64)
            .or_else(|| coords.and_then(|c| c.get(short)).and_then(Value::as_f64))
            .or_else(|| {
                coords
                    .and_then(Value::as_array)
                    .and_then(|pair| pair.get(index))
                    .and_then(Value::as_f64)
            })
            .or_else(|| record.get(long).and_then(Value::as_f64))
    };

    let latitude = axis("latitude", "lat", 1)?;
    let longitude = axis("longitude", "lon", 0)?;
    Some(Coordinates {
        latitude,
        longitude,
    })
}

/// An upstream location record together with its resolved coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedLocation {
    pub record: Value,
    pub coordinates: Coordinates,
}

impl NormalizedLocation {
    /// Marker identity: `id`, else `location`.
    pub fn key(&self) -> Option<String> {
        first_present(&self.record, &["id", "location"]).map(display_text)
    }

    /// Popup heading: `name`, else `location`, else `city`.
    pub fn title(&self) -> Option<String> {
        first_present(&self.record, &["name", "location", "city"]).map(display_text)
    }

    pub fn popup(&self) -> PopupContent {
        PopupContent::for_record(&self.record)
    }
}

/// Normalizes a list of upstream results, silently dropping every record
/// without a resolvable coordinate pair. Input order is preserved.
pub fn normalize_locations(results: &[Value]) -> Vec<NormalizedLocation> {
    results
        .iter()
        .filter_map(|record| {
            resolve_coordinates(record).map(|coordinates| NormalizedLocation {
                record: record.clone(),
                coordinates,
            })
        })
        .collect()
}

/// Extracts the `results` list from a `/locations` response body.
///
/// A missing or `null` `results` field counts as an empty list; any other
/// non-list value is an error.
pub fn results_of(body: &Value) -> Result<&[Value]> {
    match body.get("results") {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(results)) => Ok(results),
        Some(other) => Err(AppError::UnexpectedResponse(format!(
            "`results` is not a list: {}",
            other
        ))),
    }
}

/// One line of a popup: a parameter label and its latest value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterSummary {
    pub label: String,
    pub value: String,
}

impl ParameterSummary {
    fn from_entry(entry: &Value) -> Self {
        let label = ["name", "parameter", "displayName", "id"]
            .iter()
            .filter_map(|field| entry.get(*field))
            .find(|v| is_truthy(v))
            .or_else(|| entry.get("id").filter(|v| !v.is_null()))
            .map(display_text)
            .unwrap_or_default();

        let value = first_present(entry, &["lastValue", "value"])
            .map(display_text)
            .unwrap_or_else(|| entry.to_string());

        Self { label, value }
    }
}

/// What a marker popup shows, in order of availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum PopupContent {
    /// The first few entries of a non-empty `parameters` list.
    Parameters(Vec<ParameterSummary>),
    /// The `latest` object, serialized as compact JSON.
    Latest(String),
    /// Neither of the above is available.
    NoData,
}

impl PopupContent {
    pub fn for_record(record: &Value) -> Self {
        if let Some(parameters) = record
            .get("parameters")
            .and_then(Value::as_array)
            .filter(|p| !p.is_empty())
        {
            return PopupContent::Parameters(
                parameters
                    .iter()
                    .take(MAX_PARAMETER_SUMMARIES)
                    .map(ParameterSummary::from_entry)
                    .collect(),
            );
        }

        match record.get("latest") {
            Some(latest) if is_truthy(latest) => PopupContent::Latest(latest.to_string()),
            _ => PopupContent::NoData,
        }
    }

    /// Plain-text lines, as displayed below the popup title.
    pub fn lines(&self) -> Vec<String> {
        match self {
            PopupContent::Parameters(summaries) => summaries
                .iter()
                .map(|s| format!("{}: {}", s.label, s.value))
                .collect(),
            PopupContent::Latest(json) => vec![json.clone()],
            PopupContent::NoData => vec![NO_DATA_NOTICE.to_string()],
        }
    }
}

/// First field that is present and not `null`.
fn first_present<'a>(record: &'a Value, fields: &[&str]) -> Option<&'a Value> {
    fields
        .iter()
        .filter_map(|field| record.get(*field))
        .find(|v| !v.is_null())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Renders a JSON value as display text: strings unquoted, everything else as JSON.
fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
