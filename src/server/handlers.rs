//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::{api_key_from_env, OpenAQClient};
use crate::error::Result;
use crate::models::LocationsQuery;
use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// GET /health - Basic health check
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /api/openaq - Forward a locations query to OpenAQ.
///
/// Upstream errors are relayed verbatim (status and raw body bytes); successful
/// bodies are re-emitted as JSON with status 200. Anything else that goes
/// wrong becomes a plain-text 500.
///
/// The query string is taken as raw pairs so that repeated or unknown
/// parameters never cause a rejection: the first `country`/`limit` wins.
pub async fn proxy_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let query = LocationsQuery::from_pairs(pairs);
    match relay_locations(&state.upstream, &query).await {
        Ok(response) => response,
        Err(e) => {
            warn!("Proxy request for {:?} failed: {}", query, e);
            e.into_response()
        },
    }
}

async fn relay_locations(client: &OpenAQClient, query: &LocationsQuery) -> Result<Response> {
    let api_key = api_key_from_env();
    let upstream = client.fetch_locations(query, api_key.as_deref()).await?;

    if !upstream.is_success() {
        debug!("Relaying upstream status {}", upstream.status);
        let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
        let content_type = upstream
            .content_type
            .as_deref()
            .and_then(|ct| HeaderValue::from_str(ct).ok())
            .unwrap_or_else(|| HeaderValue::from_static("text/plain; charset=utf-8"));
        return Ok((status, [(header::CONTENT_TYPE, content_type)], upstream.body).into_response());
    }

    let json: Value = serde_json::from_slice(&upstream.body)?;
    Ok(Json(json).into_response())
}

/// GET / - The map page
pub async fn map_handler(Extension(state): Extension<Arc<AppState>>) -> Html<String> {
    Html(state.map.render().await)
}
