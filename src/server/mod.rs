//! HTTP server: routes, middleware and shared state.

mod handlers;
mod state;

pub use handlers::*;
pub use state::*;

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower_http::trace::TraceLayer;

use crate::api::PROXY_PATH;

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(map_handler))
        .route(PROXY_PATH, get(proxy_handler))
        .route("/health", get(health_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{OpenAQClient, ProxyClient, API_KEY_ENV, API_KEY_HEADER};
    use crate::view::{MapLoader, DEFAULT_ICON_BASE_URL};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use mockito::Matcher;
    use serde_json::{json, Value};
    use serial_test::serial;
    use tower::ServiceExt;

    /// Router whose proxy talks to `upstream_url` and whose map view talks to `proxy_url`.
    fn test_app(upstream_url: &str, proxy_url: &str) -> Router {
        let state = AppState::new(
            OpenAQClient::with_base_url(upstream_url),
            MapLoader::new(ProxyClient::new(proxy_url), DEFAULT_ICON_BASE_URL),
        );
        router(Arc::new(state))
    }

    async fn send_get_bytes(app: Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, body.to_vec())
    }

    async fn send_get(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
        let (status, content_type, body) = send_get_bytes(app, uri).await;
        (status, content_type, String::from_utf8(body).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app("http://127.0.0.1:9/v3", "http://127.0.0.1:9");
        let (status, _, body) = send_get(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({"status": "ok"}));
    }

    #[tokio::test]
    #[serial]
    async fn test_proxy_defaults_and_success() {
        std::env::remove_var(API_KEY_ENV);
        let mut upstream = mockito::Server::new_async().await;
        let payload = json!({"meta": {"found": 1}, "results": [{"id": 1, "coordinates": {"latitude": 1, "longitude": 2}}]});
        let mock = upstream
            .mock("GET", "/v3/locations")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("country".into(), "US".into()),
                Matcher::UrlEncoded("limit".into(), "50".into()),
            ]))
            .match_header(API_KEY_HEADER, Matcher::Missing)
            .with_status(200)
            // Whitespace and key order differ from what we re-serialize.
            .with_body(serde_json::to_string_pretty(&payload).unwrap())
            .create_async()
            .await;

        let app = test_app(&format!("{}/v3", upstream.url()), "http://127.0.0.1:9");
        let (status, content_type, body) = send_get(app, "/api/openaq").await;

        mock.assert_async().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), payload);
    }

    #[tokio::test]
    #[serial]
    async fn test_proxy_forwards_params_and_api_key() {
        std::env::set_var(API_KEY_ENV, "proxy-secret");
        let mut upstream = mockito::Server::new_async().await;
        let mock = upstream
            .mock("GET", "/v3/locations")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("country".into(), "New Zealand".into()),
                Matcher::UrlEncoded("limit".into(), "lots".into()),
            ]))
            .match_header(API_KEY_HEADER, "proxy-secret")
            .with_status(200)
            .with_body(r#"{"results":[]}"#)
            .create_async()
            .await;

        let app = test_app(&format!("{}/v3", upstream.url()), "http://127.0.0.1:9");
        let (status, _, _) = send_get(app, "/api/openaq?country=New%20Zealand&limit=lots").await;
        std::env::remove_var(API_KEY_ENV);

        mock.assert_async().await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    #[serial]
    async fn test_proxy_relays_upstream_error_verbatim() {
        let mut upstream = mockito::Server::new_async().await;
        let raw = "{\"detail\": \"Too Many Requests\"}  \n";
        let _m = upstream
            .mock("GET", "/v3/locations")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_body(raw)
            .create_async()
            .await;

        let app = test_app(&format!("{}/v3", upstream.url()), "http://127.0.0.1:9");
        let (status, _, body) = send_get(app, "/api/openaq?country=DE").await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body, raw);
    }

    #[tokio::test]
    #[serial]
    async fn test_proxy_relays_non_utf8_error_body() {
        let mut upstream = mockito::Server::new_async().await;
        // "err" followed by Latin-1 bytes that are not valid UTF-8
        let raw: &[u8] = &[101, 114, 114, 233, 255];
        let _m = upstream
            .mock("GET", "/v3/locations")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_header("content-type", "text/plain; charset=iso-8859-1")
            .with_body(raw)
            .create_async()
            .await;

        let app = test_app(&format!("{}/v3", upstream.url()), "http://127.0.0.1:9");
        let (status, content_type, body) = send_get_bytes(app, "/api/openaq").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(content_type.as_deref(), Some("text/plain; charset=iso-8859-1"));
        assert_eq!(body, raw);
    }

    #[tokio::test]
    #[serial]
    async fn test_proxy_repeated_params_use_first_value() {
        std::env::remove_var(API_KEY_ENV);
        let mut upstream = mockito::Server::new_async().await;
        let mock = upstream
            .mock("GET", "/v3/locations")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("country".into(), "US".into()),
                Matcher::UrlEncoded("limit".into(), "7".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"results":[]}"#)
            .create_async()
            .await;

        let app = test_app(&format!("{}/v3", upstream.url()), "http://127.0.0.1:9");
        let (status, _, body) =
            send_get(app, "/api/openaq?country=US&country=DE&limit=7&limit=9&extra=1").await;

        mock.assert_async().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({"results": []}));
    }

    #[tokio::test]
    #[serial]
    async fn test_proxy_invalid_json_is_500() {
        let mut upstream = mockito::Server::new_async().await;
        let _m = upstream
            .mock("GET", "/v3/locations")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let app = test_app(&format!("{}/v3", upstream.url()), "http://127.0.0.1:9");
        let (status, content_type, body) = send_get(app, "/api/openaq").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(content_type.unwrap().starts_with("text/plain"));
        assert!(!body.is_empty());
    }

    #[tokio::test]
    #[serial]
    async fn test_proxy_unreachable_upstream_is_500() {
        let app = test_app("http://127.0.0.1:9/v3", "http://127.0.0.1:9");
        let (status, _, body) = send_get(app, "/api/openaq").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.is_empty());
    }

    #[tokio::test]
    async fn test_map_page_with_unreachable_proxy_still_renders() {
        let app = test_app("http://127.0.0.1:9/v3", "http://127.0.0.1:9");
        let (status, content_type, body) = send_get(app, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(content_type.unwrap().starts_with("text/html"));
        assert!(body.contains(r#""markers":[]"#));
    }

    #[tokio::test]
    async fn test_map_page_renders_markers_from_proxy() {
        let mut proxy = mockito::Server::new_async().await;
        let _m = proxy
            .mock("GET", "/api/openaq")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("country".into(), "US".into()),
                Matcher::UrlEncoded("limit".into(), "200".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({"results": [
                    {"id": 1, "name": "Fresno", "coordinates": {"latitude": 36.7, "longitude": -119.8}},
                    {"id": 2, "name": "Nowhere"}
                ]})
                .to_string(),
            )
            .create_async()
            .await;

        let app = test_app("http://127.0.0.1:9/v3", &proxy.url());
        let (status, _, body) = send_get(app, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#""title":"Fresno""#));
        assert!(!body.contains("Nowhere"));
    }
}
