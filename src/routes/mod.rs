//! Route modules for Brand Server

pub mod brands;
pub mod health;

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::state::AppState;

/// Build the application router
pub fn router(state: AppState) -> Router {
    let max_upload_bytes = state.limits().max_upload_bytes;

    Router::new()
        .nest("/health", health::router())
        .nest("/api/v1/health", health::router())
        .nest("/brands", brands::router(max_upload_bytes))
        .nest("/api/v1/brands", brands::router(max_upload_bytes))
        .with_state(state)
}

/// Build the CORS layer for the configured frontends.
///
/// A `*` entry allows any origin; credentials are only allowed for an explicit
/// origin list.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, axum::http::header::InvalidHeaderValue> {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_LENGTH,
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            HeaderName::from_static("x-requested-with"),
        ]);

    if origins.iter().any(|o| o == "*") {
        return Ok(layer.allow_origin(Any));
    }

    let origins = origins
        .iter()
        .map(|o| HeaderValue::from_str(o))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(layer
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::config::LimitsConfig;
    use crate::db::MemoryBrandStore;
    use crate::extract::testing::ScriptedExtractor;

    fn test_router() -> Router {
        let state = AppState::new(
            Arc::new(MemoryBrandStore::new()),
            Arc::new(ScriptedExtractor::echo()),
            LimitsConfig::default(),
        );
        router(state)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        for uri in ["/health", "/api/v1/health"] {
            let (status, body) = get_json(test_router(), uri).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["status"], "UP");
            assert_eq!(body["service"], "brand-server");
        }
    }

    #[tokio::test]
    async fn test_readiness() {
        let (status, body) = get_json(test_router(), "/health/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "UP");
    }

    #[tokio::test]
    async fn test_cors_preflight_for_allowed_origin() {
        let origins = vec!["http://localhost:3001".to_string()];
        let app = test_router().layer(cors_layer(&origins).unwrap());

        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/brands")
                    .header(header::ORIGIN, "http://localhost:3001")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:3001"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn test_cors_rejects_unknown_origin() {
        let origins = vec!["http://localhost:3001".to_string()];
        let app = test_router().layer(cors_layer(&origins).unwrap());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "http://evil.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[test]
    fn test_cors_wildcard_and_invalid_origins() {
        assert!(cors_layer(&["*".to_string()]).is_ok());
        assert!(cors_layer(&["http://bad\norigin".to_string()]).is_err());
    }
}
