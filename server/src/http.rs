//! HTTP router: WebSocket endpoint, health check and static client assets

use crate::relay::RelayHandle;
use crate::websocket::ws_handler;
use axum::{routing::get, Router};
use shared::WS_PATH;
use std::path::Path;
use tower_http::services::ServeDir;

/// Create the Axum router with all endpoints
pub fn create_router(relay: RelayHandle, static_dir: &Path) -> Router {
    Router::new()
        .route(WS_PATH, get(ws_handler))
        .route("/health", get(health_check))
        .fallback_service(ServeDir::new(static_dir))
        .with_state(relay)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::Relay;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;

    #[tokio::test]
    async fn test_health_check() {
        let (_relay, handle) = Relay::new();
        let app = create_router(handle, Path::new("public"));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_serves_static_assets() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>chat</h1>").unwrap();

        let (_relay, handle) = Relay::new();
        let app = create_router(handle, dir.path());

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/index.html").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let missing = app
            .oneshot(Request::builder().uri("/nope.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ws_route_requires_upgrade() {
        let (_relay, handle) = Relay::new();
        let app = create_router(handle, Path::new("public"));

        let response = app
            .oneshot(Request::builder().uri(WS_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }
}
