#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use freelance_api::config::ServerConfig;
use freelance_api::router::build_app_router;
use freelance_api::state::AppState;
use freelance_core::latency::NoLatency;

pub const CLIENT_PASSWORD: &str = "securePassword123";
pub const CLIENT_SIGNATURE: &str = "client123_signature_2024";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a 30-second request timeout, and no simulated latency.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        simulated_latency: false,
        journal_capacity: 64,
    }
}

/// Fresh application state with an empty registry and the journal running.
pub fn test_state() -> AppState {
    let state = AppState::new(test_config(), Arc::new(NoLatency));
    tokio::spawn(Arc::clone(&state.journal).run(state.event_bus.subscribe()));
    state
}

/// Build the full application router with all middleware layers.
///
/// Uses the same builder as `main.rs` so integration tests exercise the
/// production middleware stack.
pub fn build_test_app(state: AppState) -> Router {
    build_app_router(state)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Submit a valid completion for `job_id` with client123's credentials and
/// return its id.
pub async fn submit_completion(app: Router, job_id: &str) -> String {
    let response = post_json(
        app,
        &format!("/api/v1/jobs/{job_id}/completions"),
        serde_json::json!({
            "notes": "done",
            "deliverables": ["file.zip"],
            "client_password": CLIENT_PASSWORD,
            "client_signature": CLIENT_SIGNATURE,
        }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string()
}
