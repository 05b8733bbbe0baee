//! Router-level tests for the read-only claims API.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use claimset_core::clock::SystemClock;
use claimset_core::Registry;
use claimset_server::app_state::AppState;
use claimset_server::{config, router};

fn app(yaml: &str) -> Router {
    let cfg = config::load_from_str(yaml).unwrap();
    let state = AppState::from_parts(cfg, Registry::builtin().unwrap(), Arc::new(SystemClock));
    router::build_router(state)
}

async fn call(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1 << 20).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn healthz_ok() {
    let resp = app("version: 1\n").oneshot(get("/healthz")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn metric_formats() {
    let (status, body) = call(app("version: 1\n"), get("/v1/metrics/debtManaged")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], "$2B+");

    let (_, body) = call(app("version: 1\n"), get("/v1/metrics/collectionLift?format=currency")).await;
    assert_eq!(body["value"], "$35");
}

#[tokio::test]
async fn unknown_metric_is_not_available() {
    let (status, body) = call(app("version: 1\n"), get("/v1/metrics/doesNotExist")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": "doesNotExist", "value": "N/A", "fresh": false }));
}

#[tokio::test]
async fn content_variant_rendered() {
    let (status, body) = call(
        app("version: 1\n"),
        get("/v1/content/home.hero.headline?variant=short&location=home"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "35% collection lift");

    let (_, body) = call(app("version: 1\n"), get("/v1/content/missing")).await;
    assert_eq!(body["text"], "");
}

#[tokio::test]
async fn render_interpolates() {
    let req = post_json("/v1/render", json!({ "template": "Up to {{roiMultiple}} ROI, {{nope}}" }));
    let (status, body) = call(app("version: 1\n"), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "Up to 5x ROI, N/A");
}

#[tokio::test]
async fn render_rejects_oversized_template() {
    let big = "x".repeat(100);
    let req = post_json("/v1/render", json!({ "template": big }));
    let (status, body) = call(app("version: 1\nserver: { max_template_bytes: 64 }\n"), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn audit_hidden_unless_enabled() {
    let (status, body) = call(app("version: 1\n"), get("/debug/audit")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");

    let app = app("version: 1\naudit: { enabled: true }\n");
    let _ = call(app.clone(), get("/v1/metrics/ghost?location=pricing")).await;
    let (status, body) = call(app, get("/debug/audit")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rtf_compliant"], false);
    assert_eq!(body["validation_errors"][0]["key"], "ghost");
    assert_eq!(body["validation_errors"][0]["location"], "pricing");
}
