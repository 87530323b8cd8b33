//! Integration tests for the HTTP surface
//!
//! The router is exercised in-process with `tower::ServiceExt::oneshot`, so no
//! port is bound.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use slizzai::config::{LatencyConfig, SlizzConfig};
use slizzai::runtime::{
    steps, AssetHandle, AssetLoader, Coordinator, LoaderError, MemoryLog, StubAssetLoader,
};
use slizzai::server::{create_router, AppState};

struct RejectingLoader;

impl AssetLoader for RejectingLoader {
    fn load_asset(&self, path: &str) -> Result<Option<AssetHandle>, LoaderError> {
        Err(LoaderError::NotFound(path.to_string()))
    }
}

fn instant_config() -> SlizzConfig {
    SlizzConfig {
        latency: LatencyConfig::zero(),
        ..SlizzConfig::default()
    }
}

fn test_router(loader: Arc<dyn AssetLoader>) -> Router {
    let coordinator = Coordinator::with_parts(instant_config(), loader, Arc::new(MemoryLog::new()));
    create_router(AppState::new(coordinator), 4)
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn run_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/pipeline/run")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let router = test_router(Arc::new(StubAssetLoader));
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(router, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_run_matches_library_results() {
    let router = test_router(Arc::new(StubAssetLoader));

    let (status, body) = send(router, run_request(r#"{"asset": "foo"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["asset"], "foo");
    assert_eq!(body["imported"], true);
    assert_eq!(
        body["results"][steps::NEURAL_HDR],
        "ASSETDATA(FOO) [Processed by SlizzAi]"
    );
    assert_eq!(
        body["results"][steps::FINAL_ASSET],
        body["results"][steps::ART_FILTER]
    );
    assert_eq!(body["steps"].as_array().unwrap().len(), 7);
    assert!(body["serial_number"]
        .as_str()
        .unwrap()
        .starts_with("SZAIV3-"));
}

#[tokio::test]
async fn test_run_uses_default_asset_and_request_id() {
    let router = test_router(Arc::new(StubAssetLoader));
    let request = Request::builder()
        .method("POST")
        .uri("/v1/pipeline/run")
        .header("x-request-id", "6f1c2a3e-9a1b-4c5d-8e7f-001122334455")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["run_id"], "6f1c2a3e-9a1b-4c5d-8e7f-001122334455");
    assert_eq!(body["asset"], "/Game/ExampleAsset.ExampleAsset");
}

#[tokio::test]
async fn test_run_with_failed_import() {
    let router = test_router(Arc::new(RejectingLoader));

    let (status, body) = send(router, run_request(r#"{"asset": "/Game/Missing"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["imported"], false);
    assert_eq!(body["results"], serde_json::json!({}));
    assert_eq!(body["steps"], serde_json::json!([]));
}

#[tokio::test]
async fn test_run_rejects_malformed_body() {
    let router = test_router(Arc::new(StubAssetLoader));

    let (status, _) = send(router, run_request("{asset")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_status_reports_cache_stats() {
    let coordinator = Coordinator::with_parts(
        instant_config(),
        Arc::new(StubAssetLoader),
        Arc::new(MemoryLog::new()),
    );
    coordinator.run("a").await;
    coordinator.run("b").await;
    let router = create_router(AppState::new(coordinator), 4);

    let request = Request::builder()
        .uri("/status")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], "2.9");
    assert_eq!(body["runs_completed"], 2);
    assert_eq!(body["caches"]["shader_conductor"]["misses"], 1);
    assert_eq!(body["caches"]["shader_conductor"]["hits"], 1);
    assert_eq!(body["caches"]["directx"]["entries"], 1);
}
