//! HTTP surface integration tests.
//!
//! Drive the router directly with `tower::ServiceExt`, with the pipeline
//! wired to mocks.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use prometheus::Registry;
use tempfile::TempDir;
use tower::ServiceExt;

use retrato_core::{
    aging::AgingParams,
    load_config_from_str,
    pipeline::{AgingPipeline, UploadConfig},
    poller::PollerConfig,
    testing::{MemoryRecordStore, MockAgingApi, MockBlobStore},
};
use retrato_server::{api::create_router, state::AppState};

const BOUNDARY: &str = "retrato-test-boundary";

struct TestServer {
    app: Router,
    _media_dir: TempDir,
}

fn test_server() -> TestServer {
    let config = load_config_from_str(
        r#"
[aging]
base_url = "https://api.agify.example/v1"
api_key = "super-secret-key"
"#,
    )
    .unwrap();

    let api = Arc::new(MockAgingApi::new());
    let storage = Arc::new(MockBlobStore::new());
    let records = Arc::new(MemoryRecordStore::new());

    let pipeline = Arc::new(AgingPipeline::new(
        UploadConfig::default(),
        PollerConfig {
            poll_interval_ms: 50,
            max_poll_duration_secs: 5,
            max_transient_retries: 3,
            retire_after_ms: 10_000,
        },
        AgingParams::default(),
        storage,
        api,
        records.clone(),
    ));

    let registry = Registry::new();
    retrato_core::metrics::register_metrics(&registry).ok();

    let media_dir = TempDir::new().unwrap();
    let state = Arc::new(AppState::new(config, pipeline, records, registry));
    let app = create_router(state, media_dir.path());

    TestServer {
        app,
        _media_dir: media_dir,
    }
}

fn multipart_body(owner_id: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"owner_id\"\r\n\r\n{owner}\r\n",
            b = BOUNDARY,
            owner = owner_id
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"photo\"\r\nContent-Type: {ct}\r\n\r\n",
            b = BOUNDARY,
            ct = content_type
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{b}--\r\n", b = BOUNDARY).as_bytes());
    body
}

fn upload_request(owner_id: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/photos")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(owner_id, content_type, bytes)))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = test_server();

    let response = server
        .app
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_config_endpoint_redacts_api_key() {
    let server = test_server();

    let response = server
        .app
        .oneshot(
            Request::builder()
                .uri("/api/v1/config")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(!text.contains("super-secret-key"));
    assert!(text.contains("api_key_configured"));
}

#[tokio::test]
async fn test_upload_returns_receipt_and_tracks_job() {
    let server = test_server();

    let response = server
        .app
        .clone()
        .oneshot(upload_request("owner-1", "image/jpeg", &[0xFF; 1024]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_json(response).await;
    assert!(json["original_url"]
        .as_str()
        .unwrap()
        .contains("owner-1/original_"));
    assert_eq!(json["job_id"], "job-1");

    // The job is immediately inspectable.
    let response = server
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/jobs/job-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["state"], "processing");

    // So is the artifact record.
    let response = server
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/records/owner-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["job_id"], "job-1");
}

#[tokio::test]
async fn test_upload_rejects_unsupported_type() {
    let server = test_server();

    let response = server
        .app
        .oneshot(upload_request("owner-1", "text/plain", b"not an image"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("unsupported content type"));
}

#[tokio::test]
async fn test_unknown_job_is_not_found() {
    let server = test_server();

    let response = server
        .app
        .oneshot(
            Request::builder()
                .uri("/api/v1/jobs/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metrics_endpoint_serves_text() {
    let server = test_server();

    let response = server
        .app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
