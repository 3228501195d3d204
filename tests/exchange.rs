//! Exchange logging through the full middleware stack.

mod common;

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{header, Request, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceExt;

use common::*;
use integration_hub::config::HubConfig;
use integration_hub::http::HubServer;
use integration_hub::lifecycle::bootstrap_with;
use integration_hub::manifest::ManifestLoader;
use integration_hub::observability::TracingLogger;
use integration_hub::registry::{HandlerModule, ModuleCatalog};

const LIMIT: usize = 1024;

fn app() -> Router {
    let catalog = ModuleCatalog::new().provide("big.m1", || {
        let routes = Router::new()
            .route("/blob", get(|| async { "x".repeat(4096) }))
            .route("/small", get(|| async { "tiny" }))
            .route("/sink", post(|body: Bytes| async move { body.len().to_string() }))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "late"
                }),
            );
        Ok(HandlerModule::new("big.m1").export("blob", routes))
    });
    let loader = ManifestLoader::from_json(
        r#"[{"feature_path": "big", "url_prefix": "/big", "routes": [{"module": "m1", "name": "blob"}]}]"#,
    );

    let mut config = HubConfig::default();
    config.limits.max_body_bytes = LIMIT;
    config.timeouts.request_secs = 1;
    assert!(config.observability.log_bodies);

    let startup = bootstrap_with(&config, loader, catalog, TracingLogger::new("test"));
    HubServer::build_router(&config, startup.router)
}

fn exchange_lines(capture: &LogCapture) -> Vec<String> {
    capture.containing("exchange completed")
}

#[tokio::test]
async fn test_large_response_passes_through_uncaptured() {
    let capture = LogCapture::default();
    let _guard = capture.install("info");

    let response = send_get(&app(), "/api/big/blob").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body.len(), 4096);

    let lines = exchange_lines(&capture);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("status=200"));
    assert!(lines[0].contains("response_body=<omitted>"));
}

#[tokio::test]
async fn test_small_response_is_captured() {
    let capture = LogCapture::default();
    let _guard = capture.install("info");

    let response = send_get(&app(), "/api/big/small").await;
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"tiny");

    let lines = exchange_lines(&capture);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("request_body=None"));
    assert!(lines[0].contains("response_body=tiny"));
}

#[tokio::test]
async fn test_oversized_request_is_logged_with_limit_status() {
    let capture = LogCapture::default();
    let _guard = capture.install("info");

    let payload = vec![b'a'; LIMIT * 2];
    let response = app()
        .oneshot(
            Request::post("/api/big/sink")
                .header(header::CONTENT_LENGTH, payload.len())
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let lines = exchange_lines(&capture);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("status=413"));
    assert!(lines[0].contains("request_body=<omitted>"));
}

#[tokio::test]
async fn test_timed_out_request_is_logged() {
    let capture = LogCapture::default();
    let _guard = capture.install("info");

    let response = send_get(&app(), "/api/big/slow").await;

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    let lines = exchange_lines(&capture);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("status=408"));
}
