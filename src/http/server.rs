//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Place the mounted handler groups under the API root
//! - Wire up middleware (correlation, tracing, timeout, limits, exchange log)
//! - Serve the index route
//! - Bind server to listener and stop when shutdown is triggered
//!
//! # Design Decisions
//! - Correlation is the outermost layer; everything inside it, including
//!   the 404 fallback, logs with the request's id
//! - The exchange log wraps the timeout and body limit, so 408 and 413
//!   answers get their line too
//! - Paths outside the API root answer a plain 404

use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::process::Command;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{HubConfig, IndexConfig};
use crate::http::request::correlation_middleware;
use crate::http::response::{log_exchange, ApiResponse, ExchangeLog};
use crate::lifecycle::Shutdown;
use crate::manifest::normalize_prefix;

const GIT_TIMEOUT: Duration = Duration::from_secs(3);

/// HTTP server for the integration hub.
pub struct HubServer {
    router: Router,
    config: HubConfig,
}

impl HubServer {
    /// Create a server around the routes produced by registration.
    pub fn new(config: HubConfig, api: Router) -> Self {
        let router = Self::build_router(&config, api);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &HubConfig, api: Router) -> Router {
        let exchange = ExchangeLog {
            log_bodies: config.observability.log_bodies,
            max_body_bytes: config.limits.max_body_bytes,
        };

        let root = normalize_prefix(&config.api_root);
        let app = if root == "/" {
            Router::new().merge(api)
        } else {
            Router::new().nest(&root, api)
        };

        app.fallback(not_found)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
            .layer(middleware::from_fn_with_state(exchange, log_exchange))
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(correlation_middleware))
    }

    /// Run the server until shutdown is triggered.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: Shutdown,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            api_root = %self.config.api_root,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.wait().await;
                tracing::info!("Draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}

/// Router serving `GET /` with the configured title and message.
pub fn index_router(index: IndexConfig) -> Router {
    Router::new().route("/", get(index_handler)).with_state(index)
}

async fn index_handler(State(index): State<IndexConfig>) -> ApiResponse {
    ApiResponse::success(json!({
        "title": index.title,
        "message": index.message,
        "git_commit_id": git_commit_id().await,
    }))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}

/// Commit the running checkout is at, or "unknown".
pub async fn git_commit_id() -> String {
    let output = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(GIT_TIMEOUT, output).await {
        Ok(Ok(output)) if output.status.success() => {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        }
        Ok(Ok(output)) => {
            tracing::error!(
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "Failed to get Git commit ID"
            );
            "unknown".to_string()
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Failed to get Git commit ID");
            "unknown".to_string()
        }
        Err(_) => {
            tracing::error!(timeout_secs = GIT_TIMEOUT.as_secs(), "Timed out getting Git commit ID");
            "unknown".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::http::request::X_CORRELATION_ID;

    fn app(config: &HubConfig) -> Router {
        HubServer::build_router(config, index_router(config.index.clone()))
    }

    #[tokio::test]
    async fn test_outside_api_root_is_404_with_correlation() {
        let response = app(&HubConfig::default())
            .oneshot(Request::get("/elsewhere").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key(&X_CORRELATION_ID));
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"Not Found");
    }

    #[tokio::test]
    async fn test_index_envelope() {
        let response = app(&HubConfig::default())
            .oneshot(Request::get("/api").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["Result"], "AGS_000");
        assert_eq!(value["ResultObject"]["title"], "Atlassian-Google-Slack Integration Hub");
        assert!(value["ResultObject"]["git_commit_id"].is_string());
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let config = HubConfig::default();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let shutdown = Shutdown::new();
        let server = HubServer::new(config.clone(), index_router(config.index.clone()));

        let handle = tokio::spawn(server.run(listener, shutdown.clone()));
        shutdown.trigger();

        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_root_api_prefix_merges() {
        let mut config = HubConfig::default();
        config.api_root = "/".to_string();

        let response = app(&config)
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
