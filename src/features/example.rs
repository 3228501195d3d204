//! Status handler group.

use axum::{routing::get, Router};
use serde_json::json;

use crate::http::response::ApiResponse;
use crate::observability::CorrelationId;
use crate::registry::{HandlerModule, ModuleLoadError};

pub const MODULE_PATH: &str = "example.status";
pub const EXPORT: &str = "example_status_route";

pub fn module() -> Result<HandlerModule, ModuleLoadError> {
    Ok(HandlerModule::new(MODULE_PATH).export(EXPORT, routes()))
}

pub fn routes() -> Router {
    Router::new().route("/status", get(status))
}

async fn status(correlation: CorrelationId) -> ApiResponse {
    tracing::debug!("Status requested");
    ApiResponse::success(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "correlation_id": correlation.as_str(),
    }))
}
