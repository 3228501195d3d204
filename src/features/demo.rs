//! Echo handler group.

use axum::{body::Bytes, routing::post, Router};
use serde_json::{json, Value};

use crate::http::response::{ApiResponse, ResponseResult};
use crate::observability::CorrelationId;
use crate::registry::{HandlerModule, ModuleLoadError};

pub const MODULE_PATH: &str = "demo.echo";
pub const EXPORT: &str = "demo_echo_route";

pub fn module() -> Result<HandlerModule, ModuleLoadError> {
    Ok(HandlerModule::new(MODULE_PATH).export(EXPORT, routes()))
}

pub fn routes() -> Router {
    Router::new().route("/echo", post(echo))
}

/// `POST /echo {"message": ...}` answers with the message and the
/// request's correlation id.
async fn echo(correlation: CorrelationId, body: Bytes) -> ApiResponse {
    let payload: Value = if body.is_empty() {
        json!({})
    } else {
        match serde_json::from_slice(&body) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(error = %e, "Failed to parse request JSON");
                return ApiResponse::new(
                    ResponseResult::JsonDecodeError,
                    format!("Error parsing request JSON: {e}"),
                );
            }
        }
    };

    let Some(message) = payload
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
    else {
        return ApiResponse::new(ResponseResult::RequiredKeyMissing, "message parameter is required")
            .with_message("Missing message parameter");
    };

    tracing::info!(length = message.len(), "Echoing message");
    ApiResponse::success(json!({
        "message": message,
        "correlation_id": correlation.as_str(),
    }))
}
