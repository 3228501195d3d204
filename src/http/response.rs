//! Response envelope and exchange logging.
//!
//! # Responsibilities
//! - Standard JSON envelope `{Result, Message, ResultObject}` for handlers
//! - Result codes shared by every handler group
//! - Log each request/response exchange once the response is ready
//!
//! # Design Decisions
//! - The envelope always answers 200; the result code carries the outcome
//! - Body capture is opt-in and bounded; bodies over the limit, or of
//!   unknown size, are forwarded untouched and logged as `<omitted>`

use std::time::Instant;

use axum::{
    body::{Body, Bytes, HttpBody},
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::observability::metrics;

/// Result codes returned in the envelope's `Result` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseResult {
    Success,
    RequiredKeyMissing,
    UnexpectedError,
    HttpError,
    JsonDecodeError,
    AtlassianApiError,
    SlackApiError,
}

impl ResponseResult {
    pub fn code(self) -> &'static str {
        match self {
            ResponseResult::Success => "AGS_000",
            ResponseResult::RequiredKeyMissing => "AGS_001",
            ResponseResult::UnexpectedError => "AGS_900",
            ResponseResult::HttpError => "AGS_901",
            ResponseResult::JsonDecodeError => "AGS_902",
            ResponseResult::AtlassianApiError => "AGS_903",
            ResponseResult::SlackApiError => "AGS_904",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ResponseResult::Success => "SUCCESS",
            ResponseResult::RequiredKeyMissing => "REQUIRED_KEY_MISSING",
            ResponseResult::UnexpectedError => "UNEXPECTED_ERROR",
            ResponseResult::HttpError => "HTTP_ERROR",
            ResponseResult::JsonDecodeError => "JSON_DECODE_ERROR",
            ResponseResult::AtlassianApiError => "ATLASSIAN_ERROR",
            ResponseResult::SlackApiError => "SLACK_ERROR",
        }
    }
}

/// Standard response body.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    #[serde(rename = "Result")]
    pub result: &'static str,
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "ResultObject")]
    pub result_object: Value,
}

impl ApiResponse {
    pub fn new(result: ResponseResult, result_object: impl Into<Value>) -> Self {
        Self {
            result: result.code(),
            message: result.message().to_string(),
            result_object: result_object.into(),
        }
    }

    pub fn success(result_object: impl Into<Value>) -> Self {
        Self::new(ResponseResult::Success, result_object)
    }

    /// Replace the code's default message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Settings for the exchange logging middleware.
#[derive(Debug, Clone)]
pub struct ExchangeLog {
    /// Capture request and response bodies in the log line.
    pub log_bodies: bool,
    /// Largest body captured; larger or unsized bodies pass through
    /// uncaptured.
    pub max_body_bytes: usize,
}

/// Logged in place of a body that was not captured.
pub const OMITTED: &str = "<omitted>";

/// Log one line per exchange: method, URI, status, elapsed time and,
/// when enabled, both bodies.
///
/// Bodies are only buffered when their size hint is known to fit within
/// `max_body_bytes`; anything else streams through untouched.
pub async fn log_exchange(State(settings): State<ExchangeLog>, request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    if !settings.log_bodies {
        let response = next.run(request).await;
        let status = response.status();
        metrics::record_request(method.as_str(), status.as_u16(), started);
        tracing::info!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "exchange completed"
        );
        return response;
    }

    let (parts, body) = request.into_parts();
    let (body, request_text) = match capture(&parts.headers, body, settings.max_body_bytes).await {
        Ok(captured) => captured,
        Err(e) => {
            tracing::warn!(method = %method, uri = %uri, error = %e, "Request body could not be read");
            metrics::record_request(method.as_str(), StatusCode::BAD_REQUEST.as_u16(), started);
            return (StatusCode::BAD_REQUEST, "Request body could not be read").into_response();
        }
    };
    let request = Request::from_parts(parts, body);

    let response = next.run(request).await;
    let (mut parts, body) = response.into_parts();

    let (body, response_text) = match capture(&parts.headers, body, settings.max_body_bytes).await {
        Ok(captured) => captured,
        Err(e) => {
            // The handler's body failed mid-stream; there is nothing left to forward.
            tracing::error!(method = %method, uri = %uri, error = %e, "Response body failed");
            parts.status = StatusCode::INTERNAL_SERVER_ERROR;
            parts.headers.remove(header::CONTENT_LENGTH);
            (Body::empty(), "<failed>".to_string())
        }
    };
    let status = parts.status;

    metrics::record_request(method.as_str(), status.as_u16(), started);
    tracing::info!(
        method = %method,
        uri = %uri,
        status = status.as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        request_body = %request_text,
        response_body = %response_text,
        "exchange completed"
    );

    Response::from_parts(parts, body)
}

/// Buffer `body` for logging when it is known to fit in `limit`; otherwise
/// hand it back unread.
async fn capture(headers: &HeaderMap, body: Body, limit: usize) -> Result<(Body, String), axum::Error> {
    let fits = body
        .size_hint()
        .upper()
        .is_some_and(|upper| upper <= limit as u64);
    if !fits {
        return Ok((body, OMITTED.to_string()));
    }

    let bytes = axum::body::to_bytes(body, limit).await?;
    let text = render_body(headers, &bytes);
    Ok((Body::from(bytes), text))
}

/// Compact JSON when the body is JSON, lossy UTF-8 otherwise.
fn render_body(headers: &HeaderMap, bytes: &Bytes) -> String {
    if bytes.is_empty() {
        return "None".to_string();
    }

    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));

    if is_json {
        if let Ok(value) = serde_json::from_slice::<Value>(bytes) {
            return value.to_string();
        }
    }
    String::from_utf8_lossy(bytes).into_owned()
}
