//! Request-side correlation handling.
//!
//! # Responsibilities
//! - Read `X-Correlation-ID` from the inbound request
//! - Establish the request's correlation id before any handler runs
//! - Run the rest of the stack inside the correlation scope
//! - Echo the id on the response, whatever its status
//!
//! # Design Decisions
//! - Installed as the outermost layer so framework events (trace spans,
//!   timeouts, 404 fallbacks) are stamped too
//! - A header that is not valid visible ASCII counts as absent

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::observability::correlation::{self, CorrelationId};

/// Header carrying the correlation id in both directions.
pub const X_CORRELATION_ID: HeaderName = HeaderName::from_static("x-correlation-id");

/// Correlation id supplied by the caller, if usable.
pub fn inbound_correlation_id(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(&X_CORRELATION_ID)
        .and_then(|value| value.to_str().ok())
}

pub async fn correlation_middleware(mut request: Request, next: Next) -> Response {
    let id = correlation::establish(inbound_correlation_id(&request));
    request.extensions_mut().insert(id.clone());

    let mut response = correlation::scope(id.clone(), next.run(request)).await;
    attach_correlation_header(&mut response, &id);
    response
}

fn attach_correlation_header(response: &mut Response, id: &CorrelationId) {
    match HeaderValue::from_str(id.as_str()) {
        Ok(value) => {
            response.headers_mut().insert(X_CORRELATION_ID, value);
        }
        Err(_) => {
            tracing::warn!(correlation_id = %id, "Correlation id is not a valid header value");
        }
    }
}
