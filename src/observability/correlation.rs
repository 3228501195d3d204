//! Per-request correlation context.
//!
//! # Responsibilities
//! - Adopt an inbound correlation id or generate a fresh one
//! - Bind the id to the current task (async) or thread (sync) for the
//!   duration of one logical request
//! - Expose the id to any call depth without parameter passing
//!
//! # Design Decisions
//! - Storage is `tokio::task_local!`, so concurrent requests never share a slot
//! - Scopes restore the previous value on exit; a reused worker never sees a
//!   previous occupant's id
//! - Reading outside a scope is not an error: `current()` returns `None`

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

/// Placeholder rendered in log lines emitted outside any request scope.
pub const SENTINEL: &str = "NA";

tokio::task_local! {
    static CURRENT_CORRELATION: CorrelationId;
}

/// Opaque identifier shared by every log line and response of one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId(Arc<str>);

impl CorrelationId {
    /// Generate a fresh id (UUID v4, 128 random bits).
    pub fn generate() -> Self {
        Self(Arc::from(Uuid::new_v4().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CorrelationId {
    fn from(value: &str) -> Self {
        Self(Arc::from(value))
    }
}

impl From<String> for CorrelationId {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

/// Pick the id for a new logical request.
///
/// A present, non-blank inbound value is adopted verbatim so callers can
/// trace across service boundaries; anything else yields a fresh id.
pub fn establish(incoming: Option<&str>) -> CorrelationId {
    match incoming {
        Some(value) if !value.trim().is_empty() => CorrelationId::from(value),
        _ => CorrelationId::generate(),
    }
}

/// The id bound to the calling task or thread, if any.
pub fn current() -> Option<CorrelationId> {
    CURRENT_CORRELATION.try_with(|id| id.clone()).ok()
}

/// Run `future` with `id` as the current correlation id.
pub async fn scope<F>(id: CorrelationId, future: F) -> F::Output
where
    F: Future,
{
    CURRENT_CORRELATION.scope(id, future).await
}

/// Synchronous counterpart of [`scope`], bound to the calling thread.
pub fn sync_scope<R>(id: CorrelationId, f: impl FnOnce() -> R) -> R {
    CURRENT_CORRELATION.sync_scope(id, f)
}

/// Carry the caller's correlation id into a future that will run on another
/// task (e.g. `tokio::spawn`). The id is captured here, at the call site;
/// without a current id the future runs unscoped.
pub fn propagate<F>(future: F) -> impl Future<Output = F::Output>
where
    F: Future,
{
    let id = current();
    async move {
        match id {
            Some(id) => scope(id, future).await,
            None => future.await,
        }
    }
}

/// Handlers can take the request's id as an argument.
///
/// The correlation middleware stores the id in the request extensions; the
/// task-local value is the fallback for requests routed around it.
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<CorrelationId>()
            .cloned()
            .or_else(current)
            .unwrap_or_else(CorrelationId::generate))
    }
}
