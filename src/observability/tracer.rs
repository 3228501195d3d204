//! Shared logging facade and operation instrumentation.
//!
//! # Responsibilities
//! - Leveled messages (debug through critical) routed to the tracing stack
//! - Wrap any callable or future so entry, completion and failure are logged
//! - Instrument every route of a handler group via a tower layer
//!
//! # Design Decisions
//! - One `TracingLogger` is built at startup and handed to whoever needs it
//! - Instrumentation only observes: results, errors and panic payloads are
//!   returned or resumed exactly as produced
//! - A wrapped call with no correlation id in scope gets a fresh one

use std::any::Any;
use std::fmt::{Debug, Display};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tower::{Layer, Service};

use crate::observability::correlation::{self, CorrelationId};

/// Process-wide logging facade.
///
/// Cloning is cheap; every clone shares the same component name.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    service: Arc<str>,
}

impl TracingLogger {
    pub fn new(service: impl Into<Arc<str>>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn debug(&self, message: impl Display) {
        tracing::debug!(service = %self.service, "{message}");
    }

    pub fn info(&self, message: impl Display) {
        tracing::info!(service = %self.service, "{message}");
    }

    pub fn warning(&self, message: impl Display) {
        tracing::warn!(service = %self.service, "{message}");
    }

    pub fn error(&self, message: impl Display) {
        tracing::error!(service = %self.service, "{message}");
    }

    /// `tracing` has no level above error; critical lines are errors tagged
    /// with `severity=critical`.
    pub fn critical(&self, message: impl Display) {
        tracing::error!(service = %self.service, severity = "critical", "{message}");
    }

    /// Run `f` as a named, logged operation.
    pub fn instrument<T, E, F>(&self, operation: &str, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: Display + Debug,
    {
        match correlation::current() {
            Some(_) => self.observe(operation, f),
            None => correlation::sync_scope(CorrelationId::generate(), || self.observe(operation, f)),
        }
    }

    /// Async counterpart of [`instrument`](Self::instrument).
    pub async fn instrument_future<T, E, Fut>(&self, operation: &str, future: Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
        E: Display + Debug,
    {
        match correlation::current() {
            Some(_) => self.observe_future(operation, future).await,
            None => {
                correlation::scope(
                    CorrelationId::generate(),
                    self.observe_future(operation, future),
                )
                .await
            }
        }
    }

    /// Turn `f` into a reusable instrumented callable.
    ///
    /// Zero-argument callables take `()`; several arguments travel as a tuple.
    pub fn wrap<A, T, E, F>(
        &self,
        operation: impl Into<String>,
        f: F,
    ) -> impl Fn(A) -> Result<T, E> + Send + Sync + 'static
    where
        F: Fn(A) -> Result<T, E> + Send + Sync + 'static,
        E: Display + Debug,
    {
        let logger = self.clone();
        let operation = operation.into();
        move |args| logger.instrument(&operation, || f(args))
    }

    /// Turn an async function into a reusable instrumented callable.
    pub fn wrap_async<A, T, E, F, Fut>(
        &self,
        operation: impl Into<String>,
        f: F,
    ) -> impl Fn(A) -> BoxFuture<'static, Result<T, E>> + Send + Sync + 'static
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Display + Debug + Send + 'static,
    {
        let logger = self.clone();
        let operation: Arc<str> = Arc::from(operation.into());
        move |args| {
            let logger = logger.clone();
            let operation = operation.clone();
            let future = f(args);
            async move { logger.instrument_future(&operation, future).await }.boxed()
        }
    }

    /// Layer instrumenting every route of a handler group as `component`.
    pub fn layer(&self, component: impl Into<Arc<str>>) -> OperationTraceLayer {
        OperationTraceLayer {
            logger: self.clone(),
            component: component.into(),
        }
    }

    fn observe<T, E, F>(&self, operation: &str, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: Display + Debug,
    {
        let started = Instant::now();
        tracing::info!(service = %self.service, operation, "operation started");

        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(result) => self.finish(operation, started, result),
            Err(payload) => {
                self.report_panic(operation, started, payload.as_ref());
                panic::resume_unwind(payload)
            }
        }
    }

    async fn observe_future<T, E, Fut>(&self, operation: &str, future: Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
        E: Display + Debug,
    {
        let started = Instant::now();
        tracing::info!(service = %self.service, operation, "operation started");

        match AssertUnwindSafe(future).catch_unwind().await {
            Ok(result) => self.finish(operation, started, result),
            Err(payload) => {
                self.report_panic(operation, started, payload.as_ref());
                panic::resume_unwind(payload)
            }
        }
    }

    fn finish<T, E>(&self, operation: &str, started: Instant, result: Result<T, E>) -> Result<T, E>
    where
        E: Display + Debug,
    {
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => {
                tracing::info!(service = %self.service, operation, elapsed_ms, "operation completed");
            }
            Err(e) => {
                tracing::error!(
                    service = %self.service,
                    operation,
                    elapsed_ms,
                    error = %e,
                    detail = ?e,
                    "operation failed"
                );
            }
        }
        result
    }

    fn report_panic(&self, operation: &str, started: Instant, payload: &(dyn Any + Send)) {
        tracing::error!(
            service = %self.service,
            operation,
            elapsed_ms = started.elapsed().as_millis() as u64,
            panic = %panic_message(payload),
            "operation panicked"
        );
    }
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Tower layer applying [`TracingLogger`] instrumentation to every request a
/// handler group serves.
#[derive(Debug, Clone)]
pub struct OperationTraceLayer {
    logger: TracingLogger,
    component: Arc<str>,
}

impl<S> Layer<S> for OperationTraceLayer {
    type Service = OperationTrace<S>;

    fn layer(&self, inner: S) -> Self::Service {
        OperationTrace {
            inner,
            logger: self.logger.clone(),
            component: self.component.clone(),
        }
    }
}

/// Service produced by [`OperationTraceLayer`].
#[derive(Debug, Clone)]
pub struct OperationTrace<S> {
    inner: S,
    logger: TracingLogger,
    component: Arc<str>,
}

impl<S> Service<Request<Body>> for OperationTrace<S>
where
    S: Service<Request<Body>, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Display + Debug + Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let operation = format!(
            "{} {} {}",
            self.component,
            request.method(),
            request.uri().path()
        );
        let logger = self.logger.clone();
        let response = self.inner.call(request);

        Box::pin(async move {
            let response = logger.instrument_future(&operation, response).await?;
            if response.status().is_server_error() {
                tracing::warn!(
                    service = %logger.service(),
                    operation = %operation,
                    status = response.status().as_u16(),
                    "operation answered with server error"
                );
            }
            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::logging::capture::Buffer;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, PartialEq)]
    struct Boom(&'static str);

    impl Display for Boom {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "boom: {}", self.0)
        }
    }

    fn fallible(input: u32) -> Result<u32, Boom> {
        if input == 0 {
            Err(Boom("zero"))
        } else {
            Ok(input * 2)
        }
    }

    #[test]
    fn test_instrument_returns_result_unchanged() {
        let logger = TracingLogger::new("test");
        assert_eq!(logger.instrument("double", || fallible(21)), Ok(42));
        assert_eq!(logger.instrument("double", || fallible(0)), fallible(0));
    }

    #[test]
    fn test_instrument_establishes_correlation_when_missing() {
        let logger = TracingLogger::new("test");
        let seen = logger
            .instrument("sample", || Ok::<_, Boom>(correlation::current()))
            .unwrap();
        assert!(seen.is_some());
        assert!(correlation::current().is_none());
    }

    #[test]
    fn test_instrument_keeps_existing_correlation() {
        let logger = TracingLogger::new("test");
        let id = CorrelationId::from("kept");
        let seen = correlation::sync_scope(id.clone(), || {
            logger.instrument("sample", || Ok::<_, Boom>(correlation::current()))
        });
        assert_eq!(seen.unwrap(), Some(id));
    }

    #[test]
    fn test_wrap_is_reusable() {
        let logger = TracingLogger::new("test");
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let wrapped = logger.wrap("add", move |(a, b): (u32, u32)| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Boom>(a + b)
        });

        assert_eq!(wrapped((1, 2)), Ok(3));
        assert_eq!(wrapped((5, 5)), Ok(10));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_panic_payload_is_resumed() {
        let logger = TracingLogger::new("test");
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            logger.instrument::<(), Boom, _>("explode", || panic!("kaboom"))
        }));

        let payload = outcome.unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "kaboom");
    }

    #[test]
    fn test_failure_logged_once_with_operation_and_error() {
        let buffer = Buffer::default();
        let _guard = buffer.install();
        let logger = TracingLogger::new("billing");

        let result = correlation::sync_scope(CorrelationId::from("cid-7"), || {
            logger.instrument("charge", || fallible(0))
        });
        assert_eq!(result, Err(Boom("zero")));

        let lines = buffer.lines();
        let errors: Vec<&String> = lines.iter().filter(|l| l.contains(" | ERROR | ")).collect();
        assert_eq!(errors.len(), 1, "{lines:?}");
        assert!(errors[0].contains(" | cid-7 | "));
        assert!(errors[0].contains("operation failed"));
        assert!(errors[0].contains("charge"));
        assert!(errors[0].contains("boom: zero"));
        assert!(lines.iter().any(|l| l.contains("operation started") && l.contains("charge")));
        assert!(!lines.iter().any(|l| l.contains("operation completed")));
    }

    #[test]
    fn test_success_logs_start_and_completion() {
        let buffer = Buffer::default();
        let _guard = buffer.install();
        let logger = TracingLogger::new("billing");

        assert_eq!(logger.instrument("double", || fallible(2)), Ok(4));

        let lines = buffer.lines();
        assert_eq!(lines.len(), 2, "{lines:?}");
        assert!(lines[0].contains("operation started"));
        assert!(lines[1].contains("operation completed"));
        assert!(lines[1].contains("elapsed_ms="));
        // Both lines share the id established for the call.
        let id = lines[0].split(" | ").nth(2).unwrap().to_string();
        assert_ne!(id, correlation::SENTINEL);
        assert_eq!(lines[1].split(" | ").nth(2).unwrap(), id);
    }

    #[test]
    fn test_panic_is_logged_before_resuming() {
        let buffer = Buffer::default();
        let _guard = buffer.install();
        let logger = TracingLogger::new("billing");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            logger.instrument::<(), Boom, _>("explode", || panic!("kaboom"))
        }));
        assert!(outcome.is_err());

        let panicked = buffer
            .lines()
            .into_iter()
            .filter(|l| l.contains("operation panicked"))
            .collect::<Vec<_>>();
        assert_eq!(panicked.len(), 1);
        assert!(panicked[0].contains(" | ERROR | "));
        assert!(panicked[0].contains("kaboom"));
    }

    #[test]
    fn test_leveled_helpers() {
        let buffer = Buffer::default();
        let _guard = buffer.install();
        let logger = TracingLogger::new("billing");

        logger.debug("d");
        logger.info("i");
        logger.warning("w");
        logger.error("e");
        logger.critical("disk full");

        let lines = buffer.lines();
        let levels: Vec<&str> = lines.iter().map(|l| l.split(" | ").nth(1).unwrap().trim()).collect();
        assert_eq!(levels, vec!["DEBUG", "INFO", "WARN", "ERROR", "ERROR"]);
        assert!(lines[4].contains("severity=\"critical\""));
        assert!(lines[4].contains("disk full"));
        assert!(!lines[3].contains("severity"));
        assert!(lines.iter().all(|l| l.contains("service=billing")));
    }

    #[tokio::test]
    async fn test_wrap_async_propagates_error() {
        let logger = TracingLogger::new("test");
        let wrapped = logger.wrap_async("async_double", |n: u32| async move { fallible(n) });

        assert_eq!(wrapped(4).await, Ok(8));
        assert_eq!(wrapped(0).await, Err(Boom("zero")));
    }
}
