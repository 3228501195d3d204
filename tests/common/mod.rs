//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tower::ServiceExt;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use integration_hub::manifest::ManifestLoader;
use integration_hub::observability::logging::build_subscriber;
use integration_hub::registry::{HandlerModule, ModuleCatalog};

/// In-memory log sink using the hub's line format.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Install the hub subscriber over this capture for the current thread.
    pub fn install(&self, directives: &str) -> tracing::subscriber::DefaultGuard {
        let subscriber = build_subscriber(EnvFilter::new(directives), self.clone());
        tracing::subscriber::set_default(subscriber)
    }

    pub fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::to_owned)
            .collect()
    }

    /// Lines at `level` (e.g. "ERROR").
    pub fn at_level(&self, level: &str) -> Vec<String> {
        let marker = format!(" | {:<5} | ", level);
        self.lines().into_iter().filter(|l| l.contains(&marker)).collect()
    }

    pub fn containing(&self, needle: &str) -> Vec<String> {
        self.lines().into_iter().filter(|l| l.contains(needle)).collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Correlation id field of a captured line.
pub fn correlation_of(line: &str) -> &str {
    line.split(" | ").nth(2).unwrap_or_default()
}

pub fn ping_router() -> Router {
    Router::new().route("/ping", get(|| async { "pong" }))
}

/// Catalog with `demo.m1` exporting `h1` (GET /ping).
pub fn demo_catalog() -> ModuleCatalog {
    ModuleCatalog::new().provide("demo.m1", || {
        Ok(HandlerModule::new("demo.m1").export("h1", ping_router()))
    })
}

/// Catalog with `demo.m1` that exports nothing.
pub fn empty_module_catalog() -> ModuleCatalog {
    ModuleCatalog::new().provide("demo.m1", || Ok(HandlerModule::new("demo.m1")))
}

/// Manifest with one group per prefix, each declaring `m1`/`h1`.
pub fn manifest_for(prefixes: &[&str]) -> ManifestLoader {
    let groups: Vec<String> = prefixes
        .iter()
        .map(|prefix| {
            format!(
                r#"{{"feature_path":"demo","url_prefix":"{prefix}","routes":[{{"module":"m1","name":"h1"}}]}}"#
            )
        })
        .collect();
    ManifestLoader::from_json(format!("[{}]", groups.join(",")))
}

pub async fn send_get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn status_of(app: &Router, uri: &str) -> StatusCode {
    send_get(app, uri).await.status()
}
