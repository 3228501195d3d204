//! Routing manifest subsystem.
//!
//! # Data Flow
//! ```text
//! routes.json (or inline text)
//!     → loader.rs (read, parse, cache)
//!     → RouteManifest (ordered FeatureGroups, immutable)
//!     → registry::engine (validates each group/route, mounts handlers)
//! ```
//!
//! # Design Decisions
//! - Group and route fields are optional at the serde level so that a single
//!   incomplete entry is skipped downstream instead of failing the whole parse
//! - The manifest is parsed once and shared via `Arc`

pub mod loader;

use serde::{Deserialize, Serialize};

pub use loader::{ManifestError, ManifestLoader, ManifestSource};

/// Ordered list of feature groups, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct RouteManifest {
    pub groups: Vec<FeatureGroup>,
}

impl RouteManifest {
    pub fn new(groups: Vec<FeatureGroup>) -> Self {
        Self { groups }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of route declarations across all groups.
    pub fn route_count(&self) -> usize {
        self.groups.iter().map(|g| g.routes.len()).sum()
    }
}

/// A module namespace mounted under one URL prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeatureGroup {
    /// Dotted or slash-separated module namespace (e.g. "feature/demo").
    #[serde(default)]
    pub feature_path: Option<String>,

    /// URL prefix every handler of this group is nested under.
    #[serde(default)]
    pub url_prefix: Option<String>,

    #[serde(default)]
    pub routes: Vec<RouteDecl>,
}

impl FeatureGroup {
    pub fn new(feature_path: &str, url_prefix: &str, routes: Vec<RouteDecl>) -> Self {
        Self {
            feature_path: Some(feature_path.to_string()),
            url_prefix: Some(url_prefix.to_string()),
            routes,
        }
    }

    /// Both required fields, if present and non-blank.
    pub fn required_fields(&self) -> Option<(&str, &str)> {
        let feature_path = non_blank(self.feature_path.as_deref())?;
        let url_prefix = non_blank(self.url_prefix.as_deref())?;
        Some((feature_path, url_prefix))
    }
}

/// One handler to mount: a module within the group and a named export of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteDecl {
    #[serde(default)]
    pub module: Option<String>,

    #[serde(default, rename = "name")]
    pub handler_name: Option<String>,
}

impl RouteDecl {
    pub fn new(module: &str, handler_name: &str) -> Self {
        Self {
            module: Some(module.to_string()),
            handler_name: Some(handler_name.to_string()),
        }
    }

    pub fn required_fields(&self) -> Option<(&str, &str)> {
        let module = non_blank(self.module.as_deref())?;
        let handler_name = non_blank(self.handler_name.as_deref())?;
        Some((module, handler_name))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Join a feature path and a module name into a dotted module path.
///
/// Slashes become dots and empty segments are dropped, so
/// `("feature/demo/", "m1")` and `("feature.demo", "m1")` both yield
/// `"feature.demo.m1"`.
pub fn module_path(feature_path: &str, module: &str) -> String {
    feature_path
        .split(['/', '.'])
        .chain(module.split(['/', '.']))
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

/// Canonical form of a URL prefix: leading slash, no trailing slash
/// (except for the root itself).
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
