//! Handler modules and the catalog of known module providers.
//!
//! # Design Decisions
//! - A module is a named bag of handler groups (`axum::Router`s), looked up
//!   by export name the way the manifest refers to them
//! - The catalog maps module paths to factories for compiled-in code; there
//!   is no loading of code that was not linked into the binary

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use axum::Router;
use thiserror::Error;

/// A mountable unit; the host nests it under a URL prefix.
pub type Handler = Router;

/// Failure reported by a module factory.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ModuleLoadError(pub String);

impl ModuleLoadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Loaded module: handler groups keyed by export name.
#[derive(Clone, Default)]
pub struct HandlerModule {
    path: String,
    exports: BTreeMap<String, Handler>,
}

impl HandlerModule {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            exports: BTreeMap::new(),
        }
    }

    /// Builder-style export of a handler group under `name`.
    pub fn export(mut self, name: impl Into<String>, handler: Handler) -> Self {
        self.exports.insert(name.into(), handler);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn get(&self, name: &str) -> Option<&Handler> {
        self.exports.get(name)
    }

    pub fn export_names(&self) -> impl Iterator<Item = &str> {
        self.exports.keys().map(String::as_str)
    }
}

impl fmt::Debug for HandlerModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerModule")
            .field("path", &self.path)
            .field("exports", &self.exports.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Factory producing a module on first resolution.
pub type ModuleFactory = Arc<dyn Fn() -> Result<HandlerModule, ModuleLoadError> + Send + Sync>;

/// Explicit registry of module providers, populated once at startup.
#[derive(Clone, Default)]
pub struct ModuleCatalog {
    providers: HashMap<String, ModuleFactory>,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider for `path`. A later registration for the same
    /// path replaces the earlier one.
    pub fn provide<F>(mut self, path: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<HandlerModule, ModuleLoadError> + Send + Sync + 'static,
    {
        self.providers.insert(path.into(), Arc::new(factory));
        self
    }

    pub fn factory(&self, path: &str) -> Option<ModuleFactory> {
        self.providers.get(path).cloned()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.providers.contains_key(path)
    }

    /// Registered module paths, sorted.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl fmt::Debug for ModuleCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleCatalog")
            .field("providers", &self.paths())
            .finish()
    }
}
