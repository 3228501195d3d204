//! Module resolution with a process-lifetime cache.
//!
//! # Responsibilities
//! - Map a module path to a loaded `HandlerModule` via the catalog
//! - Cache successful loads so later lookups are a map hit
//! - Leave failures uncached so a transient error is retried next time
//!
//! # Design Decisions
//! - The factory runs outside any map lock; concurrent first resolutions of
//!   the same path may both load, but only the first stored result survives
//!   and every caller receives that one

use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;

use crate::observability::metrics;
use crate::registry::module::{HandlerModule, ModuleCatalog, ModuleLoadError};

/// Errors that can occur while resolving a module path.
#[derive(Debug, Clone, Error)]
pub enum ResolutionError {
    /// No provider is registered for this path.
    #[error("module {0} is not provided by any registered handler group")]
    Unknown(String),

    /// The provider exists but failed to build the module.
    #[error("module {path} failed to load: {source}")]
    Load {
        path: String,
        #[source]
        source: ModuleLoadError,
    },
}

/// Resolves module paths against a catalog, caching successes.
#[derive(Debug)]
pub struct ModuleResolver {
    catalog: ModuleCatalog,
    cache: DashMap<String, Arc<HandlerModule>>,
}

impl ModuleResolver {
    pub fn new(catalog: ModuleCatalog) -> Self {
        Self {
            catalog,
            cache: DashMap::new(),
        }
    }

    pub fn catalog(&self) -> &ModuleCatalog {
        &self.catalog
    }

    /// Resolve `module_path`, loading it on first use.
    pub fn resolve(&self, module_path: &str) -> Result<Arc<HandlerModule>, ResolutionError> {
        if let Some(module) = self.cache.get(module_path) {
            return Ok(module.value().clone());
        }

        let factory = self
            .catalog
            .factory(module_path)
            .ok_or_else(|| ResolutionError::Unknown(module_path.to_string()))?;

        let loaded = match factory() {
            Ok(module) => {
                metrics::record_module_load(true);
                Arc::new(module)
            }
            Err(source) => {
                metrics::record_module_load(false);
                return Err(ResolutionError::Load {
                    path: module_path.to_string(),
                    source,
                });
            }
        };

        let stored = self
            .cache
            .entry(module_path.to_string())
            .or_insert(loaded)
            .value()
            .clone();
        tracing::debug!(module = %module_path, "Module loaded and cached");
        Ok(stored)
    }

    pub fn is_cached(&self, module_path: &str) -> bool {
        self.cache.contains_key(module_path)
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn counting_catalog(loads: Arc<AtomicUsize>) -> ModuleCatalog {
        ModuleCatalog::new().provide("demo.m1", move || {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok(HandlerModule::new("demo.m1"))
        })
    }

    #[test]
    fn test_second_resolution_is_cached() {
        let loads = Arc::new(AtomicUsize::new(0));
        let resolver = ModuleResolver::new(counting_catalog(loads.clone()));

        let first = resolver.resolve("demo.m1").unwrap();
        let second = resolver.resolve("demo.m1").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.cached_len(), 1);
    }

    #[test]
    fn test_unknown_module() {
        let resolver = ModuleResolver::new(ModuleCatalog::new());
        assert!(matches!(
            resolver.resolve("missing.mod"),
            Err(ResolutionError::Unknown(path)) if path == "missing.mod"
        ));
        assert!(!resolver.is_cached("missing.mod"));
    }

    #[test]
    fn test_failure_is_retried_not_cached() {
        let healthy = Arc::new(AtomicBool::new(false));
        let flag = healthy.clone();
        let catalog = ModuleCatalog::new().provide("flaky.mod", move || {
            if flag.load(Ordering::SeqCst) {
                Ok(HandlerModule::new("flaky.mod"))
            } else {
                Err(ModuleLoadError::new("dependency not ready"))
            }
        });
        let resolver = ModuleResolver::new(catalog);

        assert!(matches!(resolver.resolve("flaky.mod"), Err(ResolutionError::Load { .. })));
        assert!(!resolver.is_cached("flaky.mod"));

        healthy.store(true, Ordering::SeqCst);
        assert!(resolver.resolve("flaky.mod").is_ok());
        assert!(resolver.is_cached("flaky.mod"));
    }

    #[test]
    fn test_concurrent_first_resolution_stores_one_result() {
        let loads = Arc::new(AtomicUsize::new(0));
        let resolver = Arc::new(ModuleResolver::new(counting_catalog(loads.clone())));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let resolver = resolver.clone();
                std::thread::spawn(move || resolver.resolve("demo.m1").unwrap())
            })
            .collect();
        let modules: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let stored = resolver.resolve("demo.m1").unwrap();
        assert!(modules.iter().all(|m| Arc::ptr_eq(m, &stored)));
        assert!(loads.load(Ordering::SeqCst) >= 1);
        assert_eq!(resolver.cached_len(), 1);
    }
}
