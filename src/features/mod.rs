//! Handler groups compiled into the hub.
//!
//! Each feature module exposes a factory producing a `HandlerModule`; the
//! catalog built here is what manifest `feature_path`/`module` pairs resolve
//! against.

pub mod demo;
pub mod example;

use crate::registry::ModuleCatalog;

/// Catalog of every built-in module.
pub fn builtin_catalog() -> ModuleCatalog {
    ModuleCatalog::new()
        .provide(demo::MODULE_PATH, demo::module)
        .provide(example::MODULE_PATH, example::module)
}
