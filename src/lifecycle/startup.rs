//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the resolver and registration engine over a module catalog
//! - Register every manifest route on an Axum host seeded with the index
//! - Hand back the router and a report of what was mounted
//!
//! # Design Decisions
//! - A bad manifest is not fatal: the hub starts and serves the index only
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use std::path::Path;
use std::sync::Arc;

use axum::Router;

use crate::config::HubConfig;
use crate::http::host::AxumHost;
use crate::http::server::index_router;
use crate::manifest::ManifestLoader;
use crate::observability::TracingLogger;
use crate::registry::{ModuleCatalog, ModuleResolver, RegistrationEngine, RegistrationReport};

/// Everything startup produced.
pub struct Bootstrap {
    /// API routes: the index plus every mounted handler group.
    pub router: Router,
    pub report: RegistrationReport,
    pub engine: Arc<RegistrationEngine>,
    pub loader: ManifestLoader,
}

/// Register the manifest at the configured path.
pub fn bootstrap(config: &HubConfig, catalog: ModuleCatalog, logger: TracingLogger) -> Bootstrap {
    let loader = ManifestLoader::from_path(Path::new(&config.manifest.path));
    bootstrap_with(config, loader, catalog, logger)
}

/// Register the manifest from `loader`.
pub fn bootstrap_with(
    config: &HubConfig,
    loader: ManifestLoader,
    catalog: ModuleCatalog,
    logger: TracingLogger,
) -> Bootstrap {
    let resolver = Arc::new(ModuleResolver::new(catalog));
    let engine = Arc::new(RegistrationEngine::new(resolver, logger));

    let mut host = AxumHost::with_base(index_router(config.index.clone()));
    let report = engine.register_from(&loader, &mut host);

    tracing::info!(
        mounted = report.mount_count(),
        skipped = report.skipped.len(),
        manifest_ok = report.manifest_error.is_none(),
        "Registration finished"
    );

    Bootstrap {
        router: host.into_router(),
        report,
        engine,
        loader,
    }
}
