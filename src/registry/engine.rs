//! Manifest-driven handler registration.
//!
//! # Responsibilities
//! - Walk the manifest in declaration order
//! - Validate each group and route, skipping bad entries individually
//! - Resolve modules, pick the named handler, mount it under the prefix
//! - Mount each (module path, handler name) pair at most once
//!
//! # Design Decisions
//! - Every failure is local: one bad route never stops its siblings
//! - The registered set is locked for the whole pass, so two passes can't
//!   both decide to mount the same key
//! - Each mounted group is wrapped in the operation trace layer, so all of
//!   its routes are instrumented without per-handler opt-in

use std::collections::HashSet;
use std::convert::Infallible;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use crate::manifest::{module_path, normalize_prefix, ManifestLoader, RouteManifest};
use crate::observability::metrics;
use crate::observability::TracingLogger;
use crate::registry::host::MountTarget;
use crate::registry::resolver::ModuleResolver;

/// Uniqueness token of one registration: `"<module path>:<handler name>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RegistrationKey(String);

impl RegistrationKey {
    pub fn new(module_path: &str, handler_name: &str) -> Self {
        Self(format!("{module_path}:{handler_name}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegistrationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Keys mounted so far, in mount order. Only ever grows.
#[derive(Debug, Default)]
struct RegisteredSet {
    keys: HashSet<RegistrationKey>,
    order: Vec<RegistrationKey>,
}

impl RegisteredSet {
    fn contains(&self, key: &RegistrationKey) -> bool {
        self.keys.contains(key)
    }

    fn insert(&mut self, key: RegistrationKey) {
        if self.keys.insert(key.clone()) {
            self.order.push(key);
        }
    }
}

/// Why a declared route was not mounted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// The enclosing group lacks `feature_path` or `url_prefix`.
    InvalidGroup,
    /// The route lacks `module` or `name`.
    InvalidRoute,
    /// The same module/handler pair was mounted earlier.
    AlreadyRegistered,
    /// The module could not be resolved.
    Unresolved(String),
    /// The module has no export with the declared name.
    HandlerMissing,
    /// The host refused the mount.
    MountRejected(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct MountedRoute {
    pub key: RegistrationKey,
    pub url_prefix: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedRoute {
    /// Index of the feature group in the manifest.
    pub group: usize,
    /// Index of the route within its group; `None` when the whole group was
    /// skipped.
    pub route: Option<usize>,
    pub key: Option<RegistrationKey>,
    pub reason: SkipReason,
}

/// Outcome of one registration pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegistrationReport {
    pub mounted: Vec<MountedRoute>,
    pub skipped: Vec<SkippedRoute>,
    /// Set when the manifest itself could not be loaded.
    pub manifest_error: Option<String>,
}

impl RegistrationReport {
    pub fn mount_count(&self) -> usize {
        self.mounted.len()
    }

    pub fn skipped_for(&self, reason: &SkipReason) -> usize {
        self.skipped.iter().filter(|s| &s.reason == reason).count()
    }

    fn skip(&mut self, group: usize, route: Option<usize>, key: Option<RegistrationKey>, reason: SkipReason) {
        self.skipped.push(SkippedRoute {
            group,
            route,
            key,
            reason,
        });
    }
}

/// Mounts manifest-declared handlers on a host.
#[derive(Debug)]
pub struct RegistrationEngine {
    resolver: Arc<ModuleResolver>,
    logger: TracingLogger,
    registered: Mutex<RegisteredSet>,
}

impl RegistrationEngine {
    pub fn new(resolver: Arc<ModuleResolver>, logger: TracingLogger) -> Self {
        Self {
            resolver,
            logger,
            registered: Mutex::new(RegisteredSet::default()),
        }
    }

    pub fn resolver(&self) -> &Arc<ModuleResolver> {
        &self.resolver
    }

    /// Load the manifest and register it; a missing or malformed manifest
    /// mounts nothing and leaves the host serving 404s.
    pub fn register_from<M: MountTarget>(&self, loader: &ManifestLoader, host: &mut M) -> RegistrationReport {
        match loader.load() {
            Ok(manifest) => self.register_all(&manifest, host),
            Err(e) => {
                self.logger.warning("Blueprint registration skipped; no routes mounted");
                RegistrationReport {
                    manifest_error: Some(e.to_string()),
                    ..RegistrationReport::default()
                }
            }
        }
    }

    /// Register every route of `manifest` on `host`.
    ///
    /// Safe to call again: keys mounted by an earlier pass are skipped.
    pub fn register_all<M: MountTarget>(&self, manifest: &RouteManifest, host: &mut M) -> RegistrationReport {
        self.logger
            .instrument("registry.register_all", || {
                Ok::<_, Infallible>(self.register_pass(manifest, host))
            })
            .unwrap_or_else(|never| match never {})
    }

    /// Keys mounted so far, in mount order.
    pub fn registered_keys(&self) -> Vec<RegistrationKey> {
        self.lock_registered().order.clone()
    }

    pub fn is_registered(&self, key: &RegistrationKey) -> bool {
        self.lock_registered().contains(key)
    }

    fn lock_registered(&self) -> std::sync::MutexGuard<'_, RegisteredSet> {
        self.registered.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register_pass<M: MountTarget>(&self, manifest: &RouteManifest, host: &mut M) -> RegistrationReport {
        let mut registered = self.lock_registered();
        let mut report = RegistrationReport::default();

        for (group_index, group) in manifest.groups.iter().enumerate() {
            let Some((feature_path, url_prefix)) = group.required_fields() else {
                tracing::error!(
                    group = group_index,
                    feature_path = ?group.feature_path,
                    url_prefix = ?group.url_prefix,
                    "Feature path or url_prefix not defined for feature group"
                );
                metrics::record_registration("invalid_group");
                report.skip(group_index, None, None, SkipReason::InvalidGroup);
                continue;
            };
            let url_prefix = normalize_prefix(url_prefix);

            for (route_index, route) in group.routes.iter().enumerate() {
                let Some((module, handler_name)) = route.required_fields() else {
                    tracing::error!(
                        group = group_index,
                        route = route_index,
                        module = ?route.module,
                        name = ?route.handler_name,
                        "Invalid route configuration"
                    );
                    metrics::record_registration("invalid_route");
                    report.skip(group_index, Some(route_index), None, SkipReason::InvalidRoute);
                    continue;
                };

                let module_path = module_path(feature_path, module);
                let key = RegistrationKey::new(&module_path, handler_name);

                if registered.contains(&key) {
                    tracing::info!(key = %key, url_prefix = %url_prefix, "Blueprint already registered, skipping");
                    metrics::record_registration("duplicate");
                    report.skip(group_index, Some(route_index), Some(key), SkipReason::AlreadyRegistered);
                    continue;
                }

                let module = match self.resolver.resolve(&module_path) {
                    Ok(module) => module,
                    Err(e) => {
                        tracing::error!(key = %key, error = %e, "Module import failed");
                        metrics::record_registration("unresolved");
                        report.skip(group_index, Some(route_index), Some(key), SkipReason::Unresolved(e.to_string()));
                        continue;
                    }
                };

                let Some(handler) = module.get(handler_name) else {
                    tracing::error!(
                        key = %key,
                        exports = ?module.export_names().collect::<Vec<_>>(),
                        "Blueprint {} not found in {}",
                        handler_name,
                        module_path
                    );
                    metrics::record_registration("handler_missing");
                    report.skip(group_index, Some(route_index), Some(key), SkipReason::HandlerMissing);
                    continue;
                };

                let traced = handler.clone().layer(self.logger.layer(key.to_string()));
                if let Err(e) = host.mount(traced, &url_prefix) {
                    tracing::error!(key = %key, error = %e, "Host rejected blueprint");
                    metrics::record_registration("rejected");
                    report.skip(group_index, Some(route_index), Some(key), SkipReason::MountRejected(e.to_string()));
                    continue;
                }

                tracing::debug!(key = %key, url_prefix = %url_prefix, "Blueprint registered");
                metrics::record_registration("mounted");
                registered.insert(key.clone());
                report.mounted.push(MountedRoute { key, url_prefix: url_prefix.clone() });
            }
        }

        tracing::info!(
            mounted = report.mounted.len(),
            skipped = report.skipped.len(),
            "Blueprint registration finished"
        );
        report
    }
}
