//! Manifest loading and caching.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use thiserror::Error;

use crate::manifest::RouteManifest;

/// Errors that can occur while loading the routing manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file does not exist or cannot be read.
    #[error("manifest {path} unreadable: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid JSON or does not have the expected shape.
    #[error("manifest {origin} malformed: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Where the manifest text comes from.
#[derive(Debug, Clone)]
pub enum ManifestSource {
    File(PathBuf),
    Inline(String),
}

impl ManifestSource {
    fn describe(&self) -> String {
        match self {
            ManifestSource::File(path) => path.display().to_string(),
            ManifestSource::Inline(_) => "<inline>".to_string(),
        }
    }
}

/// Reads the manifest once and serves the cached parse afterwards.
#[derive(Debug)]
pub struct ManifestLoader {
    source: ManifestSource,
    cache: ArcSwapOption<RouteManifest>,
}

impl ManifestLoader {
    pub fn new(source: ManifestSource) -> Self {
        Self {
            source,
            cache: ArcSwapOption::empty(),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self::new(ManifestSource::File(path.as_ref().to_path_buf()))
    }

    pub fn from_json(text: impl Into<String>) -> Self {
        Self::new(ManifestSource::Inline(text.into()))
    }

    pub fn source(&self) -> &ManifestSource {
        &self.source
    }

    /// Return the cached manifest, reading the source on first use.
    ///
    /// Failures are logged here and not cached; the next call retries.
    pub fn load(&self) -> Result<Arc<RouteManifest>, ManifestError> {
        if let Some(manifest) = self.cache.load_full() {
            return Ok(manifest);
        }

        match self.read() {
            Ok(manifest) => {
                let manifest = Arc::new(manifest);
                tracing::info!(
                    source = %self.source.describe(),
                    groups = manifest.groups.len(),
                    routes = manifest.route_count(),
                    "Routing manifest loaded"
                );
                self.cache.store(Some(manifest.clone()));
                Ok(manifest)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load routing manifest");
                Err(e)
            }
        }
    }

    /// Drop the cached parse; the next `load` re-reads the source.
    pub fn reset(&self) {
        self.cache.store(None);
    }

    pub fn is_cached(&self) -> bool {
        self.cache.load().is_some()
    }

    fn read(&self) -> Result<RouteManifest, ManifestError> {
        let text = match &self.source {
            ManifestSource::File(path) => fs::read_to_string(path).map_err(|source| ManifestError::Io {
                path: path.clone(),
                source,
            })?,
            ManifestSource::Inline(text) => text.clone(),
        };

        serde_json::from_str(&text).map_err(|source| ManifestError::Parse {
            origin: self.source.describe(),
            source,
        })
    }
}
