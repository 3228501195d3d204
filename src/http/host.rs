//! Axum implementation of the registration host.

use std::panic::{self, AssertUnwindSafe};

use axum::Router;

use crate::observability::tracer::panic_message;
use crate::registry::{Handler, MountError, MountTarget};

/// Accumulates mounted handler groups into one router.
///
/// Axum reports overlapping routes by panicking; the host turns that into a
/// `MountError` and keeps the router as it was before the attempt.
#[derive(Debug, Default)]
pub struct AxumHost {
    router: Router,
}

impl AxumHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from routes that exist regardless of the manifest.
    pub fn with_base(router: Router) -> Self {
        Self { router }
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}

impl MountTarget for AxumHost {
    fn mount(&mut self, handler: Handler, url_prefix: &str) -> Result<(), MountError> {
        let candidate = self.router.clone();
        let prefix = url_prefix.to_string();

        let merged = panic::catch_unwind(AssertUnwindSafe(|| {
            if prefix == "/" {
                candidate.merge(handler)
            } else {
                candidate.nest(&prefix, handler)
            }
        }))
        .map_err(|payload| MountError::Conflict {
            prefix: prefix.clone(),
            reason: panic_message(payload.as_ref()),
        })?;

        self.router = merged;
        Ok(())
    }
}
