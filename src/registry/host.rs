//! The framework seam handlers are mounted on.

use thiserror::Error;

use crate::registry::module::Handler;

/// Errors reported by a host when it refuses a mount.
#[derive(Debug, Clone, Error)]
pub enum MountError {
    /// The handler's routes collide with something already mounted.
    #[error("routes under {prefix} conflict with existing routes: {reason}")]
    Conflict { prefix: String, reason: String },
}

/// Anything that can attach a handler group under a URL prefix.
pub trait MountTarget {
    fn mount(&mut self, handler: Handler, url_prefix: &str) -> Result<(), MountError>;
}

/// Host that records mounts without serving them.
///
/// Used for dry runs (`hub-cli check`) and by tests.
#[derive(Debug, Default)]
pub struct DryRunHost {
    mounts: Vec<String>,
}

impl DryRunHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefixes in the order handlers were mounted.
    pub fn prefixes(&self) -> &[String] {
        &self.mounts
    }

    pub fn mount_count(&self) -> usize {
        self.mounts.len()
    }
}

impl MountTarget for DryRunHost {
    fn mount(&mut self, _handler: Handler, url_prefix: &str) -> Result<(), MountError> {
        self.mounts.push(url_prefix.to_string());
        Ok(())
    }
}
