//! Handler registration subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     features::builtin_catalog()  → module.rs (ModuleCatalog: path → factory)
//!     manifest::ManifestLoader     → RouteManifest
//!     engine.rs                    → for each route:
//!         resolver.rs (load module once, cache)
//!         module export lookup by handler name
//!         host.rs (MountTarget::mount under url_prefix)
//! ```
//!
//! # Design Decisions
//! - Module "import" is a lookup into compiled-in factories, never dynamic
//!   code loading
//! - Successful loads are cached for the process lifetime; failures retry
//! - Registration is idempotent per (module path, handler name)

pub mod engine;
pub mod host;
pub mod module;
pub mod resolver;

pub use engine::{RegistrationEngine, RegistrationKey, RegistrationReport, SkipReason};
pub use host::{DryRunHost, MountError, MountTarget};
pub use module::{Handler, HandlerModule, ModuleCatalog, ModuleLoadError};
pub use resolver::{ModuleResolver, ResolutionError};
