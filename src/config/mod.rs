//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! hub.toml (optional) + HUB_ENV
//!     → loader.rs (parse & deserialize, env overrides)
//!     → validation.rs (semantic checks)
//!     → HubConfig (validated, immutable)
//!     → handed to startup, server and logging
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{Environment, HubConfig, IndexConfig, ListenerConfig, ObservabilityConfig};
