//! Integration hub: manifest-driven handler registration with
//! correlation-aware tracing.

pub mod config;
pub mod features;
pub mod http;
pub mod lifecycle;
pub mod manifest;
pub mod observability;
pub mod registry;

pub use config::schema::HubConfig;
pub use http::HubServer;
pub use lifecycle::Shutdown;
