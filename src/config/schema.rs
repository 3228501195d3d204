//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the hub.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the integration hub.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HubConfig {
    /// Deployment environment; selects defaults such as the log level.
    pub environment: Environment,

    /// Path every mounted route and the index live under.
    pub api_root: String,

    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Routing manifest location.
    pub manifest: ManifestConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Index page content.
    pub index: IndexConfig,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            api_root: "/api".to_string(),
            listener: ListenerConfig::default(),
            manifest: ManifestConfig::default(),
            timeouts: TimeoutConfig::default(),
            limits: LimitsConfig::default(),
            observability: ObservabilityConfig::default(),
            index: IndexConfig::default(),
        }
    }
}

impl HubConfig {
    /// Log level to use when neither the config nor `RUST_LOG` names one.
    pub fn effective_log_level(&self) -> &str {
        match &self.observability.log_level {
            Some(level) => level,
            None if self.environment.is_debug() => "debug",
            None => "info",
        }
    }
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_debug(self) -> bool {
        matches!(self, Environment::Development)
    }

    /// Parse the value of `HUB_ENV`; unknown values fall back to development.
    pub fn from_env_value(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8790").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8790".to_string(),
        }
    }
}

/// Routing manifest configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Path to the JSON routing manifest.
    pub path: String,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            path: "routes.json".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). Derived from the
    /// environment when unset.
    pub log_level: Option<String>,

    /// Include request and response bodies in exchange log lines.
    pub log_bodies: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: None,
            log_bodies: true,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Content of the index route.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IndexConfig {
    pub title: String,
    pub message: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            title: "Atlassian-Google-Slack Integration Hub".to_string(),
            message: "Welcome & Happy Testing :)".to_string(),
        }
    }
}
