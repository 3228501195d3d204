//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{Environment, HubConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding the configured environment.
pub const ENV_VAR: &str = "HUB_ENV";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<HubConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration text, applying `HUB_ENV`.
pub fn parse_config(content: &str) -> Result<HubConfig, ConfigError> {
    let mut config: HubConfig = toml::from_str(content)?;
    apply_env_overrides(&mut config, std::env::var(ENV_VAR).ok().as_deref());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Default configuration with environment overrides, used when no file is
/// given.
pub fn default_config() -> Result<HubConfig, ConfigError> {
    parse_config("")
}

fn apply_env_overrides(config: &mut HubConfig, environment: Option<&str>) {
    if let Some(value) = environment {
        config.environment = Environment::from_env_value(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_override() {
        let mut config = HubConfig::default();
        apply_env_overrides(&mut config, Some("production"));
        assert_eq!(config.environment, Environment::Production);

        apply_env_overrides(&mut config, None);
        assert_eq!(config.environment, Environment::Production);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = parse_config("api_root = \"api\"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().starts_with("Validation failed: api_root"));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(parse_config("listener = ["), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/nonexistent/hub.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
