use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::types::StateConfig;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl StateConfig {
    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, returns `StateConfig::default()`.
    /// - If the file exists, parses it as TOML and validates.
    /// - Returns an error if reading, parsing, or validation fails.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(StateConfig::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: StateConfig = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: StateConfig = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("<inline>"),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - A container name, when given, is not blank
    /// - The log filter is a valid `EnvFilter` directive
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(name) = &self.container.name {
            if name.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    message: "Container name must not be blank".to_string(),
                });
            }
        }

        if let Err(e) = EnvFilter::try_new(&self.logging.filter) {
            return Err(ConfigError::ValidationError {
                message: format!("Invalid log filter '{}': {}", self.logging.filter, e),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FaultPolicy;

    #[test]
    fn test_from_toml_str_full() {
        let config = StateConfig::from_toml_str(
            r#"
[container]
name = "settings"
fault_policy = "propagate"

[logging]
filter = "observable_state=debug"
with_target = false
"#,
        )
        .unwrap();

        assert_eq!(config.container.name.as_deref(), Some("settings"));
        assert_eq!(config.container.fault_policy, FaultPolicy::Propagate);
        assert_eq!(config.logging.filter, "observable_state=debug");
        assert!(!config.logging.with_target);
    }

    #[test]
    fn test_from_toml_str_empty_uses_defaults() {
        let config = StateConfig::from_toml_str("").unwrap();
        assert!(config.container.name.is_none());
        assert_eq!(config.container.fault_policy, FaultPolicy::Isolate);
        assert_eq!(config.logging.filter, "info");
        assert!(config.logging.with_target);
    }

    #[test]
    fn test_blank_name_fails_validation() {
        let result = StateConfig::from_toml_str("[container]\nname = \"  \"\n");
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn test_unknown_fault_policy_fails_parse() {
        let result = StateConfig::from_toml_str("[container]\nfault_policy = \"ignore\"\n");
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }
}
