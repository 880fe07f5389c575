//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RecoveryConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
///
/// A missing `app_id` is not rejected here: the service still starts and
/// serves the configuration-error responder, so callers check
/// [`RecoveryConfig::app_id`] themselves.
pub fn parse_config(content: &str) -> Result<RecoveryConfig, ConfigError> {
    let config: RecoveryConfig = toml::from_str(content)?;
    check(config)
}

/// Load and validate configuration from a TOML file, applying environment
/// overrides. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<RecoveryConfig, ConfigError> {
    let mut config = match fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "Config file not found, using defaults");
            RecoveryConfig::default()
        }
        Err(e) => return Err(ConfigError::Io(e)),
    };
    config.apply_env();
    check(config)
}

fn check(config: RecoveryConfig) -> Result<RecoveryConfig, ConfigError> {
    if let Err(errors) = validate_config(&config) {
        let fatal: Vec<_> = errors.into_iter().filter(|e| !e.is_degrading()).collect();
        if !fatal.is_empty() {
            return Err(ConfigError::Validation(fatal));
        }
    }
    Ok(config)
}
