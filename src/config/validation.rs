//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, decimals in range)
//! - Check that URLs and addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RecoveryConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use alloy::primitives::Address;
use thiserror::Error;

use crate::config::schema::{ChainConfig, RecoveryConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("app_id is not set")]
    MissingAppId,

    #[error("{field}: invalid URL '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field}: invalid address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("token.decimals {0} exceeds 77")]
    DecimalsOutOfRange(u8),

    #[error("server.bind_address: invalid socket address '{0}'")]
    InvalidBindAddress(String),
}

impl ValidationError {
    /// Whether the service can still start in degraded mode with this error.
    pub fn is_degrading(&self) -> bool {
        matches!(self, ValidationError::MissingAppId)
    }
}

/// Validate a loaded configuration.
pub fn validate_config(config: &RecoveryConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.app_id().is_none() {
        errors.push(ValidationError::MissingAppId);
    }

    if config
        .server
        .bind_address
        .parse::<std::net::SocketAddr>()
        .is_err()
    {
        errors.push(ValidationError::InvalidBindAddress(
            config.server.bind_address.clone(),
        ));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "server.request_timeout_secs",
        });
    }
    if config.server.session_idle_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "server.session_idle_secs",
        });
    }

    validate_chain(
        &config.chains.polygon,
        "chains.polygon.rpc_url",
        "chains.polygon.rpc_timeout_secs",
        &mut errors,
    );
    validate_chain(
        &config.chains.abstract_chain,
        "chains.abstract.rpc_url",
        "chains.abstract.rpc_timeout_secs",
        &mut errors,
    );

    if config.token.address.parse::<Address>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "token.address",
            value: config.token.address.clone(),
        });
    }
    // U256 holds at most 78 decimal digits.
    if config.token.decimals > 77 {
        errors.push(ValidationError::DecimalsOutOfRange(config.token.decimals));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_chain(
    chain: &ChainConfig,
    url_field: &'static str,
    timeout_field: &'static str,
    errors: &mut Vec<ValidationError>,
) {
    if chain.rpc_url.parse::<url::Url>().is_err() {
        errors.push(ValidationError::InvalidUrl {
            field: url_field,
            value: chain.rpc_url.clone(),
        });
    }
    if chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::Zero {
            field: timeout_field,
        });
    }
}
