//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Environment variable that overrides `app_id` from the config file.
pub const APP_ID_ENV_VAR: &str = "AGW_RECOVERY_APP_ID";

/// Root configuration for the recovery service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Identity provider application identifier. Required: without it the
    /// service only answers with a configuration error.
    pub app_id: Option<String>,

    /// HTTP surface settings.
    pub server: ServerConfig,

    /// The two fixed networks.
    pub chains: ChainsConfig,

    /// Fungible token whose balances are reported.
    pub token: TokenConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl RecoveryConfig {
    /// Apply environment overrides on top of file values.
    pub fn apply_env(&mut self) {
        if let Ok(app_id) = std::env::var(APP_ID_ENV_VAR) {
            self.app_id = Some(app_id);
        }
    }

    /// The application identifier with blank values treated as missing.
    pub fn app_id(&self) -> Option<&str> {
        self.app_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Seconds without a request after which a session is discarded.
    pub session_idle_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            request_timeout_secs: 30,
            session_idle_secs: 1800,
        }
    }
}

/// Per-network RPC settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainConfig {
    /// Display name used in reports (e.g., "Polygon").
    pub name: String,

    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Expected chain ID.
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    #[serde(default = "default_rpc_timeout")]
    pub rpc_timeout_secs: u64,
}

fn default_rpc_timeout() -> u64 {
    10
}

impl ChainConfig {
    /// Polygon mainnet, where the token balances live.
    pub fn polygon() -> Self {
        Self {
            name: "Polygon".to_string(),
            rpc_url: "https://polygon-rpc.com".to_string(),
            chain_id: 137,
            rpc_timeout_secs: default_rpc_timeout(),
        }
    }

    /// Abstract mainnet, where the AGW contracts live.
    pub fn abstract_mainnet() -> Self {
        Self {
            name: "Abstract".to_string(),
            rpc_url: "https://api.mainnet.abs.xyz".to_string(),
            chain_id: 2741,
            rpc_timeout_secs: default_rpc_timeout(),
        }
    }
}

/// The two networks the service reads from.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainsConfig {
    /// Network holding the token balances.
    pub polygon: ChainConfig,

    /// Network hosting the smart-contract wallets.
    #[serde(rename = "abstract")]
    pub abstract_chain: ChainConfig,
}

impl Default for ChainsConfig {
    fn default() -> Self {
        Self {
            polygon: ChainConfig::polygon(),
            abstract_chain: ChainConfig::abstract_mainnet(),
        }
    }
}

/// Token configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenConfig {
    /// ERC-20 contract address on the token network.
    pub address: String,

    /// Symbol shown in reports.
    pub symbol: String,

    /// Decimal precision used to format raw amounts.
    pub decimals: u8,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            address: "0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359".to_string(),
            symbol: "USDC".to_string(),
            decimals: 6,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RecoveryConfig::default();
        assert!(config.app_id().is_none());
        assert_eq!(config.chains.polygon.chain_id, 137);
        assert_eq!(config.chains.abstract_chain.chain_id, 2741);
        assert_eq!(config.token.decimals, 6);
        assert_eq!(config.token.symbol, "USDC");
    }

    #[test]
    fn test_blank_app_id_is_missing() {
        let config = RecoveryConfig {
            app_id: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(config.app_id().is_none());
    }

    #[test]
    fn test_partial_toml() {
        let config: RecoveryConfig = toml::from_str(
            r#"
            app_id = "clx123"

            [chains.abstract]
            name = "Abstract Testnet"
            rpc_url = "https://api.testnet.abs.xyz"
            chain_id = 11124

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.app_id(), Some("clx123"));
        assert_eq!(config.chains.abstract_chain.chain_id, 11124);
        assert_eq!(config.chains.abstract_chain.rpc_timeout_secs, 10);
        assert_eq!(config.chains.polygon.chain_id, 137);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.observability.log_level, "info");
    }
}
