//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to a JSON-RPC endpoint
//! - Query chain state (chain id, block number, contract code)
//! - Bound every call by the configured timeout
//! - Provide health check for blockchain connectivity

use std::fmt::Display;
use std::future::IntoFuture;
use std::time::Duration;

use alloy::primitives::{Address, Bytes};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use tokio::time::timeout;

use crate::blockchain::types::{ChainError, ChainId, ChainResult, Network};
use crate::config::ChainConfig;
use crate::observability::metrics;

/// RPC client for one of the fixed networks.
#[derive(Clone)]
pub struct ChainClient {
    network: Network,
    provider: DynProvider,
    config: ChainConfig,
    timeout_duration: Duration,
}

impl ChainClient {
    /// Create a new client and check the endpoint's chain id.
    ///
    /// An unreachable endpoint or a chain id mismatch is logged, not
    /// returned: the client is still usable and reads fail individually.
    pub async fn new(network: Network, config: ChainConfig) -> ChainResult<Self> {
        let client = Self::connect(network, config)?;

        match client.verify_chain_id().await {
            Ok(()) => {
                tracing::info!(
                    network = %network,
                    rpc_url = %client.config.rpc_url,
                    chain_id = client.config.chain_id,
                    "Chain client initialized"
                );
            }
            Err(e) => {
                tracing::warn!(
                    network = %network,
                    error = %e,
                    "Chain client initialized but chain verification failed"
                );
            }
        }

        Ok(client)
    }

    /// Create a client without touching the network.
    pub fn connect(network: Network, config: ChainConfig) -> ChainResult<Self> {
        let url: url::Url = config.rpc_url.parse().map_err(|e| {
            ChainError::Network(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        let provider = ProviderBuilder::new().connect_http(url).erased();

        Ok(Self {
            network,
            provider,
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
            config,
        })
    }

    /// Run an RPC future under the configured timeout.
    ///
    /// The inner result is returned untouched so callers can classify
    /// the failure themselves.
    pub async fn bounded<F, T, E>(&self, op: &'static str, fut: F) -> ChainResult<Result<T, E>>
    where
        F: IntoFuture<Output = Result<T, E>>,
        E: Display,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(value)) => Ok(Ok(value)),
            Ok(Err(e)) => {
                tracing::warn!(network = %self.network, op, error = %e, "RPC error");
                Ok(Err(e))
            }
            Err(_) => {
                tracing::warn!(network = %self.network, op, "RPC timeout");
                Err(ChainError::Timeout(self.config.rpc_timeout_secs))
            }
        }
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> ChainResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != self.config.chain_id {
            return Err(ChainError::ChainMismatch {
                expected: self.config.chain_id,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> ChainResult<ChainId> {
        self.bounded("eth_chainId", self.provider.get_chain_id())
            .await?
            .map(ChainId)
            .map_err(|e| ChainError::Network(e.to_string()))
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> ChainResult<u64> {
        self.bounded("eth_blockNumber", self.provider.get_block_number())
            .await?
            .map_err(|e| ChainError::Network(e.to_string()))
    }

    /// Get the deployed bytecode at an address (empty for EOAs).
    pub async fn get_code(&self, address: Address) -> ChainResult<Bytes> {
        self.bounded("eth_getCode", self.provider.get_code_at(address))
            .await?
            .map_err(|e| ChainError::Network(e.to_string()))
    }

    /// Check if the endpoint is reachable.
    ///
    /// Returns true if we can query the block number.
    pub async fn is_healthy(&self) -> bool {
        let healthy = self.get_block_number().await.is_ok();
        metrics::record_rpc_health(self.network, healthy);
        healthy
    }

    /// Get the underlying provider.
    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Get the configuration.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("network", &self.network)
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_config() -> ChainConfig {
        ChainConfig {
            name: "Local".to_string(),
            // Port 9 (discard) is not expected to serve JSON-RPC.
            rpc_url: "http://127.0.0.1:9".to_string(),
            chain_id: 31337,
            rpc_timeout_secs: 2,
        }
    }

    #[tokio::test]
    async fn test_client_creation_tolerates_unreachable_rpc() {
        let result = ChainClient::new(Network::Polygon, unreachable_config()).await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_invalid_url_rejected() {
        let mut config = unreachable_config();
        config.rpc_url = "not a url".to_string();
        let err = ChainClient::connect(Network::Abstract, config).unwrap_err();
        assert!(err.to_string().contains("Invalid RPC URL"));
    }

    #[tokio::test]
    async fn test_unreachable_rpc_is_network_error() {
        let client = ChainClient::connect(Network::Polygon, unreachable_config()).unwrap();
        let err = client.get_block_number().await.unwrap_err();
        assert!(err.is_network());
        assert!(!client.is_healthy().await);
    }
}
