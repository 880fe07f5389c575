//! Chain-specific types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// The two networks the reader talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    /// Holds the token balances.
    Polygon,
    /// Hosts the smart-contract wallets.
    Abstract,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Polygon => "polygon",
            Network::Abstract => "abstract",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during chain reads.
#[derive(Debug, Clone, Error)]
pub enum ChainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Network(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The target is not a contract of the expected shape, or the call reverted.
    #[error("Contract call failed: {0}")]
    ContractCall(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

impl ChainError {
    /// Whether this is a transport-level failure rather than a contract failure.
    pub fn is_network(&self) -> bool {
        matches!(self, ChainError::Network(_) | ChainError::Timeout(_))
    }

    /// First line of the error, suitable for inline display.
    pub fn short_message(&self) -> String {
        let full = self.to_string();
        full.lines().next().unwrap_or_default().trim().to_string()
    }
}

/// Result type for chain reads.
pub type ChainResult<T> = Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_conversion() {
        let chain_id = ChainId::from(137u64);
        assert_eq!(chain_id.0, 137);
        assert_eq!(u64::from(chain_id), 137);
    }

    #[test]
    fn test_error_display() {
        let err = ChainError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");
        assert!(err.is_network());

        let err = ChainError::ContractCall("execution reverted".to_string());
        assert!(!err.is_network());
    }

    #[test]
    fn test_short_message_takes_first_line() {
        let err = ChainError::ContractCall("no code at address\n  details: eth_getCode".to_string());
        assert_eq!(err.short_message(), "Contract call failed: no code at address");
    }

    #[test]
    fn test_network_serde() {
        let json = serde_json::to_string(&Network::Abstract).unwrap();
        assert_eq!(json, "\"abstract\"");
        assert_eq!(Network::Polygon.to_string(), "polygon");
    }
}
