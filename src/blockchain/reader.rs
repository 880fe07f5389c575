//! Read-only queries the reconciliation workflow depends on.
//!
//! # Responsibilities
//! - ERC-20 balance of an address, formatted with the token's decimals
//! - List of k1 (secp256k1 EOA) signers of an Abstract Global Wallet
//!
//! Nothing is cached and nothing is retried: every call hits the network
//! once and failures propagate to the caller.

use alloy::primitives::Address;
use alloy::sol;
use alloy::transports::RpcError;
use async_trait::async_trait;

use crate::blockchain::client::ChainClient;
use crate::blockchain::types::{ChainError, ChainResult, Network};
use crate::blockchain::units::format_token_amount;
use crate::config::TokenConfig;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    contract IAbstractGlobalWallet {
        function k1ListOwners() external view returns (address[]);
    }
}

/// Read-only view over the two networks.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Human-readable balance of `token` held by `owner` on `network`.
    async fn token_balance(&self, network: Network, token: &str, owner: &str)
        -> ChainResult<String>;

    /// k1 signer addresses of the smart-contract wallet at `contract`.
    async fn authorized_signers(&self, network: Network, contract: &str)
        -> ChainResult<Vec<String>>;

    /// Whether `network`'s endpoint currently answers.
    async fn is_healthy(&self, network: Network) -> bool;
}

/// [`ChainReader`] backed by JSON-RPC endpoints.
#[derive(Debug, Clone)]
pub struct RpcChainReader {
    polygon: ChainClient,
    abstract_chain: ChainClient,
    token: TokenConfig,
}

impl RpcChainReader {
    /// `token` supplies the known decimals of the configured token; other
    /// tokens have theirs read from the contract.
    pub fn new(polygon: ChainClient, abstract_chain: ChainClient, token: TokenConfig) -> Self {
        Self {
            polygon,
            abstract_chain,
            token,
        }
    }

    pub fn client(&self, network: Network) -> &ChainClient {
        match network {
            Network::Polygon => &self.polygon,
            Network::Abstract => &self.abstract_chain,
        }
    }

    async fn token_decimals(&self, client: &ChainClient, token: Address) -> ChainResult<u8> {
        if self
            .token
            .address
            .parse::<Address>()
            .is_ok_and(|known| known == token)
        {
            return Ok(self.token.decimals);
        }

        let erc20 = IERC20::new(token, client.provider().clone());
        client
            .bounded("decimals", erc20.decimals().call())
            .await?
            .map_err(classify_contract_error)
    }
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn token_balance(
        &self,
        network: Network,
        token: &str,
        owner: &str,
    ) -> ChainResult<String> {
        let client = self.client(network);
        let token = parse_address(token)?;
        let owner = parse_address(owner)?;

        let decimals = self.token_decimals(client, token).await?;
        let erc20 = IERC20::new(token, client.provider().clone());
        let raw = client
            .bounded("balanceOf", erc20.balanceOf(owner).call())
            .await?
            .map_err(classify_contract_error)?;

        tracing::debug!(network = %network, owner = %owner, raw = %raw, "Token balance read");
        Ok(format_token_amount(raw, decimals))
    }

    async fn authorized_signers(
        &self,
        network: Network,
        contract: &str,
    ) -> ChainResult<Vec<String>> {
        let client = self.client(network);
        let address = parse_address(contract)?;

        let code = client.get_code(address).await?;
        if code.is_empty() {
            return Err(ChainError::ContractCall(format!(
                "no contract deployed at {address}"
            )));
        }

        let agw = IAbstractGlobalWallet::new(address, client.provider().clone());
        let owners = client
            .bounded("k1ListOwners", agw.k1ListOwners().call())
            .await?
            .map_err(classify_contract_error)?;

        tracing::debug!(network = %network, contract = %address, count = owners.len(), "k1 owners read");
        Ok(owners.into_iter().map(|owner| owner.to_string()).collect())
    }

    async fn is_healthy(&self, network: Network) -> bool {
        self.client(network).is_healthy().await
    }
}

fn parse_address(value: &str) -> ChainResult<Address> {
    value
        .trim()
        .parse()
        .map_err(|_| ChainError::ContractCall(format!("invalid address '{value}'")))
}

/// Transport failures are network errors; everything else (revert, empty
/// return data, decode failure) means the target is not what we expected.
fn classify_contract_error(e: alloy::contract::Error) -> ChainError {
    let message = e
        .to_string()
        .lines()
        .next()
        .unwrap_or_default()
        .to_string();
    match e {
        alloy::contract::Error::TransportError(RpcError::Transport(_) | RpcError::NullResp) => {
            ChainError::Network(message)
        }
        _ => ChainError::ContractCall(message),
    }
}
