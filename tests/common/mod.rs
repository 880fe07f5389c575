//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use agw_recovery::blockchain::{ChainError, ChainReader, ChainResult, Network};
use agw_recovery::http::HttpServer;
use agw_recovery::identity::{Identity, LinkedAccount};
use agw_recovery::RecoveryConfig;
use async_trait::async_trait;
use tokio::net::TcpListener;

pub const EMBEDDED: &str = "0xAbC0000000000000000000000000000000000123";
pub const AGW: &str = "0xA000000000000000000000000000000000000001";

/// In-memory chain with canned signer sets and balances.
#[derive(Default)]
pub struct FakeChain {
    signers: HashMap<String, ChainResult<Vec<String>>>,
    balances: HashMap<String, ChainResult<String>>,
    delay: Option<Duration>,
    unhealthy: Vec<Network>,
}

impl FakeChain {
    pub fn with_signers(mut self, contract: &str, signers: &[&str]) -> Self {
        self.signers.insert(
            contract.to_lowercase(),
            Ok(signers.iter().map(|s| s.to_string()).collect()),
        );
        self
    }

    pub fn with_balance(mut self, owner: &str, balance: &str) -> Self {
        self.balances
            .insert(owner.to_lowercase(), Ok(balance.to_string()));
        self
    }

    pub fn with_failing_balance(mut self, owner: &str) -> Self {
        self.balances.insert(
            owner.to_lowercase(),
            Err(ChainError::Network("connection refused".to_string())),
        );
        self
    }

    /// Delay every signer lookup.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_unhealthy(mut self, network: Network) -> Self {
        self.unhealthy.push(network);
        self
    }
}

#[async_trait]
impl ChainReader for FakeChain {
    async fn token_balance(&self, _network: Network, _token: &str, owner: &str) -> ChainResult<String> {
        self.balances
            .get(&owner.to_lowercase())
            .cloned()
            .unwrap_or_else(|| Ok("0".to_string()))
    }

    async fn authorized_signers(&self, _network: Network, contract: &str) -> ChainResult<Vec<String>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.signers
            .get(&contract.to_lowercase())
            .cloned()
            .unwrap_or_else(|| {
                Err(ChainError::ContractCall(format!(
                    "no contract deployed at {contract}"
                )))
            })
    }

    async fn is_healthy(&self, network: Network) -> bool {
        !self.unhealthy.contains(&network)
    }
}

/// Defaults plus an application identifier.
pub fn configured() -> RecoveryConfig {
    RecoveryConfig {
        app_id: Some("test-app".to_string()),
        ..Default::default()
    }
}

pub fn identity() -> Identity {
    Identity {
        id: "did:privy:integration".to_string(),
        email: Some("user@example.com".to_string()),
        linked_accounts: vec![
            LinkedAccount::wallet("0x9999999999999999999999999999999999999999", "metamask"),
            LinkedAccount::wallet(EMBEDDED, "privy"),
        ],
    }
}

pub fn server(config: RecoveryConfig, chain: FakeChain) -> HttpServer {
    HttpServer::new(config, Arc::new(chain))
}

/// Bind an ephemeral port and serve `server` on it in the background.
pub async fn spawn_server(server: HttpServer) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener, std::future::pending()).await;
    });
    addr
}
