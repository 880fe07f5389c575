//! AGW recovery diagnostic service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Host page                ┌──────────────────────────────────────────────┐
//!     (provider SDK)           │                AGW RECOVERY                   │
//!     ─────────────────────────┼─▶ http ──▶ SessionRegistry ──▶ Reconciliation │
//!                              │                                   Engine      │
//!                              │                                     │         │
//!                              │                   ┌─────────────────┤         │
//!                              │                   ▼                 ▼         │
//!     Copyable report          │              report::summary   ChainReader ───┼──▶ Abstract RPC
//!     ◀────────────────────────┼── text/plain                        └────────┼──▶ Polygon RPC
//!                              │                                               │
//!                              │   config · observability · lifecycle          │
//!                              └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use agw_recovery::blockchain::{ChainClient, Network, RpcChainReader};
use agw_recovery::config::load_config;
use agw_recovery::lifecycle::{wait_for_signal, Shutdown};
use agw_recovery::observability::{init_logging, init_metrics};
use agw_recovery::HttpServer;

#[derive(Parser)]
#[command(name = "agw-recovery")]
#[command(about = "Abstract Global Wallet recovery diagnostic", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Missing means defaults.
    #[arg(short, long, default_value = "agw-recovery.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "agw-recovery starting");
    tracing::info!(
        config = %cli.config.display(),
        bind_address = %config.server.bind_address,
        polygon_rpc = %config.chains.polygon.rpc_url,
        abstract_rpc = %config.chains.abstract_chain.rpc_url,
        token = %config.token.symbol,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let polygon = ChainClient::new(Network::Polygon, config.chains.polygon.clone()).await?;
    let abstract_chain =
        ChainClient::new(Network::Abstract, config.chains.abstract_chain.clone()).await?;
    let reader = Arc::new(RpcChainReader::new(
        polygon,
        abstract_chain,
        config.token.clone(),
    ));

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        trigger.trigger();
    });

    let server = HttpServer::new(config, reader);
    server.run(listener, shutdown.wait()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
