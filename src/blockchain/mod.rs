//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! ChainsConfig (Polygon + Abstract RPC URLs)
//!     → client.rs (RPC connection with timeouts)
//!     → reader.rs (ERC-20 balances, AGW k1 signers)
//!     → units.rs (raw amount → decimal string)
//! ```
//!
//! # Constraints
//! - Read-only: nothing here signs or broadcasts
//! - All RPC calls have configurable timeouts
//! - Graceful degradation when an endpoint is unreachable

pub mod client;
pub mod reader;
pub mod types;
pub mod units;

pub use client::ChainClient;
pub use reader::{ChainReader, RpcChainReader};
pub use types::{ChainError, ChainId, ChainResult, Network};
pub use units::format_token_amount;
