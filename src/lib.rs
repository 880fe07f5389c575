//! AGW recovery diagnostic library.
//!
//! Cross-references the embedded wallet an identity provider manages for a
//! user against the k1 signers of an Abstract Global Wallet, and gathers
//! USDC balance evidence on Polygon for a manual support request.

// Core workflow
pub mod blockchain;
pub mod identity;
pub mod reconcile;
pub mod report;

// Service surface
pub mod config;
pub mod error;
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::RecoveryConfig;
pub use error::{RecoveryError, RecoveryResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use reconcile::{ReconciliationEngine, SessionRegistry};
