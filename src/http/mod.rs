//! HTTP surface subsystem.
//!
//! # Data Flow
//! ```text
//! Host page / client
//!     → server.rs (Axum router, trace + timeout layers)
//!     → handlers.rs (session lookup, engine operation)
//!     → ReconciliationEngine
//!     → response.rs (RecoveryError → status + JSON body)
//! ```

pub mod handlers;
pub mod response;
pub mod server;

pub use server::{build_router, config_error_router, AppState, HttpServer};
