//! External identity/wallet provider collaborator.
//!
//! # Data Flow
//! ```text
//! Provider login (external)
//!     → Identity snapshot (account.rs)
//!     → embedded wallet + login contact resolution
//!     → ReconciliationEngine
//!
//! Provider secure export (external)
//!     → WalletExporter (export.rs)
//!     → outcome recorded by the engine
//! ```

pub mod account;
pub mod export;

pub use account::{EmbeddedWallet, Identity, LinkedAccount, LinkedWallet, EMBEDDED_WALLET_CLIENT};
pub use export::{ProviderStatus, ReportedExport, WalletExporter};
