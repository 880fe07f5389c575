//! Reconciliation subsystem.
//!
//! # Data Flow
//! ```text
//! Identity (provider login)
//!     → engine.rs (authenticate, resolve embedded wallet)
//!     → contract address submitted (length gate, tagged)
//!     → ChainReader::authorized_signers (Abstract)
//!     → matching.rs (embedded wallet ∈ signers?)
//!     → ChainReader::token_balance × (1 + signers) (Polygon, all or nothing)
//!     → state.rs (SessionState snapshot, watch notifications)
//! ```
//!
//! # Constraints
//! - Only the current submission may commit results
//! - No retries; the reader's timeout bounds each call

pub mod engine;
pub mod matching;
pub mod registry;
pub mod state;

pub use engine::{LookupTargets, ReconciliationEngine};
pub use matching::{signer_matches, SignerMatch};
pub use registry::SessionRegistry;
pub use state::{
    is_submittable, BalanceRecord, ExportState, SessionPhase, SessionState, SubmissionTag,
    MIN_CONTRACT_ADDRESS_LEN,
};
