//! Service-level error types.

use thiserror::Error;

/// Errors surfaced by session operations.
///
/// Chain and export failures are not in here: they are stored in the
/// session state as display strings and never fail the operation.
#[derive(Debug, Clone, Error)]
pub enum RecoveryError {
    /// Missing startup identifier; blocks normal serving.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The identity provider failed to initialize.
    #[error("Identity provider failed to initialize: {0}")]
    Initialization(String),

    #[error("Identity provider is not ready")]
    NotReady,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Contract address must be at least {min} characters, got {len}")]
    AddressTooShort { len: usize, min: usize },

    #[error("No contract address has been submitted")]
    NoSubmission,

    #[error("Session {0} not found")]
    SessionNotFound(String),
}

/// Result type for session operations.
pub type RecoveryResult<T> = Result<T, RecoveryError>;
