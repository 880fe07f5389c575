//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + AGW_RECOVERY_APP_ID
//!     → loader.rs (parse, deserialize, env override)
//!     → validation.rs (semantic checks)
//!     → RecoveryConfig (validated, immutable)
//!     → shared via Arc to the chain reader and HTTP surface
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - A missing app_id degrades the service instead of aborting startup

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    ChainConfig, ChainsConfig, LogFormat, ObservabilityConfig, RecoveryConfig, ServerConfig,
    TokenConfig,
};
pub use validation::ValidationError;
