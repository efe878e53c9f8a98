//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → optional TOML file (--config / AGENT_SIGNER_CONFIG)
//!     → environment (MONAD_RPC_URL, MONAD_CHAIN_ID, AGENT_ADDRESS)
//!     → command-line overrides (agent-tx only, via load_with)
//!     → validation.rs (semantic checks)
//!     → SignerConfig (validated, immutable for the process lifetime)
//! ```
//!
//! # Design Decisions
//! - Config is read once at process start; each invocation is short-lived
//! - The signing key is never part of the config; wallet.rs reads it directly
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load, load_with, ConfigError};
pub use schema::{ConfirmationConfig, GasConfig, ObservabilityConfig, RpcConfig, SignerConfig};
