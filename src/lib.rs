//! Agent transaction signer library.
//!
//! ```text
//!   agent-tx (caller)                          agent-signer (key holder)
//!   ┌──────────────────────┐                   ┌──────────────────────────┐
//!   │ actions              │   sign-raw JSON   │ ipc::commands            │
//!   │  nonce / gas / fees  │ ────────────────▶ │  coerce → fees → sign    │
//!   │  abi encode / decode │ ◀──────────────── │  wallet (key never leaves)│
//!   │                      │   send-signed     │ blockchain::broadcast    │
//!   └──────────┬───────────┘                   └────────────┬─────────────┘
//!              │ reads (failover)                           │ submit (primary only)
//!              ▼                                            ▼
//!                          JSON-RPC network endpoint
//! ```

pub mod abi;
pub mod actions;
pub mod blockchain;
pub mod config;
pub mod ipc;
pub mod observability;

pub use blockchain::{BlockchainError, BlockchainResult, PreparedTransaction, SignedTransaction};
pub use config::SignerConfig;
