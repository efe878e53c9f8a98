//! Command boundary between callers and the signer process.
//!
//! # Data Flow
//! ```text
//! caller (agent-tx)                         signer (agent-signer)
//!     PreparedTransaction
//!     → protocol.rs WireTransaction (JSON, integers as strings)
//!     → process.rs spawns `agent-signer sign-raw --tx-json ...`
//!                                              → coerce.rs (JSON → typed, lossless)
//!                                              → commands.rs (sign / submit)
//!                                              → stdout: SignResponse / SendResponse
//!     ← process.rs parses stdout, re-checks hash
//! ```
//!
//! # Design Decisions
//! - The key only exists in the signer process; messages are key-free
//! - Coercion happens once, at signer ingress; internal code sees typed values
//! - stdout carries exactly one JSON document; logs and errors go to stderr

pub mod coerce;
pub mod commands;
pub mod process;
pub mod protocol;

pub use commands::TxSource;
pub use process::SignerProcess;
pub use protocol::{SendResponse, SignResponse, WireTransaction};
