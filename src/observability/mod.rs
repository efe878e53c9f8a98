//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (address, tx_hash, nonce, ...)
//!     → logging.rs subscriber → stderr
//! ```
//!
//! # Design Decisions
//! - stdout is reserved for machine-readable results
//! - Key material and signed payloads are never recorded

pub mod logging;
