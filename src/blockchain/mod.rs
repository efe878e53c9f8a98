//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! PreparedTransaction
//!     → gas.rs (optional: estimate + buffer for contract calls)
//!     → fees.rs (pick legacy / EIP-1559, reject incomplete or mixed fields)
//!     → wallet.rs + transaction.rs (sign, serialize, hash)
//!     → broadcast.rs (submit once, optionally poll for the receipt)
//!         ↳ client.rs (RPC connection with timeouts)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables, inside the signer process
//! - Never log private keys or signed payloads
//! - Signing never touches the network
//! - All RPC calls and receipt waits have deadlines

pub mod address;
pub mod broadcast;
pub mod client;
pub mod fees;
pub mod gas;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use broadcast::Broadcaster;
pub use client::BlockchainClient;
pub use fees::FeeModel;
pub use gas::{with_gas_buffer, GasPolicy};
pub use transaction::{PreparedTransaction, SignedTransaction, TxType};
pub use types::{BlockchainError, BlockchainResult, ErrorKind, Receipt, ReceiptStatus};
pub use wallet::Wallet;
