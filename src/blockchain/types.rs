//! Chain-specific types and error definitions.

use std::time::Duration;

use alloy::primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse error classes surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid environment secret, endpoint or config file.
    Configuration,
    /// Rejected input: fee fields, address, gas buffer, JSON, arguments.
    Validation,
    /// The configured key does not derive the expected address.
    AddressMismatch,
    /// Submission rejected or endpoint unreachable.
    Network,
    /// A receipt wait ran out of time.
    ConfirmationTimeout,
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The signing key was not provided to the signer process.
    #[error("Missing required env var: {0}")]
    KeyNotConfigured(&'static str),

    /// Fee fields required by the selected fee model are absent.
    #[error("Incomplete fee fields: {0}")]
    IncompleteFeeFields(String),

    /// Fee fields of the other fee model are present.
    #[error("Conflicting fee fields: {0}")]
    ConflictingFeeFields(String),

    /// Address is not 20 hex bytes or fails its checksum.
    #[error("Malformed address '{0}'")]
    MalformedAddress(String),

    /// Gas buffer percentage was negative.
    #[error("Invalid gas buffer percent {0}: must be >= 0")]
    InvalidGasBuffer(i64),

    /// Malformed JSON, number or argument.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The key loaded by the signer derives a different address than configured.
    #[error("AGENT_ADDRESS {expected} does not match the configured key (derives {actual})")]
    AddressMismatch { expected: Address, actual: Address },

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// The signing key is present but does not parse.
    #[error("Invalid private key format in AGENT_PRIVATE_KEY")]
    InvalidKey,

    /// Signing failure.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// No receipt was observed before the deadline. The transaction may still land.
    #[error("Transaction {hash} not confirmed within {waited:?}")]
    ConfirmationTimeout { hash: TxHash, waited: Duration },

    /// The signer process could not be run or answered with an error.
    #[error("Signer process error: {0}")]
    Ipc(String),
}

impl BlockchainError {
    /// Map onto the coarse error class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BlockchainError::Config(_)
            | BlockchainError::KeyNotConfigured(_)
            | BlockchainError::InvalidKey => ErrorKind::Configuration,
            BlockchainError::IncompleteFeeFields(_)
            | BlockchainError::ConflictingFeeFields(_)
            | BlockchainError::MalformedAddress(_)
            | BlockchainError::InvalidGasBuffer(_)
            | BlockchainError::InvalidInput(_)
            | BlockchainError::ChainMismatch { .. }
            | BlockchainError::Wallet(_) => ErrorKind::Validation,
            BlockchainError::AddressMismatch { .. } => ErrorKind::AddressMismatch,
            BlockchainError::Rpc(_) | BlockchainError::Timeout(_) | BlockchainError::Ipc(_) => {
                ErrorKind::Network
            }
            BlockchainError::ConfirmationTimeout { .. } => ErrorKind::ConfirmationTimeout,
        }
    }
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Final inclusion outcome of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptStatus {
    Success,
    Reverted,
}

/// The network's record of an included transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub hash: TxHash,
    pub status: ReceiptStatus,
    pub block_number: u64,
    pub gas_used: u128,
}

/// Outcome of a raw submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionResult {
    /// Identifier returned by the node, used for tracking only.
    pub hash: TxHash,
    /// keccak256 of the submitted bytes, computed locally.
    pub computed_hash: TxHash,
}

impl SubmissionResult {
    /// Whether the node agreed with the locally computed hash.
    pub fn hashes_agree(&self) -> bool {
        self.hash == self.computed_hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BlockchainError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = BlockchainError::InvalidGasBuffer(-5);
        assert!(err.to_string().contains("-5"));

        let err = BlockchainError::KeyNotConfigured("AGENT_PRIVATE_KEY");
        assert_eq!(err.to_string(), "Missing required env var: AGENT_PRIVATE_KEY");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            BlockchainError::IncompleteFeeFields("x".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            BlockchainError::KeyNotConfigured("AGENT_PRIVATE_KEY").kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            BlockchainError::AddressMismatch {
                expected: Address::ZERO,
                actual: Address::repeat_byte(1)
            }
            .kind(),
            ErrorKind::AddressMismatch
        );
        assert_eq!(BlockchainError::Rpc("down".into()).kind(), ErrorKind::Network);
        assert_eq!(
            BlockchainError::ConfirmationTimeout {
                hash: TxHash::ZERO,
                waited: Duration::from_secs(1)
            }
            .kind(),
            ErrorKind::ConfirmationTimeout
        );
        assert_eq!(BlockchainError::InvalidKey.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_confirmation_timeout_keeps_sub_second_waits() {
        let err = BlockchainError::ConfirmationTimeout {
            hash: TxHash::ZERO,
            waited: Duration::from_millis(300),
        };
        assert!(err.to_string().ends_with("not confirmed within 300ms"));
    }

    #[test]
    fn test_receipt_status_serde() {
        assert_eq!(
            serde_json::to_string(&ReceiptStatus::Reverted).unwrap(),
            "\"reverted\""
        );
    }
}
