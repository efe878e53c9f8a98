//! JSON messages exchanged across the command boundary.
//!
//! Requests travel as a [`WireTransaction`] on the signer's command line;
//! responses are printed by the signer on stdout. No message ever carries key
//! material.

use alloy::primitives::TxHash;
use serde::{Deserialize, Serialize};

use crate::blockchain::transaction::{PreparedTransaction, SignedTransaction};
use crate::blockchain::types::{Receipt, ReceiptStatus, SubmissionResult};

/// Key-free description of a transaction with every integer as a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTransaction {
    pub to: String,
    pub data: String,
    pub value: String,
    pub gas: String,
    pub nonce: String,
    pub chain_id: String,
    #[serde(rename = "type")]
    pub tx_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<String>,
}

impl From<&PreparedTransaction> for WireTransaction {
    fn from(tx: &PreparedTransaction) -> Self {
        Self {
            to: tx.to.to_checksum(None),
            data: tx.data.to_string(),
            value: tx.value.to_string(),
            gas: tx.gas.to_string(),
            nonce: tx.nonce.to_string(),
            chain_id: tx.chain_id.to_string(),
            tx_type: tx.tx_type().as_str().to_string(),
            gas_price: tx.gas_price.map(|v| v.to_string()),
            max_fee_per_gas: tx.max_fee_per_gas.map(|v| v.to_string()),
            max_priority_fee_per_gas: tx.max_priority_fee_per_gas.map(|v| v.to_string()),
        }
    }
}

/// `sign-raw` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignResponse {
    pub status: String,
    pub hash: TxHash,
    pub serialized_transaction: String,
}

impl From<&SignedTransaction> for SignResponse {
    fn from(signed: &SignedTransaction) -> Self {
        Self {
            status: "signed".to_string(),
            hash: signed.hash,
            serialized_transaction: signed.serialized_hex(),
        }
    }
}

/// `send-signed` result, with or without a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SendResponse {
    Confirmed(ConfirmedResponse),
    Submitted(SubmittedResponse),
}

impl SendResponse {
    pub fn hash(&self) -> TxHash {
        match self {
            SendResponse::Confirmed(c) => c.hash,
            SendResponse::Submitted(s) => s.hash,
        }
    }
}

/// Submitted without waiting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedResponse {
    /// Node-returned transaction id.
    pub hash: TxHash,
    /// Always "submitted".
    pub status: String,
    /// keccak256 of the payload as computed by the signer.
    pub computed_hash: TxHash,
}

impl From<SubmissionResult> for SubmittedResponse {
    fn from(result: SubmissionResult) -> Self {
        Self {
            hash: result.hash,
            status: "submitted".to_string(),
            computed_hash: result.computed_hash,
        }
    }
}

/// Submitted and observed in a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedResponse {
    pub hash: TxHash,
    pub status: ReceiptStatus,
    pub block_number: String,
    pub gas_used: String,
    pub computed_hash: TxHash,
}

impl ConfirmedResponse {
    pub fn new(submission: SubmissionResult, receipt: &Receipt) -> Self {
        Self {
            hash: submission.hash,
            status: receipt.status,
            block_number: receipt.block_number.to_string(),
            gas_used: receipt.gas_used.to_string(),
            computed_hash: submission.computed_hash,
        }
    }
}
