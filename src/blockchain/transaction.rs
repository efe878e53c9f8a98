//! Prepared transactions and their signed, wire-ready encoding.
//!
//! # Responsibilities
//! - Hold the typed, validated description of one intended transaction
//! - Build the per-fee-model envelope (legacy / EIP-1559)
//! - Serialize the signed envelope and hash the serialized bytes

use alloy::consensus::{SignableTransaction, TxEip1559, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{keccak256, Address, Bytes, Signature, TxHash, TxKind, B256, U256};
use serde::{Deserialize, Serialize};

use crate::blockchain::fees::{resolve_fee_model, FeeModel};
use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Fee model tag as it appears in the JSON description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    Legacy,
    Eip1559,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Legacy => "legacy",
            TxType::Eip1559 => "eip1559",
        }
    }
}

impl std::str::FromStr for TxType {
    type Err = BlockchainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "legacy" => Ok(TxType::Legacy),
            "eip1559" => Ok(TxType::Eip1559),
            other => Err(BlockchainError::InvalidInput(format!(
                "unknown transaction type '{}', expected legacy or eip1559",
                other
            ))),
        }
    }
}

/// The canonical input to signing. Built fresh for every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTransaction {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    pub gas: U256,
    pub nonce: u64,
    pub chain_id: u64,
    /// `None` means legacy.
    pub tx_type: Option<TxType>,
    pub gas_price: Option<U256>,
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,
}

impl PreparedTransaction {
    /// A legacy-typed transaction with empty data, zero value and no fee fields set.
    pub fn new(to: Address, gas: U256, nonce: u64, chain_id: u64) -> Self {
        Self {
            to,
            data: Bytes::new(),
            value: U256::ZERO,
            gas,
            nonce,
            chain_id,
            tx_type: None,
            gas_price: None,
            max_fee_per_gas: None,
            max_priority_fee_per_gas: None,
        }
    }

    /// The effective fee model tag.
    pub fn tx_type(&self) -> TxType {
        self.tx_type.unwrap_or(TxType::Legacy)
    }
}

/// Output of the signer: the serialized signed envelope and its content hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub serialized: Bytes,
    pub hash: TxHash,
}

impl SignedTransaction {
    /// `0x`-prefixed hex of the serialized bytes.
    pub fn serialized_hex(&self) -> String {
        self.serialized.to_string()
    }
}

/// Validate, build, sign and encode.
///
/// `sign` receives the signing hash of the envelope and must return a
/// signature over it; the caller decides where the key lives.
pub fn sign_with<F>(tx: &PreparedTransaction, sign: F) -> BlockchainResult<SignedTransaction>
where
    F: FnOnce(&B256) -> BlockchainResult<Signature>,
{
    let fee = resolve_fee_model(tx)?;
    let gas_limit: u64 = tx.gas.try_into().map_err(|_| {
        BlockchainError::InvalidInput(format!("gas {} exceeds the 64-bit gas limit range", tx.gas))
    })?;

    let envelope = match fee {
        FeeModel::Legacy { gas_price } => {
            let unsigned = TxLegacy {
                chain_id: Some(tx.chain_id),
                nonce: tx.nonce,
                gas_price,
                gas_limit,
                to: TxKind::Call(tx.to),
                value: tx.value,
                input: tx.data.clone(),
            };
            let signature = sign(&unsigned.signature_hash())?;
            TxEnvelope::from(unsigned.into_signed(signature))
        }
        FeeModel::Eip1559 {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        } => {
            let unsigned = TxEip1559 {
                chain_id: tx.chain_id,
                nonce: tx.nonce,
                gas_limit,
                max_fee_per_gas,
                max_priority_fee_per_gas,
                to: TxKind::Call(tx.to),
                value: tx.value,
                input: tx.data.clone(),
                ..Default::default()
            };
            let signature = sign(&unsigned.signature_hash())?;
            TxEnvelope::from(unsigned.into_signed(signature))
        }
    };

    let serialized = Bytes::from(envelope.encoded_2718());
    let hash = keccak256(&serialized);

    tracing::debug!(
        tx_hash = %hash,
        nonce = tx.nonce,
        chain_id = tx.chain_id,
        fee_model = fee.name(),
        "Transaction encoded"
    );

    Ok(SignedTransaction { serialized, hash })
}
