//! Fee model resolution.
//!
//! Every transaction is priced by exactly one model:
//! - legacy: a single `gasPrice`
//! - EIP-1559: `maxFeePerGas` cap plus `maxPriorityFeePerGas` tip
//!
//! Partial or mixed input is rejected. Nothing is guessed or filled in here.

use alloy::primitives::U256;

use crate::blockchain::transaction::{PreparedTransaction, TxType};
use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// A complete, validated set of fee fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeModel {
    Legacy {
        gas_price: u128,
    },
    Eip1559 {
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
    },
}

impl FeeModel {
    pub fn name(&self) -> &'static str {
        match self {
            FeeModel::Legacy { .. } => "legacy",
            FeeModel::Eip1559 { .. } => "eip1559",
        }
    }
}

/// Determine the fee model of `tx` and check its fields are complete.
pub fn resolve_fee_model(tx: &PreparedTransaction) -> BlockchainResult<FeeModel> {
    match tx.tx_type() {
        TxType::Legacy => {
            if tx.max_fee_per_gas.is_some() || tx.max_priority_fee_per_gas.is_some() {
                return Err(BlockchainError::ConflictingFeeFields(
                    "Legacy transaction must not set maxFeePerGas or maxPriorityFeePerGas".into(),
                ));
            }
            let gas_price = tx.gas_price.ok_or_else(|| {
                BlockchainError::IncompleteFeeFields("Legacy transaction requires gasPrice".into())
            })?;
            Ok(FeeModel::Legacy {
                gas_price: narrow("gasPrice", gas_price)?,
            })
        }
        TxType::Eip1559 => {
            if tx.gas_price.is_some() {
                return Err(BlockchainError::ConflictingFeeFields(
                    "EIP-1559 transaction must not set gasPrice".into(),
                ));
            }
            let (Some(max_fee), Some(priority_fee)) =
                (tx.max_fee_per_gas, tx.max_priority_fee_per_gas)
            else {
                return Err(BlockchainError::IncompleteFeeFields(
                    "EIP-1559 transaction requires maxFeePerGas and maxPriorityFeePerGas".into(),
                ));
            };
            let max_fee_per_gas = narrow("maxFeePerGas", max_fee)?;
            let max_priority_fee_per_gas = narrow("maxPriorityFeePerGas", priority_fee)?;
            if max_priority_fee_per_gas > max_fee_per_gas {
                return Err(BlockchainError::InvalidInput(format!(
                    "maxPriorityFeePerGas {} is higher than maxFeePerGas {}",
                    max_priority_fee_per_gas, max_fee_per_gas
                )));
            }
            Ok(FeeModel::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            })
        }
    }
}

fn narrow(field: &str, value: U256) -> BlockchainResult<u128> {
    value.try_into().map_err(|_| {
        BlockchainError::InvalidInput(format!("{} {} does not fit in 128 bits", field, value))
    })
}
