//! Caller-side fee and value completion.

use std::future::Future;

use alloy::primitives::utils::parse_ether;
use alloy::primitives::U256;

use crate::blockchain::transaction::{PreparedTransaction, TxType};
use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::ipc::coerce::parse_big;

/// Fee flags as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeArgs {
    pub tx_type: TxType,
    pub gas_price: Option<U256>,
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,
}

impl FeeArgs {
    /// Legacy pricing with the gas price left to the network.
    pub fn legacy() -> Self {
        Self {
            tx_type: TxType::Legacy,
            gas_price: None,
            max_fee_per_gas: None,
            max_priority_fee_per_gas: None,
        }
    }

    /// Write the fee fields into `tx`.
    ///
    /// Legacy without an explicit price calls `network_gas_price`. EIP-1559 needs
    /// both caps from the caller and never touches the network.
    pub async fn complete<F, Fut>(
        &self,
        tx: &mut PreparedTransaction,
        network_gas_price: F,
    ) -> BlockchainResult<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = BlockchainResult<u128>>,
    {
        tx.tx_type = Some(self.tx_type);
        match self.tx_type {
            TxType::Legacy => {
                if self.max_fee_per_gas.is_some() || self.max_priority_fee_per_gas.is_some() {
                    return Err(BlockchainError::ConflictingFeeFields(
                        "EIP-1559 fee flags given with --type legacy".to_string(),
                    ));
                }
                let price = match self.gas_price {
                    Some(price) => price,
                    None => {
                        let price = network_gas_price().await?;
                        tracing::debug!(gas_price = price, "Using network gas price");
                        U256::from(price)
                    }
                };
                tx.gas_price = Some(price);
            }
            TxType::Eip1559 => {
                if self.gas_price.is_some() {
                    return Err(BlockchainError::ConflictingFeeFields(
                        "--gas-price-wei given with --type eip1559".to_string(),
                    ));
                }
                let (Some(max_fee), Some(max_priority)) =
                    (self.max_fee_per_gas, self.max_priority_fee_per_gas)
                else {
                    return Err(BlockchainError::IncompleteFeeFields(
                        "EIP-1559 mode requires --max-fee-per-gas-wei and --max-priority-fee-per-gas-wei"
                            .to_string(),
                    ));
                };
                tx.max_fee_per_gas = Some(max_fee);
                tx.max_priority_fee_per_gas = Some(max_priority);
            }
        }
        Ok(())
    }
}

/// Resolve `--value-wei` / `--value-eth`; at most one may be given, default zero.
pub fn parse_value(wei: Option<&str>, eth: Option<&str>) -> BlockchainResult<U256> {
    match (wei, eth) {
        (Some(_), Some(_)) => Err(BlockchainError::InvalidInput(
            "Pass only one value unit: --value-wei or --value-eth".to_string(),
        )),
        (Some(wei), None) => parse_big("--value-wei", wei),
        (None, Some(eth)) => {
            let eth = eth.trim();
            if eth.starts_with('-') {
                return Err(BlockchainError::InvalidInput(format!(
                    "--value-eth must not be negative, got {}",
                    eth
                )));
            }
            parse_ether(eth).map_err(|e| {
                BlockchainError::InvalidInput(format!("--value-eth '{}' is invalid: {}", eth, e))
            })
        }
        (None, None) => Ok(U256::ZERO),
    }
}

/// Parse an optional wei amount flag.
pub fn parse_wei_flag(name: &str, raw: Option<&str>) -> BlockchainResult<Option<U256>> {
    raw.map(|r| parse_big(name, r)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;

    fn tx() -> PreparedTransaction {
        PreparedTransaction::new(Address::repeat_byte(0x11), U256::from(21_000), 0, 143)
    }

    #[tokio::test]
    async fn test_legacy_fetches_network_price() {
        let mut tx = tx();
        FeeArgs::legacy()
            .complete(&mut tx, || async { Ok(7_000_000_000) })
            .await
            .unwrap();
        assert_eq!(tx.tx_type, Some(TxType::Legacy));
        assert_eq!(tx.gas_price, Some(U256::from(7_000_000_000u64)));
    }

    #[tokio::test]
    async fn test_explicit_price_skips_network() {
        let mut tx = tx();
        let fees = FeeArgs {
            gas_price: Some(U256::from(1_000_000_000u64)),
            ..FeeArgs::legacy()
        };
        let mut called = false;
        fees.complete(&mut tx, || {
            called = true;
            async { Ok(1) }
        })
        .await
        .unwrap();
        assert!(!called);
        assert_eq!(tx.gas_price, Some(U256::from(1_000_000_000u64)));
    }

    #[tokio::test]
    async fn test_eip1559_requires_both_caps() {
        let mut tx = tx();
        let fees = FeeArgs {
            tx_type: TxType::Eip1559,
            max_fee_per_gas: Some(U256::from(2u64)),
            ..FeeArgs::legacy()
        };
        let err = fees
            .complete(&mut tx, || async { Ok(1) })
            .await
            .unwrap_err();
        assert!(matches!(err, BlockchainError::IncompleteFeeFields(_)));
    }

    #[tokio::test]
    async fn test_mixed_flags_rejected() {
        let mut tx = tx();
        let fees = FeeArgs {
            max_priority_fee_per_gas: Some(U256::from(1u64)),
            ..FeeArgs::legacy()
        };
        let err = fees
            .complete(&mut tx, || async { Ok(1) })
            .await
            .unwrap_err();
        assert!(matches!(err, BlockchainError::ConflictingFeeFields(_)));
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value(None, None).unwrap(), U256::ZERO);
        assert_eq!(parse_value(Some("1500"), None).unwrap(), U256::from(1500u64));
        assert_eq!(
            parse_value(None, Some("0.5")).unwrap(),
            U256::from(500_000_000_000_000_000u64)
        );
        assert!(parse_value(Some("1"), Some("1")).is_err());
        assert!(parse_value(None, Some("-1")).is_err());
        assert!(parse_value(Some("1.5"), None).is_err());
    }
}
