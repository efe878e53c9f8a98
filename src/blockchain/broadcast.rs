//! Submission of signed payloads and receipt polling.
//!
//! # Responsibilities
//! - Submit raw signed bytes once, never retrying
//! - Compute the payload hash locally and compare it with the node's answer
//! - Poll for a receipt under a caller-supplied deadline
//!
//! A timed-out wait only stops observing; the transaction may still confirm.

use std::time::Duration;

use alloy::primitives::{keccak256, TxHash};
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::{
    BlockchainError, BlockchainResult, Receipt, ReceiptStatus, SubmissionResult,
};
use crate::config::ConfirmationConfig;

/// Submits transactions and waits for their receipts.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    client: BlockchainClient,
    poll_interval: Duration,
}

impl Broadcaster {
    pub fn new(client: BlockchainClient, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval,
        }
    }

    pub fn from_config(client: BlockchainClient, config: &ConfirmationConfig) -> Self {
        Self::new(client, Duration::from_millis(config.poll_interval_ms))
    }

    /// Send the serialized transaction to the network.
    pub async fn submit(&self, serialized: &[u8]) -> BlockchainResult<SubmissionResult> {
        if serialized.is_empty() {
            return Err(BlockchainError::InvalidInput(
                "signed transaction is empty".to_string(),
            ));
        }

        let computed_hash = keccak256(serialized);
        let hash = self.client.send_raw_transaction(serialized).await?;
        let result = SubmissionResult {
            hash,
            computed_hash,
        };

        if result.hashes_agree() {
            tracing::info!(tx_hash = %hash, "Transaction submitted");
        } else {
            tracing::warn!(
                tx_hash = %hash,
                computed_hash = %computed_hash,
                "Node returned a transaction id that differs from the payload hash"
            );
        }
        Ok(result)
    }

    /// Poll until a receipt for `hash` is observed or `wait` elapses.
    pub async fn await_receipt(&self, hash: TxHash, wait: Duration) -> BlockchainResult<Receipt> {
        let result = timeout(wait, async {
            let mut ticker = interval(self.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let receipt = match self.client.get_transaction_receipt(hash).await {
                    Ok(Some(r)) => r,
                    Ok(None) => {
                        tracing::debug!(tx_hash = %hash, "Transaction pending");
                        continue;
                    }
                    // Transient read failures keep polling until the deadline.
                    Err(e) => {
                        tracing::warn!(tx_hash = %hash, error = %e, "Receipt poll failed");
                        continue;
                    }
                };

                let status = if receipt.status() {
                    ReceiptStatus::Success
                } else {
                    ReceiptStatus::Reverted
                };
                return Receipt {
                    hash,
                    status,
                    block_number: receipt.block_number.unwrap_or_default(),
                    gas_used: u128::from(receipt.gas_used),
                };
            }
        })
        .await;

        match result {
            Ok(receipt) => {
                tracing::info!(
                    tx_hash = %hash,
                    block_number = receipt.block_number,
                    status = ?receipt.status,
                    "Transaction confirmed"
                );
                Ok(receipt)
            }
            Err(_) => {
                tracing::warn!(
                    tx_hash = %hash,
                    timeout_ms = wait.as_millis() as u64,
                    "Confirmation timed out"
                );
                Err(BlockchainError::ConfirmationTimeout { hash, waited: wait })
            }
        }
    }
}
