//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoint (plus read-only fallbacks)
//! - Query chain state (chain id, gas price, pending nonce, receipts, calls)
//! - Estimate gas for contract calls
//! - Submit raw signed transactions, exactly once, to the primary endpoint

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use tokio::time::timeout;

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::config::RpcConfig;

/// Blockchain RPC client wrapper with read failover.
#[derive(Clone)]
pub struct BlockchainClient {
    /// Primary provider first, then fallbacks.
    providers: Vec<DynProvider>,
    /// Configuration.
    config: RpcConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Create a new blockchain client.
    ///
    /// No request is made here; providers connect lazily.
    pub fn new(config: RpcConfig) -> BlockchainResult<Self> {
        let timeout_duration = Duration::from_secs(config.timeout_secs);
        let mut providers = Vec::new();

        let primary_url: url::Url = config.url.parse().map_err(|e| {
            BlockchainError::Config(format!("Invalid RPC URL '{}': {}", config.url, e))
        })?;
        providers.push(ProviderBuilder::new().connect_http(primary_url).erased());

        for url_str in &config.fallback_urls {
            match url_str.parse::<url::Url>() {
                Ok(url) => providers.push(ProviderBuilder::new().connect_http(url).erased()),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid fallback RPC URL"),
            }
        }

        tracing::debug!(
            rpc_url = %config.url,
            fallbacks = providers.len() - 1,
            chain_id = config.chain_id,
            "Blockchain client initialized"
        );

        Ok(Self {
            providers,
            config,
            timeout_duration,
        })
    }

    /// Run a read-only call against each provider in turn until one answers.
    async fn read<T, E, F, Fut>(&self, op: &'static str, call: F) -> BlockchainResult<T>
    where
        F: Fn(DynProvider) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut last_error = None;
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, call(provider.clone())).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, op, error = %e, "RPC error, trying next provider");
                    last_error = Some(e.to_string());
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, op, "RPC timeout, trying next provider");
                    last_error = Some(format!(
                        "timed out after {}s",
                        self.timeout_duration.as_secs()
                    ));
                }
            }
        }
        Err(BlockchainError::Rpc(format!(
            "All RPC providers failed to {}: {}",
            op,
            last_error.unwrap_or_default()
        )))
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id != self.config.chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: self.config.chain_id,
                actual: chain_id,
            });
        }
        Ok(())
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> BlockchainResult<u64> {
        self.read("get chain id", |p| async move { p.get_chain_id().await })
            .await
    }

    /// Get current gas price in wei.
    pub async fn get_gas_price(&self) -> BlockchainResult<u128> {
        self.read("get gas price", |p| async move { p.get_gas_price().await })
            .await
    }

    /// Get the next nonce for `address`, counting transactions still in the mempool.
    pub async fn get_pending_nonce(&self, address: Address) -> BlockchainResult<u64> {
        self.read("get pending nonce", |p| async move {
            p.get_transaction_count(address).pending().await
        })
        .await
    }

    /// Estimate gas for a call from `from` to `to`.
    pub async fn estimate_gas(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
        value: U256,
    ) -> BlockchainResult<u64> {
        let request = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_input(data)
            .with_value(value);
        self.read("estimate gas", |p| {
            let request = request.clone();
            async move { p.estimate_gas(request).await }
        })
        .await
    }

    /// Execute a read-only call and return the raw result bytes.
    pub async fn call(&self, to: Address, data: Bytes) -> BlockchainResult<Bytes> {
        let request = TransactionRequest::default().with_to(to).with_input(data);
        self.read("call", |p| {
            let request = request.clone();
            async move { p.call(request).await }
        })
        .await
    }

    /// Get a transaction receipt by hash.
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<TransactionReceipt>> {
        self.read("get receipt", |p| async move {
            p.get_transaction_receipt(tx_hash).await
        })
        .await
    }

    /// Submit raw signed bytes and return the node's transaction id.
    ///
    /// Primary endpoint only, single attempt. A timeout here is ambiguous: the
    /// node may have accepted the payload, so the caller must check before resending.
    pub async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash> {
        let provider = &self.providers[0];
        match timeout(self.timeout_duration, provider.send_raw_transaction(raw)).await {
            Ok(Ok(pending)) => Ok(*pending.tx_hash()),
            Ok(Err(e)) => Err(BlockchainError::Rpc(format!("Submission rejected: {}", e))),
            Err(_) => Err(BlockchainError::Timeout(self.timeout_duration.as_secs())),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &RpcConfig {
        &self.config
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("rpc_url", &self.config.url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> RpcConfig {
        RpcConfig {
            // Nothing listens on port 1.
            url: "http://127.0.0.1:1".to_string(),
            fallback_urls: Vec::new(),
            chain_id: 143,
            timeout_secs: 2,
        }
    }

    #[test]
    fn test_client_creation_is_lazy() {
        assert!(BlockchainClient::new(test_config()).is_ok());
    }

    #[test]
    fn test_invalid_url() {
        let mut config = test_config();
        config.url = "not a url".to_string();
        let err = BlockchainClient::new(config).unwrap_err();
        assert!(err.to_string().contains("Invalid RPC URL"));
    }

    #[tokio::test]
    async fn test_rpc_failover() {
        let mut config = test_config();
        config.fallback_urls.push("http://127.0.0.1:2".to_string());

        let client = BlockchainClient::new(config).unwrap();
        let err = client.get_chain_id().await.unwrap_err();
        assert!(err.to_string().contains("All RPC providers failed"));
    }

    #[tokio::test]
    async fn test_unreachable_submit_is_network_error() {
        let client = BlockchainClient::new(test_config()).unwrap();
        let err = client.send_raw_transaction(&[0x01]).await.unwrap_err();
        assert_eq!(err.kind(), crate::blockchain::types::ErrorKind::Network);
    }
}
