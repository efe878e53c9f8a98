//! Gas limit estimation policy for contract calls.
//!
//! `limit = estimate + estimate * percent / 100`, in integer arithmetic.
//! An explicit caller-supplied limit always wins and skips estimation.

use std::future::Future;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Default safety margin on top of the network estimate.
pub const DEFAULT_GAS_BUFFER_PERCENT: i64 = 20;

/// Inflate `estimate` by `percent` percent, rounding down.
pub fn with_gas_buffer(estimate: u64, percent: i64) -> BlockchainResult<u64> {
    if percent < 0 {
        return Err(BlockchainError::InvalidGasBuffer(percent));
    }
    let estimate = u128::from(estimate);
    let limit = estimate + estimate * percent as u128 / 100;
    u64::try_from(limit).map_err(|_| {
        BlockchainError::InvalidInput(format!(
            "buffered gas limit {} exceeds the 64-bit range",
            limit
        ))
    })
}

/// Decides the gas limit a contract call is signed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasPolicy {
    buffer_percent: i64,
}

impl GasPolicy {
    /// Build a policy; negative percentages are rejected up front.
    pub fn new(buffer_percent: i64) -> BlockchainResult<Self> {
        if buffer_percent < 0 {
            return Err(BlockchainError::InvalidGasBuffer(buffer_percent));
        }
        Ok(Self { buffer_percent })
    }

    pub fn buffer_percent(&self) -> i64 {
        self.buffer_percent
    }

    /// Return `explicit` untouched, or run `estimate` and apply the buffer.
    ///
    /// Yields `(estimate, limit)`; `estimate` is `None` when bypassed.
    pub async fn resolve<F, Fut>(
        &self,
        explicit: Option<u64>,
        estimate: F,
    ) -> BlockchainResult<(Option<u64>, u64)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = BlockchainResult<u64>>,
    {
        if let Some(limit) = explicit {
            tracing::debug!(gas_limit = limit, "Using caller-supplied gas limit");
            return Ok((None, limit));
        }

        let estimated = estimate().await?;
        let limit = with_gas_buffer(estimated, self.buffer_percent)?;
        tracing::debug!(
            estimate = estimated,
            buffer_percent = self.buffer_percent,
            gas_limit = limit,
            "Applied gas buffer"
        );
        Ok((Some(estimated), limit))
    }
}

impl Default for GasPolicy {
    fn default() -> Self {
        Self {
            buffer_percent: DEFAULT_GAS_BUFFER_PERCENT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_gas_buffer() {
        assert_eq!(with_gas_buffer(100, 20).unwrap(), 120);
        assert_eq!(with_gas_buffer(100, 0).unwrap(), 100);
        assert_eq!(with_gas_buffer(21_000, 20).unwrap(), 25_200);
        // Rounds down, never through floating point.
        assert_eq!(with_gas_buffer(99, 15).unwrap(), 113);
    }

    #[test]
    fn test_negative_buffer() {
        assert!(matches!(
            with_gas_buffer(100, -1),
            Err(BlockchainError::InvalidGasBuffer(-1))
        ));
        assert!(GasPolicy::new(-20).is_err());
    }

    #[test]
    fn test_overflow_reported() {
        assert!(with_gas_buffer(u64::MAX, 100).is_err());
    }

    #[tokio::test]
    async fn test_explicit_limit_bypasses_estimation() {
        let policy = GasPolicy::default();
        let mut called = false;
        let (estimate, limit) = policy
            .resolve(Some(50_000), || {
                called = true;
                async { Ok(1) }
            })
            .await
            .unwrap();
        assert!(!called, "estimation must not run when a limit is given");
        assert_eq!(estimate, None);
        assert_eq!(limit, 50_000);
    }

    #[tokio::test]
    async fn test_estimate_is_buffered() {
        let policy = GasPolicy::new(50).unwrap();
        let (estimate, limit) = policy.resolve(None, || async { Ok(40_000) }).await.unwrap();
        assert_eq!(estimate, Some(40_000));
        assert_eq!(limit, 60_000);
    }

    #[tokio::test]
    async fn test_estimate_error_propagates() {
        let policy = GasPolicy::default();
        let result = policy
            .resolve(None, || async { Err(BlockchainError::Rpc("execution reverted".into())) })
            .await;
        assert!(matches!(result, Err(BlockchainError::Rpc(_))));
    }
}
