//! Wallet management and transaction signing.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged, serialized or returned
//! - The raw key string is zeroized as soon as it has been parsed

use alloy::primitives::{Address, Signature, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use zeroize::Zeroizing;

use crate::blockchain::transaction::{sign_with, PreparedTransaction, SignedTransaction};
use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "AGENT_PRIVATE_KEY";

/// The only owner of the signing key within a process.
pub struct Wallet {
    signer: PrivateKeySigner,
    /// Chain ID for EIP-155 replay protection.
    chain_id: u64,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    /// * `chain_id` - Chain ID every signed transaction must carry
    /// * `expected` - If set, the derived address must equal it
    pub fn from_private_key(
        private_key_hex: &str,
        chain_id: u64,
        expected: Option<Address>,
    ) -> BlockchainResult<Self> {
        let key_hex = private_key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        // The parse error can echo input; keep it out of the message.
        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|_| BlockchainError::InvalidKey)?;

        if let Some(expected) = expected {
            if expected != signer.address() {
                return Err(BlockchainError::AddressMismatch {
                    expected,
                    actual: signer.address(),
                });
            }
        }

        tracing::info!(
            address = %signer.address(),
            chain_id = chain_id,
            "Wallet initialized"
        );

        Ok(Self { signer, chain_id })
    }

    /// Load wallet from environment variable.
    ///
    /// Reads `AGENT_PRIVATE_KEY` from environment. A missing or blank value is
    /// fatal: the signer never runs without an identity.
    pub fn from_env(chain_id: u64, expected: Option<Address>) -> BlockchainResult<Self> {
        let private_key = Zeroizing::new(
            std::env::var(PRIVATE_KEY_ENV_VAR)
                .map_err(|_| BlockchainError::KeyNotConfigured(PRIVATE_KEY_ENV_VAR))?,
        );
        if private_key.trim().is_empty() {
            return Err(BlockchainError::KeyNotConfigured(PRIVATE_KEY_ENV_VAR));
        }

        Self::from_private_key(&private_key, chain_id, expected)
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Get the chain ID this wallet is configured for.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Sign a prepared transaction.
    ///
    /// Pure and local: validates fee fields, checks the chain ID, signs and
    /// hashes the serialized envelope. No network access.
    pub fn sign_prepared(&self, tx: &PreparedTransaction) -> BlockchainResult<SignedTransaction> {
        if tx.chain_id != self.chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: self.chain_id,
                actual: tx.chain_id,
            });
        }

        let signed = sign_with(tx, |hash| self.sign_hash(hash))?;

        tracing::info!(
            from = %self.address(),
            to = %tx.to,
            nonce = tx.nonce,
            tx_hash = %signed.hash,
            "Transaction signed"
        );
        Ok(signed)
    }

    fn sign_hash(&self, hash: &B256) -> BlockchainResult<Signature> {
        self.signer
            .sign_hash_sync(hash)
            .map_err(|e| BlockchainError::Wallet(format!("Signing failed: {}", e)))
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::consensus::transaction::SignerRecoverable;
    use alloy::consensus::{Transaction, TxEnvelope};
    use alloy::eips::eip2718::Decodable2718;
    use alloy::primitives::{keccak256, U256};

    use crate::blockchain::address::normalize_address;
    use crate::blockchain::transaction::TxType;

    // Well-known test private key (Anvil's first account)
    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    const RECIPIENT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

    fn wallet() -> Wallet {
        Wallet::from_private_key(TEST_PRIVATE_KEY, 143, None).unwrap()
    }

    fn legacy_tx() -> PreparedTransaction {
        let mut tx = PreparedTransaction::new(
            normalize_address(RECIPIENT).unwrap(),
            U256::from(21_000),
            5,
            143,
        );
        tx.tx_type = Some(TxType::Legacy);
        tx.gas_price = Some(U256::from(1_000_000_000u64));
        tx
    }

    #[test]
    fn test_wallet_from_private_key() {
        assert_eq!(wallet().address().to_string(), TEST_ADDRESS);
    }

    #[test]
    fn test_wallet_with_0x_prefix() {
        let wallet = Wallet::from_private_key(&format!("0x{}", TEST_PRIVATE_KEY), 1, None).unwrap();
        assert_eq!(wallet.address().to_string(), TEST_ADDRESS);
    }

    #[test]
    fn test_invalid_private_key() {
        let err = Wallet::from_private_key("invalid_key", 1, None).unwrap_err();
        assert!(err.to_string().contains("Invalid private key"));
        assert!(!err.to_string().contains("invalid_key"));
        assert_eq!(err.kind(), crate::blockchain::types::ErrorKind::Configuration);
    }

    #[test]
    fn test_expected_address_match() {
        let expected = normalize_address(TEST_ADDRESS).unwrap();
        assert!(Wallet::from_private_key(TEST_PRIVATE_KEY, 1, Some(expected)).is_ok());
    }

    #[test]
    fn test_expected_address_mismatch() {
        let expected = normalize_address(RECIPIENT).unwrap();
        let err = Wallet::from_private_key(TEST_PRIVATE_KEY, 1, Some(expected)).unwrap_err();
        assert!(matches!(err, BlockchainError::AddressMismatch { .. }));
    }

    #[test]
    fn test_debug_hides_key() {
        let rendered = format!("{:?}", wallet());
        assert!(!rendered.contains(TEST_PRIVATE_KEY));
        assert!(rendered.contains("chain_id"));
    }

    #[test]
    fn test_legacy_signing_is_deterministic() {
        let wallet = wallet();
        let first = wallet.sign_prepared(&legacy_tx()).unwrap();
        let second = wallet.sign_prepared(&legacy_tx()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_hash_is_keccak_of_serialized() {
        let signed = wallet().sign_prepared(&legacy_tx()).unwrap();
        assert_eq!(signed.hash, keccak256(&signed.serialized));
    }

    #[test]
    fn test_legacy_roundtrip_decodes() {
        let wallet = wallet();
        let signed = wallet.sign_prepared(&legacy_tx()).unwrap();

        let envelope = TxEnvelope::decode_2718(&mut signed.serialized.as_ref()).unwrap();
        assert!(envelope.is_legacy());
        assert_eq!(*envelope.tx_hash(), signed.hash);
        assert_eq!(envelope.value(), U256::ZERO);
        assert_eq!(envelope.nonce(), 5);
        assert_eq!(envelope.gas_limit(), 21_000);
        assert_eq!(envelope.chain_id(), Some(143));
        assert!(envelope.input().is_empty());
        assert_eq!(envelope.recover_signer().unwrap(), wallet.address());
    }

    #[test]
    fn test_eip1559_roundtrip_decodes() {
        let wallet = wallet();
        let mut tx = legacy_tx();
        tx.tx_type = Some(TxType::Eip1559);
        tx.gas_price = None;
        tx.max_fee_per_gas = Some(U256::from(100_000_000_000u64));
        tx.max_priority_fee_per_gas = Some(U256::from(2_000_000_000u64));
        tx.value = U256::from(1_000_000_000_000_000_000u128);
        tx.data = alloy::primitives::Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]);

        let signed = wallet.sign_prepared(&tx).unwrap();
        assert_eq!(signed.serialized[0], 0x02);

        let envelope = TxEnvelope::decode_2718(&mut signed.serialized.as_ref()).unwrap();
        assert!(envelope.is_eip1559());
        assert_eq!(*envelope.tx_hash(), signed.hash);
        assert_eq!(envelope.max_fee_per_gas(), 100_000_000_000);
        assert_eq!(envelope.max_priority_fee_per_gas(), Some(2_000_000_000));
        assert_eq!(envelope.value(), tx.value);
        assert_eq!(envelope.input().as_ref(), &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(envelope.recover_signer().unwrap(), wallet.address());
    }

    #[test]
    fn test_chain_mismatch() {
        let mut tx = legacy_tx();
        tx.chain_id = 1;
        let err = wallet().sign_prepared(&tx).unwrap_err();
        assert!(matches!(
            err,
            BlockchainError::ChainMismatch {
                expected: 143,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_missing_gas_price_fails() {
        let mut tx = legacy_tx();
        tx.gas_price = None;
        assert!(matches!(
            wallet().sign_prepared(&tx),
            Err(BlockchainError::IncompleteFeeFields(_))
        ));
    }
}
