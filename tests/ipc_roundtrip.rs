//! `SignerProcess` driving the real `agent-signer` executable.

use std::sync::Once;
use std::time::Duration;

use agent_signer::blockchain::{BlockchainError, PreparedTransaction, TxType};
use agent_signer::ipc::{SendResponse, SignerProcess};
use alloy::consensus::transaction::SignerRecoverable;
use alloy::consensus::{Transaction, TxEnvelope};
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{keccak256, Address, Bytes, U256};

mod common;
use common::{MockBehavior, CHAIN_ID, RECIPIENT, TEST_ADDRESS, TEST_PRIVATE_KEY};

static ENV: Once = Once::new();

fn signer() -> SignerProcess {
    ENV.call_once(|| {
        std::env::set_var("AGENT_PRIVATE_KEY", TEST_PRIVATE_KEY);
        std::env::set_var("MONAD_RPC_URL", "http://127.0.0.1:1");
        std::env::remove_var("AGENT_ADDRESS");
        std::env::remove_var("MONAD_CHAIN_ID");
        std::env::remove_var("AGENT_SIGNER_CONFIG");
    });
    SignerProcess::new(env!("CARGO_BIN_EXE_agent-signer"), Duration::from_secs(30))
}

fn eip1559_tx(nonce: u64) -> PreparedTransaction {
    let mut tx = PreparedTransaction::new(
        RECIPIENT.parse::<Address>().unwrap(),
        U256::from(60_000),
        nonce,
        CHAIN_ID,
    );
    tx.tx_type = Some(TxType::Eip1559);
    tx.data = Bytes::from_static(&[0xa9, 0x05, 0x9c, 0xbb]);
    // Above 2^53 so a lossy float path would corrupt it.
    tx.value = U256::from(10u64).pow(U256::from(18)) + U256::from(1);
    tx.max_fee_per_gas = Some(U256::from(100_000_000_000u64));
    tx.max_priority_fee_per_gas = Some(U256::from(2_000_000_000u64));
    tx
}

#[tokio::test]
async fn test_address_over_ipc() {
    let address = signer().address().await.unwrap();
    assert_eq!(address.to_checksum(None), TEST_ADDRESS);
}

#[tokio::test]
async fn test_sign_raw_over_ipc_is_lossless() {
    let tx = eip1559_tx(9);
    let signed = signer().sign_raw(&tx).await.unwrap();
    assert_eq!(keccak256(&signed.serialized), signed.hash);

    let envelope = TxEnvelope::decode_2718(&mut signed.serialized.as_ref()).unwrap();
    let TxEnvelope::Eip1559(inner) = &envelope else {
        panic!("expected an EIP-1559 envelope");
    };
    let decoded = inner.tx();
    assert_eq!(decoded.nonce, 9);
    assert_eq!(decoded.gas_limit, 60_000);
    assert_eq!(decoded.value, tx.value);
    assert_eq!(decoded.max_fee_per_gas, 100_000_000_000);
    assert_eq!(decoded.max_priority_fee_per_gas, 2_000_000_000);
    assert_eq!(decoded.chain_id, CHAIN_ID);
    assert_eq!(envelope.input().as_ref(), &[0xa9, 0x05, 0x9c, 0xbb]);
    assert_eq!(
        envelope.recover_signer().unwrap(),
        TEST_ADDRESS.parse::<Address>().unwrap()
    );
}

#[tokio::test]
async fn test_signer_errors_surface_as_ipc_errors() {
    let mut tx = eip1559_tx(0);
    tx.max_priority_fee_per_gas = None;

    let err = signer().sign_raw(&tx).await.unwrap_err();
    assert!(matches!(err, BlockchainError::Ipc(_)));
    assert!(err.to_string().contains("Incomplete fee fields"));
}

#[tokio::test]
async fn test_wrong_chain_is_refused() {
    let mut tx = eip1559_tx(0);
    tx.chain_id = 1;
    let err = signer().sign_raw(&tx).await.unwrap_err();
    assert!(err.to_string().contains("Chain ID mismatch"));
}

#[tokio::test]
async fn test_send_signed_over_ipc() {
    let node = common::start_mock_node(MockBehavior::default()).await;
    let signer = signer().with_env("MONAD_RPC_URL", node.url());
    let signed = signer.sign_raw(&eip1559_tx(1)).await.unwrap();

    match signer.send_signed(&signed, true).await.unwrap() {
        SendResponse::Confirmed(confirmed) => {
            assert_eq!(confirmed.hash, signed.hash);
            assert_eq!(confirmed.computed_hash, signed.hash);
            assert_eq!(confirmed.block_number, "42");
        }
        other => panic!("expected a confirmed response, got {other:?}"),
    }
    assert_eq!(node.state.submissions(), vec![signed.serialized_hex()]);
}

#[tokio::test]
async fn test_send_signed_without_wait_over_ipc() {
    let node = common::start_mock_node(MockBehavior::default()).await;
    let signer = signer().with_env("MONAD_RPC_URL", node.url());
    let signed = signer.sign_raw(&eip1559_tx(2)).await.unwrap();

    let response = signer.send_signed(&signed, false).await.unwrap();
    assert!(matches!(response, SendResponse::Submitted(_)));
    assert_eq!(response.hash(), signed.hash);
}
