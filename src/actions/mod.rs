//! Caller-side transaction flows.
//!
//! # Data Flow
//! ```text
//! agent-tx subcommand
//!     → verify eth_chainId against configuration
//!     → signer address (agent-signer address) + pending nonce
//!     → gas (explicit | estimate + buffer) and fees (flags | network gas price)
//!     → agent-signer sign-raw → agent-signer send-signed [--wait]
//! ```
//!
//! # Design Decisions
//! - This side never reads the private key; all signing crosses the process boundary
//! - Network reads go through `BlockchainClient` (with failover)
//! - Submission is delegated to the signer so there is one broadcast path

pub mod contract;
pub mod fees;
pub mod transfer;

use alloy::primitives::{keccak256, Address, TxHash};

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::transaction::{PreparedTransaction, SignedTransaction};
use crate::blockchain::types::BlockchainResult;
use crate::ipc::commands::parse_signed_hex;
use crate::ipc::process::SignerProcess;
use crate::ipc::protocol::SendResponse;

pub use contract::{read_contract, write_contract, ContractRead, ContractWrite};
pub use fees::{parse_value, FeeArgs};
pub use transfer::{send_native, NativeTransfer};

/// Network access plus the signer handle.
#[derive(Debug)]
pub struct ActionContext {
    pub client: BlockchainClient,
    pub signer: SignerProcess,
}

impl ActionContext {
    pub fn new(client: BlockchainClient, signer: SignerProcess) -> Self {
        Self { client, signer }
    }

    pub fn chain_id(&self) -> u64 {
        self.client.config().chain_id
    }

    /// Check the network, then fetch the signer's address and its pending nonce.
    async fn sender(&self) -> BlockchainResult<(Address, u64)> {
        self.client.verify_chain_id().await?;
        let from = self.signer.address().await?;
        let nonce = self.client.get_pending_nonce(from).await?;
        tracing::debug!(address = %from, nonce, "Resolved sender");
        Ok((from, nonce))
    }

    async fn sign_and_send(
        &self,
        tx: &PreparedTransaction,
        wait: bool,
    ) -> BlockchainResult<(SignedTransaction, SendResponse)> {
        let signed = self.signer.sign_raw(tx).await?;
        tracing::info!(tx_hash = %signed.hash, nonce = tx.nonce, "Transaction signed");
        let sent = self.signer.send_signed(&signed, wait).await?;
        Ok((signed, sent))
    }
}

/// Re-broadcast an already signed payload through the signer.
pub async fn broadcast(
    signer: &SignerProcess,
    signed_hex: &str,
    wait: bool,
) -> BlockchainResult<SendResponse> {
    let serialized = parse_signed_hex(signed_hex)?;
    let hash: TxHash = keccak256(&serialized);
    signer
        .send_signed(&SignedTransaction { serialized, hash }, wait)
        .await
}
