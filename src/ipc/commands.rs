//! Signer-side command handlers.
//!
//! Each handler corresponds to one `agent-signer` subcommand and returns the
//! message printed on stdout.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::Bytes;

use crate::blockchain::broadcast::Broadcaster;
use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::blockchain::wallet::Wallet;
use crate::ipc::coerce::parse_prepared_tx;
use crate::ipc::protocol::{ConfirmedResponse, SendResponse, SignResponse, SubmittedResponse};

/// Where `sign-raw` reads its transaction description from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxSource {
    Json(String),
    File(std::path::PathBuf),
}

impl TxSource {
    /// Read the raw JSON text.
    pub fn read(&self) -> BlockchainResult<String> {
        match self {
            TxSource::Json(text) => Ok(text.clone()),
            TxSource::File(path) => read_tx_file(path),
        }
    }
}

fn read_tx_file(path: &Path) -> BlockchainResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        BlockchainError::InvalidInput(format!("cannot read --tx-file {}: {}", path.display(), e))
    })
}

/// `address`: the checksummed address of the loaded key.
pub fn address(wallet: &Wallet) -> String {
    wallet.address().to_checksum(None)
}

/// `sign-raw`: coerce, validate and sign one transaction description.
pub fn sign_raw(wallet: &Wallet, source: &TxSource) -> BlockchainResult<SignResponse> {
    let tx = parse_prepared_tx(&source.read()?)?;
    let signed = wallet.sign_prepared(&tx)?;
    Ok(SignResponse::from(&signed))
}

/// Decode a `0x`-prefixed signed payload.
pub fn parse_signed_hex(raw: &str) -> BlockchainResult<Bytes> {
    let trimmed = raw.trim();
    if !trimmed.starts_with("0x") {
        return Err(BlockchainError::InvalidInput(
            "--signed-tx must be 0x-prefixed hex".to_string(),
        ));
    }
    let bytes = Bytes::from_str(trimmed)
        .map_err(|e| BlockchainError::InvalidInput(format!("--signed-tx is not valid hex: {}", e)))?;
    if bytes.is_empty() {
        return Err(BlockchainError::InvalidInput(
            "--signed-tx is empty".to_string(),
        ));
    }
    Ok(bytes)
}

/// `send-signed`: submit and, if `wait` is set, poll for the receipt.
pub async fn send_signed(
    broadcaster: &Broadcaster,
    signed_hex: &str,
    wait: Option<Duration>,
) -> BlockchainResult<SendResponse> {
    let payload = parse_signed_hex(signed_hex)?;
    let submission = broadcaster.submit(&payload).await?;

    match wait {
        None => Ok(SendResponse::Submitted(SubmittedResponse::from(submission))),
        Some(wait) => {
            let receipt = broadcaster.await_receipt(submission.hash, wait).await?;
            Ok(SendResponse::Confirmed(ConfirmedResponse::new(
                submission, &receipt,
            )))
        }
    }
}
