//! Native currency transfers.

use alloy::primitives::{Address, TxHash, U256};
use serde::Serialize;

use crate::actions::fees::FeeArgs;
use crate::actions::ActionContext;
use crate::blockchain::address::serialize_checksummed;
use crate::blockchain::transaction::PreparedTransaction;
use crate::blockchain::types::BlockchainResult;
use crate::ipc::protocol::SendResponse;

/// Gas limit of a plain value transfer.
pub const NATIVE_TRANSFER_GAS: u64 = 21_000;

#[derive(Debug, Clone)]
pub struct NativeTransfer {
    pub to: Address,
    pub value: U256,
    /// Defaults to [`NATIVE_TRANSFER_GAS`].
    pub gas: Option<u64>,
    pub fees: FeeArgs,
    pub wait: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOutcome {
    #[serde(serialize_with = "serialize_checksummed")]
    pub from: Address,
    #[serde(serialize_with = "serialize_checksummed")]
    pub to: Address,
    pub value: String,
    pub gas_limit: String,
    pub sign_hash: TxHash,
    #[serde(flatten)]
    pub sent: SendResponse,
}

pub async fn send_native(
    ctx: &ActionContext,
    request: NativeTransfer,
) -> BlockchainResult<TransferOutcome> {
    let (from, nonce) = ctx.sender().await?;
    let gas = request.gas.unwrap_or(NATIVE_TRANSFER_GAS);

    let mut tx = PreparedTransaction::new(request.to, U256::from(gas), nonce, ctx.chain_id());
    tx.value = request.value;
    request
        .fees
        .complete(&mut tx, || ctx.client.get_gas_price())
        .await?;

    let (signed, sent) = ctx.sign_and_send(&tx, request.wait).await?;

    Ok(TransferOutcome {
        from,
        to: request.to,
        value: request.value.to_string(),
        gas_limit: gas.to_string(),
        sign_hash: signed.hash,
        sent,
    })
}
