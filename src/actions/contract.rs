//! Contract writes (signed) and reads (eth_call).

use alloy::primitives::{Address, TxHash, U256};
use serde::Serialize;
use serde_json::Value;

use crate::abi::{self, AbiSource};
use crate::actions::fees::FeeArgs;
use crate::actions::ActionContext;
use crate::blockchain::address::serialize_checksummed;
use crate::blockchain::client::BlockchainClient;
use crate::blockchain::gas::GasPolicy;
use crate::blockchain::transaction::PreparedTransaction;
use crate::blockchain::types::BlockchainResult;
use crate::ipc::protocol::SendResponse;

#[derive(Debug, Clone)]
pub struct ContractWrite {
    pub to: Address,
    pub abi: AbiSource,
    pub function: String,
    pub args: Vec<Value>,
    pub value: U256,
    /// Explicit limit; skips estimation when set.
    pub gas: Option<u64>,
    pub gas_policy: GasPolicy,
    pub fees: FeeArgs,
    pub wait: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteOutcome {
    #[serde(serialize_with = "serialize_checksummed")]
    pub from: Address,
    #[serde(serialize_with = "serialize_checksummed")]
    pub to: Address,
    pub function_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_gas: Option<String>,
    pub gas_limit: String,
    pub sign_hash: TxHash,
    #[serde(flatten)]
    pub sent: SendResponse,
}

pub async fn write_contract(
    ctx: &ActionContext,
    request: ContractWrite,
) -> BlockchainResult<WriteOutcome> {
    let function = abi::resolve_function(&request.abi, &request.function, request.args.len())?;
    let data = abi::encode_call(&function, &request.args)?;

    let (from, nonce) = ctx.sender().await?;
    let (estimated, gas) = request
        .gas_policy
        .resolve(request.gas, || {
            ctx.client
                .estimate_gas(from, request.to, data.clone(), request.value)
        })
        .await?;

    let mut tx = PreparedTransaction::new(request.to, U256::from(gas), nonce, ctx.chain_id());
    tx.data = data;
    tx.value = request.value;
    request
        .fees
        .complete(&mut tx, || ctx.client.get_gas_price())
        .await?;

    let (signed, sent) = ctx.sign_and_send(&tx, request.wait).await?;

    Ok(WriteOutcome {
        from,
        to: request.to,
        function_name: request.function,
        estimated_gas: estimated.map(|e| e.to_string()),
        gas_limit: gas.to_string(),
        sign_hash: signed.hash,
        sent,
    })
}

#[derive(Debug, Clone)]
pub struct ContractRead {
    pub to: Address,
    pub abi: AbiSource,
    pub function: String,
    pub args: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadOutcome {
    pub status: &'static str,
    pub chain_id: u64,
    #[serde(serialize_with = "serialize_checksummed")]
    pub to: Address,
    pub function_name: String,
    pub result: Value,
}

/// Read-only call; needs no signer.
pub async fn read_contract(
    client: &BlockchainClient,
    request: ContractRead,
) -> BlockchainResult<ReadOutcome> {
    let function = abi::resolve_function(&request.abi, &request.function, request.args.len())?;
    let calldata = abi::encode_call(&function, &request.args)?;
    let raw = client.call(request.to, calldata).await?;
    let result = abi::decode_output(&function, &raw)?;

    Ok(ReadOutcome {
        status: "ok",
        chain_id: client.config().chain_id,
        to: request.to,
        function_name: request.function,
        result,
    })
}
