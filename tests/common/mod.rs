//! Shared utilities for integration tests: a scriptable JSON-RPC node.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use agent_signer::config::RpcConfig;
use alloy::primitives::{hex, keccak256};
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const TEST_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
pub const RECIPIENT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
pub const CHAIN_ID: u64 = 143;

/// How the mock node behaves.
#[derive(Debug, Clone)]
pub struct MockBehavior {
    pub chain_id: u64,
    pub gas_price: u64,
    pub nonce: u64,
    pub gas_estimate: u64,
    /// Hex returned by `eth_call`.
    pub call_result: String,
    /// Receipt appears on this poll (1-based); `None` means never.
    pub receipt_on_poll: Option<u32>,
    pub receipt_success: bool,
    pub reject_submission: bool,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            chain_id: CHAIN_ID,
            gas_price: 1_000_000_000,
            nonce: 5,
            gas_estimate: 50_000,
            call_result: "0x".to_string(),
            receipt_on_poll: Some(1),
            receipt_success: true,
            reject_submission: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct MockState {
    pub behavior: MockBehavior,
    pub receipt_polls: AtomicU32,
    pub submissions: Mutex<Vec<String>>,
    pub methods: Mutex<Vec<String>>,
}

impl MockState {
    pub fn submissions(&self) -> Vec<String> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: &str) -> usize {
        self.methods
            .lock()
            .unwrap()
            .iter()
            .filter(|m| *m == method)
            .count()
    }
}

pub struct MockNode {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
}

impl MockNode {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn rpc_config(&self) -> RpcConfig {
        RpcConfig {
            url: self.url(),
            timeout_secs: 5,
            ..RpcConfig::default()
        }
    }
}

/// Start a mock node on an ephemeral port.
pub async fn start_mock_node(behavior: MockBehavior) -> MockNode {
    let state = Arc::new(MockState {
        behavior,
        ..MockState::default()
    });
    let app = Router::new()
        .route("/", post(handle_rpc))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockNode { addr, state }
}

async fn handle_rpc(State(state): State<Arc<MockState>>, Json(request): Json<Value>) -> Json<Value> {
    let id = request["id"].clone();
    let method = request["method"].as_str().unwrap_or_default().to_string();
    let params = request["params"].clone();
    state.methods.lock().unwrap().push(method.clone());

    let b = &state.behavior;
    let result = match method.as_str() {
        "eth_chainId" => json!(format!("{:#x}", b.chain_id)),
        "eth_gasPrice" => json!(format!("{:#x}", b.gas_price)),
        "eth_getTransactionCount" => json!(format!("{:#x}", b.nonce)),
        "eth_estimateGas" => json!(format!("{:#x}", b.gas_estimate)),
        "eth_call" => json!(b.call_result),
        "eth_sendRawTransaction" => {
            if b.reject_submission {
                return rpc_error(id, -32000, "nonce too low");
            }
            let raw = params[0].as_str().unwrap_or_default().to_string();
            let bytes = hex::decode(&raw).unwrap_or_default();
            state.submissions.lock().unwrap().push(raw);
            json!(keccak256(&bytes))
        }
        "eth_getTransactionReceipt" => {
            let poll = state.receipt_polls.fetch_add(1, Ordering::SeqCst) + 1;
            match b.receipt_on_poll {
                Some(n) if poll >= n => receipt_json(&params[0], b.receipt_success),
                _ => Value::Null,
            }
        }
        _ => return rpc_error(id, -32601, "method not found"),
    };

    Json(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
}

fn rpc_error(id: Value, code: i64, message: &str) -> Json<Value> {
    Json(json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message }
    }))
}

fn receipt_json(hash: &Value, success: bool) -> Value {
    json!({
        "transactionHash": hash,
        "transactionIndex": "0x0",
        "blockHash": format!("0x{}", "11".repeat(32)),
        "blockNumber": "0x2a",
        "from": TEST_ADDRESS,
        "to": RECIPIENT,
        "cumulativeGasUsed": "0x5208",
        "gasUsed": "0x5208",
        "effectiveGasPrice": "0x3b9aca00",
        "contractAddress": null,
        "logs": [],
        "logsBloom": format!("0x{}", "00".repeat(256)),
        "type": "0x0",
        "status": if success { "0x1" } else { "0x0" }
    })
}

/// Write a signer config file pointing at `rpc_url` with fast polling.
pub fn write_config(name: &str, rpc_url: &str, confirmation_timeout_secs: u64) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "agent-signer-{}-{}.toml",
        name,
        std::process::id()
    ));
    std::fs::write(
        &path,
        format!(
            r#"
[rpc]
url = "{}"
chain_id = {}
timeout_secs = 5

[confirmation]
timeout_secs = {}
poll_interval_ms = 50

[observability]
log_level = "warn"
"#,
            rpc_url, CHAIN_ID, confirmation_timeout_secs
        ),
    )
    .unwrap();
    path
}
