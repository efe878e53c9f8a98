//! Caller-side handle on the signer executable.
//!
//! The caller never sees the key. It spawns `agent-signer` with key-free
//! arguments, reads one JSON document from its stdout and checks what comes
//! back before trusting it.

use std::path::PathBuf;
use std::process::Stdio;
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::{keccak256, Address, Bytes};
use serde::de::DeserializeOwned;
use tokio::process::Command;
use tokio::time::timeout;

use crate::blockchain::address::normalize_address;
use crate::blockchain::transaction::{PreparedTransaction, SignedTransaction};
use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::ipc::protocol::{SendResponse, SignResponse, WireTransaction};

/// Environment variable naming the signer executable.
pub const SIGNER_BIN_ENV_VAR: &str = "AGENT_SIGNER_BIN";
/// Executable looked up on `PATH` when nothing else is configured.
pub const DEFAULT_SIGNER_BIN: &str = "agent-signer";

/// Spawns the signer for each operation.
#[derive(Debug, Clone)]
pub struct SignerProcess {
    program: PathBuf,
    deadline: Duration,
    env: Vec<(String, String)>,
}

impl SignerProcess {
    /// `deadline` bounds every invocation, including `send-signed --wait`.
    pub fn new(program: impl Into<PathBuf>, deadline: Duration) -> Self {
        Self {
            program: program.into(),
            deadline,
            env: Vec::new(),
        }
    }

    /// Set an environment variable for every child. Never use this for key material.
    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((name.into(), value.into()));
        self
    }

    /// Resolve the executable from `AGENT_SIGNER_BIN`, falling back to `agent-signer`.
    pub fn from_env(deadline: Duration) -> Self {
        let program = std::env::var(SIGNER_BIN_ENV_VAR)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SIGNER_BIN.to_string());
        Self::new(program, deadline)
    }

    /// Ask the signer for its address.
    pub async fn address(&self) -> BlockchainResult<Address> {
        let stdout = self.run(&["address".to_string()]).await?;
        normalize_address(stdout.trim())
    }

    /// Have the signer sign `tx`, then verify the returned hash against the payload.
    pub async fn sign_raw(&self, tx: &PreparedTransaction) -> BlockchainResult<SignedTransaction> {
        let json = serde_json::to_string(&WireTransaction::from(tx))
            .map_err(|e| BlockchainError::Ipc(format!("cannot encode transaction: {}", e)))?;
        let response: SignResponse = self
            .run_json(&["sign-raw".to_string(), "--tx-json".to_string(), json])
            .await?;

        let serialized = Bytes::from_str(&response.serialized_transaction).map_err(|e| {
            BlockchainError::Ipc(format!("signer returned invalid serialized transaction: {}", e))
        })?;
        let hash = keccak256(&serialized);
        if hash != response.hash {
            return Err(BlockchainError::Ipc(format!(
                "signer reported hash {} but payload hashes to {}",
                response.hash, hash
            )));
        }

        Ok(SignedTransaction { serialized, hash })
    }

    /// Have the signer submit a payload, optionally waiting for the receipt.
    pub async fn send_signed(
        &self,
        signed: &SignedTransaction,
        wait: bool,
    ) -> BlockchainResult<SendResponse> {
        let mut args = vec![
            "send-signed".to_string(),
            "--signed-tx".to_string(),
            signed.serialized_hex(),
        ];
        if wait {
            args.push("--wait".to_string());
        }
        self.run_json(&args).await
    }

    async fn run_json<T: DeserializeOwned>(&self, args: &[String]) -> BlockchainResult<T> {
        let stdout = self.run(args).await?;
        serde_json::from_str(&stdout)
            .map_err(|e| BlockchainError::Ipc(format!("unexpected signer output: {}", e)))
    }

    async fn run(&self, args: &[String]) -> BlockchainResult<String> {
        let command = args.first().map(String::as_str).unwrap_or_default();
        tracing::debug!(program = %self.program.display(), command, "Invoking signer");

        let child = Command::new(&self.program)
            .args(args)
            .envs(self.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                BlockchainError::Ipc(format!("cannot start {}: {}", self.program.display(), e))
            })?;

        let output = match timeout(self.deadline, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| BlockchainError::Ipc(e.to_string()))?,
            Err(_) => {
                return Err(BlockchainError::Ipc(format!(
                    "{} did not finish within {}s",
                    command,
                    self.deadline.as_secs()
                )))
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("no error output")
                .trim();
            return Err(BlockchainError::Ipc(format!(
                "{} exited with {}: {}",
                command, output.status, message
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|_| BlockchainError::Ipc("signer output is not UTF-8".to_string()))
    }
}
