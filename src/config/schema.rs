//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the signer
//! and its callers. All types derive Serde traits for deserialization from
//! config files. The private key is deliberately absent: it is read by the
//! wallet inside the signer process and nowhere else.

use serde::{Deserialize, Serialize};

/// Chain identifier used when neither the config file nor the environment names one.
pub const DEFAULT_CHAIN_ID: u64 = 143;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SignerConfig {
    /// Network endpoint settings.
    pub rpc: RpcConfig,

    /// Receipt polling settings.
    pub confirmation: ConfirmationConfig,

    /// Gas estimation policy.
    pub gas: GasConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,

    /// Address the loaded key must derive to (safety check).
    pub expected_address: Option<String>,
}

/// JSON-RPC endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Primary JSON-RPC endpoint URL. Submissions only ever go here.
    pub url: String,

    /// Endpoints tried in order when a read against the primary fails.
    pub fallback_urls: Vec<String>,

    /// Chain ID embedded in every signature.
    pub chain_id: u64,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            fallback_urls: Vec::new(),
            chain_id: DEFAULT_CHAIN_ID,
            timeout_secs: 10,
        }
    }
}

/// Receipt wait configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Upper bound on a `--wait`, in seconds.
    pub timeout_secs: u64,

    /// Delay between receipt polls in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            poll_interval_ms: 2000,
        }
    }
}

/// Gas limit estimation policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GasConfig {
    /// Safety margin added on top of the network estimate (20 = +20%).
    pub buffer_percent: i64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self { buffer_percent: 20 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit log lines as JSON objects.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}
