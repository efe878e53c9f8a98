//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, chain id > 0)
//! - Check that endpoint URLs and the expected address are well-formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SignerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use url::Url;

use crate::blockchain::address::normalize_address;
use crate::config::schema::SignerConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a fully merged configuration.
pub fn validate_config(config: &SignerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.rpc.url.trim().is_empty() {
        errors.push(ValidationError::new(
            "rpc.url",
            "missing RPC URL (set MONAD_RPC_URL)",
        ));
    } else if let Err(message) = check_http_url(&config.rpc.url) {
        errors.push(ValidationError::new("rpc.url", message));
    }

    for url in &config.rpc.fallback_urls {
        if let Err(message) = check_http_url(url) {
            errors.push(ValidationError::new("rpc.fallback_urls", message));
        }
    }

    if config.rpc.chain_id == 0 {
        errors.push(ValidationError::new("rpc.chain_id", "must be positive"));
    }
    if config.rpc.timeout_secs == 0 {
        errors.push(ValidationError::new("rpc.timeout_secs", "must be positive"));
    }
    if config.confirmation.timeout_secs == 0 {
        errors.push(ValidationError::new(
            "confirmation.timeout_secs",
            "must be positive",
        ));
    }
    if config.confirmation.poll_interval_ms == 0 {
        errors.push(ValidationError::new(
            "confirmation.poll_interval_ms",
            "must be positive",
        ));
    }
    if config.gas.buffer_percent < 0 {
        errors.push(ValidationError::new("gas.buffer_percent", "must be >= 0"));
    }

    if let Some(expected) = &config.expected_address {
        if let Err(e) = normalize_address(expected) {
            errors.push(ValidationError::new("expected_address", e.to_string()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_http_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| format!("invalid URL '{}': {}", raw, e))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme '{}' in '{}'", other, raw)),
    }
}
