//! Configuration loading from disk and the environment.

use std::fs;
use std::path::{Path, PathBuf};

use crate::blockchain::types::BlockchainError;
use crate::config::schema::SignerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the primary RPC URL.
pub const RPC_URL_ENV_VAR: &str = "MONAD_RPC_URL";
/// Environment variable holding the chain ID.
pub const CHAIN_ID_ENV_VAR: &str = "MONAD_CHAIN_ID";
/// Environment variable holding the expected signer address.
pub const EXPECTED_ADDRESS_ENV_VAR: &str = "AGENT_ADDRESS";
/// Environment variable pointing at an optional TOML config file.
pub const CONFIG_PATH_ENV_VAR: &str = "AGENT_SIGNER_CONFIG";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(toml::de::Error),
    Env(&'static str, String),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "cannot read {}: {}", path.display(), e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env(name, msg) => write!(f, "invalid {}: {}", name, msg),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for BlockchainError {
    fn from(e: ConfigError) -> Self {
        BlockchainError::Config(e.to_string())
    }
}

/// Parse a TOML config file without validating it.
pub fn load_config_file(path: &Path) -> Result<SignerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Layer environment values over a parsed config.
///
/// `lookup` abstracts `std::env::var` so tests do not touch the process
/// environment. Blank values count as unset.
pub fn apply_env_overrides<F>(config: &mut SignerConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| {
        lookup(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    if let Some(url) = get(RPC_URL_ENV_VAR) {
        config.rpc.url = url;
    }
    if let Some(raw) = get(CHAIN_ID_ENV_VAR) {
        config.rpc.chain_id = raw
            .parse()
            .map_err(|_| ConfigError::Env(CHAIN_ID_ENV_VAR, format!("'{}' is not an integer", raw)))?;
    }
    if let Some(address) = get(EXPECTED_ADDRESS_ENV_VAR) {
        config.expected_address = Some(address);
    }
    Ok(())
}

/// Load configuration: defaults, then the optional file, then the process environment.
///
/// The returned config has passed validation.
pub fn load(path: Option<&Path>) -> Result<SignerConfig, ConfigError> {
    load_with(path, |_| {})
}

/// Like [`load`], with command-line overrides applied after the environment
/// and before validation.
pub fn load_with<F>(path: Option<&Path>, overrides: F) -> Result<SignerConfig, ConfigError>
where
    F: FnOnce(&mut SignerConfig),
{
    let env_path = std::env::var(CONFIG_PATH_ENV_VAR)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let mut config = match path.map(Path::to_path_buf).or(env_path) {
        Some(p) => load_config_file(&p)?,
        None => SignerConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
