//! agent-signer
//!
//! The only process that ever holds the agent's private key.
//!
//! ```text
//!   agent-signer address
//!   agent-signer sign-raw --tx-json '<json>'
//!   agent-signer sign-raw --tx-file /path/to/tx.json
//!   agent-signer send-signed --signed-tx <0x...> [--wait] [--timeout-secs N]
//! ```
//!
//! Exactly one JSON document (or the bare address) is written to stdout.
//! Logs and errors go to stderr; failures exit with status 1.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::error::ErrorKind as ClapErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use serde::Serialize;

use agent_signer::blockchain::address::normalize_address;
use agent_signer::blockchain::{BlockchainClient, BlockchainError, BlockchainResult, Broadcaster, Wallet};
use agent_signer::config;
use agent_signer::ipc::commands;
use agent_signer::ipc::TxSource;
use agent_signer::observability::logging;

#[derive(Parser)]
#[command(name = "agent-signer")]
#[command(version, about = "Local transaction signer for agent wallets", long_about = None)]
struct Cli {
    /// TOML configuration file (defaults to $AGENT_SIGNER_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the checksummed address of the configured key
    Address,
    /// Sign a prepared transaction and print the serialized payload
    SignRaw(SignRawArgs),
    /// Submit a signed payload, optionally waiting for the receipt
    SendSigned {
        /// 0x-prefixed serialized transaction
        #[arg(long)]
        signed_tx: String,

        /// Wait for the receipt before returning
        #[arg(long)]
        wait: bool,

        /// Receipt wait limit in seconds (overrides the configured value)
        #[arg(long, requires = "wait")]
        timeout_secs: Option<u64>,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct SignRawArgs {
    /// Transaction description as inline JSON
    #[arg(long)]
    tx_json: Option<String>,

    /// Path to a file holding the transaction description
    #[arg(long)]
    tx_file: Option<PathBuf>,
}

impl SignRawArgs {
    fn source(self) -> TxSource {
        match (self.tx_json, self.tx_file) {
            (Some(json), _) => TxSource::Json(json),
            (None, Some(path)) => TxSource::File(path),
            (None, None) => TxSource::Json(String::new()),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return parse_failure(err),
    };

    let Some(command) = cli.command else {
        println!("{}", Cli::command().render_help());
        return ExitCode::SUCCESS;
    };

    match run(cli.config, command).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("agent-signer error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn parse_failure(err: clap::Error) -> ExitCode {
    match err.kind() {
        ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
            let _ = err.print();
            ExitCode::SUCCESS
        }
        _ => {
            eprint!("{}", err.render());
            println!("{}", Cli::command().render_usage());
            ExitCode::FAILURE
        }
    }
}

async fn run(config_path: Option<PathBuf>, command: Commands) -> BlockchainResult<String> {
    let config = config::load(config_path.as_deref())?;
    logging::init(&config.observability);

    let expected = config
        .expected_address
        .as_deref()
        .map(normalize_address)
        .transpose()?;
    let wallet = Wallet::from_env(config.rpc.chain_id, expected)?;

    match command {
        Commands::Address => Ok(commands::address(&wallet)),
        Commands::SignRaw(args) => {
            let response = commands::sign_raw(&wallet, &args.source())?;
            to_json(&response)
        }
        Commands::SendSigned {
            signed_tx,
            wait,
            timeout_secs,
        } => {
            let wait = if wait {
                let secs = timeout_secs.unwrap_or(config.confirmation.timeout_secs);
                if secs == 0 {
                    return Err(BlockchainError::InvalidInput(
                        "--timeout-secs must be positive".to_string(),
                    ));
                }
                Some(Duration::from_secs(secs))
            } else {
                None
            };

            let client = BlockchainClient::new(config.rpc.clone())?;
            let broadcaster = Broadcaster::from_config(client, &config.confirmation);
            let response = commands::send_signed(&broadcaster, &signed_tx, wait).await?;
            to_json(&response)
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> BlockchainResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| BlockchainError::Ipc(format!("cannot encode output: {}", e)))
}
