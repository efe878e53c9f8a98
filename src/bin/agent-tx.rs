use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use agent_signer::abi::{self, AbiSource};
use agent_signer::actions::{self, ActionContext, ContractRead, ContractWrite, FeeArgs, NativeTransfer};
use agent_signer::actions::fees::parse_wei_flag;
use agent_signer::blockchain::address::normalize_address;
use agent_signer::blockchain::{BlockchainClient, BlockchainError, BlockchainResult, GasPolicy, TxType};
use agent_signer::config::{self, SignerConfig};
use agent_signer::ipc::SignerProcess;
use agent_signer::observability::logging;

#[derive(Parser)]
#[command(name = "agent-tx")]
#[command(about = "Build, sign and broadcast agent transactions", long_about = None)]
struct Cli {
    /// TOML configuration file (defaults to $AGENT_SIGNER_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint (overrides MONAD_RPC_URL)
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Chain ID (overrides MONAD_CHAIN_ID)
    #[arg(long, global = true)]
    chain_id: Option<u64>,

    /// Signer executable (overrides AGENT_SIGNER_BIN)
    #[arg(long, global = true)]
    signer_bin: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transfer native currency
    SendNative {
        #[arg(long)]
        to: String,
        #[command(flatten)]
        value: ValueArgs,
        /// Gas limit (default 21000)
        #[arg(long)]
        gas: Option<u64>,
        #[command(flatten)]
        fees: FeeFlags,
        #[arg(long)]
        wait: bool,
    },
    /// Call a state-changing contract function
    WriteContract {
        #[arg(long)]
        to: String,
        /// Pure JSON ABI file
        #[arg(long)]
        abi_file: PathBuf,
        #[arg(long)]
        function: String,
        /// Arguments as a JSON array
        #[arg(long)]
        args_json: Option<String>,
        #[command(flatten)]
        value: ValueArgs,
        /// Explicit gas limit; skips estimation
        #[arg(long)]
        gas: Option<u64>,
        /// Margin added to the estimate (defaults to the configured value)
        #[arg(long, allow_hyphen_values = true)]
        gas_buffer_percent: Option<i64>,
        #[command(flatten)]
        fees: FeeFlags,
        #[arg(long)]
        wait: bool,
    },
    /// Call a view function and decode the result
    ReadContract {
        #[arg(long)]
        to: String,
        #[arg(long)]
        function: String,
        #[arg(long)]
        args_json: Option<String>,
        #[command(flatten)]
        abi: AbiArgs,
    },
    /// Submit an already signed payload
    Broadcast {
        #[arg(long)]
        signed_tx: String,
        #[arg(long)]
        wait: bool,
    },
}

#[derive(Args)]
struct ValueArgs {
    /// Value in wei
    #[arg(long, conflicts_with = "value_eth")]
    value_wei: Option<String>,
    /// Value in ether (decimal)
    #[arg(long)]
    value_eth: Option<String>,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct AbiArgs {
    #[arg(long)]
    abi_file: Option<PathBuf>,
    #[arg(long)]
    abi_json: Option<String>,
    /// Human-readable function signature
    #[arg(long)]
    signature: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FeeType {
    Legacy,
    Eip1559,
}

#[derive(Args)]
struct FeeFlags {
    #[arg(long = "type", value_enum, default_value = "legacy")]
    tx_type: FeeType,
    #[arg(long)]
    gas_price_wei: Option<String>,
    #[arg(long)]
    max_fee_per_gas_wei: Option<String>,
    #[arg(long)]
    max_priority_fee_per_gas_wei: Option<String>,
}

impl FeeFlags {
    fn into_fee_args(self) -> BlockchainResult<FeeArgs> {
        Ok(FeeArgs {
            tx_type: match self.tx_type {
                FeeType::Legacy => TxType::Legacy,
                FeeType::Eip1559 => TxType::Eip1559,
            },
            gas_price: parse_wei_flag("--gas-price-wei", self.gas_price_wei.as_deref())?,
            max_fee_per_gas: parse_wei_flag(
                "--max-fee-per-gas-wei",
                self.max_fee_per_gas_wei.as_deref(),
            )?,
            max_priority_fee_per_gas: parse_wei_flag(
                "--max-priority-fee-per-gas-wei",
                self.max_priority_fee_per_gas_wei.as_deref(),
            )?,
        })
    }
}

impl ValueArgs {
    fn parse(&self) -> BlockchainResult<alloy::primitives::U256> {
        actions::parse_value(self.value_wei.as_deref(), self.value_eth.as_deref())
    }
}

impl AbiArgs {
    fn source(self) -> AbiSource {
        match (self.abi_file, self.abi_json, self.signature) {
            (Some(path), _, _) => AbiSource::File(path),
            (None, Some(json), _) => AbiSource::Json(json),
            (None, None, Some(sig)) => AbiSource::Signature(sig),
            (None, None, None) => AbiSource::Json(String::new()),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("agent-tx error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> BlockchainResult<String> {
    let rpc_url = cli.rpc_url;
    let chain_id = cli.chain_id;
    let config = config::load_with(cli.config.as_deref(), |c| {
        if let Some(url) = rpc_url {
            c.rpc.url = url;
        }
        if let Some(id) = chain_id {
            c.rpc.chain_id = id;
        }
    })?;
    logging::init(&config.observability);

    let client = BlockchainClient::new(config.rpc.clone())?;
    let deadline = signer_deadline(&config);
    let mut signer = match cli.signer_bin {
        Some(path) => SignerProcess::new(path, deadline),
        None => SignerProcess::from_env(deadline),
    }
    // The signer submits to the endpoint this process resolved.
    .with_env("MONAD_RPC_URL", config.rpc.url.clone())
    .with_env("MONAD_CHAIN_ID", config.rpc.chain_id.to_string());
    if let Some(path) = &cli.config {
        signer = signer.with_env("AGENT_SIGNER_CONFIG", path.display().to_string());
    }

    match cli.command {
        Commands::SendNative {
            to,
            value,
            gas,
            fees,
            wait,
        } => {
            let request = NativeTransfer {
                to: normalize_address(&to)?,
                value: value.parse()?,
                gas,
                fees: fees.into_fee_args()?,
                wait,
            };
            let ctx = ActionContext::new(client, signer);
            to_json(&actions::send_native(&ctx, request).await?)
        }
        Commands::WriteContract {
            to,
            abi_file,
            function,
            args_json,
            value,
            gas,
            gas_buffer_percent,
            fees,
            wait,
        } => {
            let request = ContractWrite {
                to: normalize_address(&to)?,
                abi: AbiSource::File(abi_file),
                function,
                args: abi::parse_args_json(args_json.as_deref())?,
                value: value.parse()?,
                gas,
                gas_policy: GasPolicy::new(
                    gas_buffer_percent.unwrap_or(config.gas.buffer_percent),
                )?,
                fees: fees.into_fee_args()?,
                wait,
            };
            let ctx = ActionContext::new(client, signer);
            to_json(&actions::write_contract(&ctx, request).await?)
        }
        Commands::ReadContract {
            to,
            function,
            args_json,
            abi,
        } => {
            let request = ContractRead {
                to: normalize_address(&to)?,
                abi: abi.source(),
                function,
                args: abi::parse_args_json(args_json.as_deref())?,
            };
            to_json(&actions::read_contract(&client, request).await?)
        }
        Commands::Broadcast { signed_tx, wait } => {
            to_json(&actions::broadcast(&signer, &signed_tx, wait).await?)
        }
    }
}

/// Bound on one signer invocation: a receipt wait plus a few RPC round trips.
fn signer_deadline(config: &SignerConfig) -> Duration {
    Duration::from_secs(config.confirmation.timeout_secs + 3 * config.rpc.timeout_secs)
}

fn to_json<T: Serialize>(value: &T) -> BlockchainResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| BlockchainError::InvalidInput(format!("cannot encode output: {}", e)))
}
