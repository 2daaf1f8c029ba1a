use std::path::PathBuf;

use alloy::primitives::{Address, B256};
use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use txlens::config::{self, Config, DEFAULT_RPC};
use txlens::domain::abi::AbiDecoder;
use txlens::infrastructure::ethereum::types::{parse_address, parse_b256};
use txlens::infrastructure::ethereum::{create_provider, ProviderConfig};
use txlens::infrastructure::{AbiLoader, AlloyAbiDecoder};
use txlens::report::{self, Report};

#[derive(Debug, Parser)]
#[command(
    name = "txlens",
    version,
    about = "txlens: fetch an Ethereum transaction and decode it against a local ABI"
)]
struct Args {
    /// HTTP JSON-RPC endpoint (e.g. http://localhost:8545)
    #[arg(long)]
    rpc: Option<String>,

    /// WebSocket endpoint (e.g. ws://localhost:8546)
    #[arg(long)]
    ws: Option<String>,

    /// IPC path (e.g. ~/.ethereum/geth.ipc). Unix only.
    #[arg(long)]
    ipc: Option<PathBuf>,

    /// JSON ABI (bare array or build artifact) used for decoding [default: bundled BAYC ABI]
    #[arg(long)]
    abi: Option<String>,

    /// Account to report the balance of
    #[arg(long)]
    account: Option<String>,

    /// Transaction hash to inspect
    #[arg(long)]
    tx: Option<String>,

    /// Config file (defaults to $TXLENS_CONFIG or ~/.config/txlens/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let config = match &args.config {
        Some(path) => config::load_from(path)?,
        None => config::load()?,
    };

    let endpoint = endpoint_from_args_and_config(&args, &config)?;
    let account = parse_address(args.account.as_deref().unwrap_or(config.account()))
        .context("Invalid account address")?;
    let tx_hash =
        parse_b256(args.tx.as_deref().unwrap_or(config.tx())).context("Invalid transaction hash")?;
    let abi_path = args
        .abi
        .as_deref()
        .and_then(config::expand_path)
        .or_else(|| config.abi_path());

    let report = inspect(endpoint, account, tx_hash, abi_path).await?;

    if args.json {
        println!("{}", report::render_json(&report)?);
    } else {
        print!("{}", report::render_text(&report));
    }

    Ok(())
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")
}

/// Run the fetch-and-decode sequence against one node
#[tracing::instrument(level = "info", skip_all, fields(endpoint = %endpoint.display(), tx = %tx_hash))]
async fn inspect(
    endpoint: ProviderConfig,
    account: Address,
    tx_hash: B256,
    abi_path: Option<PathBuf>,
) -> Result<Report> {
    let provider = create_provider(endpoint).await?;
    let endpoint_name = provider.endpoint_name();

    let balance = provider
        .get_balance(account)
        .await
        .with_context(|| format!("Failed to fetch balance from {endpoint_name}"))?;
    tracing::debug!(%account, %balance, "Balance fetched");

    let block = provider
        .latest_block()
        .await
        .context("Failed to fetch latest block")?;
    tracing::debug!(number = block.number, "Latest block fetched");

    let mut transaction = provider
        .get_transaction(tx_hash)
        .await
        .context("Failed to fetch transaction")?
        .with_context(|| format!("Transaction {tx_hash} not found"))?;
    if transaction.chain_id.is_none() {
        // Legacy pre-EIP-155 transactions carry no chain id
        transaction.chain_id = Some(provider.chain_id().await.context("Failed to fetch chain id")?);
    }

    let registry = match &abi_path {
        Some(path) => AbiLoader::load(path)?,
        None => AbiLoader::bundled()?,
    };
    let decoder = AlloyAbiDecoder::new(registry);

    let call = decoder
        .decode_calldata(&transaction.input)
        .context("Failed to decode transaction input")?;
    tracing::info!(method = %call.method_name, "Calldata decoded");

    let receipt = provider
        .get_receipt(tx_hash)
        .await
        .context("Failed to fetch receipt")?
        .with_context(|| format!("Receipt for {tx_hash} not found"))?;

    let logs = decoder
        .decode_logs(&receipt.logs)
        .context("Failed to decode transaction logs")?;
    tracing::info!(count = logs.len(), "Logs decoded");

    Ok(Report {
        account,
        balance,
        block,
        transaction,
        call,
        receipt,
        logs,
    })
}

/// Pick the node to dial: CLI flags first (ipc, ws, rpc), then the config file
fn endpoint_from_args_and_config(args: &Args, config: &Config) -> Result<ProviderConfig> {
    let non_empty = |value: Option<&str>| value.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);

    if let Some(ipc) = args.ipc.clone() {
        return ipc_endpoint(ipc);
    }
    if let Some(ws) = non_empty(args.ws.as_deref()) {
        return Ok(ProviderConfig::WebSocket(ws));
    }
    if let Some(rpc) = non_empty(args.rpc.as_deref()) {
        return Ok(ProviderConfig::Http(normalize_http_endpoint(&rpc)));
    }

    if let Some(ipc) = config.ipc_path() {
        return ipc_endpoint(ipc);
    }
    if let Some(ws) = non_empty(config.ws.as_deref()) {
        return Ok(ProviderConfig::WebSocket(ws));
    }
    if let Some(rpc) = non_empty(config.rpc.as_deref()) {
        return Ok(ProviderConfig::Http(normalize_http_endpoint(&rpc)));
    }

    Ok(ProviderConfig::Http(DEFAULT_RPC.to_string()))
}

#[cfg(unix)]
fn ipc_endpoint(path: PathBuf) -> Result<ProviderConfig> {
    Ok(ProviderConfig::Ipc(path))
}

#[cfg(not(unix))]
fn ipc_endpoint(_path: PathBuf) -> Result<ProviderConfig> {
    Err(anyhow::anyhow!("IPC is not supported on this platform"))
}

fn normalize_http_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}
