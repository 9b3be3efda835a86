//! chainnonce CLI — build, send and reconcile batched nonce queries.
//!
//! # Commands
//! ```text
//! chainnonce requests  --block latest <ADDR>...
//! chainnonce reconcile --block latest --responses resp.json <ADDR>...
//! chainnonce fetch     --url <URL> --block latest <ADDR>...
//! ```
//!
//! Addresses are numbered `1..=n` in argument order; those numbers are the
//! JSON-RPC ids of the batch.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use chainnonce_core::{
    build_nonce_requests, number_queries, reconcile_nonces, BatchCaller, BatchConfig, BlockRef,
    GetTransactionCount, NonceParams,
};
use chainnonce_http::{parse_batch_body, HttpClientConfig, HttpRpcClient};
use serde_json::Value;

mod logging;
mod report;

use logging::{init_tracing, LogConfig};
use report::Report;

#[derive(Parser)]
#[command(
    name = "chainnonce",
    about = "Batch eth_getTransactionCount queries — ChainNonce CLI",
    version
)]
struct Cli {
    /// Default log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the JSON-RPC batch for the given addresses
    Requests {
        /// Block reference: latest, pending, safe, finalized, earliest, 0x-quantity or decimal
        #[arg(short, long, default_value = "latest")]
        block: BlockRef,
        /// Account addresses
        #[arg(required = true)]
        addresses: Vec<String>,
    },

    /// Classify a saved batch response against the given addresses
    Reconcile {
        #[arg(short, long, default_value = "latest")]
        block: BlockRef,
        /// File containing the JSON response array
        #[arg(short, long)]
        responses: PathBuf,
        #[arg(required = true)]
        addresses: Vec<String>,
    },

    /// Query a node for the nonces of the given addresses
    Fetch {
        /// JSON-RPC endpoint
        #[arg(short, long, env = "CHAINNONCE_RPC_URL")]
        url: String,
        #[arg(short, long, default_value = "latest")]
        block: BlockRef,
        /// Max requests per HTTP batch (0 = unlimited)
        #[arg(long, default_value_t = 100)]
        max_batch_size: usize,
        /// HTTP request timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
        #[arg(required = true)]
        addresses: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&LogConfig {
        level: cli.log_level.clone(),
        json: cli.json_logs,
    });

    match cli.command {
        Commands::Requests { block, addresses } => cmd_requests(block, addresses),
        Commands::Reconcile {
            block,
            responses,
            addresses,
        } => cmd_reconcile(block, &responses, addresses),
        Commands::Fetch {
            url,
            block,
            max_batch_size,
            timeout_secs,
            addresses,
        } => cmd_fetch(&url, block, max_batch_size, timeout_secs, addresses).await,
    }
}

fn queries(block: BlockRef, addresses: Vec<String>) -> Vec<NonceParams> {
    addresses
        .into_iter()
        .map(|address| NonceParams::new(address, block))
        .collect()
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_requests(block: BlockRef, addresses: Vec<String>) -> Result<()> {
    let id_to_params = number_queries(queries(block, addresses));
    print_json(&build_nonce_requests(&id_to_params))
}

fn cmd_reconcile(block: BlockRef, path: &Path, addresses: Vec<String>) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let body: Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let report = reconcile_body(block, body, addresses)
        .with_context(|| format!("{} is not a JSON-RPC response array", path.display()))?;
    print_json(&report)
}

/// Classify a saved batch body entry by entry, the same way a live batch is.
fn reconcile_body(block: BlockRef, body: Value, addresses: Vec<String>) -> Result<Report> {
    let responses = parse_batch_body(body)?;
    let id_to_params = number_queries(queries(block, addresses));
    let batch = reconcile_nonces(responses, &id_to_params);
    Ok(Report::new(batch, &id_to_params))
}

async fn cmd_fetch(
    url: &str,
    block: BlockRef,
    max_batch_size: usize,
    timeout_secs: u64,
    addresses: Vec<String>,
) -> Result<()> {
    let client = HttpRpcClient::new(
        url,
        HttpClientConfig {
            request_timeout: Duration::from_secs(timeout_secs),
        },
    )?;
    let caller = BatchCaller::new(
        Arc::new(client),
        BatchConfig::default().max_batch_size(max_batch_size),
    );

    let id_to_params = number_queries(queries(block, addresses));
    let batch = caller
        .call::<GetTransactionCount>(&id_to_params)
        .await
        .with_context(|| format!("batch to {url} failed"))?;

    print_json(&Report::new(batch, &id_to_params))
}
