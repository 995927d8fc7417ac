//! CLI argument definitions for txbench.

use std::{path::PathBuf, time::Duration};

use clap::{ArgAction, Parser};
use url::Url;

use crate::{WorkloadKind, logging::LogFormat};

/// txbench - transaction throughput benchmarking for Ethereum JSON-RPC endpoints.
#[derive(Debug, Clone, Parser)]
#[command(name = "txbench")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Benchmark configuration arguments.
    #[command(flatten)]
    pub bench: BenchArgs,

    /// Logging configuration arguments.
    #[command(flatten)]
    pub logging: LogArgs,
}

/// Benchmark run arguments.
#[derive(Debug, Clone, Parser)]
#[command(next_help_heading = "Benchmark")]
pub struct BenchArgs {
    /// URL of the JSON-RPC endpoint under test.
    #[arg(long = "rpc-url", env = "TXBENCH_RPC_URL", value_parser = parse_url)]
    pub rpc_url: Url,

    /// Mnemonic the admin account and sub-accounts are derived from.
    #[arg(long = "mnemonic", env = "TXBENCH_MNEMONIC", hide_env_values = true)]
    pub mnemonic: String,

    /// Kind of transactions to send.
    #[arg(long = "workload", env = "TXBENCH_WORKLOAD", default_value = "eoa", ignore_case = true)]
    pub workload: WorkloadKind,

    /// Number of sub-accounts that send transactions.
    #[arg(long = "sub-accounts", env = "TXBENCH_SUB_ACCOUNTS", default_value = "10")]
    pub sub_accounts: u32,

    /// Total number of transactions to send.
    #[arg(long = "transactions", env = "TXBENCH_TRANSACTIONS", default_value = "60")]
    pub transactions: u64,

    /// Number of transactions per JSON-RPC batch request.
    #[arg(long = "batch-size", env = "TXBENCH_BATCH_SIZE", default_value = "20")]
    pub batch_size: usize,

    /// How long to wait for each benchmark transaction to be mined (e.g., "60s").
    #[arg(
        long = "receipt-timeout",
        env = "TXBENCH_RECEIPT_TIMEOUT",
        default_value = "60s",
        value_parser = parse_duration
    )]
    pub receipt_timeout: Duration,

    /// How long to wait for funding and deployment transactions (e.g., "2m").
    #[arg(
        long = "funding-timeout",
        env = "TXBENCH_FUNDING_TIMEOUT",
        default_value = "120s",
        value_parser = parse_duration
    )]
    pub funding_timeout: Duration,

    /// RPC request timeout (e.g., "30s").
    #[arg(
        long = "rpc-timeout",
        env = "TXBENCH_RPC_TIMEOUT",
        default_value = "30s",
        value_parser = parse_duration
    )]
    pub rpc_timeout: Duration,

    /// Maximum number of concurrent receipt and block requests.
    #[arg(long = "max-concurrency", env = "TXBENCH_MAX_CONCURRENCY", default_value = "64")]
    pub max_concurrency: usize,

    /// Compiled ERC20 contract artifact (Foundry or Hardhat JSON).
    #[arg(long = "erc20-artifact", env = "TXBENCH_ERC20_ARTIFACT")]
    pub erc20_artifact: Option<PathBuf>,

    /// Compiled ERC721 contract artifact (Foundry or Hardhat JSON).
    #[arg(long = "erc721-artifact", env = "TXBENCH_ERC721_ARTIFACT")]
    pub erc721_artifact: Option<PathBuf>,
}

/// Logging configuration arguments.
#[derive(Debug, Clone, Parser)]
#[command(next_help_heading = "Logging")]
pub struct LogArgs {
    /// Increase logging verbosity (1=ERROR, 2=WARN, 3=INFO, 4=DEBUG, 5=TRACE).
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        default_value = "3",
        env = "TXBENCH_LOG_LEVEL",
        global = true
    )]
    pub level: u8,

    /// Suppress stdout logging.
    #[arg(long = "quiet", short = 'q', global = true)]
    pub stdout_quiet: bool,

    /// Stdout log format.
    #[arg(
        long = "log-format",
        default_value = "full",
        env = "TXBENCH_LOG_FORMAT",
        global = true
    )]
    pub stdout_format: LogFormat,
}

/// Parse a duration string like "12s", "5m", "1h".
fn parse_duration(s: &str) -> Result<Duration, humantime::DurationError> {
    humantime::parse_duration(s)
}

/// Parse a URL string.
fn parse_url(s: &str) -> Result<Url, url::ParseError> {
    Url::parse(s)
}
