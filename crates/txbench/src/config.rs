//! Configuration types and validation for txbench.

use std::{fmt, path::PathBuf, time::Duration};

use thiserror::Error;
use url::Url;

use crate::{
    WorkloadKind,
    accounts::AccountDeriver,
    cli::{Cli, LogArgs},
    logging::{LogConfig, verbosity_to_level_filter},
};

/// Errors that can occur during configuration validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid URL format.
    #[error("invalid {field} URL: {reason}")]
    InvalidUrl {
        /// The field name that contains the invalid URL.
        field: &'static str,
        /// The reason the URL is invalid.
        reason: String,
    },
    /// A field value is out of the allowed range.
    #[error("{field} must be {constraint}, got {value}")]
    OutOfRange {
        /// The field name that is out of range.
        field: &'static str,
        /// The constraint description.
        constraint: &'static str,
        /// The actual value.
        value: String,
    },
    /// A contract workload was selected without its artifact.
    #[error("{workload} workload requires a contract artifact")]
    MissingArtifact {
        /// The selected workload.
        workload: WorkloadKind,
    },
    /// The mnemonic does not derive valid keys.
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),
}

/// Validated benchmark configuration.
#[derive(Clone)]
pub struct BenchConfig {
    /// URL of the JSON-RPC endpoint under test.
    pub rpc_url: Url,
    /// Mnemonic the accounts are derived from.
    pub mnemonic: String,
    /// Kind of transactions to send.
    pub workload: WorkloadKind,
    /// Number of sub-accounts.
    pub sub_accounts: u32,
    /// Total number of transactions.
    pub transactions: u64,
    /// Transactions per batch request.
    pub batch_size: usize,
    /// Per-transaction confirmation timeout during stats collection.
    pub receipt_timeout: Duration,
    /// Confirmation timeout for funding and deployment transactions.
    pub funding_timeout: Duration,
    /// RPC request timeout.
    pub rpc_timeout: Duration,
    /// Bound on concurrent receipt and block requests.
    pub max_concurrency: usize,
    /// ERC20 contract artifact.
    pub erc20_artifact: Option<PathBuf>,
    /// ERC721 contract artifact.
    pub erc721_artifact: Option<PathBuf>,
    /// Logging configuration.
    pub log: LogConfig,
}

impl fmt::Debug for BenchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BenchConfig")
            .field("rpc_url", &self.rpc_url.as_str())
            .field("mnemonic", &"<redacted>")
            .field("workload", &self.workload)
            .field("sub_accounts", &self.sub_accounts)
            .field("transactions", &self.transactions)
            .field("batch_size", &self.batch_size)
            .field("receipt_timeout", &self.receipt_timeout)
            .field("funding_timeout", &self.funding_timeout)
            .field("rpc_timeout", &self.rpc_timeout)
            .field("max_concurrency", &self.max_concurrency)
            .field("erc20_artifact", &self.erc20_artifact)
            .field("erc721_artifact", &self.erc721_artifact)
            .finish()
    }
}

impl BenchConfig {
    /// Create a validated configuration from CLI arguments.
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let config = Self {
            rpc_url: cli.bench.rpc_url,
            mnemonic: cli.bench.mnemonic,
            workload: cli.bench.workload,
            sub_accounts: cli.bench.sub_accounts,
            transactions: cli.bench.transactions,
            batch_size: cli.bench.batch_size,
            receipt_timeout: cli.bench.receipt_timeout,
            funding_timeout: cli.bench.funding_timeout,
            rpc_timeout: cli.bench.rpc_timeout,
            max_concurrency: cli.bench.max_concurrency,
            erc20_artifact: cli.bench.erc20_artifact,
            erc721_artifact: cli.bench.erc721_artifact,
            log: LogConfig::from(cli.logging),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks ranges, the endpoint URL, the mnemonic and workload artifacts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url(&self.rpc_url, "rpc-url")?;

        non_zero("sub-accounts", u64::from(self.sub_accounts))?;
        non_zero("transactions", self.transactions)?;
        non_zero("batch-size", self.batch_size as u64)?;
        non_zero("max-concurrency", self.max_concurrency as u64)?;
        for (field, timeout) in [
            ("receipt-timeout", self.receipt_timeout),
            ("funding-timeout", self.funding_timeout),
            ("rpc-timeout", self.rpc_timeout),
        ] {
            if timeout.is_zero() {
                return Err(ConfigError::OutOfRange {
                    field,
                    constraint: "greater than 0",
                    value: "0s".to_string(),
                });
            }
        }

        let artifact = match self.workload {
            WorkloadKind::Eoa => None,
            WorkloadKind::Erc20 => Some(&self.erc20_artifact),
            WorkloadKind::Erc721 => Some(&self.erc721_artifact),
        };
        if artifact.is_some_and(Option::is_none) {
            return Err(ConfigError::MissingArtifact { workload: self.workload });
        }

        AccountDeriver::new(self.mnemonic.as_str())
            .map_err(|e| ConfigError::InvalidMnemonic(e.to_string()))?;

        Ok(())
    }
}

fn non_zero(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::OutOfRange {
            field,
            constraint: "greater than 0",
            value: "0".to_string(),
        });
    }
    Ok(())
}

/// Validate that a URL has an HTTP(S) scheme and a host.
fn validate_url(url: &Url, field: &'static str) -> Result<(), ConfigError> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            field,
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }

    if url.host().is_none() {
        return Err(ConfigError::InvalidUrl { field, reason: "missing host".to_string() });
    }

    Ok(())
}

impl From<LogArgs> for LogConfig {
    fn from(args: LogArgs) -> Self {
        Self {
            global_level: verbosity_to_level_filter(args.level),
            stdout_format: (!args.stdout_quiet).then_some(args.stdout_format),
        }
    }
}
