//! Error types for the benchmark pipeline.

use std::time::Duration;

use alloy_primitives::{B256, U256};
use thiserror::Error;

use crate::{config::ConfigError, rpc::RpcError};

/// Errors that can occur while preparing or running a benchmark.
///
/// Every variant except [`BenchError::ConfirmationTimeout`] ends the run.
/// Timeouts are counted and dropped by the stats collector.
#[derive(Debug, Error)]
pub enum BenchError {
    /// The funding source cannot cover even the cheapest shortfall.
    #[error("insufficient funds in distributor: available {available}, cheapest account needs {required}")]
    InsufficientFunds {
        /// Balance of the funding source.
        available: U256,
        /// Smallest amount that would have funded one account, margin included.
        required: U256,
    },

    /// A gas or cost estimate call failed.
    #[error("estimation failed: {0}")]
    Estimation(String),

    /// Builder setup (contract deployment) failed or reverted.
    #[error("initialization failed: {0}")]
    Initialization(String),

    /// A transaction was not mined in time.
    #[error("transaction {hash} not mined within {timeout:?}")]
    ConfirmationTimeout {
        /// Transaction hash.
        hash: B256,
        /// How long the wait lasted.
        timeout: Duration,
    },

    /// RPC failure.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// Funding stopped part way. `ready` holds the accounts funded or already
    /// sufficient before the failure.
    #[error("funding aborted with {} ready accounts: {source}", .ready.len())]
    Funding {
        /// Ready account indexes accumulated before the failure.
        ready: Vec<u32>,
        /// The failure that stopped funding.
        #[source]
        source: Box<BenchError>,
    },

    /// A funding transfer was mined but reverted.
    #[error("funding transaction {0} reverted")]
    FundingReverted(B256),

    /// No sub-account is ready to send transactions.
    #[error("no ready accounts")]
    NoReadyAccounts,

    /// Transaction signing failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// No key could be derived from the mnemonic for an account.
    #[error("failed to derive account {index}: {reason}")]
    Derivation {
        /// Mnemonic index of the account.
        index: u32,
        /// Why derivation failed.
        reason: String,
    },

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The run was cancelled between phases.
    #[error("benchmark cancelled")]
    Cancelled,
}

impl BenchError {
    /// Wraps `self` into [`BenchError::Funding`] with the ready set gathered so far.
    pub fn into_funding(self, ready: Vec<u32>) -> Self {
        Self::Funding { ready, source: Box::new(self) }
    }
}

impl BenchError {
    /// Key derivation failure for the account at `index`.
    pub fn derivation(index: u32, err: impl std::fmt::Display) -> Self {
        Self::Derivation { index, reason: err.to_string() }
    }
}

/// Result type alias for benchmark operations.
pub type BenchResult<T> = Result<T, BenchError>;
