//! Chain data types returned by [`super::ChainClient`].

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// The parts of a transaction receipt the benchmark cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptSummary {
    /// Block the transaction was mined in.
    pub block_number: u64,
    /// Whether execution succeeded.
    pub status: bool,
    /// Address of the created contract, for deployments.
    pub contract_address: Option<Address>,
}

/// Metadata of a block that contains benchmark transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSummary {
    /// Block number.
    pub number: u64,
    /// Block timestamp in seconds.
    pub timestamp: u64,
    /// Number of transactions in the block.
    pub tx_count: u64,
    /// Gas used by all transactions in the block.
    pub gas_used: u64,
    /// Block gas limit.
    pub gas_limit: u64,
}

impl BlockSummary {
    /// Percentage of the block gas limit that was used.
    pub fn gas_utilization(&self) -> f64 {
        if self.gas_limit == 0 {
            return 0.0;
        }
        self.gas_used as f64 / self.gas_limit as f64 * 100.0
    }
}
