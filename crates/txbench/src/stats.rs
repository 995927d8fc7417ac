//! Confirmation tracking and throughput calculation.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
    time::Duration,
};

use alloy_primitives::B256;
use futures::{StreamExt, stream};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    constants::RECEIPT_POLL_INTERVAL,
    error::BenchError,
    rpc::{BlockSummary, ChainClient, wait_for_receipt},
};

/// A transaction that made it into a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxConfirmation {
    /// Transaction hash.
    pub hash: B256,
    /// Block the transaction was mined in.
    pub block_number: u64,
}

/// Outcome of a benchmark run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    /// Transactions per second across the confirming blocks.
    pub tps: f64,
    /// Number of transactions accepted by the node.
    pub sent: usize,
    /// Number of transactions confirmed within the receipt timeout.
    pub confirmed: usize,
    /// Blocks that hold at least one confirmed transaction.
    pub blocks: BTreeMap<u64, BlockSummary>,
}

impl RunResult {
    /// Mean gas utilization of the confirming blocks, in percent.
    pub fn average_utilization(&self) -> f64 {
        if self.blocks.is_empty() {
            return 0.0;
        }
        let total: f64 = self.blocks.values().map(BlockSummary::gas_utilization).sum();
        total / self.blocks.len() as f64
    }
}

/// Computes throughput over blocks ordered by number.
///
/// Every adjacent pair adds the later block's transaction count and the
/// timestamp difference, so the first block's transactions are not counted.
/// Returns 0 when fewer than two blocks are given or no time passed.
pub fn calc_tps(blocks: &BTreeMap<u64, BlockSummary>) -> f64 {
    let mut total_txs = 0u64;
    let mut total_time = 0u64;
    for (prev, cur) in blocks.values().zip(blocks.values().skip(1)) {
        total_txs += cur.tx_count;
        total_time += cur.timestamp.saturating_sub(prev.timestamp);
    }

    if total_time == 0 {
        return 0.0;
    }
    (total_txs as f64 / total_time as f64).ceil()
}

/// Waits for sent transactions and measures the blocks they landed in.
pub struct StatsCollector {
    client: Arc<dyn ChainClient>,
    batch_size: usize,
    max_concurrency: usize,
    receipt_timeout: Duration,
    poll_interval: Duration,
}

impl std::fmt::Debug for StatsCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsCollector")
            .field("batch_size", &self.batch_size)
            .field("max_concurrency", &self.max_concurrency)
            .field("receipt_timeout", &self.receipt_timeout)
            .finish_non_exhaustive()
    }
}

impl StatsCollector {
    /// Creates a collector that confirms `batch_size` transactions per worker.
    pub fn new(
        client: Arc<dyn ChainClient>,
        batch_size: usize,
        max_concurrency: usize,
        receipt_timeout: Duration,
    ) -> Self {
        Self {
            client,
            batch_size: batch_size.max(1),
            max_concurrency: max_concurrency.max(1),
            receipt_timeout,
            poll_interval: RECEIPT_POLL_INTERVAL,
        }
    }

    /// Sets the receipt polling interval.
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Confirms `hashes`, fetches their blocks and computes throughput.
    ///
    /// Unconfirmed transactions and unavailable blocks are logged and left
    /// out of the result.
    pub async fn collect(&self, hashes: &[B256]) -> RunResult {
        if hashes.is_empty() {
            return RunResult::default();
        }

        info!(transactions = hashes.len(), "Waiting for transaction receipts");
        let confirmations = self.confirm(hashes).await;

        let numbers: BTreeSet<u64> = confirmations.iter().map(|c| c.block_number).collect();
        info!(confirmed = confirmations.len(), blocks = numbers.len(), "Fetching block data");
        let blocks = self.fetch_blocks(numbers).await;

        RunResult { tps: calc_tps(&blocks), sent: hashes.len(), confirmed: confirmations.len(), blocks }
    }

    async fn confirm(&self, hashes: &[B256]) -> Vec<TxConfirmation> {
        let outcomes: Vec<_> = stream::iter(hashes.chunks(self.batch_size))
            .map(|batch| self.confirm_batch(batch))
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        let mut confirmations = Vec::with_capacity(hashes.len());
        let mut failures = Vec::new();
        for (confirmed, failed) in outcomes {
            confirmations.extend(confirmed);
            failures.extend(failed);
        }

        if !failures.is_empty() {
            for (hash, error) in &failures {
                debug!(%hash, %error, "Transaction not confirmed");
            }
            warn!(failed = failures.len(), "Some transactions were not confirmed");
        }
        confirmations
    }

    async fn confirm_batch(&self, batch: &[B256]) -> (Vec<TxConfirmation>, Vec<(B256, BenchError)>) {
        let mut confirmed = Vec::with_capacity(batch.len());
        let mut failed = Vec::new();
        for &hash in batch {
            match wait_for_receipt(
                self.client.as_ref(),
                hash,
                self.receipt_timeout,
                self.poll_interval,
            )
            .await
            {
                Ok(receipt) => {
                    confirmed.push(TxConfirmation { hash, block_number: receipt.block_number })
                }
                Err(e) => failed.push((hash, e)),
            }
        }
        (confirmed, failed)
    }

    async fn fetch_blocks(&self, numbers: BTreeSet<u64>) -> BTreeMap<u64, BlockSummary> {
        let fetched: Vec<_> = stream::iter(numbers)
            .map(|number| async move { (number, self.client.block_summary(number).await) })
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        let mut blocks = BTreeMap::new();
        for (number, result) in fetched {
            match result {
                Ok(Some(block)) => {
                    blocks.insert(number, block);
                }
                Ok(None) => warn!(block = number, "Block not found"),
                Err(e) => warn!(block = number, error = %e, "Failed to fetch block"),
            }
        }
        blocks
    }
}
