//! JSON-RPC batch submission.

use std::sync::Arc;

use alloy_primitives::B256;
use tracing::{debug, info, warn};

use super::SignedTx;
use crate::{error::BenchResult, rpc::ChainClient};

/// Splits `txs` into groups of `batch_size`. The last group may be shorter.
///
/// A `batch_size` of zero is treated as one.
pub fn partition(txs: Vec<SignedTx>, batch_size: usize) -> Vec<Vec<SignedTx>> {
    let batch_size = batch_size.max(1);
    let mut batches = Vec::with_capacity(txs.len().div_ceil(batch_size));
    let mut iter = txs.into_iter().peekable();
    while iter.peek().is_some() {
        batches.push(iter.by_ref().take(batch_size).collect());
    }
    batches
}

/// Sends signed transactions one batch request at a time.
pub struct BatchSender {
    client: Arc<dyn ChainClient>,
}

impl std::fmt::Debug for BatchSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchSender").finish_non_exhaustive()
    }
}

impl BatchSender {
    /// Creates a sender over `client`.
    pub fn new(client: Arc<dyn ChainClient>) -> Self {
        Self { client }
    }

    /// Submits every batch and returns the hashes the node accepted.
    ///
    /// Entries the node rejects are logged and left out. A transport failure
    /// on any batch aborts the whole send.
    pub async fn send(&self, batches: Vec<Vec<SignedTx>>) -> BenchResult<Vec<B256>> {
        let total: usize = batches.iter().map(Vec::len).sum();
        info!(transactions = total, batches = batches.len(), "Sending transaction batches");

        let mut hashes = Vec::with_capacity(total);
        let mut rejected = Vec::new();

        for (batch_index, batch) in batches.into_iter().enumerate() {
            let (senders, raws): (Vec<_>, Vec<_>) =
                batch.into_iter().map(|tx| ((tx.from, tx.nonce), tx.raw)).unzip();

            let results = self.client.send_raw_transaction_batch(raws).await?;
            debug!(batch = batch_index, size = results.len(), "Batch sent");

            for ((from, nonce), result) in senders.into_iter().zip(results) {
                match result {
                    Ok(hash) => hashes.push(hash),
                    Err(e) => rejected.push((from, nonce, e)),
                }
            }
        }

        if !rejected.is_empty() {
            for (from, nonce, e) in &rejected {
                warn!(%from, nonce, error = %e, "Transaction rejected");
            }
            warn!(rejected = rejected.len(), "Some transactions were rejected by the node");
        }
        info!(accepted = hashes.len(), "Finished sending transactions");

        Ok(hashes)
    }
}
