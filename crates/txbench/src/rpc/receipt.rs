//! Receipt polling.

use std::time::Duration;

use alloy_primitives::B256;
use tokio::time::{sleep, timeout};
use tracing::debug;

use super::{traits::ChainClient, types::ReceiptSummary};
use crate::error::{BenchError, BenchResult};

/// Polls `eth_getTransactionReceipt` until the transaction is mined or `limit` elapses.
///
/// A failed poll is logged and the next poll goes ahead, so only `limit`
/// bounds the wait.
pub async fn wait_for_receipt(
    client: &dyn ChainClient,
    hash: B256,
    limit: Duration,
    poll_interval: Duration,
) -> BenchResult<ReceiptSummary> {
    timeout(limit, async {
        loop {
            match client.transaction_receipt(hash).await {
                Ok(Some(receipt)) => return receipt,
                Ok(None) => {}
                Err(e) => debug!(%hash, error = %e, "Receipt poll failed"),
            }
            sleep(poll_interval).await;
        }
    })
    .await
    .map_err(|_| BenchError::ConfirmationTimeout { hash, timeout: limit })
}
