//! Signing and submission of benchmark transactions.

mod batch;
pub use batch::{BatchSender, partition};

mod signer;
pub use signer::{SignedTx, sign_legacy};

use std::{collections::HashMap, time::Duration};

use alloy_consensus::TxLegacy;
use alloy_primitives::{Address, B256};
use alloy_signer_local::PrivateKeySigner;
use tracing::{info, warn};

use crate::{
    accounts::SenderAccount,
    builder::UnsignedTx,
    constants::RECEIPT_POLL_INTERVAL,
    error::{BenchError, BenchResult},
    rpc::{ChainClient, ReceiptSummary, wait_for_receipt},
};

/// A transaction that could not be signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignFailure {
    /// Sender the transaction was built for.
    pub from: Address,
    /// Nonce of the transaction.
    pub nonce: u64,
    /// Why signing failed.
    pub reason: String,
}

/// Signs `txs` with the matching account from `accounts`.
///
/// A transaction whose sender has no signer in `accounts`, or whose signature
/// fails, is reported in the second list instead of aborting the rest.
pub fn sign_transactions(
    accounts: &[SenderAccount],
    txs: Vec<UnsignedTx>,
) -> (Vec<SignedTx>, Vec<SignFailure>) {
    let signers: HashMap<Address, &PrivateKeySigner> =
        accounts.iter().map(|account| (account.address(), account.signer())).collect();

    let mut signed = Vec::with_capacity(txs.len());
    let mut failures = Vec::new();

    for UnsignedTx { from, tx } in txs {
        let nonce = tx.nonce;
        let Some(signer) = signers.get(&from) else {
            failures.push(SignFailure { from, nonce, reason: "no signer for sender".into() });
            continue;
        };
        match sign_legacy(signer, tx) {
            Ok(tx) => signed.push(tx),
            Err(e) => failures.push(SignFailure { from, nonce, reason: e.to_string() }),
        }
    }

    if !failures.is_empty() {
        for failure in &failures {
            warn!(from = %failure.from, nonce = failure.nonce, reason = %failure.reason, "Failed to sign transaction");
        }
    }
    info!(signed = signed.len(), failed = failures.len(), "Signed transactions");

    (signed, failures)
}

/// Signs and sends a single transaction, then waits for it to be mined.
pub async fn send_and_confirm(
    client: &dyn ChainClient,
    signer: &PrivateKeySigner,
    tx: TxLegacy,
    timeout: Duration,
) -> BenchResult<(B256, ReceiptSummary)> {
    let signed = sign_legacy(signer, tx).map_err(|e| BenchError::Signing(e.to_string()))?;
    let hash = client.send_raw_transaction(signed.raw).await?;
    let receipt = wait_for_receipt(client, hash, timeout, RECEIPT_POLL_INTERVAL).await?;
    Ok((hash, receipt))
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{Bytes, TxKind, U256};

    use super::*;
    use crate::test_utils::{MockChainClient, test_accounts};

    fn unsigned(from: Address, nonce: u64) -> UnsignedTx {
        UnsignedTx {
            from,
            tx: TxLegacy {
                chain_id: Some(1),
                nonce,
                gas_price: 1,
                gas_limit: 21_000,
                to: TxKind::Call(Address::ZERO),
                value: U256::ZERO,
                input: Bytes::new(),
            },
        }
    }

    #[test]
    fn test_sign_transactions_collects_unknown_senders() {
        let accounts = test_accounts(&[1, 2], 0);
        let stranger = Address::repeat_byte(0xaa);
        let txs = vec![
            unsigned(accounts[0].address(), 0),
            unsigned(stranger, 0),
            unsigned(accounts[1].address(), 0),
        ];

        let (signed, failures) = sign_transactions(&accounts, txs);

        assert_eq!(signed.len(), 2);
        assert_eq!(signed[0].from, accounts[0].address());
        assert_eq!(signed[1].from, accounts[1].address());
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].from, stranger);
    }

    #[tokio::test]
    async fn test_send_and_confirm() {
        let client = MockChainClient::default().auto_mine(12);
        let accounts = test_accounts(&[1], 0);

        let (hash, receipt) = send_and_confirm(
            &client,
            accounts[0].signer(),
            unsigned(Address::ZERO, 0).tx,
            Duration::from_secs(5),
        )
        .await
        .unwrap();

        assert_eq!(client.sent(), vec![hash]);
        assert_eq!(receipt.block_number, 12);
    }
}
