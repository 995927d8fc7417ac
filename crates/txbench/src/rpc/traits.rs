//! Async trait definitions for the chain RPC client.

use alloy_primitives::{Address, B256, Bytes, U256};
use alloy_rpc_types_eth::TransactionRequest;
use async_trait::async_trait;

use super::{
    error::RpcResult,
    types::{BlockSummary, ReceiptSummary},
};

/// JSON-RPC surface used by the benchmark pipeline.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Gets the chain id via `eth_chainId`.
    async fn chain_id(&self) -> RpcResult<u64>;

    /// Gets the suggested legacy gas price via `eth_gasPrice`.
    async fn gas_price(&self) -> RpcResult<u128>;

    /// Gets the native balance of an account at the latest block.
    async fn balance(&self, address: Address) -> RpcResult<U256>;

    /// Gets the nonce of an account including pending transactions.
    async fn pending_nonce(&self, address: Address) -> RpcResult<u64>;

    /// Estimates the gas a transaction would consume.
    async fn estimate_gas(&self, request: TransactionRequest) -> RpcResult<u64>;

    /// Executes a call without creating a transaction.
    async fn call(&self, request: TransactionRequest) -> RpcResult<Bytes>;

    /// Submits a single signed transaction and returns its hash.
    async fn send_raw_transaction(&self, raw: Bytes) -> RpcResult<B256>;

    /// Submits signed transactions as a single JSON-RPC batch request.
    ///
    /// The outer error is a transport failure that affects the whole batch.
    /// Inner results carry the node's answer for each entry, in request order.
    async fn send_raw_transaction_batch(
        &self,
        raws: Vec<Bytes>,
    ) -> RpcResult<Vec<RpcResult<B256>>>;

    /// Gets the receipt of a transaction, or `None` if it is not mined yet.
    async fn transaction_receipt(&self, hash: B256) -> RpcResult<Option<ReceiptSummary>>;

    /// Gets block metadata by number, or `None` if the block is unknown.
    async fn block_summary(&self, number: u64) -> RpcResult<Option<BlockSummary>>;
}
