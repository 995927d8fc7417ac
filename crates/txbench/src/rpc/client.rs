//! Alloy-backed [`ChainClient`] implementation.

use std::time::Duration;

use alloy_eips::BlockNumberOrTag;
use alloy_network::{Ethereum, ReceiptResponse};
use alloy_primitives::{Address, B256, Bytes, U256};
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_client::{RpcClient, Waiter};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_transport_http::{Http, reqwest::Client};
use async_trait::async_trait;
use url::Url;

use super::{
    error::{RpcError, RpcResult},
    traits::ChainClient,
    types::{BlockSummary, ReceiptSummary},
};
use crate::constants::DEFAULT_RPC_TIMEOUT;

/// Shared type alias for the HTTP provider.
pub type HttpProvider = RootProvider<Ethereum>;

/// Configuration for the chain client.
#[derive(Debug, Clone)]
pub struct ChainClientConfig {
    /// RPC endpoint URL.
    pub endpoint: Url,
    /// Request timeout.
    pub timeout: Duration,
}

impl ChainClientConfig {
    /// Creates a new client configuration with defaults.
    pub const fn new(endpoint: Url) -> Self {
        Self { endpoint, timeout: DEFAULT_RPC_TIMEOUT }
    }

    /// Sets the request timeout.
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Chain RPC client using Alloy.
///
/// Single requests go through the provider. Batched sends go through the
/// underlying [`RpcClient`] so all entries share one HTTP request.
#[derive(Debug, Clone)]
pub struct ChainClientImpl {
    rpc: RpcClient,
    provider: HttpProvider,
}

impl ChainClientImpl {
    /// Creates a new chain client from the given configuration.
    pub fn new(config: ChainClientConfig) -> RpcResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RpcError::Connection(format!("Failed to build HTTP client: {e}")))?;

        let http = Http::with_client(client, config.endpoint);
        let rpc = RpcClient::new(http, false);
        let provider = RootProvider::new(rpc.clone());

        Ok(Self { rpc, provider })
    }
}

#[async_trait]
impl ChainClient for ChainClientImpl {
    async fn chain_id(&self) -> RpcResult<u64> {
        self.provider.get_chain_id().await.map_err(RpcError::from)
    }

    async fn gas_price(&self) -> RpcResult<u128> {
        self.provider.get_gas_price().await.map_err(RpcError::from)
    }

    async fn balance(&self, address: Address) -> RpcResult<U256> {
        self.provider.get_balance(address).await.map_err(RpcError::from)
    }

    async fn pending_nonce(&self, address: Address) -> RpcResult<u64> {
        self.provider.get_transaction_count(address).pending().await.map_err(RpcError::from)
    }

    async fn estimate_gas(&self, request: TransactionRequest) -> RpcResult<u64> {
        self.provider.estimate_gas(request).await.map_err(RpcError::from)
    }

    async fn call(&self, request: TransactionRequest) -> RpcResult<Bytes> {
        self.provider.call(request).await.map_err(RpcError::from)
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> RpcResult<B256> {
        let pending = self.provider.send_raw_transaction(&raw).await?;
        Ok(*pending.tx_hash())
    }

    async fn send_raw_transaction_batch(
        &self,
        raws: Vec<Bytes>,
    ) -> RpcResult<Vec<RpcResult<B256>>> {
        let mut batch = self.rpc.new_batch();
        let mut waiters: Vec<Waiter<B256>> = Vec::with_capacity(raws.len());
        for raw in raws {
            waiters.push(batch.add_call("eth_sendRawTransaction", &(raw,))?);
        }

        batch.send().await?;

        let mut results = Vec::with_capacity(waiters.len());
        for waiter in waiters {
            results.push(waiter.await.map_err(RpcError::from));
        }
        Ok(results)
    }

    async fn transaction_receipt(&self, hash: B256) -> RpcResult<Option<ReceiptSummary>> {
        let receipt = self.provider.get_transaction_receipt(hash).await?;

        receipt
            .map(|receipt| {
                let block_number = ReceiptResponse::block_number(&receipt).ok_or_else(|| {
                    RpcError::InvalidResponse(format!("receipt for {hash} has no block number"))
                })?;
                Ok(ReceiptSummary {
                    block_number,
                    status: ReceiptResponse::status(&receipt),
                    contract_address: ReceiptResponse::contract_address(&receipt),
                })
            })
            .transpose()
    }

    async fn block_summary(&self, number: u64) -> RpcResult<Option<BlockSummary>> {
        let block =
            self.provider.get_block_by_number(BlockNumberOrTag::Number(number)).await?;

        Ok(block.map(|block| BlockSummary {
            number: block.header.number,
            timestamp: block.header.timestamp,
            tx_count: block.transactions.len() as u64,
            gas_used: block.header.gas_used,
            gas_limit: block.header.gas_limit,
        }))
    }
}
