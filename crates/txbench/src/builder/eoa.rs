//! Native-currency transfer workload.

use std::sync::Arc;

use alloy_consensus::TxLegacy;
use alloy_primitives::{Bytes, TxKind, U256};
use alloy_rpc_types_eth::TransactionRequest;
use async_trait::async_trait;
use tracing::info;

use super::{ChainParams, TxBuilder, UnsignedTx, WorkloadKind, require_gas, round_robin};
use crate::{
    accounts::{AccountDeriver, SenderAccount},
    constants::DEFAULT_TRANSFER_VALUE_WEI,
    error::{BenchError, BenchResult},
    rpc::ChainClient,
};

/// Builds value transfers between sub-accounts.
pub struct EoaTxBuilder {
    client: Arc<dyn ChainClient>,
    deriver: AccountDeriver,
    value: U256,
    gas_limit: Option<u64>,
}

impl std::fmt::Debug for EoaTxBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EoaTxBuilder")
            .field("value", &self.value)
            .field("gas_limit", &self.gas_limit)
            .finish_non_exhaustive()
    }
}

impl EoaTxBuilder {
    /// Creates a builder that moves the default value per transaction.
    pub const fn new(client: Arc<dyn ChainClient>, deriver: AccountDeriver) -> Self {
        Self { client, deriver, value: DEFAULT_TRANSFER_VALUE_WEI, gas_limit: None }
    }

    /// Sets the value attached to each transfer.
    pub const fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

#[async_trait]
impl TxBuilder for EoaTxBuilder {
    fn kind(&self) -> WorkloadKind {
        WorkloadKind::Eoa
    }

    async fn initialize(&mut self) -> BenchResult<()> {
        Ok(())
    }

    async fn estimate_unit_cost(&mut self) -> BenchResult<u64> {
        let estimation = |e: alloy_signer_local::LocalSignerError| BenchError::Estimation(e.to_string());
        let from = self.deriver.admin().map_err(estimation)?.address();
        let to = self.deriver.address(1).map_err(estimation)?;

        let request = TransactionRequest::default().from(from).to(to).value(self.value);
        let gas = self
            .client
            .estimate_gas(request)
            .await
            .map_err(|e| BenchError::Estimation(format!("value transfer: {e}")))?;

        info!(gas, "Estimated value transfer gas");
        self.gas_limit = Some(gas);
        Ok(gas)
    }

    fn per_tx_value(&self) -> U256 {
        self.value
    }

    fn construct_transactions(
        &self,
        accounts: &mut [SenderAccount],
        count: usize,
        params: ChainParams,
    ) -> BenchResult<Vec<UnsignedTx>> {
        let gas_limit = require_gas(self.gas_limit)?;

        info!(count, "Constructing value transfer transactions");
        let txs = round_robin(accounts, count, |nonce, receiver| TxLegacy {
            chain_id: Some(params.chain_id),
            nonce,
            gas_price: params.gas_price,
            gas_limit,
            to: TxKind::Call(receiver),
            value: self.value,
            input: Bytes::new(),
        })?;
        info!(count = txs.len(), "Constructed transactions");
        Ok(txs)
    }
}
