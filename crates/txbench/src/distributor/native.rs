//! Native-currency distribution from the admin account.

use std::{sync::Arc, time::Duration};

use alloy_consensus::TxLegacy;
use alloy_primitives::{Bytes, TxKind, U256};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use tracing::{debug, info, warn};

use super::{FundingCandidate, plan_funding};
use crate::{
    accounts::AccountDeriver,
    constants::ADMIN_ACCOUNT_INDEX,
    error::{BenchError, BenchResult},
    rpc::ChainClient,
    sender::send_and_confirm,
};

/// Native-currency cost of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeCosts {
    /// Gas price the costs were computed with.
    pub gas_price: u128,
    /// Cost of one workload transaction: `gas_price * unit_gas + value`.
    pub base_tx_cost: U256,
    /// Balance each sub-account needs: `base_tx_cost * total_tx`.
    pub sub_account: U256,
    /// Gas used by one funding transfer.
    pub distribution_gas: u64,
    /// Wei spent on gas by one funding transfer.
    pub distribution_cost: U256,
}

/// Tops up sub-accounts `1..=sub_accounts` from the admin account.
pub struct FundDistributor {
    client: Arc<dyn ChainClient>,
    deriver: AccountDeriver,
    sub_accounts: u32,
    total_tx: u64,
    confirm_timeout: Duration,
}

impl std::fmt::Debug for FundDistributor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FundDistributor")
            .field("sub_accounts", &self.sub_accounts)
            .field("total_tx", &self.total_tx)
            .finish_non_exhaustive()
    }
}

impl FundDistributor {
    /// Creates a distributor for `sub_accounts` accounts running `total_tx` transactions.
    pub fn new(
        client: Arc<dyn ChainClient>,
        deriver: AccountDeriver,
        sub_accounts: u32,
        total_tx: u64,
        confirm_timeout: Duration,
    ) -> Self {
        Self { client, deriver, sub_accounts, total_tx, confirm_timeout }
    }

    fn admin(&self) -> BenchResult<PrivateKeySigner> {
        self.deriver.admin().map_err(|e| BenchError::derivation(ADMIN_ACCOUNT_INDEX, e))
    }

    /// Prices the run from the unit gas and value of one workload transaction.
    ///
    /// The distribution gas is estimated from a transfer of the full
    /// sub-account requirement to the first sub-account.
    pub async fn calculate_costs(&self, unit_gas: u64, per_tx_value: U256) -> BenchResult<NativeCosts> {
        let gas_price = self.client.gas_price().await?;
        let base_tx_cost = U256::from(gas_price) * U256::from(unit_gas) + per_tx_value;
        let sub_account = base_tx_cost * U256::from(self.total_tx);

        let estimation = |e: alloy_signer_local::LocalSignerError| BenchError::Estimation(e.to_string());
        let from = self.deriver.admin().map_err(estimation)?.address();
        let to = self.deriver.address(1).map_err(estimation)?;
        let request = TransactionRequest::default().from(from).to(to).value(sub_account);
        let distribution_gas = self
            .client
            .estimate_gas(request)
            .await
            .map_err(|e| BenchError::Estimation(format!("distribution transfer: {e}")))?;
        let distribution_cost = U256::from(distribution_gas) * U256::from(gas_price);

        let costs =
            NativeCosts { gas_price, base_tx_cost, sub_account, distribution_gas, distribution_cost };
        info!(
            gas_price,
            base_tx_cost = %costs.base_tx_cost,
            required_account_balance = %costs.sub_account,
            distribution_gas,
            distribution_cost = %costs.distribution_cost,
            "Calculated native run costs"
        );
        Ok(costs)
    }

    /// Makes sure sub-accounts hold `costs.sub_account` and returns the ready indexes.
    ///
    /// Accounts that already hold enough come first, followed by the funded
    /// accounts in funding order. If no account is short nothing is sent.
    pub async fn distribute(&self, costs: &NativeCosts) -> BenchResult<Vec<u32>> {
        info!(sub_accounts = self.sub_accounts, "Fetching sub-account balances");

        let mut ready = Vec::new();
        let mut short = Vec::new();
        for index in 1..=self.sub_accounts {
            let address =
                self.deriver.address(index).map_err(|e| BenchError::derivation(index, e))?;
            let balance = self.client.balance(address).await?;
            match FundingCandidate::from_balance(index, address, balance, costs.sub_account) {
                Some(candidate) => short.push(candidate),
                None => ready.push(index),
            }
        }

        if short.is_empty() {
            info!(ready = ready.len(), "Sub-accounts are fully funded for the run");
            return Ok(ready);
        }

        let admin = self.admin()?;
        let budget = self.client.balance(admin.address()).await?;
        let short_count = short.len();
        let fundable = plan_funding(short, budget, costs.distribution_cost)?;
        if fundable.len() < short_count {
            warn!(
                short = short_count,
                funding = fundable.len(),
                %budget,
                "Unable to fund all sub-accounts"
            );
        }

        info!(accounts = fundable.len(), "Funding sub-accounts");
        for candidate in fundable {
            if let Err(e) = self.fund(&admin, &candidate, costs).await {
                return Err(e.into_funding(ready));
            }
            ready.push(candidate.index);
        }

        info!(ready = ready.len(), "Fund distribution finished");
        Ok(ready)
    }

    async fn fund(
        &self,
        admin: &PrivateKeySigner,
        candidate: &FundingCandidate,
        costs: &NativeCosts,
    ) -> BenchResult<()> {
        let chain_id = self.client.chain_id().await?;
        let nonce = self.client.pending_nonce(admin.address()).await?;
        let tx = TxLegacy {
            chain_id: Some(chain_id),
            nonce,
            gas_price: costs.gas_price,
            gas_limit: costs.distribution_gas,
            to: TxKind::Call(candidate.address),
            value: candidate.missing,
            input: Bytes::new(),
        };

        let (hash, receipt) =
            send_and_confirm(self.client.as_ref(), admin, tx, self.confirm_timeout).await?;
        if !receipt.status {
            return Err(BenchError::FundingReverted(hash));
        }

        debug!(index = candidate.index, amount = %candidate.missing, %hash, "Funded sub-account");
        Ok(())
    }
}
