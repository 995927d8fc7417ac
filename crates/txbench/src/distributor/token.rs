//! Token distribution from the token supplier.

use alloy_primitives::U256;
use tracing::{debug, info, warn};

use super::{FundingCandidate, plan_funding};
use crate::{
    accounts::AccountDeriver,
    builder::TokenFunding,
    error::{BenchError, BenchResult},
};

/// Token cost of a run, spread over the ready accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenCosts {
    /// Tokens moved by the whole run: `transfer_value * total_tx`.
    pub total: U256,
    /// Tokens each ready account needs, rounded up.
    pub per_account: U256,
}

impl TokenCosts {
    /// Computes the per-account requirement for `ready_count` senders.
    pub fn new(transfer_value: U256, total_tx: u64, ready_count: usize) -> BenchResult<Self> {
        if ready_count == 0 {
            return Err(BenchError::NoReadyAccounts);
        }
        let total = transfer_value * U256::from(total_tx);
        let accounts = U256::from(ready_count);
        let mut per_account = total / accounts;
        if !(total % accounts).is_zero() {
            per_account += U256::from(1);
        }
        Ok(Self { total, per_account })
    }
}

/// Tops up ready accounts with tokens from the supplier.
#[derive(Debug)]
pub struct TokenDistributor {
    deriver: AccountDeriver,
    total_tx: u64,
}

impl TokenDistributor {
    /// Creates a distributor for a run of `total_tx` transactions.
    pub const fn new(deriver: AccountDeriver, total_tx: u64) -> Self {
        Self { deriver, total_tx }
    }

    /// Funds the short accounts of `ready` and returns the new ready set.
    ///
    /// Token transfers carry no native value, so no margin is held back from
    /// the supplier balance. If every account already holds enough, `ready`
    /// is returned as is. Otherwise the result is replaced by the accounts
    /// funded here, in funding order.
    pub async fn distribute(
        &self,
        ready: &[u32],
        token: &dyn TokenFunding,
    ) -> BenchResult<Vec<u32>> {
        let costs = TokenCosts::new(token.transfer_value(), self.total_tx, ready.len())?;
        info!(
            symbol = token.symbol(),
            total = %costs.total,
            per_account = %costs.per_account,
            "Calculated token run costs"
        );

        let mut short = Vec::new();
        for &index in ready {
            let address =
                self.deriver.address(index).map_err(|e| BenchError::derivation(index, e))?;
            let balance = token.token_balance(address).await?;
            if let Some(candidate) =
                FundingCandidate::from_balance(index, address, balance, costs.per_account)
            {
                short.push(candidate);
            }
        }

        if short.is_empty() {
            info!(symbol = token.symbol(), ready = ready.len(), "Accounts hold enough tokens");
            return Ok(ready.to_vec());
        }

        let supply = token.supplier_balance().await?;
        let short_count = short.len();
        let fundable = plan_funding(short, supply, U256::ZERO)?;
        if fundable.len() < short_count {
            warn!(
                symbol = token.symbol(),
                short = short_count,
                funding = fundable.len(),
                %supply,
                "Unable to fund all accounts with tokens"
            );
        }

        let mut funded = Vec::with_capacity(fundable.len());
        for candidate in fundable {
            match token.fund_account(candidate.address, candidate.missing).await {
                Ok(hash) => {
                    debug!(index = candidate.index, %hash, "Token funding confirmed");
                    funded.push(candidate.index);
                }
                Err(e) => return Err(e.into_funding(funded)),
            }
        }

        info!(symbol = token.symbol(), ready = funded.len(), "Token distribution finished");
        Ok(funded)
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;

    use super::*;
    use crate::test_utils::{MockTokenSource, TEST_MNEMONIC};

    fn deriver() -> AccountDeriver {
        AccountDeriver::new(TEST_MNEMONIC).unwrap()
    }

    fn address(index: u32) -> Address {
        deriver().address(index).unwrap()
    }

    #[test]
    fn test_costs_round_up() {
        let costs = TokenCosts::new(U256::from(1), 10, 3).unwrap();
        assert_eq!(costs.total, U256::from(10));
        assert_eq!(costs.per_account, U256::from(4));

        let even = TokenCosts::new(U256::from(2), 9, 3).unwrap();
        assert_eq!(even.per_account, U256::from(6));
    }

    #[test]
    fn test_costs_without_accounts() {
        assert!(matches!(TokenCosts::new(U256::from(1), 10, 0), Err(BenchError::NoReadyAccounts)));
    }

    #[tokio::test]
    async fn test_funding_replaces_ready_set() {
        let token = MockTokenSource::with_supply(U256::from(100));
        token.set_balance(address(1), U256::from(5));
        token.set_balance(address(2), U256::from(2));

        // 10 transfers over 2 accounts: 5 each.
        let ready = TokenDistributor::new(deriver(), 10).distribute(&[1, 2], &token).await.unwrap();

        assert_eq!(ready, vec![2]);
        assert_eq!(token.transfers(), vec![(address(2), U256::from(3))]);
    }

    #[tokio::test]
    async fn test_all_sufficient_keeps_ready_set() {
        let token = MockTokenSource::with_supply(U256::ZERO);
        token.set_balance(address(1), U256::from(5));
        token.set_balance(address(2), U256::from(5));

        let ready = TokenDistributor::new(deriver(), 10).distribute(&[1, 2], &token).await.unwrap();

        assert_eq!(ready, vec![1, 2]);
        assert!(token.transfers().is_empty());
    }

    #[tokio::test]
    async fn test_underivable_account() {
        let token = MockTokenSource::with_supply(U256::from(100));
        let err = TokenDistributor::new(AccountDeriver::new_unchecked("not a phrase"), 4)
            .distribute(&[1], &token)
            .await
            .unwrap_err();
        assert!(matches!(err, BenchError::Derivation { index: 1, .. }));
    }

    #[tokio::test]
    async fn test_limited_supply_funds_cheapest() {
        let token = MockTokenSource::with_supply(U256::from(6));
        token.set_balance(address(3), U256::from(1));

        // 12 transfers over 3 accounts: 4 each. Shortfalls: 1 -> 4, 2 -> 4, 3 -> 3.
        let ready =
            TokenDistributor::new(deriver(), 12).distribute(&[1, 2, 3], &token).await.unwrap();

        assert_eq!(ready, vec![3]);
    }

    #[tokio::test]
    async fn test_empty_supply() {
        let token = MockTokenSource::with_supply(U256::ZERO);
        let err = TokenDistributor::new(deriver(), 4).distribute(&[1, 2], &token).await.unwrap_err();
        assert!(matches!(err, BenchError::InsufficientFunds { .. }));
    }

    #[tokio::test]
    async fn test_failure_reports_partial_set() {
        let token = MockTokenSource::with_supply(U256::from(100)).failing_after(1);
        token.set_balance(address(3), U256::from(2));

        let err =
            TokenDistributor::new(deriver(), 6).distribute(&[1, 2, 3], &token).await.unwrap_err();

        // Account 3 held enough but is not part of the replaced set.
        match err {
            BenchError::Funding { ready, source } => {
                assert_eq!(ready, vec![1]);
                assert!(matches!(*source, BenchError::FundingReverted(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
