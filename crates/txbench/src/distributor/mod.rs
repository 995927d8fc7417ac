//! Funding of sub-accounts before a run.
//!
//! Both distributors follow the same plan: scan balances, collect the accounts
//! that are short, pick as many of them as the funding source can cover
//! (smallest shortfall first), then fund them one at a time.

use alloy_primitives::{Address, U256};

use crate::error::{BenchError, BenchResult};

mod native;
pub use native::{FundDistributor, NativeCosts};

mod token;
pub use token::{TokenCosts, TokenDistributor};

/// An account whose balance is below the run requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundingCandidate {
    /// Mnemonic index of the account.
    pub index: u32,
    /// Address of the account.
    pub address: Address,
    /// Amount needed to reach the requirement.
    pub missing: U256,
}

impl FundingCandidate {
    /// Returns a candidate if `balance` is below `requirement`.
    pub fn from_balance(
        index: u32,
        address: Address,
        balance: U256,
        requirement: U256,
    ) -> Option<Self> {
        (balance < requirement).then(|| Self { index, address, missing: requirement - balance })
    }
}

/// Picks the candidates the funding source can cover.
///
/// Candidates are stably sorted by ascending shortfall, which maximises the
/// number of accounts funded. A candidate is accepted while the remaining
/// budget covers its shortfall plus `margin`, so the accepted shortfalls never
/// exceed `budget - margin`. Selection stops at the first candidate that does
/// not fit.
pub fn plan_funding(
    mut candidates: Vec<FundingCandidate>,
    budget: U256,
    margin: U256,
) -> BenchResult<Vec<FundingCandidate>> {
    candidates.sort_by(|a, b| a.missing.cmp(&b.missing));

    let mut remaining = budget;
    let mut fundable = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if candidate.missing.saturating_add(margin) > remaining {
            if fundable.is_empty() {
                return Err(BenchError::InsufficientFunds {
                    available: budget,
                    required: candidate.missing.saturating_add(margin),
                });
            }
            break;
        }
        remaining -= candidate.missing;
        fundable.push(candidate);
    }

    Ok(fundable)
}
