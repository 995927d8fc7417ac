//! ERC20 transfer workload.

use std::{sync::Arc, time::Duration};

use alloy_consensus::TxLegacy;
use alloy_primitives::{Address, B256, Bytes, TxKind, U256};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use tracing::{debug, info};

use super::{
    ChainParams, TokenFunding, TxBuilder, UnsignedTx, WorkloadKind, deploy_contract, require_gas,
    round_robin,
};
use crate::{
    accounts::{AccountDeriver, SenderAccount},
    constants::{
        DEFAULT_TOKEN_NAME, DEFAULT_TOKEN_SUPPLY, DEFAULT_TOKEN_SYMBOL,
        DEFAULT_TOKEN_TRANSFER_AMOUNT, TOKEN_DEPLOY_GAS_LIMIT,
    },
    contracts::{ContractArtifact, IBenchToken},
    error::{BenchError, BenchResult},
    rpc::{ChainClient, RpcError},
    sender::send_and_confirm,
};

/// Deployed token state, available after [`TxBuilder::initialize`].
#[derive(Debug, Clone)]
struct Deployment {
    address: Address,
    chain_id: u64,
    deployer: PrivateKeySigner,
}

/// Builds ERC20 `transfer` calls between sub-accounts against a freshly
/// deployed token.
pub struct Erc20TxBuilder {
    client: Arc<dyn ChainClient>,
    deriver: AccountDeriver,
    artifact: ContractArtifact,
    confirm_timeout: Duration,
    transfer_amount: U256,
    deployment: Option<Deployment>,
    gas_limit: Option<u64>,
}

impl std::fmt::Debug for Erc20TxBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Erc20TxBuilder")
            .field("token", &self.deployment.as_ref().map(|d| d.address))
            .field("gas_limit", &self.gas_limit)
            .finish_non_exhaustive()
    }
}

impl Erc20TxBuilder {
    /// Creates a builder that deploys `artifact` on initialization.
    pub fn new(
        client: Arc<dyn ChainClient>,
        deriver: AccountDeriver,
        artifact: ContractArtifact,
        confirm_timeout: Duration,
    ) -> Self {
        Self {
            client,
            deriver,
            artifact,
            confirm_timeout,
            transfer_amount: U256::from(DEFAULT_TOKEN_TRANSFER_AMOUNT),
            deployment: None,
            gas_limit: None,
        }
    }

    /// Address of the deployed token.
    pub fn token_address(&self) -> Option<Address> {
        self.deployment.as_ref().map(|d| d.address)
    }

    fn deployment(&self) -> BenchResult<&Deployment> {
        self.deployment
            .as_ref()
            .ok_or_else(|| BenchError::Initialization("token contract not deployed".into()))
    }

    fn transfer_input(to: Address, amount: U256) -> Bytes {
        IBenchToken::transferCall { to, amount }.abi_encode().into()
    }
}

#[async_trait]
impl TxBuilder for Erc20TxBuilder {
    fn kind(&self) -> WorkloadKind {
        WorkloadKind::Erc20
    }

    async fn initialize(&mut self) -> BenchResult<()> {
        let deployer =
            self.deriver.admin().map_err(|e| BenchError::Initialization(e.to_string()))?;
        let code = self.artifact.deploy_code((
            U256::from(DEFAULT_TOKEN_SUPPLY),
            DEFAULT_TOKEN_NAME.to_string(),
            DEFAULT_TOKEN_SYMBOL.to_string(),
        ));

        let (address, chain_id) = deploy_contract(
            self.client.as_ref(),
            &deployer,
            code,
            Some(TOKEN_DEPLOY_GAS_LIMIT),
            self.confirm_timeout,
        )
        .await?;
        self.deployment = Some(Deployment { address, chain_id, deployer });

        let balance = self.supplier_balance().await?;
        info!(token = %address, symbol = DEFAULT_TOKEN_SYMBOL, %balance, "Token deployed");
        Ok(())
    }

    async fn estimate_unit_cost(&mut self) -> BenchResult<u64> {
        let deployment = self.deployment()?;
        let to = self.deriver.address(1).map_err(|e| BenchError::Estimation(e.to_string()))?;

        let request = TransactionRequest::default()
            .from(deployment.deployer.address())
            .to(deployment.address)
            .input(Self::transfer_input(to, self.transfer_amount).into());
        let gas = self
            .client
            .estimate_gas(request)
            .await
            .map_err(|e| BenchError::Estimation(format!("token transfer: {e}")))?;

        info!(gas, "Estimated token transfer gas");
        self.gas_limit = Some(gas);
        Ok(gas)
    }

    fn per_tx_value(&self) -> U256 {
        U256::ZERO
    }

    fn construct_transactions(
        &self,
        accounts: &mut [SenderAccount],
        count: usize,
        params: ChainParams,
    ) -> BenchResult<Vec<UnsignedTx>> {
        let token = self.deployment()?.address;
        let gas_limit = require_gas(self.gas_limit)?;

        info!(count, symbol = DEFAULT_TOKEN_SYMBOL, "Constructing token transfer transactions");
        round_robin(accounts, count, |nonce, receiver| TxLegacy {
            chain_id: Some(params.chain_id),
            nonce,
            gas_price: params.gas_price,
            gas_limit,
            to: TxKind::Call(token),
            value: U256::ZERO,
            input: Self::transfer_input(receiver, self.transfer_amount),
        })
    }

    fn token_funding(&self) -> Option<&dyn TokenFunding> {
        Some(self)
    }
}

#[async_trait]
impl TokenFunding for Erc20TxBuilder {
    fn symbol(&self) -> &str {
        DEFAULT_TOKEN_SYMBOL
    }

    fn transfer_value(&self) -> U256 {
        self.transfer_amount
    }

    async fn token_balance(&self, address: Address) -> BenchResult<U256> {
        let token = self.deployment()?.address;
        let input: Bytes = IBenchToken::balanceOfCall { account: address }.abi_encode().into();
        let output =
            self.client.call(TransactionRequest::default().to(token).input(input.into())).await?;

        IBenchToken::balanceOfCall::abi_decode_returns(&output).map_err(|e| {
            BenchError::from(RpcError::InvalidResponse(format!("balanceOf({address}): {e}")))
        })
    }

    async fn supplier_balance(&self) -> BenchResult<U256> {
        let deployer = self.deployment()?.deployer.address();
        self.token_balance(deployer).await
    }

    async fn fund_account(&self, to: Address, amount: U256) -> BenchResult<B256> {
        let deployment = self.deployment()?;
        let from = deployment.deployer.address();
        let input = Self::transfer_input(to, amount);

        let request = TransactionRequest::default()
            .from(from)
            .to(deployment.address)
            .input(input.clone().into());
        let gas_limit = self
            .client
            .estimate_gas(request)
            .await
            .map_err(|e| BenchError::Estimation(format!("token funding: {e}")))?;
        let gas_price = self.client.gas_price().await?;
        let nonce = self.client.pending_nonce(from).await?;

        let tx = TxLegacy {
            chain_id: Some(deployment.chain_id),
            nonce,
            gas_price,
            gas_limit,
            to: TxKind::Call(deployment.address),
            value: U256::ZERO,
            input,
        };
        let (hash, receipt) =
            send_and_confirm(self.client.as_ref(), &deployment.deployer, tx, self.confirm_timeout)
                .await?;
        if !receipt.status {
            return Err(BenchError::FundingReverted(hash));
        }

        debug!(%to, %amount, %hash, "Funded account with tokens");
        Ok(hash)
    }
}
