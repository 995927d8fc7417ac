//! ERC721 mint workload.

use std::{sync::Arc, time::Duration};

use alloy_consensus::TxLegacy;
use alloy_primitives::{Address, Bytes, TxKind, U256};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use tracing::info;

use super::{
    ChainParams, TxBuilder, UnsignedTx, WorkloadKind, deploy_contract, require_gas, round_robin,
};
use crate::{
    accounts::{AccountDeriver, SenderAccount},
    constants::{DEFAULT_NFT_NAME, DEFAULT_NFT_SYMBOL, DEFAULT_NFT_URI, NFT_GAS_MULTIPLIER},
    contracts::{ContractArtifact, IBenchNft},
    error::{BenchError, BenchResult},
    rpc::ChainClient,
};

/// Builds `createNFT` mints against a freshly deployed collection.
///
/// Mints have no receiver; every sender mints to itself.
pub struct Erc721TxBuilder {
    client: Arc<dyn ChainClient>,
    deriver: AccountDeriver,
    artifact: ContractArtifact,
    confirm_timeout: Duration,
    token_uri: String,
    collection: Option<Address>,
    gas_limit: Option<u64>,
}

impl std::fmt::Debug for Erc721TxBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Erc721TxBuilder")
            .field("collection", &self.collection)
            .field("token_uri", &self.token_uri)
            .field("gas_limit", &self.gas_limit)
            .finish_non_exhaustive()
    }
}

impl Erc721TxBuilder {
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
            token_uri: DEFAULT_NFT_URI.to_string(),
            collection: None,
            gas_limit: None,
        }
    }

    /// Address of the deployed collection.
    pub const fn collection_address(&self) -> Option<Address> {
        self.collection
    }

    fn collection(&self) -> BenchResult<Address> {
        self.collection
            .ok_or_else(|| BenchError::Initialization("NFT contract not deployed".into()))
    }

    fn mint_input(&self) -> Bytes {
        IBenchNft::createNFTCall { tokenURI: self.token_uri.clone() }.abi_encode().into()
    }
}

#[async_trait]
impl TxBuilder for Erc721TxBuilder {
    fn kind(&self) -> WorkloadKind {
        WorkloadKind::Erc721
    }

    async fn initialize(&mut self) -> BenchResult<()> {
        let deployer =
            self.deriver.admin().map_err(|e| BenchError::Initialization(e.to_string()))?;
        let code = self
            .artifact
            .deploy_code((DEFAULT_NFT_NAME.to_string(), DEFAULT_NFT_SYMBOL.to_string()));

        let (address, _) =
            deploy_contract(self.client.as_ref(), &deployer, code, None, self.confirm_timeout)
                .await?;
        self.collection = Some(address);

        info!(collection = %address, symbol = DEFAULT_NFT_SYMBOL, "NFT collection deployed");
        Ok(())
    }

    async fn estimate_unit_cost(&mut self) -> BenchResult<u64> {
        let collection = self.collection()?;
        let from = self.deriver.admin().map_err(|e| BenchError::Estimation(e.to_string()))?;

        let request = TransactionRequest::default()
            .from(from.address())
            .to(collection)
            .input(self.mint_input().into());
        let raw = self
            .client
            .estimate_gas(request)
            .await
            .map_err(|e| BenchError::Estimation(format!("NFT mint: {e}")))?;

        let gas = raw.saturating_mul(NFT_GAS_MULTIPLIER);
        info!(raw, gas, "Estimated NFT mint gas");
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
        let collection = self.collection()?;
        let gas_limit = require_gas(self.gas_limit)?;
        let input = self.mint_input();

        info!(count, symbol = DEFAULT_NFT_SYMBOL, "Constructing NFT mint transactions");
        round_robin(accounts, count, |nonce, _| TxLegacy {
            chain_id: Some(params.chain_id),
            nonce,
            gas_price: params.gas_price,
            gas_limit,
            to: TxKind::Call(collection),
            value: U256::ZERO,
            input: input.clone(),
        })
    }
}
