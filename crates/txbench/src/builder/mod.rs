//! Workload transaction builders.
//!
//! Each [`WorkloadKind`] has one [`TxBuilder`] implementation. A builder sets
//! up on-chain state once, prices a single transaction, and then constructs the
//! whole workload round-robin over the sender pool.

use std::{fmt, path::Path, sync::Arc, time::Duration};

use alloy_consensus::TxLegacy;
use alloy_primitives::{Address, B256, Bytes, TxKind, U256};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{
    accounts::{AccountDeriver, SenderAccount},
    config::{BenchConfig, ConfigError},
    contracts::ContractArtifact,
    error::{BenchError, BenchResult},
    rpc::ChainClient,
    sender::send_and_confirm,
};

mod eoa;
pub use eoa::EoaTxBuilder;

mod erc20;
pub use erc20::Erc20TxBuilder;

mod erc721;
pub use erc721::Erc721TxBuilder;

/// The kind of transaction a benchmark run sends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WorkloadKind {
    /// Plain native-currency transfers between sub-accounts.
    #[default]
    Eoa,
    /// ERC20 `transfer` calls between sub-accounts.
    Erc20,
    /// ERC721 `createNFT` mints.
    Erc721,
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eoa => f.write_str("EOA"),
            Self::Erc20 => f.write_str("ERC20"),
            Self::Erc721 => f.write_str("ERC721"),
        }
    }
}

/// Chain parameters shared by every transaction of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainParams {
    /// Chain id used for EIP-155 signatures.
    pub chain_id: u64,
    /// Legacy gas price in wei.
    pub gas_price: u128,
}

/// An unsigned transaction together with the account that must sign it.
#[derive(Debug, Clone, PartialEq)]
pub struct UnsignedTx {
    /// Sender address, used to look up the signer.
    pub from: Address,
    /// Transaction body.
    pub tx: TxLegacy,
}

/// Builds the transactions of one workload kind.
#[async_trait]
pub trait TxBuilder: Send + Sync {
    /// The workload this builder produces.
    fn kind(&self) -> WorkloadKind;

    /// One-time setup, such as deploying the workload contract.
    async fn initialize(&mut self) -> BenchResult<()>;

    /// Estimates the gas of one representative transaction and keeps it as the
    /// gas limit of every constructed transaction.
    async fn estimate_unit_cost(&mut self) -> BenchResult<u64>;

    /// Native value attached to each transaction.
    fn per_tx_value(&self) -> U256;

    /// Builds `count` transactions, rotating senders over `accounts`.
    ///
    /// Transaction `i` is sent by `accounts[i % n]` and, for workloads with a
    /// receiver, received by `accounts[(i + 1) % n]`. Each sender's nonce
    /// advances by one per transaction.
    fn construct_transactions(
        &self,
        accounts: &mut [SenderAccount],
        count: usize,
        params: ChainParams,
    ) -> BenchResult<Vec<UnsignedTx>>;

    /// Token funding capability, for workloads that spend tokens.
    fn token_funding(&self) -> Option<&dyn TokenFunding> {
        None
    }
}

/// Access to the workload token for the token distributor.
#[async_trait]
pub trait TokenFunding: Send + Sync {
    /// Token symbol, for logging.
    fn symbol(&self) -> &str;

    /// Tokens moved by each workload transaction.
    fn transfer_value(&self) -> U256;

    /// Token balance of `address`.
    async fn token_balance(&self, address: Address) -> BenchResult<U256>;

    /// Token balance of the account that funds sub-accounts.
    async fn supplier_balance(&self) -> BenchResult<U256>;

    /// Transfers `amount` tokens to `to` and waits until the transfer is mined.
    async fn fund_account(&self, to: Address, amount: U256) -> BenchResult<B256>;
}

/// Creates the builder for `config.workload`.
pub fn create_tx_builder(
    config: &BenchConfig,
    client: Arc<dyn ChainClient>,
    deriver: AccountDeriver,
) -> BenchResult<Box<dyn TxBuilder>> {
    match config.workload {
        WorkloadKind::Eoa => Ok(Box::new(EoaTxBuilder::new(client, deriver))),
        WorkloadKind::Erc20 => {
            let artifact = load_artifact(config.erc20_artifact.as_deref(), config.workload)?;
            Ok(Box::new(Erc20TxBuilder::new(client, deriver, artifact, config.funding_timeout)))
        }
        WorkloadKind::Erc721 => {
            let artifact = load_artifact(config.erc721_artifact.as_deref(), config.workload)?;
            Ok(Box::new(Erc721TxBuilder::new(client, deriver, artifact, config.funding_timeout)))
        }
    }
}

fn load_artifact(path: Option<&Path>, workload: WorkloadKind) -> BenchResult<ContractArtifact> {
    let path = path.ok_or(ConfigError::MissingArtifact { workload })?;
    ContractArtifact::from_file(path).map_err(|e| BenchError::Initialization(e.to_string()))
}

/// Runs the round-robin construction loop shared by all builders.
///
/// `build` receives the sender nonce and the receiver address.
pub(crate) fn round_robin<F>(
    accounts: &mut [SenderAccount],
    count: usize,
    mut build: F,
) -> BenchResult<Vec<UnsignedTx>>
where
    F: FnMut(u64, Address) -> TxLegacy,
{
    let n = accounts.len();
    if n == 0 {
        return Err(BenchError::NoReadyAccounts);
    }

    let mut txs = Vec::with_capacity(count);
    for i in 0..count {
        let receiver = accounts[(i + 1) % n].address();
        let sender = &mut accounts[i % n];
        let nonce = sender.next_nonce();
        txs.push(UnsignedTx { from: sender.address(), tx: build(nonce, receiver) });
    }
    Ok(txs)
}

/// Deploys `code` from `deployer` and returns the contract address.
///
/// Without a `gas_limit` the deployment is estimated first. A reverted
/// deployment or a receipt without a contract address is an initialization
/// failure.
pub(crate) async fn deploy_contract(
    client: &dyn ChainClient,
    deployer: &PrivateKeySigner,
    code: Bytes,
    gas_limit: Option<u64>,
    timeout: Duration,
) -> BenchResult<(Address, u64)> {
    let init = |e: BenchError| BenchError::Initialization(format!("contract deployment: {e}"));
    let from = deployer.address();

    let chain_id = client.chain_id().await.map_err(|e| init(e.into()))?;
    let gas_price = client.gas_price().await.map_err(|e| init(e.into()))?;
    let nonce = client.pending_nonce(from).await.map_err(|e| init(e.into()))?;
    let gas_limit = match gas_limit {
        Some(limit) => limit,
        None => {
            let mut request = TransactionRequest::default().from(from).input(code.clone().into());
            request.to = Some(TxKind::Create);
            client.estimate_gas(request).await.map_err(|e| init(e.into()))?
        }
    };

    let tx = TxLegacy {
        chain_id: Some(chain_id),
        nonce,
        gas_price,
        gas_limit,
        to: TxKind::Create,
        value: U256::ZERO,
        input: code,
    };
    let (hash, receipt) = send_and_confirm(client, deployer, tx, timeout).await.map_err(init)?;

    if !receipt.status {
        error!(%hash, "Contract deployment reverted");
        return Err(BenchError::Initialization(format!("deployment {hash} reverted")));
    }
    let address = receipt.contract_address.ok_or_else(|| {
        BenchError::Initialization(format!("deployment {hash} has no contract address"))
    })?;

    info!(%address, %hash, block = receipt.block_number, "Contract deployed");
    Ok((address, chain_id))
}

/// Returns the stored gas estimate, or an error if it was never taken.
pub(crate) fn require_gas(gas: Option<u64>) -> BenchResult<u64> {
    gas.ok_or_else(|| BenchError::Estimation("unit cost has not been estimated".into()))
}
