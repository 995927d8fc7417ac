//! Orchestration of a full benchmark run.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    accounts::{AccountDeriver, load_sender_accounts},
    builder::{ChainParams, TxBuilder, create_tx_builder},
    config::{BenchConfig, ConfigError},
    distributor::{FundDistributor, TokenDistributor},
    error::{BenchError, BenchResult},
    rpc::ChainClient,
    sender::{BatchSender, partition, sign_transactions},
    stats::{RunResult, StatsCollector},
};

/// Drives a benchmark: setup and funding, then sending and measuring.
///
/// The cancellation token is checked between phases. A phase that has
/// started always runs to completion.
pub struct TxBenchmarker {
    config: BenchConfig,
    client: Arc<dyn ChainClient>,
    deriver: AccountDeriver,
    builder: Box<dyn TxBuilder>,
    ready: Vec<u32>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for TxBenchmarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxBenchmarker")
            .field("workload", &self.builder.kind())
            .field("ready", &self.ready)
            .finish_non_exhaustive()
    }
}

impl TxBenchmarker {
    /// Creates a benchmarker for `config.workload`.
    pub fn new(
        config: BenchConfig,
        client: Arc<dyn ChainClient>,
        cancel: CancellationToken,
    ) -> BenchResult<Self> {
        let deriver = AccountDeriver::new(config.mnemonic.as_str())
            .map_err(|e| ConfigError::InvalidMnemonic(e.to_string()))?;
        let builder = create_tx_builder(&config, Arc::clone(&client), deriver.clone())?;
        Ok(Self { config, client, deriver, builder, ready: Vec::new(), cancel })
    }

    /// Sub-account indexes that are funded for the run.
    pub fn ready_accounts(&self) -> &[u32] {
        &self.ready
    }

    fn checkpoint(&self) -> BenchResult<()> {
        if self.cancel.is_cancelled() {
            return Err(BenchError::Cancelled);
        }
        Ok(())
    }

    /// Sets up the workload and funds the sub-accounts.
    pub async fn initialize(&mut self) -> BenchResult<()> {
        info!(
            workload = %self.builder.kind(),
            sub_accounts = self.config.sub_accounts,
            transactions = self.config.transactions,
            "Initializing benchmark"
        );

        self.checkpoint()?;
        self.builder.initialize().await?;

        self.checkpoint()?;
        let unit_gas = self.builder.estimate_unit_cost().await?;
        let distributor = FundDistributor::new(
            Arc::clone(&self.client),
            self.deriver.clone(),
            self.config.sub_accounts,
            self.config.transactions,
            self.config.funding_timeout,
        );
        let costs = distributor.calculate_costs(unit_gas, self.builder.per_tx_value()).await?;

        self.checkpoint()?;
        self.ready = distributor.distribute(&costs).await?;

        if let Some(token) = self.builder.token_funding() {
            self.checkpoint()?;
            let tokens = TokenDistributor::new(self.deriver.clone(), self.config.transactions);
            self.ready = tokens.distribute(&self.ready, token).await?;
        }

        if self.ready.is_empty() {
            return Err(BenchError::NoReadyAccounts);
        }
        if self.ready.len() < self.config.sub_accounts as usize {
            warn!(
                ready = self.ready.len(),
                requested = self.config.sub_accounts,
                "Running with fewer sub-accounts than requested"
            );
        }
        info!(ready = self.ready.len(), "Benchmark initialized");
        Ok(())
    }

    /// Sends the workload and collects the results.
    pub async fn run(&self) -> BenchResult<RunResult> {
        self.checkpoint()?;
        let params = ChainParams {
            chain_id: self.client.chain_id().await?,
            gas_price: self.client.gas_price().await?,
        };
        let count = usize::try_from(self.config.transactions).map_err(|_| {
            ConfigError::OutOfRange {
                field: "transactions",
                constraint: "addressable on this platform",
                value: self.config.transactions.to_string(),
            }
        })?;

        let mut accounts = load_sender_accounts(
            self.client.as_ref(),
            &self.deriver,
            &self.ready,
            self.config.transactions,
        )
        .await?;
        let txs = self.builder.construct_transactions(&mut accounts, count, params)?;

        self.checkpoint()?;
        let (signed, _) = sign_transactions(&accounts, txs);
        let batches = partition(signed, self.config.batch_size);
        let hashes = BatchSender::new(Arc::clone(&self.client)).send(batches).await?;

        self.checkpoint()?;
        let collector = StatsCollector::new(
            Arc::clone(&self.client),
            self.config.batch_size,
            self.config.max_concurrency,
            self.config.receipt_timeout,
        );
        let result = collector.collect(&hashes).await;

        info!(
            tps = result.tps,
            sent = result.sent,
            confirmed = result.confirmed,
            blocks = result.blocks.len(),
            "Benchmark finished"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alloy_primitives::U256;
    use url::Url;

    use super::*;
    use crate::{
        WorkloadKind,
        logging::{LogConfig, init_test_tracing},
        rpc::BlockSummary,
        test_utils::{MockChainClient, TEST_MNEMONIC},
    };

    fn config(workload: WorkloadKind) -> BenchConfig {
        BenchConfig {
            rpc_url: Url::parse("http://localhost:8545").unwrap(),
            mnemonic: TEST_MNEMONIC.to_string(),
            workload,
            sub_accounts: 3,
            transactions: 6,
            batch_size: 4,
            receipt_timeout: Duration::from_secs(5),
            funding_timeout: Duration::from_secs(5),
            rpc_timeout: Duration::from_secs(5),
            max_concurrency: 4,
            erc20_artifact: None,
            erc721_artifact: None,
            log: LogConfig::default(),
        }
    }

    fn admin() -> alloy_primitives::Address {
        AccountDeriver::new(TEST_MNEMONIC).unwrap().address(0).unwrap()
    }

    #[tokio::test]
    async fn test_eoa_end_to_end() {
        init_test_tracing();
        let client = Arc::new(MockChainClient::default().auto_mine(5));
        client.set_balance(admin(), U256::from(10).pow(U256::from(18)));
        client.add_block(BlockSummary {
            number: 5,
            timestamp: 100,
            tx_count: 6,
            gas_used: 126_000,
            gas_limit: 30_000_000,
        });

        let mut bench =
            TxBenchmarker::new(config(WorkloadKind::Eoa), client.clone(), CancellationToken::new())
                .unwrap();
        bench.initialize().await.unwrap();
        assert_eq!(bench.ready_accounts(), &[1, 2, 3]);
        // One funding transfer per sub-account.
        assert_eq!(client.sent().len(), 3);

        let result = bench.run().await.unwrap();

        assert_eq!(result.sent, 6);
        assert_eq!(result.confirmed, 6);
        assert_eq!(result.blocks.keys().copied().collect::<Vec<_>>(), vec![5]);
        assert_eq!(result.tps, 0.0);
        assert_eq!(client.batch_calls(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_before_initialize() {
        let client = Arc::new(MockChainClient::default().auto_mine(1));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut bench = TxBenchmarker::new(config(WorkloadKind::Eoa), client.clone(), cancel).unwrap();

        assert!(matches!(bench.initialize().await, Err(BenchError::Cancelled)));
        assert!(matches!(bench.run().await, Err(BenchError::Cancelled)));
        assert!(client.sent().is_empty());
    }

    #[tokio::test]
    async fn test_unfunded_admin() {
        let client = Arc::new(MockChainClient::default().auto_mine(1));
        let mut bench =
            TxBenchmarker::new(config(WorkloadKind::Eoa), client, CancellationToken::new())
                .unwrap();

        bench.ready = vec![1, 2];

        let err = bench.initialize().await.unwrap_err();
        assert!(matches!(err, BenchError::InsufficientFunds { .. }));
        assert_eq!(bench.ready_accounts(), &[1, 2]);
    }

    #[test]
    fn test_contract_workload_without_artifact() {
        let client = Arc::new(MockChainClient::default());
        let err =
            TxBenchmarker::new(config(WorkloadKind::Erc20), client, CancellationToken::new())
                .unwrap_err();
        assert!(matches!(
            err,
            BenchError::Config(ConfigError::MissingArtifact { workload: WorkloadKind::Erc20 })
        ));
    }
}
