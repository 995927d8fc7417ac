//! txbench binary entry point.
//!
//! 1. Parse and validate configuration
//! 2. Initialise logging
//! 3. Connect to the endpoint under test
//! 4. Deploy contracts and fund sub-accounts
//! 5. Send the workload and log the measured throughput

use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use eyre::{Result, WrapErr};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use txbench::{
    BenchConfig, BenchError, ChainClientConfig, ChainClientImpl, TxBenchmarker, cli::Cli,
    setup_signal_handler,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    let config = BenchConfig::from_cli(cli).wrap_err("invalid configuration")?;
    config.log.init_tracing_subscriber()?;

    info!(
        rpc_url = %config.rpc_url,
        workload = %config.workload,
        sub_accounts = config.sub_accounts,
        transactions = config.transactions,
        batch_size = config.batch_size,
        "Starting txbench"
    );

    let client = ChainClientImpl::new(
        ChainClientConfig::new(config.rpc_url.clone()).with_timeout(config.rpc_timeout),
    )?;

    let cancel = CancellationToken::new();
    setup_signal_handler(cancel.clone());

    let mut bench = TxBenchmarker::new(config, Arc::new(client), cancel)?;
    if let Err(e) = bench.initialize().await {
        if let BenchError::Funding { ready, .. } = &e {
            error!(ready = ?ready, "Funding stopped before all accounts were ready");
        }
        return Err(e).wrap_err("benchmark initialization failed");
    }

    let result = bench.run().await.wrap_err("benchmark run failed")?;
    info!(
        tps = result.tps,
        blocks = result.blocks.len(),
        confirmed = result.confirmed,
        avg_utilization = result.average_utilization(),
        "Run complete"
    );

    Ok(())
}
