#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/base/txbench/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod accounts;
pub use accounts::{AccountDeriver, SenderAccount, load_sender_accounts};

mod benchmarker;
pub use benchmarker::TxBenchmarker;

mod builder;
pub use builder::{
    ChainParams, EoaTxBuilder, Erc20TxBuilder, Erc721TxBuilder, TokenFunding, TxBuilder,
    UnsignedTx, WorkloadKind, create_tx_builder,
};

pub mod cli;

mod config;
pub use config::{BenchConfig, ConfigError};

mod constants;
pub use constants::*;

mod contracts;
pub use contracts::{ArtifactError, ContractArtifact, IBenchNft, IBenchToken};

mod distributor;
pub use distributor::{
    FundDistributor, FundingCandidate, NativeCosts, TokenCosts, TokenDistributor, plan_funding,
};

mod error;
pub use error::*;

mod logging;
pub use logging::{LogConfig, LogFormat, init_test_tracing, verbosity_to_level_filter};

mod rpc;
pub use rpc::{
    BlockSummary, ChainClient, ChainClientConfig, ChainClientImpl, HttpProvider, ReceiptSummary,
    RpcError, RpcResult, wait_for_receipt,
};

mod sender;
pub use sender::{
    BatchSender, SignFailure, SignedTx, partition, send_and_confirm, sign_legacy,
    sign_transactions,
};

mod signal;
pub use signal::setup_signal_handler;

mod stats;
pub use stats::{RunResult, StatsCollector, TxConfirmation, calc_tps};

#[cfg(test)]
pub mod test_utils;
