//! Constants used throughout the benchmark pipeline.

use std::time::Duration;

use alloy_primitives::U256;

/// Mnemonic derivation index of the admin account that funds sub-accounts and deploys contracts.
pub const ADMIN_ACCOUNT_INDEX: u32 = 0;

/// Value attached to every native transfer: 0.0001 ETH.
pub const DEFAULT_TRANSFER_VALUE_WEI: U256 = U256::from_limbs([100_000_000_000_000, 0, 0, 0]);

/// Number of token units moved by each ERC20 transfer in the workload.
pub const DEFAULT_TOKEN_TRANSFER_AMOUNT: u64 = 1;

/// Initial supply minted to the deployer of the benchmark ERC20 token.
pub const DEFAULT_TOKEN_SUPPLY: u64 = 500_000_000_000;

/// Name of the benchmark ERC20 token.
pub const DEFAULT_TOKEN_NAME: &str = "Zex Coin";

/// Symbol of the benchmark ERC20 token.
pub const DEFAULT_TOKEN_SYMBOL: &str = "ZEX";

/// Gas limit for the ERC20 deployment transaction.
pub const TOKEN_DEPLOY_GAS_LIMIT: u64 = 2_000_000;

/// Name of the benchmark ERC721 collection.
pub const DEFAULT_NFT_NAME: &str = "ZEXTokens";

/// Symbol of the benchmark ERC721 collection.
pub const DEFAULT_NFT_SYMBOL: &str = "ZEXes";

/// Token URI passed to every `createNFT` call.
pub const DEFAULT_NFT_URI: &str = "https://really-valuable-nft-page.io";

/// Multiplier applied to the raw mint gas estimate. Mint cost grows with stored URI data.
pub const NFT_GAS_MULTIPLIER: u64 = 10;

/// Default number of sub-accounts derived for the run.
pub const DEFAULT_SUB_ACCOUNTS: u32 = 10;

/// Default number of transactions in the workload.
pub const DEFAULT_TRANSACTIONS: u64 = 60;

/// Default number of raw transactions per JSON-RPC batch request.
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Default upper bound on in-flight receipt and block lookups.
pub const DEFAULT_MAX_CONCURRENCY: usize = 64;

/// How long a single benchmark transaction may take to be mined before it is dropped.
pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(60);

/// How long a funding or deployment transaction may take to be mined.
pub const DEFAULT_FUNDING_TIMEOUT: Duration = Duration::from_secs(120);

/// Default HTTP request timeout for the RPC client.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// Interval between `eth_getTransactionReceipt` polls.
pub const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(1);
