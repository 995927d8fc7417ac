//! Chain RPC access.

mod client;
mod error;
mod receipt;
mod traits;
mod types;

pub use client::{ChainClientConfig, ChainClientImpl, HttpProvider};
pub use error::{RpcError, RpcResult};
pub use receipt::wait_for_receipt;
pub use traits::ChainClient;
pub use types::{BlockSummary, ReceiptSummary};
