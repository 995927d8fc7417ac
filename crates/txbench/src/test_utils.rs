//! Shared test utilities: in-memory chain and token mocks plus account helpers.

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use alloy_consensus::{Transaction, TxEnvelope, transaction::SignerRecoverable};
use alloy_eips::eip2718::Decodable2718;
use alloy_primitives::{Address, B256, Bytes, U256, address, keccak256};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_sol_types::{SolCall, SolValue};
use async_trait::async_trait;

use crate::{
    accounts::{AccountDeriver, SenderAccount},
    builder::TokenFunding,
    contracts::IBenchToken,
    error::{BenchError, BenchResult},
    rpc::{BlockSummary, ChainClient, ReceiptSummary, RpcError, RpcResult},
};

/// Well-known development mnemonic.
pub(crate) const TEST_MNEMONIC: &str = "test test test test test test test test test test test junk";

/// Derives sender accounts at `indexes`, all starting at `nonce`.
pub(crate) fn test_accounts(indexes: &[u32], nonce: u64) -> Vec<SenderAccount> {
    let deriver = AccountDeriver::new(TEST_MNEMONIC).unwrap();
    indexes
        .iter()
        .map(|&index| SenderAccount::new(index, deriver.derive(index).unwrap(), nonce))
        .collect()
}

#[derive(Debug, Default)]
struct MockState {
    balances: HashMap<Address, U256>,
    token_balances: HashMap<Address, U256>,
    nonces: HashMap<Address, u64>,
    receipts: HashMap<B256, ReceiptSummary>,
    blocks: HashMap<u64, BlockSummary>,
    failing_blocks: HashSet<u64>,
    rejected: HashMap<Bytes, String>,
    sent: Vec<B256>,
    sent_raw: Vec<Bytes>,
    batch_calls: usize,
    failing_receipt_polls: usize,
    receipt_polls: usize,
    reverting: bool,
}

/// In-memory [`ChainClient`].
///
/// Submitted transactions that decode as EIP-2718 envelopes bump the
/// recovered sender's nonce. With [`Self::auto_mine`] every accepted
/// transaction gets a receipt in the configured block; contract creations
/// report [`Self::CONTRACT_ADDRESS`].
#[derive(Debug)]
pub(crate) struct MockChainClient {
    chain_id: u64,
    gas_price: u128,
    gas_estimate: u64,
    failing_estimates: bool,
    failing_batches: bool,
    auto_mine: Option<u64>,
    state: Mutex<MockState>,
}

impl Default for MockChainClient {
    fn default() -> Self {
        Self {
            chain_id: 1337,
            gas_price: 1,
            gas_estimate: 21_000,
            failing_estimates: false,
            failing_batches: false,
            auto_mine: None,
            state: Mutex::default(),
        }
    }
}

impl MockChainClient {
    /// Address reported for every deployed contract.
    pub(crate) const CONTRACT_ADDRESS: Address =
        address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");

    pub(crate) const fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = gas_price;
        self
    }

    pub(crate) const fn with_gas_estimate(mut self, gas: u64) -> Self {
        self.gas_estimate = gas;
        self
    }

    pub(crate) const fn failing_estimates(mut self) -> Self {
        self.failing_estimates = true;
        self
    }

    pub(crate) const fn failing_batches(mut self) -> Self {
        self.failing_batches = true;
        self
    }

    /// Mines every accepted transaction into `block`.
    pub(crate) const fn auto_mine(mut self, block: u64) -> Self {
        self.auto_mine = Some(block);
        self
    }

    /// Marks every mined transaction as reverted.
    pub(crate) fn reverting(self) -> Self {
        self.set_reverting(true);
        self
    }

    pub(crate) fn set_reverting(&self, reverting: bool) {
        self.state.lock().unwrap().reverting = reverting;
    }

    pub(crate) fn set_balance(&self, address: Address, balance: U256) {
        self.state.lock().unwrap().balances.insert(address, balance);
    }

    pub(crate) fn set_token_balance(&self, address: Address, balance: U256) {
        self.state.lock().unwrap().token_balances.insert(address, balance);
    }

    pub(crate) fn set_nonce(&self, address: Address, nonce: u64) {
        self.state.lock().unwrap().nonces.insert(address, nonce);
    }

    /// Records a receipt for `hash`.
    pub(crate) fn mine(&self, hash: B256, block: u64, status: bool) {
        let receipt = ReceiptSummary { block_number: block, status, contract_address: None };
        self.state.lock().unwrap().receipts.insert(hash, receipt);
    }

    /// Makes the next `count` receipt polls fail with a transport error.
    pub(crate) fn fail_receipt_polls(&self, count: usize) {
        self.state.lock().unwrap().failing_receipt_polls = count;
    }

    /// Number of `transaction_receipt` calls served so far.
    pub(crate) fn receipt_polls(&self) -> usize {
        self.state.lock().unwrap().receipt_polls
    }

    pub(crate) fn add_block(&self, block: BlockSummary) {
        self.state.lock().unwrap().blocks.insert(block.number, block);
    }

    /// Makes `block_summary` fail with a transport error for `number`.
    pub(crate) fn fail_block(&self, number: u64) {
        self.state.lock().unwrap().failing_blocks.insert(number);
    }

    /// Makes the node reject `raw` with `message`.
    pub(crate) fn reject_raw(&self, raw: Bytes, message: &str) {
        self.state.lock().unwrap().rejected.insert(raw, message.to_string());
    }

    /// Hashes of all accepted transactions, in submission order.
    pub(crate) fn sent(&self) -> Vec<B256> {
        self.state.lock().unwrap().sent.clone()
    }

    /// Raw bytes of all accepted transactions, in submission order.
    pub(crate) fn sent_raw(&self) -> Vec<Bytes> {
        self.state.lock().unwrap().sent_raw.clone()
    }

    pub(crate) fn batch_calls(&self) -> usize {
        self.state.lock().unwrap().batch_calls
    }

    fn submit(&self, raw: Bytes) -> RpcResult<B256> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = state.rejected.get(&raw) {
            return Err(RpcError::Rejected { code: -32000, message: message.clone() });
        }

        let (hash, contract_address) = match TxEnvelope::decode_2718(&mut raw.as_ref()) {
            Ok(tx) => {
                if let Ok(sender) = tx.recover_signer() {
                    let nonce = state.nonces.entry(sender).or_default();
                    *nonce = (*nonce).max(tx.nonce() + 1);
                }
                let created = tx.kind().is_create().then_some(Self::CONTRACT_ADDRESS);
                (*tx.tx_hash(), created)
            }
            Err(_) => (keccak256(&raw), None),
        };

        if let Some(block_number) = self.auto_mine {
            let status = !state.reverting;
            state
                .receipts
                .insert(hash, ReceiptSummary { block_number, status, contract_address });
        }
        state.sent.push(hash);
        state.sent_raw.push(raw);
        Ok(hash)
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn chain_id(&self) -> RpcResult<u64> {
        Ok(self.chain_id)
    }

    async fn gas_price(&self) -> RpcResult<u128> {
        Ok(self.gas_price)
    }

    async fn balance(&self, address: Address) -> RpcResult<U256> {
        Ok(self.state.lock().unwrap().balances.get(&address).copied().unwrap_or_default())
    }

    async fn pending_nonce(&self, address: Address) -> RpcResult<u64> {
        Ok(self.state.lock().unwrap().nonces.get(&address).copied().unwrap_or_default())
    }

    async fn estimate_gas(&self, _: TransactionRequest) -> RpcResult<u64> {
        if self.failing_estimates {
            return Err(RpcError::Rejected { code: 3, message: "execution reverted".into() });
        }
        Ok(self.gas_estimate)
    }

    async fn call(&self, request: TransactionRequest) -> RpcResult<Bytes> {
        let input = request.input.input().cloned().unwrap_or_default();
        match IBenchToken::balanceOfCall::abi_decode(&input) {
            Ok(call) => {
                let state = self.state.lock().unwrap();
                let balance = state.token_balances.get(&call.account).copied().unwrap_or_default();
                Ok(balance.abi_encode().into())
            }
            Err(_) => Ok(Bytes::new()),
        }
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> RpcResult<B256> {
        self.submit(raw)
    }

    async fn send_raw_transaction_batch(
        &self,
        raws: Vec<Bytes>,
    ) -> RpcResult<Vec<RpcResult<B256>>> {
        if self.failing_batches {
            return Err(RpcError::Transport("connection reset".into()));
        }
        self.state.lock().unwrap().batch_calls += 1;
        Ok(raws.into_iter().map(|raw| self.submit(raw)).collect())
    }

    async fn transaction_receipt(&self, hash: B256) -> RpcResult<Option<ReceiptSummary>> {
        let mut state = self.state.lock().unwrap();
        state.receipt_polls += 1;
        if state.failing_receipt_polls > 0 {
            state.failing_receipt_polls -= 1;
            return Err(RpcError::Transport("429 Too Many Requests".into()));
        }
        Ok(state.receipts.get(&hash).copied())
    }

    async fn block_summary(&self, number: u64) -> RpcResult<Option<BlockSummary>> {
        let state = self.state.lock().unwrap();
        if state.failing_blocks.contains(&number) {
            return Err(RpcError::Transport(format!("block {number} unavailable")));
        }
        Ok(state.blocks.get(&number).copied())
    }
}

/// In-memory [`TokenFunding`] source with a fixed supplier balance.
#[derive(Debug, Default)]
pub(crate) struct MockTokenSource {
    supply: U256,
    fail_after: Option<usize>,
    balances: Mutex<HashMap<Address, U256>>,
    transfers: Mutex<Vec<(Address, U256)>>,
}

impl MockTokenSource {
    pub(crate) fn with_supply(supply: U256) -> Self {
        Self { supply, ..Default::default() }
    }

    /// Makes every funding transfer after the first `count` fail.
    pub(crate) const fn failing_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    pub(crate) fn set_balance(&self, address: Address, balance: U256) {
        self.balances.lock().unwrap().insert(address, balance);
    }

    /// Funding transfers made so far.
    pub(crate) fn transfers(&self) -> Vec<(Address, U256)> {
        self.transfers.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenFunding for MockTokenSource {
    fn symbol(&self) -> &str {
        "TST"
    }

    fn transfer_value(&self) -> U256 {
        U256::from(1)
    }

    async fn token_balance(&self, address: Address) -> BenchResult<U256> {
        Ok(self.balances.lock().unwrap().get(&address).copied().unwrap_or_default())
    }

    async fn supplier_balance(&self) -> BenchResult<U256> {
        Ok(self.supply)
    }

    async fn fund_account(&self, to: Address, amount: U256) -> BenchResult<B256> {
        let mut transfers = self.transfers.lock().unwrap();
        if self.fail_after.is_some_and(|limit| transfers.len() >= limit) {
            return Err(BenchError::FundingReverted(B256::repeat_byte(0xee)));
        }
        transfers.push((to, amount));
        Ok(B256::with_last_byte(transfers.len() as u8))
    }
}
