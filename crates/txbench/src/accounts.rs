//! Mnemonic-derived benchmark accounts.

use std::fmt;

use alloy_primitives::Address;
use alloy_signer_local::{LocalSignerError, MnemonicBuilder, PrivateKeySigner, coins_bip39::English};
use tracing::debug;

use crate::{
    constants::ADMIN_ACCOUNT_INDEX,
    error::{BenchError, BenchResult},
    rpc::ChainClient,
};

/// Derives signers from a BIP-39 mnemonic along `m/44'/60'/0'/0/{index}`.
#[derive(Clone)]
pub struct AccountDeriver {
    mnemonic: String,
}

impl fmt::Debug for AccountDeriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountDeriver").finish_non_exhaustive()
    }
}

impl AccountDeriver {
    /// Creates a deriver, checking that the phrase yields a valid admin signer.
    pub fn new(mnemonic: impl Into<String>) -> Result<Self, LocalSignerError> {
        let deriver = Self { mnemonic: mnemonic.into() };
        deriver.derive(ADMIN_ACCOUNT_INDEX)?;
        Ok(deriver)
    }

    /// Creates a deriver without checking the phrase.
    #[cfg(test)]
    pub(crate) fn new_unchecked(mnemonic: &str) -> Self {
        Self { mnemonic: mnemonic.to_string() }
    }

    /// Derives the signer at `index`.
    pub fn derive(&self, index: u32) -> Result<PrivateKeySigner, LocalSignerError> {
        let path = format!("m/44'/60'/0'/0/{index}");
        MnemonicBuilder::<English>::default()
            .phrase(self.mnemonic.as_str())
            .derivation_path(&path)?
            .build()
    }

    /// Derives the address at `index`.
    pub fn address(&self, index: u32) -> Result<Address, LocalSignerError> {
        self.derive(index).map(|signer| signer.address())
    }

    /// Derives the admin account that funds sub-accounts and deploys contracts.
    pub fn admin(&self) -> Result<PrivateKeySigner, LocalSignerError> {
        self.derive(ADMIN_ACCOUNT_INDEX)
    }
}

/// A sub-account that signs benchmark transactions, with its next nonce.
///
/// The nonce is only advanced by transaction construction, one step per
/// transaction, so nonces per account are gapless.
#[derive(Debug, Clone)]
pub struct SenderAccount {
    index: u32,
    signer: PrivateKeySigner,
    nonce: u64,
}

impl SenderAccount {
    /// Creates a sender account starting at `nonce`.
    pub const fn new(index: u32, signer: PrivateKeySigner, nonce: u64) -> Self {
        Self { index, signer, nonce }
    }

    /// Mnemonic index of the account.
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Address of the account.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Signer for the account.
    pub const fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    /// The nonce the next transaction will use.
    pub const fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Returns the current nonce and advances it by one.
    pub const fn next_nonce(&mut self) -> u64 {
        let nonce = self.nonce;
        self.nonce += 1;
        nonce
    }
}

/// Loads the sender pool for a run.
///
/// Takes the first `min(ready.len(), total_tx)` ready indexes, so no account is
/// loaded that would not send at least one transaction, and reads each
/// account's pending nonce.
pub async fn load_sender_accounts(
    client: &dyn ChainClient,
    deriver: &AccountDeriver,
    ready: &[u32],
    total_tx: u64,
) -> BenchResult<Vec<SenderAccount>> {
    let count = ready.len().min(usize::try_from(total_tx).unwrap_or(usize::MAX));
    if count == 0 {
        return Err(BenchError::NoReadyAccounts);
    }

    let mut accounts = Vec::with_capacity(count);
    for &index in &ready[..count] {
        let signer = deriver.derive(index).map_err(|e| BenchError::derivation(index, e))?;
        let nonce = client.pending_nonce(signer.address()).await?;
        debug!(index, address = %signer.address(), nonce, "Loaded sender account");
        accounts.push(SenderAccount::new(index, signer, nonce));
    }

    Ok(accounts)
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;
    use crate::test_utils::{MockChainClient, TEST_MNEMONIC};

    #[test]
    fn test_derive_is_deterministic() {
        let deriver = AccountDeriver::new(TEST_MNEMONIC).unwrap();
        assert_eq!(
            deriver.address(0).unwrap(),
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
        assert_eq!(deriver.address(1).unwrap(), deriver.derive(1).unwrap().address());
    }

    #[test]
    fn test_invalid_mnemonic_rejected() {
        assert!(AccountDeriver::new("definitely not a mnemonic").is_err());
    }

    #[test]
    fn test_next_nonce_increments() {
        let deriver = AccountDeriver::new(TEST_MNEMONIC).unwrap();
        let mut account = SenderAccount::new(1, deriver.derive(1).unwrap(), 5);
        assert_eq!(account.next_nonce(), 5);
        assert_eq!(account.next_nonce(), 6);
        assert_eq!(account.nonce(), 7);
    }

    #[tokio::test]
    async fn test_load_sender_accounts_caps_at_tx_count() {
        let deriver = AccountDeriver::new(TEST_MNEMONIC).unwrap();
        let client = MockChainClient::default();
        client.set_nonce(deriver.address(2).unwrap(), 4);

        let accounts = load_sender_accounts(&client, &deriver, &[2, 3, 4], 2).await.unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].index(), 2);
        assert_eq!(accounts[0].nonce(), 4);
        assert_eq!(accounts[1].index(), 3);
        assert_eq!(accounts[1].nonce(), 0);
    }

    #[tokio::test]
    async fn test_load_sender_accounts_underivable() {
        let deriver = AccountDeriver::new_unchecked("not a phrase");
        let client = MockChainClient::default();
        let err = load_sender_accounts(&client, &deriver, &[2], 1).await.unwrap_err();
        assert!(matches!(err, BenchError::Derivation { index: 2, .. }));
    }

    #[tokio::test]
    async fn test_load_sender_accounts_requires_ready_accounts() {
        let deriver = AccountDeriver::new(TEST_MNEMONIC).unwrap();
        let client = MockChainClient::default();
        let err = load_sender_accounts(&client, &deriver, &[], 10).await.unwrap_err();
        assert!(matches!(err, BenchError::NoReadyAccounts));
    }
}
