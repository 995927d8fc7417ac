//! Legacy transaction signing.

use alloy_consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy_eips::eip2718::Encodable2718;
use alloy_primitives::{Address, B256, Bytes};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;

/// A signed transaction ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTx {
    /// Transaction hash.
    pub hash: B256,
    /// Sender address.
    pub from: Address,
    /// Sender nonce.
    pub nonce: u64,
    /// EIP-2718 encoded transaction.
    pub raw: Bytes,
}

/// Signs a legacy transaction. The chain id in `tx` gives EIP-155 replay protection.
pub fn sign_legacy(signer: &PrivateKeySigner, tx: TxLegacy) -> alloy_signer::Result<SignedTx> {
    let nonce = tx.nonce;
    let signature = signer.sign_hash_sync(&tx.signature_hash())?;
    let envelope = TxEnvelope::from(tx.into_signed(signature));

    Ok(SignedTx {
        hash: *envelope.tx_hash(),
        from: signer.address(),
        nonce,
        raw: envelope.encoded_2718().into(),
    })
}
