//! Transaction digests and multi-signature signing.
//!
//! What gets signed is `sha256(chain_id || transaction_bytes)`. Mixing in
//! the chain id means a signature made for one network is worthless on
//! another, even for byte-identical transactions.
//!
//! The transaction id is different: `sha256(transaction_bytes)` truncated
//! to 20 bytes, with no chain id. It identifies the transaction, not the
//! authorization.

use tracing::debug;

use super::types::{SignedTransaction, UnsignedTransaction};
use crate::config::{ChainConfig, DIGEST_LENGTH, TRANSACTION_ID_LENGTH};
use crate::crypto::{sha256, sha256_multi, PrivateKey, PublicKey, Signature};
use crate::error::Result;

/// Everything derived from one transaction's canonical bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDigest {
    /// Canonical serialization of the unsigned transaction.
    pub payload: Vec<u8>,
    /// `sha256(chain_id || payload)`: the message every signer signs.
    pub signable: [u8; DIGEST_LENGTH],
    /// Lowercase hex of `sha256(payload)[..20]`.
    pub tx_id: String,
}

/// Computes the payload, signable digest and id for `tx`.
pub fn digest(tx: &UnsignedTransaction, chain_id: &[u8; DIGEST_LENGTH]) -> Result<TransactionDigest> {
    let payload = tx.to_bytes()?;
    let signable = sha256_multi(&[chain_id.as_slice(), payload.as_slice()]);
    let tx_id = hex::encode(&sha256(&payload)[..TRANSACTION_ID_LENGTH]);
    Ok(TransactionDigest {
        payload,
        signable,
        tx_id,
    })
}

/// Signs `tx` with each key in turn and returns the result with its id.
///
/// Accepts either a fresh [`UnsignedTransaction`] or a
/// [`SignedTransaction`] that already carries other parties' signatures.
/// New signatures are appended after the existing ones, in key order.
///
/// # Example
///
/// ```
/// use steem_protocol::config::ChainConfig;
/// use steem_protocol::crypto::PrivateKey;
/// use steem_protocol::transaction::{sign_transaction, verify_signatures, Operation, UnsignedTransaction};
///
/// let key = PrivateKey::from_seed(b"example").unwrap();
/// let tx = UnsignedTransaction {
///     ref_block_num: 1,
///     ref_block_prefix: 2,
///     expiration: "2030-01-01T00:00:00".parse().unwrap(),
///     operations: vec![Operation::vote("alice", "bob", "post", 10_000).unwrap()],
///     extensions: vec![],
/// };
/// let config = ChainConfig::mainnet();
/// let (signed, tx_id) = sign_transaction(tx, &[key.clone()], &config).unwrap();
/// assert_eq!(tx_id.len(), 40);
/// assert_eq!(verify_signatures(&signed, &config).unwrap(), vec![key.public_key()]);
/// ```
pub fn sign_transaction(
    tx: impl Into<SignedTransaction>,
    keys: &[PrivateKey],
    config: &ChainConfig,
) -> Result<(SignedTransaction, String)> {
    let mut signed: SignedTransaction = tx.into();
    let digest = digest(&signed.transaction, &config.chain_id)?;

    for key in keys {
        let signature = Signature::sign_digest(key, &digest.signable);
        signed.add_signature(&signature.to_hex())?;
    }

    debug!(
        tx_id = %digest.tx_id,
        added = keys.len(),
        total = signed.signatures().len(),
        "signed transaction"
    );
    Ok((signed, digest.tx_id))
}

/// Recovers the public key behind every signature on `tx`, in order.
///
/// Recovery succeeding only proves the signature is well-formed over this
/// digest. Whether the recovered keys satisfy the relevant authorities is
/// for the ledger to decide.
pub fn verify_signatures(tx: &SignedTransaction, config: &ChainConfig) -> Result<Vec<PublicKey>> {
    let digest = digest(&tx.transaction, &config.chain_id)?;
    tx.signatures()
        .iter()
        .map(|hex_sig| {
            Signature::from_hex(hex_sig)?
                .recover_public_key(&digest.signable)
                .map(|key| key.with_prefix(&config.address_prefix))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
