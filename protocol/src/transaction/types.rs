//! Transaction value types.
//!
//! An [`UnsignedTransaction`] is what gets hashed and signed. A
//! [`SignedTransaction`] is the same thing plus an append-only list of
//! signatures; it is what nodes accept for broadcast.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use crate::codec::ByteBuffer;
use crate::config::SIGNATURE_HEX_LENGTH;
use crate::crypto::PublicKey;
use crate::error::{Error, Result};
use crate::serializer::{
    find_by_name, Asset, Authority, OperationSchema, TimePointSec, Type, SIGNED_TRANSACTION, TRANSACTION,
};

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// One ledger action: a name from the protocol table and its parameters.
///
/// Serializes as `["name", { ...params }]`, the same shape node APIs use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, Value)", into = "(String, Value)")]
pub struct Operation {
    name: String,
    params: Value,
}

impl Operation {
    /// Builds an operation and checks it against the protocol table.
    ///
    /// The parameters are encoded once into a scratch buffer, so a bad field
    /// is reported here rather than at signing time.
    pub fn new(name: &str, params: Value) -> Result<Self> {
        let op = Self {
            name: name.to_string(),
            params,
        };
        op.to_bytes()?;
        Ok(op)
    }

    /// `vote`. Weight is in basis points, `-10000..=10000`.
    pub fn vote(voter: &str, author: &str, permlink: &str, weight: i16) -> Result<Self> {
        Self::new(
            "vote",
            json!({
                "voter": voter,
                "author": author,
                "permlink": permlink,
                "weight": weight,
            }),
        )
    }

    /// `transfer` of a liquid asset.
    pub fn transfer(from: &str, to: &str, amount: Asset, memo: &str) -> Result<Self> {
        Self::new(
            "transfer",
            json!({
                "from": from,
                "to": to,
                "amount": amount.to_string(),
                "memo": memo,
            }),
        )
    }

    /// `custom_json`, the generic application hook.
    pub fn custom_json(
        required_auths: &[&str],
        required_posting_auths: &[&str],
        id: &str,
        payload: &str,
    ) -> Result<Self> {
        Self::new(
            "custom_json",
            json!({
                "required_auths": required_auths,
                "required_posting_auths": required_posting_auths,
                "id": id,
                "json": payload,
            }),
        )
    }

    /// `account_create`. The fee is paid by `creator`.
    #[allow(clippy::too_many_arguments)]
    pub fn account_create(
        fee: Asset,
        creator: &str,
        new_account_name: &str,
        owner: &Authority,
        active: &Authority,
        posting: &Authority,
        memo_key: &PublicKey,
        json_metadata: &str,
    ) -> Result<Self> {
        Self::new(
            "account_create",
            json!({
                "fee": fee.to_string(),
                "creator": creator,
                "new_account_name": new_account_name,
                "owner": authority_value(owner)?,
                "active": authority_value(active)?,
                "posting": authority_value(posting)?,
                "memo_key": memo_key.to_string(),
                "json_metadata": json_metadata,
            }),
        )
    }

    /// `account_update`. A `None` authority is left unchanged on chain.
    pub fn account_update(
        account: &str,
        owner: Option<&Authority>,
        active: Option<&Authority>,
        posting: Option<&Authority>,
        memo_key: &PublicKey,
        json_metadata: &str,
    ) -> Result<Self> {
        Self::new(
            "account_update",
            json!({
                "account": account,
                "owner": owner.map(authority_value).transpose()?,
                "active": active.map(authority_value).transpose()?,
                "posting": posting.map(authority_value).transpose()?,
                "memo_key": memo_key.to_string(),
                "json_metadata": json_metadata,
            }),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &Value {
        &self.params
    }

    /// The table entry for this operation.
    pub fn schema(&self) -> Result<&'static OperationSchema> {
        find_by_name(&self.name)
            .ok_or_else(|| Error::serialization(&self.name, "unknown operation"))
    }

    /// Wire bytes: varint id followed by the fields.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = ByteBuffer::new();
        Type::Operation.encode(&mut buf, &json!([self.name, self.params]))?;
        Ok(buf.into_written())
    }
}

fn authority_value(authority: &Authority) -> Result<Value> {
    serde_json::to_value(authority).map_err(|e| Error::serialization("authority", e.to_string()))
}

impl From<(String, Value)> for Operation {
    fn from((name, params): (String, Value)) -> Self {
        Self { name, params }
    }
}

impl From<Operation> for (String, Value) {
    fn from(op: Operation) -> Self {
        (op.name, op.params)
    }
}

// ---------------------------------------------------------------------------
// UnsignedTransaction
// ---------------------------------------------------------------------------

/// The signed-over part of a transaction.
///
/// `ref_block_num`/`ref_block_prefix` pin the transaction to a recent block
/// (TaPoS), so it cannot be replayed on a fork that lacks that block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    /// Low 16 bits of the reference block number.
    pub ref_block_num: u16,
    /// Bytes 4..8 of the reference block id, little-endian.
    pub ref_block_prefix: u32,
    pub expiration: TimePointSec,
    pub operations: Vec<Operation>,
    /// Always empty today.
    #[serde(default)]
    pub extensions: Vec<Value>,
}

impl UnsignedTransaction {
    /// The canonical bytes that get hashed for signing.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let value = serde_json::to_value(self)
            .map_err(|e| Error::serialization("transaction", e.to_string()))?;
        TRANSACTION.to_bytes(&value)
    }

    /// Parses canonical bytes. Public keys inside operations are rendered
    /// with `address_prefix`.
    pub fn from_bytes(bytes: &[u8], address_prefix: &str) -> Result<Self> {
        let value = TRANSACTION.from_bytes(bytes, address_prefix)?;
        serde_json::from_value(value).map_err(|e| Error::serialization("transaction", e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// SignedTransaction
// ---------------------------------------------------------------------------

/// An [`UnsignedTransaction`] plus signatures.
///
/// Signatures are only ever appended. Existing entries are never removed or
/// reordered, which is what lets several parties sign the same transaction
/// in turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedTransaction {
    #[serde(flatten)]
    pub transaction: UnsignedTransaction,
    #[serde(deserialize_with = "signature_list")]
    signatures: Vec<String>,
}

impl SignedTransaction {
    /// Wraps a transaction with no signatures yet.
    pub fn new(transaction: UnsignedTransaction) -> Self {
        Self {
            transaction,
            signatures: Vec::new(),
        }
    }

    /// Hex-encoded 65-byte signatures, in the order they were added.
    pub fn signatures(&self) -> &[String] {
        &self.signatures
    }

    /// Appends an externally produced signature.
    ///
    /// Only the shape is checked (130 hex characters). Whether it actually
    /// signs this transaction is for the network, or
    /// [`verify_signatures`](super::verify_signatures), to decide.
    pub fn add_signature(&mut self, signature_hex: &str) -> Result<()> {
        self.signatures.push(normalize_signature(signature_hex)?);
        Ok(())
    }

    /// Full wire form including signatures.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let value = serde_json::to_value(self)
            .map_err(|e| Error::serialization("signed_transaction", e.to_string()))?;
        SIGNED_TRANSACTION.to_bytes(&value)
    }

    /// Parses the full wire form.
    pub fn from_bytes(bytes: &[u8], address_prefix: &str) -> Result<Self> {
        let value = SIGNED_TRANSACTION.from_bytes(bytes, address_prefix)?;
        serde_json::from_value(value)
            .map_err(|e| Error::serialization("signed_transaction", e.to_string()))
    }
}

/// Checks a hex signature's shape and lowercases it.
fn normalize_signature(signature_hex: &str) -> Result<String> {
    if signature_hex.len() != SIGNATURE_HEX_LENGTH {
        return Err(Error::SignatureFormat(format!(
            "expected {SIGNATURE_HEX_LENGTH} hex characters, got {}",
            signature_hex.len()
        )));
    }
    if !signature_hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::SignatureFormat("signature is not hex".into()));
    }
    Ok(signature_hex.to_ascii_lowercase())
}

fn signature_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<String>::deserialize(deserializer)?
        .iter()
        .map(|sig| normalize_signature(sig).map_err(serde::de::Error::custom))
        .collect()
}

impl From<UnsignedTransaction> for SignedTransaction {
    fn from(transaction: UnsignedTransaction) -> Self {
        Self::new(transaction)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::AssetSymbol;

    fn sample() -> UnsignedTransaction {
        UnsignedTransaction {
            ref_block_num: 34294,
            ref_block_prefix: 3707022213,
            expiration: "2016-04-06T08:29:27".parse().unwrap(),
            operations: vec![Operation::vote("a", "b", "c", 1).unwrap()],
            extensions: Vec::new(),
        }
    }

    #[test]
    fn operation_json_shape() {
        let op = Operation::transfer("alice", "bob", Asset::new(1_000, AssetSymbol::Steem), "hi").unwrap();
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json[0], "transfer");
        assert_eq!(json[1]["amount"], "1.000 STEEM");

        let back: Operation = serde_json::from_value(json).unwrap();
        assert_eq!(back, op);
    }

    #[test]
    fn operation_new_validates() {
        assert!(Operation::new("teleport", json!({})).is_err());
        assert!(Operation::new("vote", json!({"voter": "a"})).is_err());
        assert!(Operation::vote("a", "b", "c", 10_000).is_ok());
    }

    #[test]
    fn custom_json_sets() {
        let op = Operation::custom_json(&[], &["alice"], "follow", "[]").unwrap();
        assert_eq!(op.schema().unwrap().id, 18);
        assert_eq!(op.params()["required_posting_auths"][0], "alice");
        assert!(Operation::custom_json(&[], &["alice", "alice"], "follow", "[]").is_err());
    }

    #[test]
    fn unsigned_bytes_are_stable() {
        let bytes = sample().to_bytes().unwrap();
        assert_eq!(hex::encode(&bytes), "f68585abf4dce7c804570100016101620163010000");
        assert_eq!(UnsignedTransaction::from_bytes(&bytes, "STM").unwrap(), sample());
    }

    #[test]
    fn signed_json_flattens() {
        let mut signed = SignedTransaction::new(sample());
        signed.add_signature(&"AB".repeat(65)).unwrap();
        let json = serde_json::to_value(&signed).unwrap();
        assert_eq!(json["ref_block_num"], 34294);
        assert_eq!(json["signatures"][0], "ab".repeat(65));
    }

    #[test]
    fn signed_bytes_append_signatures() {
        let mut signed = SignedTransaction::new(sample());
        let unsigned_len = sample().to_bytes().unwrap().len();
        signed.add_signature(&"00".repeat(65)).unwrap();
        let bytes = signed.to_bytes().unwrap();
        assert_eq!(bytes.len(), unsigned_len + 1 + 65);
        assert_eq!(SignedTransaction::from_bytes(&bytes, "STM").unwrap(), signed);
    }

    #[test]
    fn add_signature_rejects_bad_shapes() {
        let mut signed = SignedTransaction::new(sample());
        assert!(matches!(signed.add_signature("abcd"), Err(Error::SignatureFormat(_))));
        assert!(matches!(
            signed.add_signature(&"zz".repeat(65)),
            Err(Error::SignatureFormat(_))
        ));
        assert!(signed.signatures().is_empty());
    }

    #[test]
    fn deserialize_checks_signatures() {
        let mut json = serde_json::to_value(SignedTransaction::new(sample())).unwrap();

        json["signatures"] = json!(["AB".repeat(65)]);
        let signed: SignedTransaction = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(signed.signatures(), ["ab".repeat(65)]);

        json["signatures"] = json!(["abcd"]);
        assert!(serde_json::from_value::<SignedTransaction>(json.clone()).is_err());

        json["signatures"] = json!(["zz".repeat(65)]);
        assert!(serde_json::from_value::<SignedTransaction>(json).is_err());
    }

    #[test]
    fn account_helpers_take_authorities() {
        let key: PublicKey = "STM8m5UgaFAAYQRuaNejYdS8FVLVp9Ss3K1qAVk5de6F8s3HnVbvA".parse().unwrap();
        let auth = Authority::single_key(key.clone());

        let update = Operation::account_update("alice", None, None, Some(&auth), &key, "{}").unwrap();
        assert_eq!(update.schema().unwrap().id, 10);
        assert!(update.params()["owner"].is_null());
        assert_eq!(update.params()["posting"]["key_auths"][0][0], key.to_string());
        assert_eq!(update.params()["posting"]["key_auths"][0][1], 1);

        let create = Operation::account_create(
            Asset::new(3_000, AssetSymbol::Steem),
            "alice",
            "bob",
            &auth,
            &auth,
            &auth,
            &key,
            "",
        )
        .unwrap();
        assert_eq!(create.schema().unwrap().id, 9);
        assert_eq!(create.params()["fee"], "3.000 STEEM");
        assert_eq!(create.params()["active"]["weight_threshold"], 1);
    }
}
