//! # Key Management
//!
//! secp256k1 private and public keys with the ledger's textual encodings.
//!
//! ## Encodings
//!
//! - **Private keys** use Wallet Import Format: Base58 of
//!   `0x80 || key || sha256(sha256(0x80 || key))[0..4]`.
//! - **Public keys** are a three-character network prefix followed by
//!   Base58 of `compressed_point || ripemd160(compressed_point)[0..4]`.
//!
//! Both checksums are verified on decode. A typo'd key that happens to
//! decode to the right length is rejected with
//! [`Error::ChecksumMismatch`] instead of silently becoming someone else's
//! key.
//!
//! ## Security considerations
//!
//! - `PrivateKey` does not implement `Serialize`, `Display` or a leaky
//!   `Debug`. Getting the secret out is always an explicit `to_wif()` or
//!   `to_bytes()` call.
//! - The scalar is erased on drop, best effort. Copies you make with
//!   `to_bytes()` are yours to clean up.
//! - Key bytes are never logged. If you add logging to this module,
//!   you will be asked to leave.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use secp256k1::{ecdh, PublicKey as SecpPublicKey, SecretKey, SECP256K1};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::hash::{double_sha256, ripemd160, sha256, sha512};
use super::signatures::Signature;
use crate::config::{
    ADDRESS_PREFIX_LENGTH, DEFAULT_LOGIN_ROLE, KEY_CHECKSUM_LENGTH, MAINNET_ADDRESS_PREFIX,
    PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH, WIF_NETWORK_ID,
};
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// PrivateKey
// ---------------------------------------------------------------------------

/// A secp256k1 secret scalar.
///
/// # Examples
///
/// ```
/// use steem_protocol::crypto::PrivateKey;
///
/// let key = PrivateKey::from_wif("5JdeC9P7Pbd1uGdFVEsJ41EkEnADbbHGq6p1BwFxm6txNBsQnsw").unwrap();
/// assert_eq!(
///     key.public_key().to_wif(),
///     "STM8m5UgaFAAYQRuaNejYdS8FVLVp9Ss3K1qAVk5de6F8s3HnVbvA"
/// );
/// ```
pub struct PrivateKey {
    secret: SecretKey,
}

impl PrivateKey {
    /// Generates a fresh key from the OS RNG.
    pub fn generate() -> Self {
        Self {
            secret: SecretKey::new(&mut secp256k1::rand::thread_rng()),
        }
    }

    /// Wraps 32 raw bytes. Fails if they are not a valid scalar (zero, or
    /// not below the curve order).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PRIVATE_KEY_LENGTH {
            return Err(Error::InvalidKey(format!(
                "private key must be {PRIVATE_KEY_LENGTH} bytes, got {}",
                bytes.len()
            )));
        }
        let secret = SecretKey::from_slice(bytes)
            .map_err(|_| Error::InvalidKey("not a valid secp256k1 scalar".into()))?;
        Ok(Self { secret })
    }

    /// Parses a hex-encoded 32-byte scalar.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| Error::InvalidKey(format!("private key hex: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Decodes a Wallet Import Format string.
    pub fn from_wif(wif: &str) -> Result<Self> {
        let raw = bs58::decode(wif)
            .into_vec()
            .map_err(|e| Error::InvalidKey(format!("private key base58: {e}")))?;

        let expected = 1 + PRIVATE_KEY_LENGTH + KEY_CHECKSUM_LENGTH;
        if raw.len() != expected {
            return Err(Error::InvalidKey(format!(
                "WIF must decode to {expected} bytes, got {}",
                raw.len()
            )));
        }
        if raw[0] != WIF_NETWORK_ID {
            return Err(Error::InvalidKey(format!(
                "unexpected WIF version byte 0x{:02x}",
                raw[0]
            )));
        }

        let (payload, checksum) = raw.split_at(1 + PRIVATE_KEY_LENGTH);
        if double_sha256(payload)[..KEY_CHECKSUM_LENGTH] != *checksum {
            return Err(Error::ChecksumMismatch("private key WIF checksum".into()));
        }

        Self::from_bytes(&payload[1..])
    }

    /// Derives a key as `sha256(seed)`.
    pub fn from_seed(seed: &[u8]) -> Result<Self> {
        Self::from_bytes(&sha256(seed))
    }

    /// Derives the key a user gets from their account name and password.
    ///
    /// The seed is `username ++ role ++ password`. `role` defaults to
    /// `"active"`; the other roles in common use are `"owner"`, `"posting"`
    /// and `"memo"`.
    pub fn from_login(username: &str, password: &str, role: Option<&str>) -> Result<Self> {
        let role = role.unwrap_or(DEFAULT_LOGIN_ROLE);
        let seed = format!("{username}{role}{password}");
        Self::from_seed(seed.as_bytes())
    }

    /// Encodes the key as WIF. This prints your secret. Mean it.
    pub fn to_wif(&self) -> String {
        let mut payload = Vec::with_capacity(1 + PRIVATE_KEY_LENGTH + KEY_CHECKSUM_LENGTH);
        payload.push(WIF_NETWORK_ID);
        payload.extend_from_slice(&self.secret.secret_bytes());
        let checksum = double_sha256(&payload);
        payload.extend_from_slice(&checksum[..KEY_CHECKSUM_LENGTH]);
        bs58::encode(payload).into_string()
    }

    /// Raw scalar bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.secret.secret_bytes()
    }

    /// Derives the public key with an explicit address prefix, or the
    /// mainnet prefix when `None`.
    pub fn create_public(&self, prefix: Option<&str>) -> PublicKey {
        let point = SecpPublicKey::from_secret_key(SECP256K1, &self.secret);
        PublicKey {
            bytes: point.serialize(),
            prefix: prefix.unwrap_or(MAINNET_ADDRESS_PREFIX).to_string(),
        }
    }

    /// Derives the public key with the mainnet prefix.
    pub fn public_key(&self) -> PublicKey {
        self.create_public(None)
    }

    /// Signs a 32-byte digest. See [`Signature::sign_digest`].
    pub fn sign(&self, digest: &[u8; 32]) -> Signature {
        Signature::sign_digest(self, digest)
    }

    /// Signs `sha256(data)`.
    pub fn sign_buffer(&self, data: &[u8]) -> Signature {
        self.sign(&sha256(data))
    }

    /// ECDH shared secret with a peer: `sha512(x-coordinate of d·Q)`.
    ///
    /// This is NOT the raw ECDH output. The compressed shared point's parity
    /// byte is discarded and the remaining 32 bytes are run through SHA-512.
    /// Only the memo subsystem should need this.
    pub fn get_shared_secret(&self, peer: &PublicKey) -> Result<[u8; 64]> {
        let point = peer.to_secp()?;
        let shared = ecdh::shared_secret_point(&point, &self.secret);
        Ok(sha512(&shared[..32]))
    }

    pub(crate) fn secret(&self) -> &SecretKey {
        &self.secret
    }
}

impl Clone for PrivateKey {
    /// Cloning a private key is allowed but should make you uncomfortable.
    fn clone(&self) -> Self {
        Self { secret: self.secret }
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.secret.non_secure_erase();
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Public half only. A partial leak is still a leak.
        write!(f, "PrivateKey(pub={})", self.public_key())
    }
}

impl PartialEq for PrivateKey {
    /// Compared through the public key, never the scalar.
    fn eq(&self, other: &Self) -> bool {
        self.public_key() == other.public_key()
    }
}

impl Eq for PrivateKey {}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// A compressed secp256k1 point plus the address prefix it is displayed with.
///
/// Equality and hashing look at the point only: `STM…` and `TST…` renderings
/// of the same point are the same key.
///
/// The all-zero point is the *null key*. It is not on the curve and cannot
/// verify anything, but the ledger uses it as an explicit "no key" value
/// (e.g. to clear a witness signing key), so it parses, prints and
/// serializes like any other key.
#[derive(Clone)]
pub struct PublicKey {
    bytes: [u8; PUBLIC_KEY_LENGTH],
    prefix: String,
}

impl PublicKey {
    /// Parses a 33-byte compressed or 65-byte uncompressed point, with the
    /// mainnet prefix. 33 zero bytes yield the null key.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() == PUBLIC_KEY_LENGTH && bytes.iter().all(|b| *b == 0) {
            return Ok(Self::null(MAINNET_ADDRESS_PREFIX));
        }
        let point = SecpPublicKey::from_slice(bytes)
            .map_err(|_| Error::InvalidKey("not a valid secp256k1 point".into()))?;
        Ok(Self {
            bytes: point.serialize(),
            prefix: MAINNET_ADDRESS_PREFIX.to_string(),
        })
    }

    /// The null key with the given prefix.
    pub fn null(prefix: &str) -> Self {
        Self {
            bytes: [0u8; PUBLIC_KEY_LENGTH],
            prefix: prefix.to_string(),
        }
    }

    /// Returns `true` for the all-zero sentinel.
    pub fn is_null(&self) -> bool {
        self.bytes.iter().all(|b| *b == 0)
    }

    /// Same point, different display prefix.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// Parses `PREFIX + Base58(point || ripemd160(point)[0..4])`.
    ///
    /// The first three characters are taken as the prefix, whatever they
    /// are. Callers that care which network a key belongs to should compare
    /// [`prefix`](Self::prefix) themselves.
    pub fn from_wif(text: &str) -> Result<Self> {
        let (prefix, encoded) = match (text.get(..ADDRESS_PREFIX_LENGTH), text.get(ADDRESS_PREFIX_LENGTH..)) {
            (Some(prefix), Some(encoded)) if !encoded.is_empty() => (prefix, encoded),
            _ => return Err(Error::InvalidKey(format!("public key too short: {text:?}"))),
        };

        let raw = bs58::decode(encoded)
            .into_vec()
            .map_err(|e| Error::InvalidKey(format!("public key base58: {e}")))?;
        if raw.len() != PUBLIC_KEY_LENGTH + KEY_CHECKSUM_LENGTH {
            return Err(Error::InvalidKey(format!(
                "public key must decode to {} bytes, got {}",
                PUBLIC_KEY_LENGTH + KEY_CHECKSUM_LENGTH,
                raw.len()
            )));
        }

        let (point, checksum) = raw.split_at(PUBLIC_KEY_LENGTH);
        if ripemd160(point)[..KEY_CHECKSUM_LENGTH] != *checksum {
            return Err(Error::ChecksumMismatch("public key checksum".into()));
        }

        Ok(Self::from_bytes(point)?.with_prefix(prefix))
    }

    /// Encodes as `PREFIX + Base58(point || ripemd160(point)[0..4])`.
    pub fn to_wif(&self) -> String {
        let checksum = ripemd160(&self.bytes);
        let mut payload = Vec::with_capacity(PUBLIC_KEY_LENGTH + KEY_CHECKSUM_LENGTH);
        payload.extend_from_slice(&self.bytes);
        payload.extend_from_slice(&checksum[..KEY_CHECKSUM_LENGTH]);
        format!("{}{}", self.prefix, bs58::encode(payload).into_string())
    }

    /// The compressed point.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.bytes
    }

    /// The display prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Verifies a signature over a 32-byte digest.
    ///
    /// Returns `false` for the null key, malformed signatures, or a mismatch.
    /// No error oracle: callers just want a yes or a no.
    pub fn verify(&self, digest: &[u8; 32], signature: &Signature) -> bool {
        signature.verify(digest, self)
    }

    pub(crate) fn to_secp(&self) -> Result<SecpPublicKey> {
        if self.is_null() {
            return Err(Error::InvalidKey("the null key has no curve point".into()));
        }
        SecpPublicKey::from_slice(&self.bytes)
            .map_err(|_| Error::InvalidKey("not a valid secp256k1 point".into()))
    }

    pub(crate) fn from_secp(point: &SecpPublicKey) -> Self {
        Self {
            bytes: point.serialize(),
            prefix: MAINNET_ADDRESS_PREFIX.to_string(),
        }
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for PublicKey {}

impl Hash for PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wif())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_wif())
    }
}

impl FromStr for PublicKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_wif(s)
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wif())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_wif(&text).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const WIF: &str = "5JdeC9P7Pbd1uGdFVEsJ41EkEnADbbHGq6p1BwFxm6txNBsQnsw";
    const PUB: &str = "STM8m5UgaFAAYQRuaNejYdS8FVLVp9Ss3K1qAVk5de6F8s3HnVbvA";

    #[test]
    fn known_wif_derives_known_public_key() {
        let key = PrivateKey::from_wif(WIF).unwrap();
        assert_eq!(key.create_public(None).to_wif(), PUB);
    }

    #[test]
    fn private_wif_roundtrip() {
        let key = PrivateKey::from_wif(WIF).unwrap();
        assert_eq!(key.to_wif(), WIF);
        let again = PrivateKey::from_wif(&key.to_wif()).unwrap();
        assert_eq!(again.to_wif(), key.to_wif());
    }

    #[test]
    fn generated_key_wif_roundtrip() {
        let key = PrivateKey::generate();
        let restored = PrivateKey::from_wif(&key.to_wif()).unwrap();
        assert_eq!(restored.to_bytes(), key.to_bytes());
    }

    #[test]
    fn public_wif_roundtrip() {
        let key = PublicKey::from_wif(PUB).unwrap();
        assert_eq!(key.prefix(), "STM");
        assert_eq!(key.to_wif(), PUB);
    }

    #[test]
    fn corrupted_private_wif_fails_checksum() {
        let mut raw = bs58::decode(WIF).into_vec().unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let tampered = bs58::encode(raw).into_string();
        assert!(matches!(
            PrivateKey::from_wif(&tampered),
            Err(Error::ChecksumMismatch(_))
        ));
    }

    #[test]
    fn corrupted_public_key_fails_checksum() {
        let key = PublicKey::from_wif(PUB).unwrap();
        let mut payload = key.as_bytes().to_vec();
        payload.extend_from_slice(&[0, 0, 0, 0]);
        let tampered = format!("STM{}", bs58::encode(payload).into_string());
        assert!(matches!(
            PublicKey::from_wif(&tampered),
            Err(Error::ChecksumMismatch(_))
        ));
    }

    #[test]
    fn wrong_version_byte_rejected() {
        let mut payload = vec![0x81];
        payload.extend_from_slice(&[7u8; 32]);
        let checksum = double_sha256(&payload);
        payload.extend_from_slice(&checksum[..4]);
        let wif = bs58::encode(payload).into_string();
        assert!(matches!(PrivateKey::from_wif(&wif), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn invalid_scalars_rejected() {
        assert!(PrivateKey::from_bytes(&[0u8; 32]).is_err());
        assert!(PrivateKey::from_bytes(&[0xFFu8; 32]).is_err());
        assert!(PrivateKey::from_bytes(&[1u8; 31]).is_err());
    }

    #[test]
    fn invalid_point_rejected() {
        assert!(PublicKey::from_bytes(&[0x09u8; 33]).is_err());
        assert!(PublicKey::from_bytes(&[0x02u8; 20]).is_err());
    }

    #[test]
    fn login_derivation_matches_manual_seed() {
        let derived = PrivateKey::from_login("alice", "hunter2", None).unwrap();
        let manual = PrivateKey::from_seed(b"aliceactivehunter2").unwrap();
        assert_eq!(derived.to_bytes(), manual.to_bytes());

        let posting = PrivateKey::from_login("alice", "hunter2", Some("posting")).unwrap();
        assert_ne!(posting.to_bytes(), derived.to_bytes());
    }

    #[test]
    fn create_public_respects_prefix() {
        let key = PrivateKey::from_wif(WIF).unwrap();
        let testnet = key.create_public(Some("TST"));
        assert!(testnet.to_wif().starts_with("TST"));
        assert_eq!(testnet, key.public_key());
        let reparsed = PublicKey::from_wif(&testnet.to_wif()).unwrap();
        assert_eq!(reparsed.prefix(), "TST");
    }

    #[test]
    fn null_key_roundtrip() {
        let null = PublicKey::null("STM");
        assert!(null.is_null());
        let text = null.to_wif();
        assert!(text.starts_with(&format!("STM{}", "1".repeat(33))));
        let parsed = PublicKey::from_wif(&text).unwrap();
        assert!(parsed.is_null());
        assert_eq!(parsed.as_bytes(), &[0u8; 33]);
    }

    #[test]
    fn shared_secret_is_symmetric() {
        let alice = PrivateKey::generate();
        let bob = PrivateKey::generate();
        let ab = alice.get_shared_secret(&bob.public_key()).unwrap();
        let ba = bob.get_shared_secret(&alice.public_key()).unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn shared_secret_with_null_key_fails() {
        let alice = PrivateKey::generate();
        assert!(alice.get_shared_secret(&PublicKey::null("STM")).is_err());
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let key = PrivateKey::from_wif(WIF).unwrap();
        let debug = format!("{key:?}");
        assert!(debug.contains(PUB));
        assert!(!debug.contains(WIF));
        assert!(!debug.contains(&hex::encode(key.to_bytes())));
    }

    #[test]
    fn public_key_serde_as_string() {
        let key = PublicKey::from_wif(PUB).unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, format!("\"{PUB}\""));
        let back: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn short_public_key_text_rejected() {
        assert!(PublicKey::from_wif("STM").is_err());
        assert!(PublicKey::from_wif("ST").is_err());
        assert!(PublicKey::from_wif("STM0OIl").is_err());
    }
}
