//! # Hashing Utilities
//!
//! The ledger uses three hash functions and we refuse to add a fourth:
//!
//! - **SHA-256**: transaction digests, transaction ids, WIF checksums
//!   (doubled) and the memo key-material check.
//! - **SHA-512**: ECDH shared secrets and memo key material.
//! - **RIPEMD-160**: the 4-byte checksum suffix on public key strings.
//!
//! All functions return fixed-size arrays. Callers slice what they need.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};

/// SHA-256 of `data`.
///
/// # Example
///
/// ```
/// use steem_protocol::crypto::sha256;
///
/// let hash = sha256(b"");
/// assert_eq!(hex::encode(hash), "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// SHA-256 over several slices fed in order, without concatenating them.
///
/// Used for `sha256(chain_id || payload)` where the two halves live in
/// different places.
pub fn sha256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// `SHA-256(SHA-256(data))`, the WIF checksum construction.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// SHA-512 of `data`.
pub fn sha512(data: &[u8]) -> [u8; 64] {
    let mut out = [0u8; 64];
    out.copy_from_slice(&Sha512::digest(data));
    out
}

/// RIPEMD-160 of `data`.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(data).into()
}
