//! # Recoverable Signatures
//!
//! ECDSA over secp256k1 with the signer's public key recoverable from the
//! signature itself. Transactions carry signatures, never public keys; the
//! ledger recovers the key and checks it against the account's authorities.
//!
//! ## Wire format
//!
//! 65 bytes: one header byte followed by compact `r || s`.
//!
//! | key form     | header byte         |
//! |--------------|---------------------|
//! | compressed   | `31 + recovery_id`  |
//! | uncompressed | `27 + recovery_id`  |
//!
//! The header is modelled as [`RecoveryHeader`] rather than integer
//! arithmetic, so an out-of-range byte is an error at parse time instead of
//! a wrong key at recovery time.
//!
//! ## Canonical signatures
//!
//! The ledger only accepts signatures whose `r` and `s` both fit in 32 bytes
//! without the high bit set and without a redundant leading zero. libsecp256k1
//! already produces low-S signatures; signing retries with fresh supplemental
//! nonce data until the result is also canonical in this stricter sense.
//! Expect about four attempts on average.

use rand::rngs::OsRng;
use rand::RngCore;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId, Signature as EcdsaSignature};
use secp256k1::{Message, SECP256K1};
use tracing::trace;

use super::keys::{PrivateKey, PublicKey};
use crate::config::{DIGEST_LENGTH, SIGNATURE_HEX_LENGTH, SIGNATURE_LENGTH};
use crate::error::{Error, Result};

/// Header byte offset for signatures made with compressed keys.
const COMPRESSED_HEADER_BASE: u8 = 31;

/// Header byte offset for signatures made with uncompressed keys.
const UNCOMPRESSED_HEADER_BASE: u8 = 27;

// ---------------------------------------------------------------------------
// RecoveryHeader
// ---------------------------------------------------------------------------

/// Whether the signer's key was compressed when it signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyForm {
    /// 33-byte points. Everything this library produces.
    Compressed,
    /// 65-byte points. Only seen in signatures from very old tools.
    Uncompressed,
}

/// Key form and recovery id (0–3), packed into one byte on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecoveryHeader {
    form: KeyForm,
    recovery_id: u8,
}

impl RecoveryHeader {
    /// Builds a header. `recovery_id` must be 0–3.
    pub fn new(form: KeyForm, recovery_id: u8) -> Result<Self> {
        if recovery_id > 3 {
            return Err(Error::SignatureFormat(format!(
                "recovery id must be 0-3, got {recovery_id}"
            )));
        }
        Ok(Self { form, recovery_id })
    }

    /// Parses a wire header byte (27–34).
    pub fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            UNCOMPRESSED_HEADER_BASE..=30 => {
                Self::new(KeyForm::Uncompressed, byte - UNCOMPRESSED_HEADER_BASE)
            }
            COMPRESSED_HEADER_BASE..=34 => Self::new(KeyForm::Compressed, byte - COMPRESSED_HEADER_BASE),
            other => Err(Error::SignatureFormat(format!(
                "invalid recovery header byte {other}"
            ))),
        }
    }

    /// The wire header byte.
    pub fn to_byte(self) -> u8 {
        match self.form {
            KeyForm::Compressed => COMPRESSED_HEADER_BASE + self.recovery_id,
            KeyForm::Uncompressed => UNCOMPRESSED_HEADER_BASE + self.recovery_id,
        }
    }

    /// Key form of the signer.
    pub fn form(self) -> KeyForm {
        self.form
    }

    /// Recovery id, 0–3.
    pub fn recovery_id(self) -> u8 {
        self.recovery_id
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A recoverable ECDSA signature: header plus compact `(r, s)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    header: RecoveryHeader,
    compact: [u8; 64],
}

impl Signature {
    /// Signs a 32-byte digest, retrying until the signature is canonical.
    ///
    /// Each attempt feeds fresh random bytes into the RFC 6979 nonce
    /// derivation as supplemental data, so two signatures over the same
    /// digest differ but both verify.
    pub fn sign_digest(key: &PrivateKey, digest: &[u8; 32]) -> Self {
        let message = Message::from_digest(*digest);
        let mut extra = [0u8; 32];
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            OsRng.fill_bytes(&mut extra);
            let signature =
                SECP256K1.sign_ecdsa_recoverable_with_noncedata(&message, key.secret(), &extra);
            let (recovery_id, compact) = signature.serialize_compact();
            if is_canonical(&compact) {
                trace!(attempts, "produced canonical signature");
                // libsecp256k1 only ever hands out recovery ids 0..=3.
                let recovery_id = recovery_id.to_i32() as u8;
                return Self {
                    header: RecoveryHeader { form: KeyForm::Compressed, recovery_id },
                    compact,
                };
            }
        }
    }

    /// Assembles a signature from its parts.
    pub fn from_parts(header: RecoveryHeader, compact: [u8; 64]) -> Self {
        Self { header, compact }
    }

    /// Parses the 65-byte wire form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(Error::SignatureFormat(format!(
                "signature must be {SIGNATURE_LENGTH} bytes, got {}",
                bytes.len()
            )));
        }
        let header = RecoveryHeader::from_byte(bytes[0])?;
        let mut compact = [0u8; 64];
        compact.copy_from_slice(&bytes[1..]);
        Ok(Self { header, compact })
    }

    /// Parses the 130-character hex wire form.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        if hex_str.len() != SIGNATURE_HEX_LENGTH {
            return Err(Error::SignatureFormat(format!(
                "signature hex must be {SIGNATURE_HEX_LENGTH} characters, got {}",
                hex_str.len()
            )));
        }
        let bytes = hex::decode(hex_str)
            .map_err(|e| Error::SignatureFormat(format!("signature hex: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// 65-byte wire form: header byte then compact `(r, s)`.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut out = [0u8; SIGNATURE_LENGTH];
        out[0] = self.header.to_byte();
        out[1..].copy_from_slice(&self.compact);
        out
    }

    /// Hex of the wire form. This is what goes into `signatures` on a
    /// transaction.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// The recovery header.
    pub fn header(&self) -> RecoveryHeader {
        self.header
    }

    /// Compact `r || s`.
    pub fn compact(&self) -> &[u8; 64] {
        &self.compact
    }

    /// Returns `true` if the ledger would accept this `(r, s)` encoding.
    pub fn is_canonical(&self) -> bool {
        is_canonical(&self.compact)
    }

    /// Recovers the signer's public key from a 32-byte digest.
    pub fn recover_public_key(&self, digest: &[u8]) -> Result<PublicKey> {
        let digest: [u8; DIGEST_LENGTH] = digest.try_into().map_err(|_| {
            Error::SignatureFormat(format!(
                "message digest must be {DIGEST_LENGTH} bytes, got {}",
                digest.len()
            ))
        })?;
        let recovery_id = RecoveryId::from_i32(i32::from(self.header.recovery_id))
            .map_err(|_| Error::SignatureFormat("invalid recovery id".into()))?;
        let recoverable = RecoverableSignature::from_compact(&self.compact, recovery_id)
            .map_err(|_| Error::SignatureFormat("malformed compact signature".into()))?;
        let point = SECP256K1
            .recover_ecdsa(&Message::from_digest(digest), &recoverable)
            .map_err(|_| Error::SignatureFormat("public key recovery failed".into()))?;
        Ok(PublicKey::from_secp(&point))
    }

    /// Recovers the signer's public key from a 64-character hex digest.
    pub fn recover_public_key_hex(&self, digest_hex: &str) -> Result<PublicKey> {
        if digest_hex.len() != DIGEST_LENGTH * 2 {
            return Err(Error::SignatureFormat(format!(
                "message digest hex must be {} characters, got {}",
                DIGEST_LENGTH * 2,
                digest_hex.len()
            )));
        }
        let digest = hex::decode(digest_hex)
            .map_err(|e| Error::SignatureFormat(format!("digest hex: {e}")))?;
        self.recover_public_key(&digest)
    }

    /// Standard ECDSA verification against `public_key`.
    ///
    /// High-S encodings from other tools are normalized before checking.
    pub fn verify(&self, digest: &[u8; 32], public_key: &PublicKey) -> bool {
        let Ok(point) = public_key.to_secp() else {
            return false;
        };
        let Ok(mut signature) = EcdsaSignature::from_compact(&self.compact) else {
            return false;
        };
        signature.normalize_s();
        SECP256K1
            .verify_ecdsa(&Message::from_digest(*digest), &signature, &point)
            .is_ok()
    }
}

/// Canonical form check on compact `(r, s)`: no high bit, no padding zero.
fn is_canonical(compact: &[u8; 64]) -> bool {
    let half_ok = |half: &[u8]| half[0] & 0x80 == 0 && !(half[0] == 0 && half[1] & 0x80 == 0);
    half_ok(&compact[..32]) && half_ok(&compact[32..])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
