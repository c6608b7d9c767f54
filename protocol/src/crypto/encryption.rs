//! # AES-256-CBC Encryption
//!
//! The memo format predates AEAD being the obvious default, so memos are
//! AES-256 in CBC mode with PKCS#7 padding. Integrity comes from elsewhere:
//! the memo envelope carries a checksum of the key material, and a wrong key
//! almost always surfaces as a padding error on decrypt.
//!
//! Don't reach for this outside the memo subsystem. If you need to encrypt
//! something new, use an AEAD.

use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use thiserror::Error;

use crate::config::{AES_IV_LENGTH, AES_KEY_LENGTH};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Errors that can occur during encryption/decryption.
///
/// Deliberately vague about *why* a decryption failed.
#[derive(Debug, Error)]
pub enum EncryptionError {
    #[error("decryption failed -- wrong key or corrupted ciphertext")]
    DecryptFailed,
}

/// Encrypts `plaintext` with AES-256-CBC and PKCS#7 padding.
///
/// Output length is the plaintext length rounded up to the next multiple of
/// 16 (a full block of padding when it is already aligned).
///
/// # Example
///
/// ```
/// use steem_protocol::crypto::encryption::{decrypt, encrypt};
///
/// let key = [0x42u8; 32];
/// let iv = [0x24u8; 16];
/// let sealed = encrypt(&key, &iv, b"private memo");
/// assert_eq!(decrypt(&key, &iv, &sealed).unwrap(), b"private memo");
/// ```
pub fn encrypt(key: &[u8; AES_KEY_LENGTH], iv: &[u8; AES_IV_LENGTH], plaintext: &[u8]) -> Vec<u8> {
    Aes256CbcEnc::new(key.into(), iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}

/// Decrypts AES-256-CBC ciphertext and strips PKCS#7 padding.
///
/// # Errors
///
/// [`EncryptionError::DecryptFailed`] if the ciphertext is not a whole number
/// of blocks or the padding is invalid.
pub fn decrypt(
    key: &[u8; AES_KEY_LENGTH],
    iv: &[u8; AES_IV_LENGTH],
    ciphertext: &[u8],
) -> Result<Vec<u8>, EncryptionError> {
    Aes256CbcDec::new(key.into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| EncryptionError::DecryptFailed)
}
