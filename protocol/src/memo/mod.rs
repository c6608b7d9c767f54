//! # Encrypted Memos
//!
//! Transfers carry a free-text memo. A memo that starts with `#` is private:
//! its body is encrypted so that only the sender and the recipient can read
//! it.
//!
//! ## Scheme
//!
//! 1. `shared = sha512(x(sender_priv · recipient_pub))`. Symmetric, so
//!    either party's private key with the other's public key gives the
//!    same secret.
//! 2. `material = sha512(u64_le(nonce) || shared)`.
//! 3. AES-256-CBC with `key = material[0..32]`, `iv = material[32..48]`
//!    over the length-prefixed memo text.
//! 4. `check = u32_le(sha256(material)[0..4])` goes in the envelope so a
//!    wrong key is caught before decryption.
//! 5. The [`MemoEnvelope`] is Base58-encoded and prefixed with `#`.
//!
//! ## Self-check
//!
//! The first encode or decode on a [`MemoCipher`] runs a known-answer
//! round trip. If it fails, every later call returns
//! [`Error::EnvironmentUnsupported`] rather than producing memos nobody can
//! read. The result is cached per cipher instance.

pub mod envelope;
pub mod nonce;

use std::sync::OnceLock;

use tracing::{debug, warn};

pub use envelope::MemoEnvelope;
pub use nonce::NonceGenerator;

use crate::codec::ByteBuffer;
use crate::config::{ChainConfig, AES_IV_LENGTH, AES_KEY_LENGTH, MEMO_PREFIX};
use crate::crypto::encryption::{decrypt, encrypt};
use crate::crypto::{sha256, sha512, PrivateKey, PublicKey};
use crate::error::{Error, Result};

const SELF_CHECK_WIF: &str = "5JdeC9P7Pbd1uGdFVEsJ41EkEnADbbHGq6p1BwFxm6txNBsQnsw";
const SELF_CHECK_PUBLIC_KEY: &str = "STM8m5UgaFAAYQRuaNejYdS8FVLVp9Ss3K1qAVk5de6F8s3HnVbvA";
const SELF_CHECK_MEMO: &str = "#memo爱";

/// Per-message symmetric parameters.
struct MemoKeys {
    key: [u8; AES_KEY_LENGTH],
    iv: [u8; AES_IV_LENGTH],
    check: u32,
}

fn derive_keys(private: &PrivateKey, public: &PublicKey, nonce: u64) -> Result<MemoKeys> {
    let shared = private.get_shared_secret(public)?;

    let mut seed = ByteBuffer::with_capacity(8 + shared.len());
    seed.write_u64(nonce)?;
    seed.write_bytes(&shared)?;
    let material = sha512(seed.written());

    let mut key = [0u8; AES_KEY_LENGTH];
    key.copy_from_slice(&material[..AES_KEY_LENGTH]);
    let mut iv = [0u8; AES_IV_LENGTH];
    iv.copy_from_slice(&material[AES_KEY_LENGTH..AES_KEY_LENGTH + AES_IV_LENGTH]);
    let digest = sha256(&material);
    let check = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]);

    Ok(MemoKeys { key, iv, check })
}

/// Encrypts and decrypts `#`-prefixed memos.
///
/// Holds the nonce generator and the cached self-check result, so share one
/// instance rather than building a new one per memo.
///
/// ```
/// use steem_protocol::crypto::PrivateKey;
/// use steem_protocol::memo::MemoCipher;
///
/// let alice = PrivateKey::from_seed(b"alice").unwrap();
/// let bob = PrivateKey::from_seed(b"bob").unwrap();
///
/// let cipher = MemoCipher::default();
/// let sealed = cipher.encode(&alice, &bob.public_key(), "#lunch?").unwrap();
/// assert!(sealed.starts_with('#'));
/// assert_eq!(cipher.decode(&bob, &sealed).unwrap(), "#lunch?");
/// ```
#[derive(Debug)]
pub struct MemoCipher {
    config: ChainConfig,
    nonces: NonceGenerator,
    self_check: OnceLock<bool>,
}

impl Default for MemoCipher {
    fn default() -> Self {
        Self::new(ChainConfig::default())
    }
}

impl MemoCipher {
    /// `config` supplies the address prefix for keys placed in envelopes.
    pub fn new(config: ChainConfig) -> Self {
        Self {
            config,
            nonces: NonceGenerator::new(),
            self_check: OnceLock::new(),
        }
    }

    /// Runs (once) and reports the known-answer self-check.
    pub fn check_encryption(&self) -> Result<()> {
        let passed = *self.self_check.get_or_init(|| {
            let outcome = run_self_check(&self.config, &self.nonces);
            match &outcome {
                Ok(()) => debug!("memo encryption self-check passed"),
                Err(e) => warn!(error = %e, "memo encryption self-check failed"),
            }
            outcome.is_ok()
        });
        if passed {
            Ok(())
        } else {
            Err(Error::EnvironmentUnsupported)
        }
    }

    /// Encrypts `memo` from `sender` to `recipient`.
    ///
    /// Text not starting with `#` is public and comes back unchanged.
    pub fn encode(&self, sender: &PrivateKey, recipient: &PublicKey, memo: &str) -> Result<String> {
        if !memo.starts_with(MEMO_PREFIX) {
            return Ok(memo.to_string());
        }
        self.check_encryption()?;
        seal(&self.config, sender, recipient, memo, self.nonces.next_nonce())
    }

    /// Like [`encode`](Self::encode) with a caller-chosen nonce.
    ///
    /// Reusing a nonce with the same key pair reuses the AES key and IV.
    /// Only tests and reproducible fixtures should call this.
    pub fn encode_with_nonce(
        &self,
        sender: &PrivateKey,
        recipient: &PublicKey,
        memo: &str,
        nonce: u64,
    ) -> Result<String> {
        if !memo.starts_with(MEMO_PREFIX) {
            return Ok(memo.to_string());
        }
        self.check_encryption()?;
        seal(&self.config, sender, recipient, memo, nonce)
    }

    /// Decrypts a memo with either party's private key.
    ///
    /// Text not starting with `#` comes back unchanged. The result keeps its
    /// leading `#`.
    ///
    /// # Errors
    ///
    /// - [`Error::ChecksumMismatch`] if `private_key` belongs to neither
    ///   party. No decryption is attempted in that case.
    /// - [`Error::Serialization`] for malformed Base58, envelopes or
    ///   ciphertext.
    pub fn decode(&self, private_key: &PrivateKey, memo: &str) -> Result<String> {
        if !memo.starts_with(MEMO_PREFIX) {
            return Ok(memo.to_string());
        }
        self.check_encryption()?;
        open(&self.config, private_key, memo)
    }
}

fn run_self_check(config: &ChainConfig, nonces: &NonceGenerator) -> Result<()> {
    let key = PrivateKey::from_wif(SELF_CHECK_WIF)?;
    let public = PublicKey::from_wif(SELF_CHECK_PUBLIC_KEY)?;
    let sealed = seal(config, &key, &public, SELF_CHECK_MEMO, nonces.next_nonce())?;
    let opened = open(config, &key, &sealed)?;
    if opened == SELF_CHECK_MEMO {
        Ok(())
    } else {
        Err(Error::EnvironmentUnsupported)
    }
}

fn seal(config: &ChainConfig, sender: &PrivateKey, recipient: &PublicKey, memo: &str, nonce: u64) -> Result<String> {
    let body = memo.strip_prefix(MEMO_PREFIX).unwrap_or(memo);
    let keys = derive_keys(sender, recipient, nonce)?;

    let mut plaintext = ByteBuffer::new();
    plaintext.write_vstring(body)?;
    let encrypted = encrypt(&keys.key, &keys.iv, plaintext.written());

    let envelope = MemoEnvelope {
        from: sender.create_public(Some(&config.address_prefix)),
        to: recipient.clone().with_prefix(&config.address_prefix),
        nonce,
        check: keys.check,
        encrypted,
    };
    let encoded = bs58::encode(envelope.to_bytes()?).into_string();
    Ok(format!("{MEMO_PREFIX}{encoded}"))
}

fn open(config: &ChainConfig, private_key: &PrivateKey, memo: &str) -> Result<String> {
    let body = memo.strip_prefix(MEMO_PREFIX).unwrap_or(memo);
    let raw = bs58::decode(body)
        .into_vec()
        .map_err(|e| Error::serialization("memo", format!("invalid base58: {e}")))?;
    let envelope = MemoEnvelope::from_bytes(&raw, &config.address_prefix).map_err(|e| e.within("memo"))?;

    let own = private_key.public_key();
    let counterparty = if own == envelope.from { &envelope.to } else { &envelope.from };

    let keys = derive_keys(private_key, counterparty, envelope.nonce)?;
    if keys.check != envelope.check {
        return Err(Error::ChecksumMismatch("memo key check failed; wrong private key".into()));
    }

    let plaintext = decrypt(&keys.key, &keys.iv, &envelope.encrypted)
        .map_err(|e| Error::serialization("memo.encrypted", e.to_string()))?;

    // Older clients encrypted the raw UTF-8 without a length prefix.
    let mut buf = ByteBuffer::wrap(&plaintext);
    buf.mark();
    let text = match buf.read_vstring() {
        Ok(text) => text,
        Err(_) => {
            buf.reset();
            String::from_utf8_lossy(buf.readable()).into_owned()
        }
    };
    Ok(format!("{MEMO_PREFIX}{text}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
