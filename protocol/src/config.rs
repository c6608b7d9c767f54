//! # Protocol Configuration & Constants
//!
//! Every magic number the wire format depends on lives here. If you're
//! hardcoding a constant somewhere else, you're doing it wrong and you owe
//! the team coffee.
//!
//! Two values differ between networks and are therefore not constants:
//! the chain id (mixed into every signed digest) and the address prefix
//! (embedded in every textual public key). Both travel together in a
//! [`ChainConfig`]. Loading one from a file is the host's business; this
//! module only knows how to describe and validate it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Network Identifiers
// ---------------------------------------------------------------------------

/// Address prefix used by the main network. Every public key string starts
/// with it: `STM8m5Uga...`.
pub const MAINNET_ADDRESS_PREFIX: &str = "STM";

/// Address prefix used by the public test network.
pub const TESTNET_ADDRESS_PREFIX: &str = "TST";

/// Main network chain id. Yes, it's all zeros. The mainnet launched before
/// anyone thought replay protection across networks would matter.
pub const MAINNET_CHAIN_ID: [u8; 32] = [0u8; 32];

/// Test network chain id, hex-encoded.
pub const TESTNET_CHAIN_ID_HEX: &str =
    "46d82ab7d8db682eb1959aed0ada039a6d49afa1602491f93dde9cac3e8e6c32";

/// Length of the textual address prefix. Public key parsing splits on this.
pub const ADDRESS_PREFIX_LENGTH: usize = 3;

// ---------------------------------------------------------------------------
// Key & Signature Parameters
// ---------------------------------------------------------------------------

/// Version byte prepended to private keys before Base58 encoding (WIF).
pub const WIF_NETWORK_ID: u8 = 0x80;

/// Raw secp256k1 secret scalar length.
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// Compressed secp256k1 point length.
pub const PUBLIC_KEY_LENGTH: usize = 33;

/// Trailing checksum length on every Base58 key encoding.
pub const KEY_CHECKSUM_LENGTH: usize = 4;

/// Wire signature length: one recovery header byte plus compact (r, s).
pub const SIGNATURE_LENGTH: usize = 65;

/// Hex length of a wire signature. External tools hand us these.
pub const SIGNATURE_HEX_LENGTH: usize = SIGNATURE_LENGTH * 2;

/// Length of the digest that gets signed. Always a SHA-256 output.
pub const DIGEST_LENGTH: usize = 32;

/// Number of digest bytes that make up a transaction id.
pub const TRANSACTION_ID_LENGTH: usize = 20;

/// Default role used by brain-wallet style login key derivation.
pub const DEFAULT_LOGIN_ROLE: &str = "active";

// ---------------------------------------------------------------------------
// Serialization Parameters
// ---------------------------------------------------------------------------

/// Asset symbols are stored in exactly this many bytes, zero padded.
pub const MAX_ASSET_SYMBOL_LENGTH: usize = 7;

/// A varint32 never needs more than five 7-bit groups.
pub const MAX_VARINT32_BYTES: usize = 5;

/// Starting capacity for scratch buffers. Most operations fit comfortably.
pub const DEFAULT_BUFFER_CAPACITY: usize = 16;

// ---------------------------------------------------------------------------
// Memo Encryption Parameters
// ---------------------------------------------------------------------------

/// Text fields starting with this character are encrypted memos.
pub const MEMO_PREFIX: char = '#';

/// AES-256 key length in bytes.
pub const AES_KEY_LENGTH: usize = 32;

/// AES-CBC initialization vector length in bytes.
pub const AES_IV_LENGTH: usize = 16;

// ---------------------------------------------------------------------------
// Transaction Timing
// ---------------------------------------------------------------------------

/// How far past the chain head a freshly built transaction expires.
pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(60);

/// The ledger refuses transactions that expire further out than this.
pub const MAX_EXPIRATION: Duration = Duration::from_secs(3600);

// ---------------------------------------------------------------------------
// ChainConfig
// ---------------------------------------------------------------------------

/// Per-network parameters that feed the digest and key encodings.
///
/// Serializes with the chain id as a hex string so that a config can be
/// dropped into a JSON or TOML file without ceremony:
///
/// ```
/// use steem_protocol::config::ChainConfig;
///
/// let json = r#"{"chain_id":"0000000000000000000000000000000000000000000000000000000000000000","address_prefix":"STM"}"#;
/// let config: ChainConfig = serde_json::from_str(json).unwrap();
/// assert_eq!(config, ChainConfig::mainnet());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Bytes prepended to the serialized transaction before hashing.
    #[serde(with = "hex_chain_id")]
    pub chain_id: [u8; 32],

    /// Three-character prefix of textual public keys.
    pub address_prefix: String,
}

impl ChainConfig {
    /// Main network parameters.
    pub fn mainnet() -> Self {
        Self {
            chain_id: MAINNET_CHAIN_ID,
            address_prefix: MAINNET_ADDRESS_PREFIX.to_string(),
        }
    }

    /// Public test network parameters.
    pub fn testnet() -> Self {
        let mut chain_id = [0u8; 32];
        // The constant is a compile-time literal of the right length.
        if let Ok(bytes) = hex::decode(TESTNET_CHAIN_ID_HEX) {
            chain_id.copy_from_slice(&bytes);
        }
        Self {
            chain_id,
            address_prefix: TESTNET_ADDRESS_PREFIX.to_string(),
        }
    }

    /// Builds a config for a private network.
    pub fn custom(chain_id: [u8; 32], address_prefix: &str) -> Result<Self> {
        let config = Self {
            chain_id,
            address_prefix: address_prefix.to_string(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that the prefix can actually be split back off a key string.
    pub fn validate(&self) -> Result<()> {
        let prefix = &self.address_prefix;
        if prefix.len() != ADDRESS_PREFIX_LENGTH || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::Config(format!(
                "address prefix must be {ADDRESS_PREFIX_LENGTH} ASCII alphanumerics, got {prefix:?}"
            )));
        }
        Ok(())
    }

    /// Hex-encoded chain id, as node APIs report it.
    pub fn chain_id_hex(&self) -> String {
        hex::encode(self.chain_id)
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}

mod hex_chain_id {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| de::Error::custom("chain id must be exactly 32 bytes"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
