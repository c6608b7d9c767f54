//! # Cryptographic Primitives
//!
//! Everything the ledger's security model touches flows through here:
//!
//! - **secp256k1** for keys, recoverable ECDSA signatures and ECDH.
//! - **SHA-256 / SHA-512 / RIPEMD-160** for digests and checksums.
//! - **AES-256-CBC** for memo payloads.
//!
//! None of it is negotiable. These are the consensus network's choices and a
//! client that deviates produces transactions nobody will accept.
//!
//! ## A note on "rolling your own crypto"
//!
//! We don't. Everything here is a thin, type-safe wrapper around audited
//! implementations (libsecp256k1 and RustCrypto). The only logic of our own
//! is encoding: WIF, key checksums, the recovery header byte.

pub mod encryption;
pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{double_sha256, ripemd160, sha256, sha256_multi, sha512};
pub use keys::{PrivateKey, PublicKey};
pub use signatures::{KeyForm, RecoveryHeader, Signature};
