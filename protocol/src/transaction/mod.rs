//! # Transaction Module
//!
//! Building, hashing, signing and broadcasting ledger transactions.
//!
//! ## Architecture
//!
//! ```text
//! types.rs    Operation, UnsignedTransaction, SignedTransaction
//! signing.rs  digest, multi-signature signing, signer recovery
//! builder.rs  TransactionBuilder session and its collaborator traits
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Collect**: queue [`Operation`]s on a [`TransactionBuilder`].
//! 2. **Create**: anchor to the chain head (TaPoS) and set an expiration.
//! 3. **Sign**: one or more parties call [`sign_transaction`]; signatures
//!    accumulate.
//! 4. **Broadcast**: hand the result to a [`Broadcaster`].
//!
//! ## Design Decisions
//!
//! - The digest is `sha256(chain_id || canonical_bytes)`, so signatures are
//!   bound to one network.
//! - The transaction id is the first 20 bytes of `sha256(canonical_bytes)`,
//!   independent of the network and of who signed.
//! - Signatures are compact recoverable ECDSA with a canonical-`s` retry
//!   loop; see [`crate::crypto::signatures`].

pub mod builder;
pub mod signing;
pub mod types;

pub use builder::{BroadcastOutcome, Broadcaster, BuilderState, ChainHead, ChainHeadSource, TransactionBuilder};
pub use signing::{digest, sign_transaction, verify_signatures, TransactionDigest};
pub use types::{Operation, SignedTransaction, UnsignedTransaction};
