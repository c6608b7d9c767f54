// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Steem Protocol: Client Library
//!
//! Everything a client needs to talk to a Steem-style ledger without
//! trusting anyone else to do the cryptography: the exact binary wire
//! format, key handling, transaction signing, and private memos.
//!
//! What this crate deliberately does not do is I/O. Fetching the chain head
//! and broadcasting are behind small traits
//! ([`transaction::ChainHeadSource`], [`transaction::Broadcaster`]) that the
//! host application implements with whatever transport it already has.
//!
//! ## Architecture
//!
//! - **codec**: [`codec::ByteBuffer`], the cursor-based byte buffer all
//!   wire encoding goes through.
//! - **serializer**: Type combinators and the static operation table.
//!   This is consensus code: one wrong field order and the network rejects
//!   every signature.
//! - **crypto**: secp256k1 keys, recoverable signatures, hashes, AES.
//! - **transaction**: Digests, multi-party signing, the builder session.
//! - **memo**: ECDH + AES-256-CBC encrypted memos.
//! - **config**: Network parameters and protocol constants.
//! - **logging**: Optional `tracing` subscriber setup for binaries.
//!
//! ## Quick start
//!
//! ```
//! use steem_protocol::config::ChainConfig;
//! use steem_protocol::crypto::PrivateKey;
//! use steem_protocol::serializer::Asset;
//! use steem_protocol::transaction::{ChainHead, Operation, TransactionBuilder};
//!
//! let key = PrivateKey::from_login("alice", "correct horse battery staple", None).unwrap();
//! let amount: Asset = "1.000 STEEM".parse().unwrap();
//!
//! let mut builder = TransactionBuilder::new(ChainConfig::mainnet());
//! builder.add_operation(Operation::transfer("alice", "bob", amount, "thanks").unwrap()).unwrap();
//! builder.create(&ChainHead {
//!     head_block_number: 1_000_000,
//!     head_block_id: "000f4240deadbeef000000000000000000000000".into(),
//!     time: "2030-01-01T00:00:00".parse().unwrap(),
//! }).unwrap();
//! let tx_id = builder.sign(&[key]).unwrap();
//! assert_eq!(tx_id.len(), 40);
//! ```
//!
//! ## Design Philosophy
//!
//! 1. Byte-exact compatibility first. Every encoding here is checked
//!    against known vectors.
//! 2. No global mutable state. Caches and counters live in values you own.
//! 3. Fail fast and say where: serialization errors carry the field path.

pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod logging;
pub mod memo;
pub mod serializer;
pub mod transaction;

pub use error::{Error, Result};
