//! Transaction sessions.
//!
//! A [`TransactionBuilder`] walks one transaction through its life:
//!
//! ```text
//! Empty ──create──▶ Created ──sign / add_signature──▶ Signed ──broadcast──▶ Broadcastable
//!   ▲ add_operation                                    │  ▲
//!   └──────────────                                    └──┘ more signers
//! ```
//!
//! Steps can't be skipped or repeated out of order: signing before the
//! reference block is fixed, or adding operations after it is, would yield a
//! transaction whose signatures don't cover what gets broadcast.
//!
//! The chain head and the broadcast transport are supplied by the caller
//! through [`ChainHeadSource`] and [`Broadcaster`]. This crate never opens a
//! socket.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::signing::sign_transaction;
use super::types::{Operation, SignedTransaction, UnsignedTransaction};
use crate::config::{ChainConfig, DEFAULT_EXPIRATION, MAX_EXPIRATION};
use crate::crypto::PrivateKey;
use crate::error::{Error, Result};
use crate::serializer::TimePointSec;

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// The slice of chain state needed to anchor a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainHead {
    pub head_block_number: u32,
    /// Hex block id. The first four bytes encode the block number.
    pub head_block_id: String,
    /// Head block timestamp.
    pub time: TimePointSec,
}

impl ChainHead {
    /// Low 16 bits of the head block number.
    pub fn ref_block_num(&self) -> u16 {
        (self.head_block_number & 0xFFFF) as u16
    }

    /// Bytes 4..8 of the head block id, read little-endian.
    pub fn ref_block_prefix(&self) -> Result<u32> {
        let id = hex::decode(&self.head_block_id)
            .map_err(|e| Error::Collaborator(format!("head_block_id is not hex: {e}")))?;
        let prefix: [u8; 4] = id
            .get(4..8)
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or_else(|| Error::Collaborator(format!("head_block_id too short: {} bytes", id.len())))?;
        Ok(u32::from_le_bytes(prefix))
    }
}

/// Supplies the current chain head, typically from a node's
/// `get_dynamic_global_properties`.
pub trait ChainHeadSource {
    fn chain_head(&self) -> Result<ChainHead>;
}

/// What a node said about a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastOutcome {
    /// Accepted into the node's pending pool.
    Accepted,
    /// The node already has this transaction. Treated as success.
    Duplicate,
}

/// Submits a signed transaction to the network.
pub trait Broadcaster {
    fn broadcast(&self, tx: &SignedTransaction) -> Result<BroadcastOutcome>;
}

// ---------------------------------------------------------------------------
// BuilderState
// ---------------------------------------------------------------------------

/// Where a [`TransactionBuilder`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    /// Collecting operations.
    Empty,
    /// Reference block and expiration fixed; ready to sign.
    Created,
    /// At least one signature attached.
    Signed,
    /// Handed to a broadcaster. Terminal.
    Broadcastable,
}

impl fmt::Display for BuilderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Empty => "empty",
            Self::Created => "created",
            Self::Signed => "signed",
            Self::Broadcastable => "broadcastable",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// One transaction, from operations to broadcast.
///
/// ```
/// use steem_protocol::config::ChainConfig;
/// use steem_protocol::crypto::PrivateKey;
/// use steem_protocol::transaction::{BuilderState, ChainHead, Operation, TransactionBuilder};
///
/// let mut builder = TransactionBuilder::new(ChainConfig::mainnet());
/// builder.add_operation(Operation::vote("alice", "bob", "post", 10_000).unwrap()).unwrap();
/// builder.create(&ChainHead {
///     head_block_number: 0x0123_4567,
///     head_block_id: "01234567aabbccdd00000000000000000000000000".into(),
///     time: "2030-01-01T00:00:00".parse().unwrap(),
/// }).unwrap();
/// builder.sign(&[PrivateKey::from_seed(b"alice").unwrap()]).unwrap();
/// assert_eq!(builder.state(), BuilderState::Signed);
/// ```
#[derive(Debug)]
pub struct TransactionBuilder {
    config: ChainConfig,
    expire_in: Duration,
    operations: Vec<Operation>,
    transaction: Option<SignedTransaction>,
    tx_id: Option<String>,
    state: BuilderState,
}

impl TransactionBuilder {
    /// Starts an empty session. Expiration defaults to 60 seconds past the
    /// head block time.
    pub fn new(config: ChainConfig) -> Self {
        Self {
            config,
            expire_in: DEFAULT_EXPIRATION,
            operations: Vec::new(),
            transaction: None,
            tx_id: None,
            state: BuilderState::Empty,
        }
    }

    /// Overrides the expiration window. The ledger caps it at one hour.
    pub fn expire_in(mut self, window: Duration) -> Result<Self> {
        if window > MAX_EXPIRATION {
            return Err(Error::Config(format!(
                "expiration window {}s exceeds maximum {}s",
                window.as_secs(),
                MAX_EXPIRATION.as_secs()
            )));
        }
        self.expire_in = window;
        Ok(self)
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }

    /// Operations queued so far.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// The transaction, once created.
    pub fn transaction(&self) -> Option<&SignedTransaction> {
        self.transaction.as_ref()
    }

    /// The transaction id, once signed.
    pub fn tx_id(&self) -> Option<&str> {
        self.tx_id.as_deref()
    }

    fn refuse(&self, action: &str) -> Error {
        Error::InvalidState {
            state: self.state.to_string(),
            action: action.to_string(),
        }
    }

    /// Queues an operation. Only allowed before [`create`](Self::create).
    pub fn add_operation(&mut self, op: Operation) -> Result<&mut Self> {
        if self.state != BuilderState::Empty {
            return Err(self.refuse("add an operation"));
        }
        self.operations.push(op);
        Ok(self)
    }

    /// Fixes the reference block and expiration from `head`.
    pub fn create(&mut self, head: &ChainHead) -> Result<&SignedTransaction> {
        if self.state != BuilderState::Empty {
            return Err(self.refuse("create"));
        }
        if self.operations.is_empty() {
            return Err(self.refuse("create without operations"));
        }

        let unsigned = UnsignedTransaction {
            ref_block_num: head.ref_block_num(),
            ref_block_prefix: head.ref_block_prefix()?,
            expiration: head.time.checked_add(self.expire_in)?,
            operations: self.operations.clone(),
            extensions: Vec::new(),
        };
        // Surface serialization problems now rather than at signing.
        unsigned.to_bytes()?;

        debug!(
            ref_block_num = unsigned.ref_block_num,
            ref_block_prefix = unsigned.ref_block_prefix,
            expiration = %unsigned.expiration,
            operations = unsigned.operations.len(),
            "transaction created"
        );
        self.state = BuilderState::Created;
        Ok(&*self.transaction.insert(SignedTransaction::new(unsigned)))
    }

    /// Fetches the chain head from `source`, then [`create`](Self::create)s.
    pub fn create_from(&mut self, source: &dyn ChainHeadSource) -> Result<&SignedTransaction> {
        if self.state != BuilderState::Empty {
            return Err(self.refuse("create"));
        }
        let head = source.chain_head()?;
        self.create(&head)
    }

    /// Signs with each key, appending to any signatures already present.
    ///
    /// An empty `keys` slice is refused and the session stays where it was.
    pub fn sign(&mut self, keys: &[PrivateKey]) -> Result<&str> {
        if keys.is_empty() {
            return Err(self.refuse("sign without keys"));
        }
        let tx = self.take_for_signing("sign")?;
        let (signed, tx_id) = match sign_transaction(tx.clone(), keys, &self.config) {
            Ok(result) => result,
            Err(e) => {
                self.transaction = Some(tx);
                return Err(e);
            }
        };
        self.transaction = Some(signed);
        self.state = BuilderState::Signed;
        Ok(self.tx_id.insert(tx_id).as_str())
    }

    /// Attaches a signature produced elsewhere (hardware wallet, co-signer).
    pub fn add_signature(&mut self, signature_hex: &str) -> Result<()> {
        let mut tx = self.take_for_signing("add a signature")?;
        let added = tx.add_signature(signature_hex);
        self.transaction = Some(tx);
        added?;
        self.state = BuilderState::Signed;
        Ok(())
    }

    fn take_for_signing(&mut self, action: &str) -> Result<SignedTransaction> {
        match (self.state, self.transaction.take()) {
            (BuilderState::Created | BuilderState::Signed, Some(tx)) => Ok(tx),
            (_, tx) => {
                self.transaction = tx;
                Err(self.refuse(action))
            }
        }
    }

    /// Hands the signed transaction to `broadcaster`.
    ///
    /// [`BroadcastOutcome::Accepted`] and [`BroadcastOutcome::Duplicate`]
    /// both end the session. A broadcaster error leaves it `Signed` so the
    /// caller can retry.
    pub fn broadcast(&mut self, broadcaster: &dyn Broadcaster) -> Result<BroadcastOutcome> {
        let tx = match (self.state, self.transaction.as_ref()) {
            (BuilderState::Signed, Some(tx)) if !tx.signatures().is_empty() => tx,
            _ => return Err(self.refuse("broadcast")),
        };
        let outcome = broadcaster.broadcast(tx)?;
        info!(tx_id = ?self.tx_id, ?outcome, "transaction broadcast");
        self.state = BuilderState::Broadcastable;
        Ok(outcome)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
