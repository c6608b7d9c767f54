//! End-to-end integration tests for the Steem protocol library.
//!
//! These drive the public API the way a wallet would: derive keys, build a
//! transaction against a chain head, collect signatures from several
//! parties, check the wire bytes, and exchange private memos. Each test
//! builds its own keys and cipher; there is no shared state.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use serde_json::json;

use steem_protocol::config::ChainConfig;
use steem_protocol::crypto::{PrivateKey, PublicKey, Signature};
use steem_protocol::memo::{MemoCipher, NonceGenerator};
use steem_protocol::serializer::{Asset, Type, TRANSACTION};
use steem_protocol::transaction::{
    digest, sign_transaction, verify_signatures, BroadcastOutcome, Broadcaster, BuilderState, ChainHead,
    ChainHeadSource, Operation, SignedTransaction, TransactionBuilder, UnsignedTransaction,
};
use steem_protocol::{Error, Result};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const KNOWN_WIF: &str = "5JdeC9P7Pbd1uGdFVEsJ41EkEnADbbHGq6p1BwFxm6txNBsQnsw";
const KNOWN_PUB: &str = "STM8m5UgaFAAYQRuaNejYdS8FVLVp9Ss3K1qAVk5de6F8s3HnVbvA";

struct StaticHead;

impl ChainHeadSource for StaticHead {
    fn chain_head(&self) -> Result<ChainHead> {
        Ok(ChainHead {
            head_block_number: 0x00bc_614e,
            head_block_id: "00bc614e1f2e3d4c5b6a79880000000000000000".into(),
            time: "2030-06-01T12:00:00".parse()?,
        })
    }
}

/// Accepts the first submission and reports duplicates after that, like a
/// node that already has the transaction in its pool.
#[derive(Default)]
struct Node {
    seen: parking_lot::Mutex<HashSet<Vec<u8>>>,
}

impl Broadcaster for Node {
    fn broadcast(&self, tx: &SignedTransaction) -> Result<BroadcastOutcome> {
        let bytes = tx.to_bytes()?;
        if self.seen.lock().insert(bytes) {
            Ok(BroadcastOutcome::Accepted)
        } else {
            Ok(BroadcastOutcome::Duplicate)
        }
    }
}

fn transfer(from: &str, to: &str, amount: &str) -> Operation {
    Operation::transfer(from, to, amount.parse::<Asset>().unwrap(), "").unwrap()
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

#[test]
fn known_key_vector() {
    let key = PrivateKey::from_wif(KNOWN_WIF).unwrap();
    assert_eq!(key.to_wif(), KNOWN_WIF);
    assert_eq!(key.public_key().to_wif(), KNOWN_PUB);

    let public: PublicKey = KNOWN_PUB.parse().unwrap();
    assert_eq!(public, key.public_key());
}

#[test]
fn login_keys_differ_by_role() {
    let active = PrivateKey::from_login("alice", "hunter2", None).unwrap();
    let explicit = PrivateKey::from_login("alice", "hunter2", Some("active")).unwrap();
    let posting = PrivateKey::from_login("alice", "hunter2", Some("posting")).unwrap();
    assert_eq!(active, explicit);
    assert_ne!(active, posting);
}

#[test]
fn signature_recovers_signer() {
    let key = PrivateKey::from_seed(b"recover me").unwrap();
    let signature = key.sign_buffer(b"hello ledger");
    let digest = steem_protocol::crypto::sha256(b"hello ledger");

    assert!(signature.is_canonical());
    assert_eq!(signature.recover_public_key(&digest).unwrap(), key.public_key());

    let round_trip = Signature::from_hex(&signature.to_hex()).unwrap();
    assert_eq!(round_trip, signature);
    assert!(round_trip.verify(&digest, &key.public_key()));
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[test]
fn digest_is_stable_for_identical_content() {
    let build = || UnsignedTransaction {
        ref_block_num: 1234,
        ref_block_prefix: 0xdead_beef,
        expiration: "2030-01-01T00:00:00".parse().unwrap(),
        operations: vec![transfer("alice", "bob", "0.001 SBD")],
        extensions: Vec::new(),
    };
    let chain_id = ChainConfig::mainnet().chain_id;
    assert_eq!(digest(&build(), &chain_id).unwrap(), digest(&build(), &chain_id).unwrap());
}

#[test]
fn transaction_json_round_trips_through_bytes() {
    let tx = json!({
        "ref_block_num": 19,
        "ref_block_prefix": 2_843_410_553u32,
        "expiration": "2030-01-01T00:00:30",
        "operations": [
            ["vote", {"voter": "a", "author": "b", "permlink": "c", "weight": -500}],
            ["transfer", {"from": "a", "to": "b", "amount": "12.345 STEEM", "memo": "m"}],
            ["delegate_vesting_shares", {
                "delegator": "a",
                "delegatee": "b",
                "vesting_shares": "1000.000000 VESTS"
            }],
            ["update_proposal_votes", {
                "voter": "a",
                "proposal_ids": [1, 2, 3],
                "approve": true,
                "extensions": []
            }]
        ],
        "extensions": []
    });
    let bytes = TRANSACTION.to_bytes(&tx).unwrap();
    assert_eq!(TRANSACTION.from_bytes(&bytes, "STM").unwrap(), tx);

    let typed: UnsignedTransaction = serde_json::from_value(tx).unwrap();
    assert_eq!(typed.to_bytes().unwrap(), bytes);
}

#[test]
fn unknown_operation_is_reported_by_name() {
    let mut buf = steem_protocol::codec::ByteBuffer::new();
    let err = Type::Operation
        .encode(&mut buf, &json!(["teleport", {}]))
        .unwrap_err();
    assert!(err.to_string().contains("teleport"), "{err}");
}

// ---------------------------------------------------------------------------
// Multi-party signing
// ---------------------------------------------------------------------------

#[test]
fn three_party_signing_accumulates() {
    let config = ChainConfig::mainnet();
    let keys: Vec<_> = ["owner", "active", "cosigner"]
        .iter()
        .map(|role| PrivateKey::from_login("treasury", "pw", Some(*role)).unwrap())
        .collect();

    let mut builder = TransactionBuilder::new(config.clone());
    builder.add_operation(transfer("treasury", "payee", "100.000 STEEM")).unwrap();
    builder.create_from(&StaticHead).unwrap();

    // Each party signs in turn, possibly on a different machine.
    let unsigned = builder.transaction().unwrap().clone();
    let (after_one, id_one) = sign_transaction(unsigned, &keys[..1], &config).unwrap();
    let (after_three, id_three) = sign_transaction(after_one.clone(), &keys[1..], &config).unwrap();

    assert_eq!(id_one, id_three);
    assert_eq!(after_three.signatures().len(), 3);
    assert_eq!(&after_three.signatures()[..1], after_one.signatures());

    let signers = verify_signatures(&after_three, &config).unwrap();
    let expected: Vec<_> = keys.iter().map(PrivateKey::public_key).collect();
    assert_eq!(signers, expected);
}

#[test]
fn builder_session_to_broadcast() {
    let key = PrivateKey::from_seed(b"broadcaster").unwrap();
    let node = Node::default();

    let mut builder = TransactionBuilder::new(ChainConfig::mainnet());
    builder.add_operation(transfer("alice", "bob", "1.000 STEEM")).unwrap();
    builder.add_operation(Operation::vote("alice", "bob", "post", 100).unwrap()).unwrap();
    let created = builder.create_from(&StaticHead).unwrap();
    assert_eq!(created.transaction.ref_block_num, 0x614e);
    assert_eq!(created.transaction.expiration.to_string(), "2030-06-01T12:01:00");

    builder.sign(&[key.clone()]).unwrap();
    assert_eq!(builder.broadcast(&node).unwrap(), BroadcastOutcome::Accepted);
    assert_eq!(builder.state(), BuilderState::Broadcastable);

    // Resubmitting the same bytes is a duplicate from the node's side.
    let replay = builder.transaction().unwrap().clone();
    assert_eq!(node.broadcast(&replay).unwrap(), BroadcastOutcome::Duplicate);

    assert!(matches!(builder.sign(&[key]), Err(Error::InvalidState { .. })));
}

#[test]
fn testnet_signatures_do_not_verify_on_mainnet() {
    let key = PrivateKey::from_seed(b"network bound").unwrap();
    let mut builder = TransactionBuilder::new(ChainConfig::testnet());
    builder.add_operation(transfer("a", "b", "1.000 TESTS")).unwrap();
    builder.create_from(&StaticHead).unwrap();
    builder.sign(&[key.clone()]).unwrap();

    let signed = builder.transaction().unwrap();
    let on_testnet = verify_signatures(signed, &ChainConfig::testnet()).unwrap();
    let on_mainnet = verify_signatures(signed, &ChainConfig::mainnet()).unwrap();
    assert_eq!(on_testnet[0], key.public_key());
    assert_ne!(on_mainnet[0], key.public_key());
    assert!(on_testnet[0].to_wif().starts_with("TST"));
}

// ---------------------------------------------------------------------------
// Memos
// ---------------------------------------------------------------------------

#[test]
fn memo_known_key_round_trip() {
    let key = PrivateKey::from_wif(KNOWN_WIF).unwrap();
    let public: PublicKey = KNOWN_PUB.parse().unwrap();
    let cipher = MemoCipher::default();

    let sealed = cipher.encode(&key, &public, "#memo爱").unwrap();
    assert_eq!(cipher.decode(&key, &sealed).unwrap(), "#memo爱");
}

#[test]
fn memo_between_two_accounts() {
    let alice = PrivateKey::from_login("alice", "pw", Some("memo")).unwrap();
    let bob = PrivateKey::from_login("bob", "pw", Some("memo")).unwrap();
    let carol = PrivateKey::from_login("carol", "pw", Some("memo")).unwrap();
    let cipher = MemoCipher::default();

    let sealed = cipher.encode(&alice, &bob.public_key(), "#invoice 42").unwrap();
    assert_ne!(sealed, "#invoice 42");
    assert_eq!(cipher.decode(&bob, &sealed).unwrap(), "#invoice 42");
    assert_eq!(cipher.decode(&alice, &sealed).unwrap(), "#invoice 42");
    assert!(matches!(cipher.decode(&carol, &sealed), Err(Error::ChecksumMismatch(_))));

    // Memo goes straight into a transfer operation.
    let op = Operation::transfer("alice", "bob", "0.001 STEEM".parse().unwrap(), &sealed).unwrap();
    assert_eq!(op.params()["memo"], sealed);
}

#[test]
fn nonces_unique_across_threads() {
    let generator = Arc::new(NonceGenerator::new());
    let workers: Vec<_> = (0..8)
        .map(|_| {
            let generator = Arc::clone(&generator);
            thread::spawn(move || (0..500).map(|_| generator.next_nonce()).collect::<Vec<_>>())
        })
        .collect();

    let mut all = HashSet::new();
    for worker in workers {
        for nonce in worker.join().unwrap() {
            assert!(all.insert(nonce));
        }
    }
    assert_eq!(all.len(), 4_000);
}

#[test]
fn shared_cipher_across_threads() {
    let cipher = Arc::new(MemoCipher::default());
    let alice = PrivateKey::from_seed(b"threaded alice").unwrap();
    let bob = PrivateKey::from_seed(b"threaded bob").unwrap();
    let bob_public = bob.public_key();

    let sealed: Vec<String> = (0..4)
        .map(|i| {
            let cipher = Arc::clone(&cipher);
            let alice = alice.clone();
            let bob_public = bob_public.clone();
            thread::spawn(move || cipher.encode(&alice, &bob_public, &format!("#msg {i}")).unwrap())
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    for (i, memo) in sealed.iter().enumerate() {
        assert_eq!(cipher.decode(&bob, memo).unwrap(), format!("#msg {i}"));
    }
}
