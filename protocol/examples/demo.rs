//! Walkthrough of the client library: keys, a two-party transfer, and a
//! private memo.
//!
//! Everything runs offline. The chain head and the node are simulated.
//!
//! Run with:
//!   cargo run --example demo --release
//!
//! Set `LOG_FORMAT=json` for machine-readable logs, `RUST_LOG=debug` for
//! more of them.

use std::time::Instant;

use steem_protocol::config::ChainConfig;
use steem_protocol::crypto::PrivateKey;
use steem_protocol::logging::{init_logging, LogFormat, DEFAULT_LOG_LEVEL};
use steem_protocol::memo::MemoCipher;
use steem_protocol::serializer::{Asset, AssetSymbol};
use steem_protocol::transaction::{
    verify_signatures, BroadcastOutcome, Broadcaster, ChainHead, ChainHeadSource, Operation, SignedTransaction,
    TransactionBuilder,
};
use steem_protocol::Result;

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn section(num: u32, title: &str) {
    println!();
    println!("{BOLD}{CYAN}==[ {YELLOW}{num}{CYAN} ]== {WHITE}{title}{RESET}");
}

fn success(text: &str) {
    println!("{GREEN}  [OK] {text}{RESET}");
}

fn info(label: &str, value: &str) {
    println!("{WHITE}  {BOLD}{label}:{RESET} {YELLOW}{value}{RESET}");
}

fn timing(label: &str, elapsed: std::time::Duration) {
    let ms = elapsed.as_secs_f64() * 1000.0;
    println!("{DIM}  [{label}: {ms:.2} ms]{RESET}");
}

// ---------------------------------------------------------------------------
// Simulated collaborators
// ---------------------------------------------------------------------------

struct FakeNode;

impl ChainHeadSource for FakeNode {
    fn chain_head(&self) -> Result<ChainHead> {
        Ok(ChainHead {
            head_block_number: 83_000_000,
            head_block_id: "04f2858022a11d7ce93b1a3c2a25e2e4f40a0b1d".into(),
            time: "2030-03-14T15:09:26".parse()?,
        })
    }
}

impl Broadcaster for FakeNode {
    fn broadcast(&self, tx: &SignedTransaction) -> Result<BroadcastOutcome> {
        let bytes = tx.to_bytes()?;
        info("node received", &format!("{} bytes", bytes.len()));
        Ok(BroadcastOutcome::Accepted)
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let format = LogFormat::from_str_lossy(&std::env::var("LOG_FORMAT").unwrap_or_default());
    init_logging(DEFAULT_LOG_LEVEL, format)?;

    let config = ChainConfig::mainnet();
    let node = FakeNode;

    section(1, "Keys from account credentials");
    let t = Instant::now();
    let alice_active = PrivateKey::from_login("alice", "P5Jalicepassword", Some("active"))?;
    let alice_memo = PrivateKey::from_login("alice", "P5Jalicepassword", Some("memo"))?;
    let escrow_agent = PrivateKey::from_login("agent", "P5Jagentpassword", Some("active"))?;
    let bob_memo = PrivateKey::from_login("bob", "P5Jbobpassword", Some("memo"))?;
    timing("derive x4", t.elapsed());
    info("alice active", &alice_active.public_key().to_string());
    info("alice memo", &alice_memo.public_key().to_string());
    info("bob memo", &bob_memo.public_key().to_string());

    section(2, "Private memo");
    let cipher = MemoCipher::new(config.clone());
    let sealed = cipher.encode(&alice_memo, &bob_memo.public_key(), "#invoice 2030-0042 paid")?;
    info("on chain", &sealed);
    info("bob reads", &cipher.decode(&bob_memo, &sealed)?);
    success("only alice and bob can read the memo");

    section(3, "Build, co-sign, broadcast");
    let amount = Asset::new(12_500, AssetSymbol::Steem);
    let mut builder = TransactionBuilder::new(config.clone());
    builder.add_operation(Operation::transfer("alice", "bob", amount, &sealed)?)?;
    let created = builder.create_from(&node)?;
    info("ref_block_num", &created.transaction.ref_block_num.to_string());
    info("ref_block_prefix", &created.transaction.ref_block_prefix.to_string());
    info("expiration", &created.transaction.expiration.to_string());

    let t = Instant::now();
    let tx_id = builder.sign(&[alice_active.clone()])?.to_string();
    builder.sign(&[escrow_agent.clone()])?;
    timing("sign x2", t.elapsed());
    info("tx id", &tx_id);

    if let Some(signed) = builder.transaction() {
        for (i, signer) in verify_signatures(signed, &config)?.iter().enumerate() {
            info(&format!("signer {i}"), &signer.to_string());
        }
    }

    let outcome = builder.broadcast(&node)?;
    success(&format!("broadcast outcome: {outcome:?}"));
    println!();
    Ok(())
}
