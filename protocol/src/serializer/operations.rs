//! The protocol table: every operation the ledger accepts, in id order.
//!
//! An operation's id is its position in this list, and that position is
//! consensus-critical. Entries are never reordered or removed; new ones are
//! appended. The field lists likewise fix the wire order of each payload.
//!
//! Shared sub-objects (authorities, prices, block headers) are defined once
//! at the top and referenced from the operations that embed them.

use super::schema::{Field, Schema, Type};

/// An entry in the operation table.
#[derive(Debug, Clone, Copy)]
pub struct OperationSchema {
    /// Wire id.
    pub id: u32,
    /// Payload schema. `schema.name` is the operation's name.
    pub schema: Schema,
}

impl OperationSchema {
    /// The operation's name, e.g. `"transfer"`.
    pub fn name(&self) -> &'static str {
        self.schema.name
    }
}

const fn f(name: &'static str, ty: Type) -> Field {
    Field::new(name, ty)
}

const fn op(id: u32, name: &'static str, fields: &'static [Field]) -> OperationSchema {
    OperationSchema {
        id,
        schema: Schema { name, fields },
    }
}

// ---------------------------------------------------------------------------
// Shorthand types
// ---------------------------------------------------------------------------

const STRING: Type = Type::String;
const ASSET: Type = Type::Asset;
const BOOL: Type = Type::Bool;
const U16: Type = Type::Uint16;
const U32: Type = Type::Uint32;
const DATE: Type = Type::Date;
const KEY: Type = Type::PublicKey;
const BYTES: Type = Type::Binary(None);
const ACCOUNT_SET: Type = Type::Set(&Type::String);
const PROPOSAL_IDS: Type = Type::Array(&Type::Int64);
/// Reserved for future protocol upgrades; always an empty list today.
const EXTENSIONS: Type = Type::Set(&Type::Void);
const AUTH: Type = Type::Object(&AUTHORITY);
const OPTIONAL_AUTH: Type = Type::Optional(&AUTH);

// ---------------------------------------------------------------------------
// Shared sub-objects
// ---------------------------------------------------------------------------

pub const AUTHORITY: Schema = Schema {
    name: "authority",
    fields: &[
        f("weight_threshold", U32),
        f("account_auths", Type::FlatMap(&STRING, &U16)),
        f("key_auths", Type::FlatMap(&KEY, &U16)),
    ],
};

pub const PRICE: Schema = Schema {
    name: "price",
    fields: &[f("base", ASSET), f("quote", ASSET)],
};

pub const CHAIN_PROPERTIES: Schema = Schema {
    name: "chain_properties",
    fields: &[
        f("account_creation_fee", ASSET),
        f("maximum_block_size", U32),
        f("sbd_interest_rate", U16),
    ],
};

const POW: Schema = Schema {
    name: "pow",
    fields: &[
        f("worker", KEY),
        f("input", Type::Binary(Some(32))),
        f("signature", Type::Binary(Some(65))),
        f("work", Type::Binary(Some(32))),
    ],
};

const POW2_INPUT: Schema = Schema {
    name: "pow2_input",
    fields: &[
        f("worker_account", STRING),
        f("prev_block", Type::Binary(Some(20))),
        f("nonce", Type::Uint64),
    ],
};

const POW2: Schema = Schema {
    name: "pow2",
    fields: &[f("input", Type::Object(&POW2_INPUT)), f("pow_summary", U32)],
};

const EQUIHASH_PROOF: Schema = Schema {
    name: "equihash_proof",
    fields: &[
        f("n", U32),
        f("k", U32),
        f("seed", Type::Binary(Some(32))),
        f("inputs", Type::Array(&U32)),
    ],
};

const EQUIHASH_POW: Schema = Schema {
    name: "equihash_pow",
    fields: &[
        f("input", Type::Object(&POW2_INPUT)),
        f("proof", Type::Object(&EQUIHASH_PROOF)),
        f("prev_block", Type::Binary(Some(20))),
        f("pow_summary", U32),
    ],
};

/// Packed `major << 24 | hardfork << 16 | release`.
const VERSION: Schema = Schema {
    name: "version",
    fields: &[f("v_num", U32)],
};

const HARDFORK_VERSION_VOTE: Schema = Schema {
    name: "hardfork_version_vote",
    fields: &[f("hf_version", Type::Object(&VERSION)), f("hf_time", DATE)],
};

const BLOCK_HEADER_EXTENSION: Type = Type::StaticVariant(&[
    Type::Void,
    Type::Object(&VERSION),
    Type::Object(&HARDFORK_VERSION_VOTE),
]);

const SIGNED_BLOCK_HEADER: Schema = Schema {
    name: "signed_block_header",
    fields: &[
        f("previous", Type::Binary(Some(20))),
        f("timestamp", DATE),
        f("witness", STRING),
        f("transaction_merkle_root", Type::Binary(Some(20))),
        f("extensions", Type::Set(&BLOCK_HEADER_EXTENSION)),
        f("witness_signature", Type::Binary(Some(65))),
    ],
};

const BENEFICIARY_ROUTE: Schema = Schema {
    name: "beneficiary_route_type",
    fields: &[f("account", STRING), f("weight", U16)],
};

const COMMENT_PAYOUT_BENEFICIARIES: Schema = Schema {
    name: "comment_payout_beneficiaries",
    fields: &[f("beneficiaries", Type::Set(&Type::Object(&BENEFICIARY_ROUTE)))],
};

const COMMENT_OPTIONS_EXTENSION: Type =
    Type::StaticVariant(&[Type::Object(&COMMENT_PAYOUT_BENEFICIARIES)]);

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// The signed part of a transaction.
pub const TRANSACTION: Schema = Schema {
    name: "transaction",
    fields: &[
        f("ref_block_num", U16),
        f("ref_block_prefix", U32),
        f("expiration", DATE),
        f("operations", Type::Array(&Type::Operation)),
        f("extensions", EXTENSIONS),
    ],
};

/// A transaction plus its signatures, as relayed between nodes.
pub const SIGNED_TRANSACTION: Schema = Schema {
    name: "signed_transaction",
    fields: &[
        f("ref_block_num", U16),
        f("ref_block_prefix", U32),
        f("expiration", DATE),
        f("operations", Type::Array(&Type::Operation)),
        f("extensions", EXTENSIONS),
        f("signatures", Type::Array(&Type::Binary(Some(65)))),
    ],
};

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// All operations, indexed by id.
pub static OPERATIONS: &[OperationSchema] = &[
    op(0, "vote", &[
        f("voter", STRING),
        f("author", STRING),
        f("permlink", STRING),
        f("weight", Type::Int16),
    ]),
    op(1, "comment", &[
        f("parent_author", STRING),
        f("parent_permlink", STRING),
        f("author", STRING),
        f("permlink", STRING),
        f("title", STRING),
        f("body", STRING),
        f("json_metadata", STRING),
    ]),
    op(2, "transfer", &[
        f("from", STRING),
        f("to", STRING),
        f("amount", ASSET),
        f("memo", STRING),
    ]),
    op(3, "transfer_to_vesting", &[
        f("from", STRING),
        f("to", STRING),
        f("amount", ASSET),
    ]),
    op(4, "withdraw_vesting", &[
        f("account", STRING),
        f("vesting_shares", ASSET),
    ]),
    op(5, "limit_order_create", &[
        f("owner", STRING),
        f("orderid", U32),
        f("amount_to_sell", ASSET),
        f("min_to_receive", ASSET),
        f("fill_or_kill", BOOL),
        f("expiration", DATE),
    ]),
    op(6, "limit_order_cancel", &[
        f("owner", STRING),
        f("orderid", U32),
    ]),
    op(7, "feed_publish", &[
        f("publisher", STRING),
        f("exchange_rate", Type::Object(&PRICE)),
    ]),
    op(8, "convert", &[
        f("owner", STRING),
        f("requestid", U32),
        f("amount", ASSET),
    ]),
    op(9, "account_create", &[
        f("fee", ASSET),
        f("creator", STRING),
        f("new_account_name", STRING),
        f("owner", AUTH),
        f("active", AUTH),
        f("posting", AUTH),
        f("memo_key", KEY),
        f("json_metadata", STRING),
    ]),
    op(10, "account_update", &[
        f("account", STRING),
        f("owner", OPTIONAL_AUTH),
        f("active", OPTIONAL_AUTH),
        f("posting", OPTIONAL_AUTH),
        f("memo_key", KEY),
        f("json_metadata", STRING),
    ]),
    op(11, "witness_update", &[
        f("owner", STRING),
        f("url", STRING),
        f("block_signing_key", KEY),
        f("props", Type::Object(&CHAIN_PROPERTIES)),
        f("fee", ASSET),
    ]),
    op(12, "account_witness_vote", &[
        f("account", STRING),
        f("witness", STRING),
        f("approve", BOOL),
    ]),
    op(13, "account_witness_proxy", &[
        f("account", STRING),
        f("proxy", STRING),
    ]),
    op(14, "pow", &[
        f("worker_account", STRING),
        f("block_id", Type::Binary(Some(20))),
        f("nonce", Type::Uint64),
        f("work", Type::Object(&POW)),
        f("props", Type::Object(&CHAIN_PROPERTIES)),
    ]),
    op(15, "custom", &[
        f("required_auths", ACCOUNT_SET),
        f("id", U16),
        f("data", BYTES),
    ]),
    op(16, "report_over_production", &[
        f("reporter", STRING),
        f("first_block", Type::Object(&SIGNED_BLOCK_HEADER)),
        f("second_block", Type::Object(&SIGNED_BLOCK_HEADER)),
    ]),
    op(17, "delete_comment", &[
        f("author", STRING),
        f("permlink", STRING),
    ]),
    op(18, "custom_json", &[
        f("required_auths", ACCOUNT_SET),
        f("required_posting_auths", ACCOUNT_SET),
        f("id", STRING),
        f("json", STRING),
    ]),
    op(19, "comment_options", &[
        f("author", STRING),
        f("permlink", STRING),
        f("max_accepted_payout", ASSET),
        f("percent_steem_dollars", U16),
        f("allow_votes", BOOL),
        f("allow_curation_rewards", BOOL),
        f("extensions", Type::Set(&COMMENT_OPTIONS_EXTENSION)),
    ]),
    op(20, "set_withdraw_vesting_route", &[
        f("from_account", STRING),
        f("to_account", STRING),
        f("percent", U16),
        f("auto_vest", BOOL),
    ]),
    op(21, "limit_order_create2", &[
        f("owner", STRING),
        f("orderid", U32),
        f("amount_to_sell", ASSET),
        f("exchange_rate", Type::Object(&PRICE)),
        f("fill_or_kill", BOOL),
        f("expiration", DATE),
    ]),
    op(22, "claim_account", &[
        f("creator", STRING),
        f("fee", ASSET),
        f("extensions", EXTENSIONS),
    ]),
    op(23, "create_claimed_account", &[
        f("creator", STRING),
        f("new_account_name", STRING),
        f("owner", AUTH),
        f("active", AUTH),
        f("posting", AUTH),
        f("memo_key", KEY),
        f("json_metadata", STRING),
        f("extensions", EXTENSIONS),
    ]),
    op(24, "request_account_recovery", &[
        f("recovery_account", STRING),
        f("account_to_recover", STRING),
        f("new_owner_authority", AUTH),
        f("extensions", EXTENSIONS),
    ]),
    op(25, "recover_account", &[
        f("account_to_recover", STRING),
        f("new_owner_authority", AUTH),
        f("recent_owner_authority", AUTH),
        f("extensions", EXTENSIONS),
    ]),
    op(26, "change_recovery_account", &[
        f("account_to_recover", STRING),
        f("new_recovery_account", STRING),
        f("extensions", EXTENSIONS),
    ]),
    op(27, "escrow_transfer", &[
        f("from", STRING),
        f("to", STRING),
        f("agent", STRING),
        f("escrow_id", U32),
        f("sbd_amount", ASSET),
        f("steem_amount", ASSET),
        f("fee", ASSET),
        f("ratification_deadline", DATE),
        f("escrow_expiration", DATE),
        f("json_meta", STRING),
    ]),
    op(28, "escrow_dispute", &[
        f("from", STRING),
        f("to", STRING),
        f("agent", STRING),
        f("who", STRING),
        f("escrow_id", U32),
    ]),
    op(29, "escrow_release", &[
        f("from", STRING),
        f("to", STRING),
        f("agent", STRING),
        f("who", STRING),
        f("receiver", STRING),
        f("escrow_id", U32),
        f("sbd_amount", ASSET),
        f("steem_amount", ASSET),
    ]),
    op(30, "pow2", &[
        f("work", Type::StaticVariant(&[Type::Object(&POW2), Type::Object(&EQUIHASH_POW)])),
        f("new_owner_key", Type::Optional(&KEY)),
        f("props", Type::Object(&CHAIN_PROPERTIES)),
    ]),
    op(31, "escrow_approve", &[
        f("from", STRING),
        f("to", STRING),
        f("agent", STRING),
        f("who", STRING),
        f("escrow_id", U32),
        f("approve", BOOL),
    ]),
    op(32, "transfer_to_savings", &[
        f("from", STRING),
        f("to", STRING),
        f("amount", ASSET),
        f("memo", STRING),
    ]),
    op(33, "transfer_from_savings", &[
        f("from", STRING),
        f("request_id", U32),
        f("to", STRING),
        f("amount", ASSET),
        f("memo", STRING),
    ]),
    op(34, "cancel_transfer_from_savings", &[
        f("from", STRING),
        f("request_id", U32),
    ]),
    op(35, "custom_binary", &[
        f("required_owner_auths", ACCOUNT_SET),
        f("required_active_auths", ACCOUNT_SET),
        f("required_posting_auths", ACCOUNT_SET),
        f("required_auths", Type::Array(&AUTH)),
        f("id", STRING),
        f("data", BYTES),
    ]),
    op(36, "decline_voting_rights", &[
        f("account", STRING),
        f("decline", BOOL),
    ]),
    op(37, "reset_account", &[
        f("reset_account", STRING),
        f("account_to_reset", STRING),
        f("new_owner_authority", AUTH),
    ]),
    op(38, "set_reset_account", &[
        f("account", STRING),
        f("current_reset_account", STRING),
        f("reset_account", STRING),
    ]),
    op(39, "claim_reward_balance", &[
        f("account", STRING),
        f("reward_steem", ASSET),
        f("reward_sbd", ASSET),
        f("reward_vests", ASSET),
    ]),
    op(40, "delegate_vesting_shares", &[
        f("delegator", STRING),
        f("delegatee", STRING),
        f("vesting_shares", ASSET),
    ]),
    op(41, "account_create_with_delegation", &[
        f("fee", ASSET),
        f("delegation", ASSET),
        f("creator", STRING),
        f("new_account_name", STRING),
        f("owner", AUTH),
        f("active", AUTH),
        f("posting", AUTH),
        f("memo_key", KEY),
        f("json_metadata", STRING),
        f("extensions", EXTENSIONS),
    ]),
    op(42, "witness_set_properties", &[
        f("owner", STRING),
        f("props", Type::FlatMap(&STRING, &BYTES)),
        f("extensions", EXTENSIONS),
    ]),
    op(43, "account_update2", &[
        f("account", STRING),
        f("owner", OPTIONAL_AUTH),
        f("active", OPTIONAL_AUTH),
        f("posting", OPTIONAL_AUTH),
        f("memo_key", Type::Optional(&KEY)),
        f("json_metadata", STRING),
        f("posting_json_metadata", STRING),
        f("extensions", EXTENSIONS),
    ]),
    op(44, "create_proposal", &[
        f("creator", STRING),
        f("receiver", STRING),
        f("start_date", DATE),
        f("end_date", DATE),
        f("daily_pay", ASSET),
        f("subject", STRING),
        f("permlink", STRING),
        f("extensions", EXTENSIONS),
    ]),
    op(45, "update_proposal_votes", &[
        f("voter", STRING),
        f("proposal_ids", PROPOSAL_IDS),
        f("approve", BOOL),
        f("extensions", EXTENSIONS),
    ]),
    op(46, "remove_proposal", &[
        f("proposal_owner", STRING),
        f("proposal_ids", PROPOSAL_IDS),
        f("extensions", EXTENSIONS),
    ]),
];

/// Looks up an operation by name.
pub fn find_by_name(name: &str) -> Option<&'static OperationSchema> {
    OPERATIONS.iter().find(|entry| entry.schema.name == name)
}

/// Looks up an operation by wire id.
pub fn find_by_id(id: u32) -> Option<&'static OperationSchema> {
    OPERATIONS.get(id as usize)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::codec::ByteBuffer;
    use crate::crypto::PublicKey;

    #[test]
    fn ids_match_positions() {
        assert_eq!(OPERATIONS.len(), 47);
        for (index, entry) in OPERATIONS.iter().enumerate() {
            assert_eq!(entry.id as usize, index, "{}", entry.name());
        }
    }

    #[test]
    fn names_are_unique() {
        for (i, entry) in OPERATIONS.iter().enumerate() {
            assert!(
                OPERATIONS[..i].iter().all(|other| other.name() != entry.name()),
                "duplicate operation {}",
                entry.name()
            );
        }
    }

    #[test]
    fn well_known_ids() {
        assert_eq!(find_by_name("vote").unwrap().id, 0);
        assert_eq!(find_by_name("transfer").unwrap().id, 2);
        assert_eq!(find_by_name("custom_json").unwrap().id, 18);
        assert_eq!(find_by_name("claim_reward_balance").unwrap().id, 39);
        assert_eq!(find_by_id(40).unwrap().name(), "delegate_vesting_shares");
        assert!(find_by_name("teleport").is_none());
        assert!(find_by_id(47).is_none());
    }

    const KEY_A: &str = "STM8m5UgaFAAYQRuaNejYdS8FVLVp9Ss3K1qAVk5de6F8s3HnVbvA";

    fn authority() -> serde_json::Value {
        json!({
            "weight_threshold": 1,
            "account_auths": [["bob", 1]],
            "key_auths": [[KEY_A, 1]]
        })
    }

    fn props() -> serde_json::Value {
        json!({
            "account_creation_fee": "3.000 STEEM",
            "maximum_block_size": 65536,
            "sbd_interest_rate": 1000
        })
    }

    fn block_header(witness: &str) -> serde_json::Value {
        json!({
            "previous": "0000ffff".repeat(5),
            "timestamp": "2016-07-04T12:00:03",
            "witness": witness,
            "transaction_merkle_root": "00".repeat(20),
            "extensions": [[1, {"v_num": 1}]],
            "witness_signature": "1f".repeat(65)
        })
    }

    fn pow2_input() -> serde_json::Value {
        json!({"worker_account": "miner", "prev_block": "ab".repeat(20), "nonce": 42})
    }

    /// One canonical payload per operation, in id order.
    fn sample_operations() -> Vec<serde_json::Value> {
        let null_key = PublicKey::null("STM").to_wif();
        vec![
            json!(["vote", {"voter": "alice", "author": "bob", "permlink": "post", "weight": -500}]),
            json!(["comment", {
                "parent_author": "", "parent_permlink": "steem", "author": "alice",
                "permlink": "hello", "title": "Hello", "body": "world", "json_metadata": "{}"
            }]),
            json!(["transfer", {"from": "alice", "to": "bob", "amount": "1.000 STEEM", "memo": "hi"}]),
            json!(["transfer_to_vesting", {"from": "alice", "to": "alice", "amount": "10.000 STEEM"}]),
            json!(["withdraw_vesting", {"account": "alice", "vesting_shares": "100.000000 VESTS"}]),
            json!(["limit_order_create", {
                "owner": "alice", "orderid": 7, "amount_to_sell": "1.000 STEEM",
                "min_to_receive": "0.250 SBD", "fill_or_kill": false,
                "expiration": "2030-01-01T00:00:00"
            }]),
            json!(["limit_order_cancel", {"owner": "alice", "orderid": 7}]),
            json!(["feed_publish", {
                "publisher": "witness",
                "exchange_rate": {"base": "0.250 SBD", "quote": "1.000 STEEM"}
            }]),
            json!(["convert", {"owner": "alice", "requestid": 1, "amount": "5.000 SBD"}]),
            json!(["account_create", {
                "fee": "3.000 STEEM", "creator": "alice", "new_account_name": "carol",
                "owner": authority(), "active": authority(), "posting": authority(),
                "memo_key": KEY_A, "json_metadata": ""
            }]),
            json!(["account_update", {
                "account": "alice", "owner": null, "active": authority(), "posting": null,
                "memo_key": KEY_A, "json_metadata": "{}"
            }]),
            json!(["witness_update", {
                "owner": "witness", "url": "https://example.com",
                "block_signing_key": null_key, "props": props(), "fee": "0.000 STEEM"
            }]),
            json!(["account_witness_vote", {"account": "alice", "witness": "witness", "approve": true}]),
            json!(["account_witness_proxy", {"account": "alice", "proxy": "bob"}]),
            json!(["pow", {
                "worker_account": "miner", "block_id": "cd".repeat(20), "nonce": 9,
                "work": {
                    "worker": KEY_A, "input": "01".repeat(32),
                    "signature": "20".repeat(65), "work": "02".repeat(32)
                },
                "props": props()
            }]),
            json!(["custom", {"required_auths": ["alice"], "id": 777, "data": "deadbeef"}]),
            json!(["report_over_production", {
                "reporter": "alice",
                "first_block": block_header("witness"),
                "second_block": block_header("witness")
            }]),
            json!(["delete_comment", {"author": "alice", "permlink": "hello"}]),
            json!(["custom_json", {
                "required_auths": [], "required_posting_auths": ["alice"],
                "id": "follow", "json": "[]"
            }]),
            json!(["comment_options", {
                "author": "alice", "permlink": "hello",
                "max_accepted_payout": "1000000.000 SBD", "percent_steem_dollars": 10000,
                "allow_votes": true, "allow_curation_rewards": true,
                "extensions": [[0, {"beneficiaries": [{"account": "bob", "weight": 2500}]}]]
            }]),
            json!(["set_withdraw_vesting_route", {
                "from_account": "alice", "to_account": "bob", "percent": 5000, "auto_vest": true
            }]),
            json!(["limit_order_create2", {
                "owner": "alice", "orderid": 8, "amount_to_sell": "1.000 STEEM",
                "exchange_rate": {"base": "1.000 STEEM", "quote": "0.250 SBD"},
                "fill_or_kill": true, "expiration": "2030-01-01T00:00:00"
            }]),
            json!(["claim_account", {"creator": "alice", "fee": "0.000 STEEM", "extensions": []}]),
            json!(["create_claimed_account", {
                "creator": "alice", "new_account_name": "dave",
                "owner": authority(), "active": authority(), "posting": authority(),
                "memo_key": KEY_A, "json_metadata": "", "extensions": []
            }]),
            json!(["request_account_recovery", {
                "recovery_account": "steem", "account_to_recover": "alice",
                "new_owner_authority": authority(), "extensions": []
            }]),
            json!(["recover_account", {
                "account_to_recover": "alice", "new_owner_authority": authority(),
                "recent_owner_authority": authority(), "extensions": []
            }]),
            json!(["change_recovery_account", {
                "account_to_recover": "alice", "new_recovery_account": "bob", "extensions": []
            }]),
            json!(["escrow_transfer", {
                "from": "alice", "to": "bob", "agent": "carol", "escrow_id": 1,
                "sbd_amount": "1.000 SBD", "steem_amount": "0.000 STEEM", "fee": "0.100 SBD",
                "ratification_deadline": "2030-01-01T00:00:00",
                "escrow_expiration": "2030-02-01T00:00:00", "json_meta": "{}"
            }]),
            json!(["escrow_dispute", {
                "from": "alice", "to": "bob", "agent": "carol", "who": "alice", "escrow_id": 1
            }]),
            json!(["escrow_release", {
                "from": "alice", "to": "bob", "agent": "carol", "who": "carol",
                "receiver": "bob", "escrow_id": 1,
                "sbd_amount": "1.000 SBD", "steem_amount": "0.000 STEEM"
            }]),
            json!(["pow2", {
                "work": [1, {
                    "input": pow2_input(),
                    "proof": {"n": 140, "k": 6, "seed": "ef".repeat(32), "inputs": [1, 2, 3]},
                    "prev_block": "ab".repeat(20),
                    "pow_summary": 12345
                }],
                "new_owner_key": KEY_A,
                "props": props()
            }]),
            json!(["escrow_approve", {
                "from": "alice", "to": "bob", "agent": "carol", "who": "bob",
                "escrow_id": 1, "approve": true
            }]),
            json!(["transfer_to_savings", {"from": "alice", "to": "alice", "amount": "1.000 SBD", "memo": ""}]),
            json!(["transfer_from_savings", {
                "from": "alice", "request_id": 3, "to": "bob", "amount": "1.000 SBD", "memo": ""
            }]),
            json!(["cancel_transfer_from_savings", {"from": "alice", "request_id": 3}]),
            json!(["custom_binary", {
                "required_owner_auths": [], "required_active_auths": ["alice"],
                "required_posting_auths": [], "required_auths": [authority()],
                "id": "app", "data": "00ff"
            }]),
            json!(["decline_voting_rights", {"account": "alice", "decline": true}]),
            json!(["reset_account", {
                "reset_account": "steem", "account_to_reset": "alice",
                "new_owner_authority": authority()
            }]),
            json!(["set_reset_account", {
                "account": "alice", "current_reset_account": "steem", "reset_account": "bob"
            }]),
            json!(["claim_reward_balance", {
                "account": "alice", "reward_steem": "0.000 STEEM",
                "reward_sbd": "0.001 SBD", "reward_vests": "1.000000 VESTS"
            }]),
            json!(["delegate_vesting_shares", {
                "delegator": "alice", "delegatee": "bob", "vesting_shares": "500.000000 VESTS"
            }]),
            json!(["account_create_with_delegation", {
                "fee": "0.500 STEEM", "delegation": "30000.000000 VESTS",
                "creator": "alice", "new_account_name": "erin",
                "owner": authority(), "active": authority(), "posting": authority(),
                "memo_key": KEY_A, "json_metadata": "", "extensions": []
            }]),
            json!(["witness_set_properties", {
                "owner": "witness",
                "props": [["key", "02".repeat(33)], ["url", "0568747470"]],
                "extensions": []
            }]),
            json!(["account_update2", {
                "account": "alice", "owner": null, "active": null, "posting": authority(),
                "memo_key": null, "json_metadata": "", "posting_json_metadata": "{}",
                "extensions": []
            }]),
            json!(["create_proposal", {
                "creator": "alice", "receiver": "bob",
                "start_date": "2030-01-01T00:00:00", "end_date": "2030-06-01T00:00:00",
                "daily_pay": "100.000 SBD", "subject": "tooling", "permlink": "proposal",
                "extensions": []
            }]),
            json!(["update_proposal_votes", {
                "voter": "alice", "proposal_ids": [0, 7], "approve": true, "extensions": []
            }]),
            json!(["remove_proposal", {"proposal_owner": "alice", "proposal_ids": [7], "extensions": []}]),
        ]
    }

    #[test]
    fn every_operation_round_trips() {
        let samples = sample_operations();
        assert_eq!(samples.len(), OPERATIONS.len());

        for (entry, sample) in OPERATIONS.iter().zip(&samples) {
            assert_eq!(sample[0], entry.name(), "samples must follow id order");

            let mut buf = ByteBuffer::new();
            Type::Operation
                .encode(&mut buf, sample)
                .unwrap_or_else(|e| panic!("{}: {e}", entry.name()));
            assert_eq!(buf.written()[0] as u32, entry.id, "{}", entry.name());

            buf.flip();
            let decoded = Type::Operation
                .decode(&mut buf, "STM")
                .unwrap_or_else(|e| panic!("{}: {e}", entry.name()));
            assert_eq!(&decoded, sample, "{}", entry.name());
            assert_eq!(buf.remaining(), 0, "{}", entry.name());
        }
    }

    #[test]
    fn vote_operation_bytes() {
        let op = json!(["vote", {
            "voter": "alice",
            "author": "bob",
            "permlink": "post",
            "weight": 10000
        }]);
        let mut buf = ByteBuffer::new();
        Type::Operation.encode(&mut buf, &op).unwrap();
        assert_eq!(
            hex::encode(buf.written()),
            "0005616c69636503626f6204706f73741027"
        );

        buf.flip();
        assert_eq!(Type::Operation.decode(&mut buf, "STM").unwrap(), op);
    }

    #[test]
    fn transfer_error_names_operation_and_field() {
        let op = json!(["transfer", {
            "from": "alice",
            "to": "bob",
            "amount": 5,
            "memo": ""
        }]);
        let mut buf = ByteBuffer::new();
        let err = Type::Operation.encode(&mut buf, &op).unwrap_err();
        assert!(err.to_string().contains("transfer.amount"), "{err}");
    }

    #[test]
    fn account_update_with_absent_authorities() {
        let op = json!(["account_update", {
            "account": "alice",
            "owner": null,
            "active": null,
            "posting": {
                "weight_threshold": 1,
                "account_auths": [],
                "key_auths": [["STM8m5UgaFAAYQRuaNejYdS8FVLVp9Ss3K1qAVk5de6F8s3HnVbvA", 1]]
            },
            "memo_key": "STM8m5UgaFAAYQRuaNejYdS8FVLVp9Ss3K1qAVk5de6F8s3HnVbvA",
            "json_metadata": "{}"
        }]);
        let mut buf = ByteBuffer::new();
        Type::Operation.encode(&mut buf, &op).unwrap();
        buf.flip();
        assert_eq!(Type::Operation.decode(&mut buf, "STM").unwrap(), op);
    }

    #[test]
    fn comment_options_with_beneficiaries() {
        let op = json!(["comment_options", {
            "author": "alice",
            "permlink": "post",
            "max_accepted_payout": "1000000.000 SBD",
            "percent_steem_dollars": 10000,
            "allow_votes": true,
            "allow_curation_rewards": true,
            "extensions": [[0, {"beneficiaries": [{"account": "bob", "weight": 2500}]}]]
        }]);
        let mut buf = ByteBuffer::new();
        Type::Operation.encode(&mut buf, &op).unwrap();
        buf.flip();
        assert_eq!(Type::Operation.decode(&mut buf, "STM").unwrap(), op);
    }

    #[test]
    fn transaction_schema_bytes() {
        let tx = json!({
            "ref_block_num": 34294,
            "ref_block_prefix": 3707022213u32,
            "expiration": "2016-04-06T08:29:27",
            "operations": [["vote", {
                "voter": "a",
                "author": "b",
                "permlink": "c",
                "weight": 1
            }]],
            "extensions": []
        });
        let bytes = TRANSACTION.to_bytes(&tx).unwrap();
        assert_eq!(
            hex::encode(&bytes),
            "f68585abf4dce7c804570100016101620163010000"
        );
        assert_eq!(TRANSACTION.from_bytes(&bytes, "STM").unwrap(), tx);
    }
}
