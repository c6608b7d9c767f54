//! # Protocol Serialization
//!
//! Turns JSON-shaped ledger objects into the exact bytes the network signs,
//! and back again.
//!
//! The layering is:
//!
//! - [`types`] for values with their own wire form ([`Asset`],
//!   [`TimePointSec`], [`Authority`]).
//! - [`schema`] for the combinators ([`Type`]) and ordered field lists
//!   ([`Schema`]).
//! - [`operations`] for the static protocol table: every operation, its id,
//!   its fields, plus the transaction envelope.
//!
//! There is no framing, tagging or self-description in the output. Both
//! sides must agree on the schema, which is why the table is consensus code
//! and not configuration.
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//! use steem_protocol::serializer::operations::find_by_name;
//!
//! let transfer = find_by_name("transfer").unwrap();
//! let bytes = transfer
//!     .schema
//!     .to_bytes(&json!({
//!         "from": "alice",
//!         "to": "bob",
//!         "amount": "1.000 STEEM",
//!         "memo": ""
//!     }))
//!     .unwrap();
//! assert_eq!(bytes.len(), 6 + 4 + 16 + 1);
//! ```

pub mod operations;
pub mod schema;
pub mod types;

pub use operations::{find_by_id, find_by_name, OperationSchema, OPERATIONS, SIGNED_TRANSACTION, TRANSACTION};
pub use schema::{Field, Schema, Type};
pub use types::{Asset, AssetSymbol, Authority, TimePointSec};
