//! # Binary Codec
//!
//! The lowest layer of the wire format: a cursor over a growable byte array
//! with fixed-width integers, LEB128 varints and length-prefixed strings.
//!
//! Everything above this module (the typed serializers, the transaction
//! digest, the memo envelope) is a sequence of calls into [`ByteBuffer`].
//! Get a byte wrong here and every signature downstream is garbage, so the
//! tests in `buffer.rs` pin down exact layouts, not just round-trips.

pub mod buffer;

pub use buffer::{ByteBuffer, CodecError, Endianness};
