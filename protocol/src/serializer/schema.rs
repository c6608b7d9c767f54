//! Type combinators and object schemas.
//!
//! A [`Type`] knows how to move one JSON value to and from the wire. The
//! primitives map one-to-one onto [`ByteBuffer`] calls; the composite ones
//! (`Array`, `Optional`, `FlatMap`, ...) wrap other types. An object is a
//! [`Schema`]: an ordered list of named fields, written back to back with no
//! tags or lengths between them.
//!
//! Everything is `const`-constructible so the whole protocol table lives in
//! static memory and costs nothing at startup.
//!
//! JSON conventions, since node APIs and this module have to agree:
//!
//! | Type            | JSON form                                  |
//! |-----------------|--------------------------------------------|
//! | `Uint64/Int64`  | number, or decimal string                  |
//! | `Binary`        | lowercase hex string                       |
//! | `Asset`         | `"1.000 STEEM"`                            |
//! | `Date`          | `"2016-08-08T12:24:17"`                    |
//! | `PublicKey`     | `"STM..."`                                 |
//! | `FlatMap`       | `[[key, value], ...]`                      |
//! | `StaticVariant` | `[type_index, payload]`                    |
//! | `Operation`     | `["transfer", { ...fields }]`              |

use std::str::FromStr;

use serde_json::{json, Map, Value};

use super::operations;
use super::types::{Asset, TimePointSec};
use crate::codec::ByteBuffer;
use crate::config::PUBLIC_KEY_LENGTH;
use crate::crypto::PublicKey;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Type
// ---------------------------------------------------------------------------

/// One wire type. Composite variants borrow their element types statically.
#[derive(Debug, Clone, Copy)]
pub enum Type {
    /// Placeholder element of always-empty extension lists. Any attempt to
    /// write or read an actual value fails.
    Void,
    Bool,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Int16,
    Int64,
    /// LEB128 unsigned, up to 32 bits.
    VarUint32,
    /// Varint length followed by UTF-8.
    String,
    /// Raw bytes: fixed width when `Some`, varint-length-prefixed when `None`.
    Binary(Option<usize>),
    Asset,
    Date,
    PublicKey,
    /// Varint count followed by elements.
    Array(&'static Type),
    /// Same wire form as `Array`, but duplicate elements are rejected.
    Set(&'static Type),
    /// `0x00` for absent, `0x01` followed by the value for present.
    Optional(&'static Type),
    /// Varint count followed by key/value pairs.
    FlatMap(&'static Type, &'static Type),
    /// Varint type index followed by that alternative's payload.
    StaticVariant(&'static [Type]),
    Object(&'static Schema),
    /// Varint operation id followed by that operation's fields.
    Operation,
}

/// A named field of an object schema.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub ty: Type,
}

impl Field {
    pub const fn new(name: &'static str, ty: Type) -> Self {
        Self { name, ty }
    }
}

/// An ordered list of fields. Field order is wire order.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [Field],
}

impl Type {
    /// Appends `value` to `buf`.
    ///
    /// # Errors
    ///
    /// [`Error::Serialization`] when `value` has the wrong JSON shape or is
    /// out of range. Nothing is rolled back: on error, `buf` may hold a
    /// partial write and should be discarded.
    pub fn encode(&self, buf: &mut ByteBuffer, value: &Value) -> Result<()> {
        match self {
            Type::Void => return Err(Error::serialization("", "void cannot be serialized")),
            Type::Bool => {
                buf.write_u8(u8::from(expect_bool(value)?))?;
            }
            Type::Uint8 => {
                buf.write_u8(expect_unsigned(value, u64::from(u8::MAX))? as u8)?;
            }
            Type::Uint16 => {
                buf.write_u16(expect_unsigned(value, u64::from(u16::MAX))? as u16)?;
            }
            Type::Uint32 => {
                buf.write_u32(expect_unsigned(value, u64::from(u32::MAX))? as u32)?;
            }
            Type::Uint64 => {
                buf.write_u64(expect_unsigned(value, u64::MAX)?)?;
            }
            Type::Int16 => {
                let n = expect_signed(value, i64::from(i16::MIN), i64::from(i16::MAX))?;
                buf.write_i16(n as i16)?;
            }
            Type::Int64 => {
                buf.write_i64(expect_signed(value, i64::MIN, i64::MAX)?)?;
            }
            Type::VarUint32 => {
                buf.write_varint32(expect_unsigned(value, u64::from(u32::MAX))? as u32)?;
            }
            Type::String => {
                buf.write_vstring(expect_str(value)?)?;
            }
            Type::Binary(width) => {
                let bytes = hex::decode(expect_str(value)?)
                    .map_err(|e| Error::serialization("", format!("invalid hex: {e}")))?;
                match width {
                    Some(n) if bytes.len() != *n => {
                        return Err(Error::serialization(
                            "",
                            format!("expected {n} bytes, got {}", bytes.len()),
                        ));
                    }
                    Some(_) => {
                        buf.write_bytes(&bytes)?;
                    }
                    None => {
                        buf.write_vbytes(&bytes)?;
                    }
                }
            }
            Type::Asset => {
                Asset::from_str(expect_str(value)?)?.write(buf)?;
            }
            Type::Date => {
                let time = match value {
                    Value::String(text) => text.parse::<TimePointSec>()?,
                    other => TimePointSec::from_secs(expect_unsigned(other, u64::from(u32::MAX))? as u32),
                };
                buf.write_u32(time.secs())?;
            }
            Type::PublicKey => {
                let key = PublicKey::from_wif(expect_str(value)?)?;
                buf.write_bytes(key.as_bytes())?;
            }
            Type::Array(element) => {
                encode_sequence(buf, element, expect_array(value)?)?;
            }
            Type::Set(element) => {
                let items = expect_array(value)?;
                for (i, item) in items.iter().enumerate() {
                    if items[..i].contains(item) {
                        return Err(Error::serialization("", format!("duplicate set element {item}")));
                    }
                }
                encode_sequence(buf, element, items)?;
            }
            Type::Optional(inner) => {
                if value.is_null() {
                    buf.write_u8(0)?;
                } else {
                    buf.write_u8(1)?;
                    inner.encode(buf, value)?;
                }
            }
            Type::FlatMap(key_ty, value_ty) => {
                let pairs = flat_map_pairs(value)?;
                buf.write_varint32(length_u32(pairs.len())?)?;
                for (i, (key, item)) in pairs.into_iter().enumerate() {
                    key_ty.encode(buf, &key).map_err(|e| e.within(&format!("[{i}].key")))?;
                    value_ty.encode(buf, &item).map_err(|e| e.within(&format!("[{i}].value")))?;
                }
            }
            Type::StaticVariant(alternatives) => {
                let (index, payload) = expect_pair(value)?;
                let index = expect_unsigned(index, u64::from(u32::MAX))? as u32;
                let alternative = alternatives.get(index as usize).ok_or_else(|| {
                    Error::serialization("", format!("variant index {index} out of range"))
                })?;
                buf.write_varint32(index)?;
                alternative.encode(buf, payload)?;
            }
            Type::Object(schema) => schema.encode(buf, value)?,
            Type::Operation => {
                let (name, params) = expect_pair(value)?;
                let op = match name {
                    Value::String(name) => operations::find_by_name(name),
                    other => operations::find_by_id(expect_unsigned(other, u64::from(u32::MAX))? as u32),
                }
                .ok_or_else(|| Error::serialization("", format!("unknown operation {name}")))?;
                buf.write_varint32(op.id)?;
                op.schema.encode(buf, params)?;
            }
        }
        Ok(())
    }

    /// Reads one value of this type at the cursor.
    ///
    /// `address_prefix` is used to render any public keys encountered.
    pub fn decode(&self, buf: &mut ByteBuffer, address_prefix: &str) -> Result<Value> {
        Ok(match self {
            Type::Void => return Err(Error::serialization("", "void cannot be deserialized")),
            Type::Bool => Value::Bool(buf.read_u8()? != 0),
            Type::Uint8 => json!(buf.read_u8()?),
            Type::Uint16 => json!(buf.read_u16()?),
            Type::Uint32 => json!(buf.read_u32()?),
            Type::Uint64 => json!(buf.read_u64()?),
            Type::Int16 => json!(buf.read_i16()?),
            Type::Int64 => json!(buf.read_i64()?),
            Type::VarUint32 => json!(buf.read_varint32()?),
            Type::String => Value::String(buf.read_vstring()?),
            Type::Binary(Some(n)) => Value::String(hex::encode(buf.read_bytes(*n)?)),
            Type::Binary(None) => Value::String(hex::encode(buf.read_vbytes()?)),
            Type::Asset => Value::String(Asset::read(buf)?.to_string()),
            Type::Date => Value::String(TimePointSec::from_secs(buf.read_u32()?).to_string()),
            Type::PublicKey => {
                let raw = buf.read_bytes(PUBLIC_KEY_LENGTH)?;
                let key = PublicKey::from_bytes(&raw)?.with_prefix(address_prefix);
                Value::String(key.to_wif())
            }
            Type::Array(element) | Type::Set(element) => {
                let count = buf.read_varint32()? as usize;
                let mut items = Vec::with_capacity(count.min(buf.remaining()));
                for i in 0..count {
                    items.push(
                        element
                            .decode(buf, address_prefix)
                            .map_err(|e| e.within(&format!("[{i}]")))?,
                    );
                }
                Value::Array(items)
            }
            Type::Optional(inner) => match buf.read_u8()? {
                0 => Value::Null,
                1 => inner.decode(buf, address_prefix)?,
                flag => return Err(Error::serialization("", format!("invalid optional flag {flag}"))),
            },
            Type::FlatMap(key_ty, value_ty) => {
                let count = buf.read_varint32()? as usize;
                let mut pairs = Vec::with_capacity(count.min(buf.remaining()));
                for i in 0..count {
                    let key = key_ty
                        .decode(buf, address_prefix)
                        .map_err(|e| e.within(&format!("[{i}].key")))?;
                    let item = value_ty
                        .decode(buf, address_prefix)
                        .map_err(|e| e.within(&format!("[{i}].value")))?;
                    pairs.push(json!([key, item]));
                }
                Value::Array(pairs)
            }
            Type::StaticVariant(alternatives) => {
                let index = buf.read_varint32()?;
                let alternative = alternatives.get(index as usize).ok_or_else(|| {
                    Error::serialization("", format!("variant index {index} out of range"))
                })?;
                json!([index, alternative.decode(buf, address_prefix)?])
            }
            Type::Object(schema) => schema.decode(buf, address_prefix)?,
            Type::Operation => {
                let id = buf.read_varint32()?;
                let op = operations::find_by_id(id)
                    .ok_or_else(|| Error::serialization("", format!("unknown operation id {id}")))?;
                json!([op.schema.name, op.schema.decode(buf, address_prefix)?])
            }
        })
    }
}

impl Schema {
    /// Writes every field of `value`, in schema order.
    ///
    /// Missing fields are an error. Unknown fields are ignored.
    pub fn encode(&self, buf: &mut ByteBuffer, value: &Value) -> Result<()> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::serialization(self.name, format!("expected object, got {}", kind(value))))?;
        for field in self.fields {
            let item = object
                .get(field.name)
                .ok_or_else(|| Error::serialization(field.name, "missing field").within(self.name))?;
            field
                .ty
                .encode(buf, item)
                .map_err(|e| e.within(field.name).within(self.name))?;
        }
        Ok(())
    }

    /// Reads every field, in schema order, into a JSON object.
    pub fn decode(&self, buf: &mut ByteBuffer, address_prefix: &str) -> Result<Value> {
        let mut object = Map::new();
        for field in self.fields {
            let item = field
                .ty
                .decode(buf, address_prefix)
                .map_err(|e| e.within(field.name).within(self.name))?;
            object.insert(field.name.to_string(), item);
        }
        Ok(Value::Object(object))
    }

    /// Encodes `value` into a fresh byte vector.
    pub fn to_bytes(&self, value: &Value) -> Result<Vec<u8>> {
        let mut buf = ByteBuffer::new();
        self.encode(&mut buf, value)?;
        Ok(buf.into_written())
    }

    /// Decodes a complete object from `bytes`. Trailing bytes are an error.
    pub fn from_bytes(&self, bytes: &[u8], address_prefix: &str) -> Result<Value> {
        let mut buf = ByteBuffer::wrap(bytes);
        let value = self.decode(&mut buf, address_prefix)?;
        if buf.remaining() != 0 {
            return Err(Error::serialization(
                self.name,
                format!("{} trailing bytes", buf.remaining()),
            ));
        }
        Ok(value)
    }
}

// ---------------------------------------------------------------------------
// JSON shape helpers
// ---------------------------------------------------------------------------

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(expected: &str, value: &Value) -> Error {
    Error::serialization("", format!("expected {expected}, got {}", kind(value)))
}

fn expect_bool(value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) if n.as_u64() == Some(0) => Ok(false),
        Value::Number(n) if n.as_u64() == Some(1) => Ok(true),
        other => Err(mismatch("bool", other)),
    }
}

fn expect_str(value: &Value) -> Result<&str> {
    value.as_str().ok_or_else(|| mismatch("string", value))
}

fn expect_array(value: &Value) -> Result<&[Value]> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| mismatch("array", value))
}

fn expect_pair(value: &Value) -> Result<(&Value, &Value)> {
    match expect_array(value)? {
        [first, second] => Ok((first, second)),
        other => Err(Error::serialization(
            "",
            format!("expected 2-element array, got {} elements", other.len()),
        )),
    }
}

/// Accepts a JSON number or a decimal string, bounded by `max`.
fn expect_unsigned(value: &Value, max: u64) -> Result<u64> {
    let n = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse::<u64>().ok(),
        other => return Err(mismatch("unsigned integer", other)),
    }
    .ok_or_else(|| Error::serialization("", format!("{value} is not an unsigned integer")))?;
    if n > max {
        return Err(Error::serialization("", format!("{n} exceeds maximum {max}")));
    }
    Ok(n)
}

fn expect_signed(value: &Value, min: i64, max: i64) -> Result<i64> {
    let n = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse::<i64>().ok(),
        other => return Err(mismatch("integer", other)),
    }
    .ok_or_else(|| Error::serialization("", format!("{value} is not an integer")))?;
    if n < min || n > max {
        return Err(Error::serialization("", format!("{n} outside [{min}, {max}]")));
    }
    Ok(n)
}

fn length_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::serialization("", format!("length {len} exceeds u32")))
}

fn encode_sequence(buf: &mut ByteBuffer, element: &Type, items: &[Value]) -> Result<()> {
    buf.write_varint32(length_u32(items.len())?)?;
    for (i, item) in items.iter().enumerate() {
        element.encode(buf, item).map_err(|e| e.within(&format!("[{i}]")))?;
    }
    Ok(())
}

/// Flat maps arrive as `[[k, v], ...]`. A JSON object is also accepted for
/// string-keyed maps; its entries are taken in key order.
fn flat_map_pairs(value: &Value) -> Result<Vec<(Value, Value)>> {
    match value {
        Value::Object(map) => Ok(map
            .iter()
            .map(|(k, v)| (Value::String(k.clone()), v.clone()))
            .collect()),
        Value::Array(items) => items
            .iter()
            .map(|item| expect_pair(item).map(|(k, v)| (k.clone(), v.clone())))
            .collect(),
        other => Err(mismatch("array of pairs", other)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
