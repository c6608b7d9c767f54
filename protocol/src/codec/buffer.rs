//! Growable byte buffer with a read/write cursor.
//!
//! [`ByteBuffer`] is the foundation of the wire format. It keeps a backing
//! array plus three positions:
//!
//! ```text
//! 0 <= marked_offset? <= offset <= limit <= capacity
//! ```
//!
//! Relative operations read or write at `offset` and advance it. Absolute
//! operations (`*_at`) take an explicit position and leave the cursor alone.
//! After a series of writes, [`ByteBuffer::flip`] turns the written region
//! into the readable one.
//!
//! The ledger's wire format is little-endian throughout; big-endian exists
//! only because a buffer that can't do it tends to get reimplemented badly
//! the first time someone needs it.

use thiserror::Error;

use crate::config::{DEFAULT_BUFFER_CAPACITY, MAX_VARINT32_BYTES};

/// Errors raised by cursor operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The access `[offset, offset + len)` falls outside `[0, limit]`.
    #[error("access out of bounds: offset {offset} + {len} exceeds limit {limit}")]
    OutOfBounds {
        /// Start of the attempted access.
        offset: usize,
        /// Number of bytes requested.
        len: usize,
        /// Current limit of the buffer.
        limit: usize,
    },

    /// A varint32 ran longer than five bytes or overflowed 32 bits.
    #[error("malformed varint32: more than {MAX_VARINT32_BYTES} bytes or value exceeds u32")]
    VarintOverflow,

    /// A length-prefixed string did not contain valid UTF-8.
    #[error("string is not valid UTF-8")]
    InvalidUtf8,
}

/// Byte order used for fixed-width integers and floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    /// Least significant byte first. The ledger wire format.
    #[default]
    Little,
    /// Most significant byte first.
    Big,
}

/// A growable byte array with relative and absolute cursor operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteBuffer {
    /// Backing storage. `data.len()` is the capacity.
    data: Vec<u8>,
    offset: usize,
    limit: usize,
    marked_offset: Option<usize>,
    endianness: Endianness,
    assertions: bool,
}

// Generates the relative and absolute accessors for one fixed-width type.
macro_rules! fixed_width {
    ($ty:ty, $read:ident, $read_at:ident, $write:ident, $write_at:ident) => {
        #[doc = concat!("Reads a `", stringify!($ty), "` at the cursor and advances it.")]
        pub fn $read(&mut self) -> Result<$ty, CodecError> {
            let value = self.$read_at(self.offset)?;
            self.offset += std::mem::size_of::<$ty>();
            Ok(value)
        }

        #[doc = concat!("Reads a `", stringify!($ty), "` at `offset` without moving the cursor.")]
        pub fn $read_at(&self, offset: usize) -> Result<$ty, CodecError> {
            const N: usize = std::mem::size_of::<$ty>();
            let mut raw = [0u8; N];
            raw.copy_from_slice(self.slice_at(offset, N)?);
            Ok(match self.endianness {
                Endianness::Little => <$ty>::from_le_bytes(raw),
                Endianness::Big => <$ty>::from_be_bytes(raw),
            })
        }

        #[doc = concat!("Writes a `", stringify!($ty), "` at the cursor and advances it.")]
        pub fn $write(&mut self, value: $ty) -> Result<&mut Self, CodecError> {
            let offset = self.offset;
            self.$write_at(value, offset)?;
            self.offset = offset + std::mem::size_of::<$ty>();
            Ok(self)
        }

        #[doc = concat!("Writes a `", stringify!($ty), "` at `offset` without moving the cursor.")]
        pub fn $write_at(&mut self, value: $ty, offset: usize) -> Result<&mut Self, CodecError> {
            let raw = match self.endianness {
                Endianness::Little => value.to_le_bytes(),
                Endianness::Big => value.to_be_bytes(),
            };
            self.put_at(offset, &raw)?;
            Ok(self)
        }
    };
}

impl ByteBuffer {
    /// Creates an empty buffer with the given capacity, little-endian.
    ///
    /// A fresh buffer is a write buffer: `limit == capacity`, and the limit
    /// keeps tracking the capacity as writes grow it.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity],
            offset: 0,
            limit: capacity,
            marked_offset: None,
            endianness: Endianness::Little,
            assertions: true,
        }
    }

    /// Creates an empty buffer with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }

    /// Wraps existing bytes for reading: `offset = 0`, `limit = bytes.len()`.
    pub fn wrap(bytes: &[u8]) -> Self {
        Self {
            data: bytes.to_vec(),
            offset: 0,
            limit: bytes.len(),
            marked_offset: None,
            endianness: Endianness::Little,
            assertions: true,
        }
    }

    /// Switches the byte order for subsequent fixed-width operations.
    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    /// Disables bounds assertions on writes.
    ///
    /// With assertions off, a write past `limit` grows the buffer and moves
    /// the limit instead of failing. Reads past `limit` still fail: there is
    /// nothing there to read.
    pub fn no_assert(mut self) -> Self {
        self.assertions = false;
        self
    }

    // -----------------------------------------------------------------------
    // Cursor management
    // -----------------------------------------------------------------------

    /// Current cursor position.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Moves the cursor. Fails if `offset > limit`.
    pub fn set_offset(&mut self, offset: usize) -> Result<(), CodecError> {
        if offset > self.limit {
            return Err(CodecError::OutOfBounds { offset, len: 0, limit: self.limit });
        }
        self.offset = offset;
        Ok(())
    }

    /// End of the readable (or writable) region.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Size of the backing array.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Byte order in use.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Bytes left between the cursor and the limit.
    pub fn remaining(&self) -> usize {
        self.limit - self.offset
    }

    /// Turns written data into readable data: `limit = offset; offset = 0`.
    pub fn flip(&mut self) -> &mut Self {
        self.limit = self.offset;
        self.offset = 0;
        self.marked_offset = None;
        self
    }

    /// Remembers the current cursor position for a later [`reset`](Self::reset).
    pub fn mark(&mut self) -> &mut Self {
        self.marked_offset = Some(self.offset);
        self
    }

    /// Returns to the marked position, or to the start if nothing is marked.
    pub fn reset(&mut self) -> &mut Self {
        self.offset = self.marked_offset.take().unwrap_or(0);
        self
    }

    /// Rewinds to an empty write buffer without releasing memory.
    pub fn clear(&mut self) -> &mut Self {
        self.offset = 0;
        self.limit = self.data.len();
        self.marked_offset = None;
        self
    }

    /// The bytes written so far: `[0, offset)`.
    pub fn written(&self) -> &[u8] {
        &self.data[..self.offset]
    }

    /// The unread bytes: `[offset, limit)`.
    pub fn readable(&self) -> &[u8] {
        &self.data[self.offset..self.limit]
    }

    /// Copies the unread bytes out, leaving the cursor where it is.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.readable().to_vec()
    }

    /// Consumes a write buffer, keeping `[0, offset)`.
    pub fn into_written(mut self) -> Vec<u8> {
        self.data.truncate(self.offset);
        self.data
    }

    // -----------------------------------------------------------------------
    // Raw access
    // -----------------------------------------------------------------------

    fn slice_at(&self, offset: usize, len: usize) -> Result<&[u8], CodecError> {
        match offset.checked_add(len) {
            Some(end) if end <= self.limit => Ok(&self.data[offset..end]),
            _ => Err(CodecError::OutOfBounds { offset, len, limit: self.limit }),
        }
    }

    fn put_at(&mut self, offset: usize, bytes: &[u8]) -> Result<(), CodecError> {
        let end = offset
            .checked_add(bytes.len())
            .ok_or(CodecError::OutOfBounds { offset, len: bytes.len(), limit: self.limit })?;

        if self.assertions && offset > self.limit {
            return Err(CodecError::OutOfBounds { offset, len: bytes.len(), limit: self.limit });
        }

        let tracks_capacity = self.limit == self.data.len();
        self.ensure_capacity(end);
        if tracks_capacity {
            self.limit = self.data.len();
        } else if end > self.limit {
            if self.assertions {
                return Err(CodecError::OutOfBounds { offset, len: bytes.len(), limit: self.limit });
            }
            self.limit = end;
        }

        self.data[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    /// Grows the backing array so that it holds at least `required` bytes.
    ///
    /// Growth is to at least double the current capacity, or exactly
    /// `required` if that is larger.
    pub fn ensure_capacity(&mut self, required: usize) {
        let capacity = self.data.len();
        if required > capacity {
            let grown = capacity.saturating_mul(2).max(required);
            self.data.resize(grown, 0);
        }
    }

    /// Writes raw bytes at the cursor.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self, CodecError> {
        let offset = self.offset;
        self.put_at(offset, bytes)?;
        self.offset = offset + bytes.len();
        Ok(self)
    }

    /// Writes raw bytes at `offset` without moving the cursor.
    pub fn write_bytes_at(&mut self, bytes: &[u8], offset: usize) -> Result<&mut Self, CodecError> {
        self.put_at(offset, bytes)?;
        Ok(self)
    }

    /// Reads exactly `len` bytes at the cursor.
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, CodecError> {
        let bytes = self.slice_at(self.offset, len)?.to_vec();
        self.offset += len;
        Ok(bytes)
    }

    /// Reads exactly `len` bytes at `offset` without moving the cursor.
    pub fn read_bytes_at(&self, offset: usize, len: usize) -> Result<Vec<u8>, CodecError> {
        Ok(self.slice_at(offset, len)?.to_vec())
    }

    // -----------------------------------------------------------------------
    // Fixed-width numbers
    // -----------------------------------------------------------------------

    fixed_width!(i8, read_i8, read_i8_at, write_i8, write_i8_at);
    fixed_width!(u8, read_u8, read_u8_at, write_u8, write_u8_at);
    fixed_width!(i16, read_i16, read_i16_at, write_i16, write_i16_at);
    fixed_width!(u16, read_u16, read_u16_at, write_u16, write_u16_at);
    fixed_width!(i32, read_i32, read_i32_at, write_i32, write_i32_at);
    fixed_width!(u32, read_u32, read_u32_at, write_u32, write_u32_at);
    fixed_width!(i64, read_i64, read_i64_at, write_i64, write_i64_at);
    fixed_width!(u64, read_u64, read_u64_at, write_u64, write_u64_at);
    fixed_width!(f32, read_f32, read_f32_at, write_f32, write_f32_at);
    fixed_width!(f64, read_f64, read_f64_at, write_f64, write_f64_at);

    // -----------------------------------------------------------------------
    // Varint32
    // -----------------------------------------------------------------------

    /// Number of bytes `value` occupies as an unsigned LEB128 varint (1–5).
    pub fn calculate_varint32(value: u32) -> usize {
        match value {
            0..=0x7F => 1,
            0x80..=0x3FFF => 2,
            0x4000..=0x1F_FFFF => 3,
            0x20_0000..=0x0FFF_FFFF => 4,
            _ => 5,
        }
    }

    fn encode_varint32(mut value: u32) -> ([u8; MAX_VARINT32_BYTES], usize) {
        let mut out = [0u8; MAX_VARINT32_BYTES];
        let mut len = 0;
        loop {
            let byte = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                out[len] = byte;
                return (out, len + 1);
            }
            out[len] = byte | 0x80;
            len += 1;
        }
    }

    /// Writes an unsigned LEB128 varint at the cursor. Returns bytes written.
    pub fn write_varint32(&mut self, value: u32) -> Result<usize, CodecError> {
        let (raw, len) = Self::encode_varint32(value);
        self.write_bytes(&raw[..len])?;
        Ok(len)
    }

    /// Writes an unsigned LEB128 varint at `offset`. Returns bytes written.
    pub fn write_varint32_at(&mut self, value: u32, offset: usize) -> Result<usize, CodecError> {
        let (raw, len) = Self::encode_varint32(value);
        self.write_bytes_at(&raw[..len], offset)?;
        Ok(len)
    }

    /// Reads an unsigned LEB128 varint at the cursor.
    pub fn read_varint32(&mut self) -> Result<u32, CodecError> {
        let (value, len) = self.read_varint32_at(self.offset)?;
        self.offset += len;
        Ok(value)
    }

    /// Reads an unsigned LEB128 varint at `offset`, returning `(value, length)`.
    pub fn read_varint32_at(&self, offset: usize) -> Result<(u32, usize), CodecError> {
        let mut value: u64 = 0;
        for i in 0..MAX_VARINT32_BYTES {
            let byte = self.read_u8_at(offset + i)?;
            value |= u64::from(byte & 0x7F) << (7 * i);
            if byte & 0x80 == 0 {
                let value = u32::try_from(value).map_err(|_| CodecError::VarintOverflow)?;
                return Ok((value, i + 1));
            }
        }
        Err(CodecError::VarintOverflow)
    }

    /// Writes a signed varint using zig-zag encoding.
    pub fn write_varint32_zigzag(&mut self, value: i32) -> Result<usize, CodecError> {
        self.write_varint32(((value << 1) ^ (value >> 31)) as u32)
    }

    /// Reads a zig-zag encoded signed varint.
    pub fn read_varint32_zigzag(&mut self) -> Result<i32, CodecError> {
        let raw = self.read_varint32()?;
        Ok(((raw >> 1) as i32) ^ -((raw & 1) as i32))
    }

    // -----------------------------------------------------------------------
    // Length-prefixed strings and blobs
    // -----------------------------------------------------------------------

    /// Writes `varint32(len)` followed by the UTF-8 bytes. Returns bytes written.
    pub fn write_vstring(&mut self, value: &str) -> Result<usize, CodecError> {
        self.write_vbytes(value.as_bytes())
    }

    /// Reads a length-prefixed UTF-8 string.
    pub fn read_vstring(&mut self) -> Result<String, CodecError> {
        let bytes = self.read_vbytes()?;
        String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)
    }

    /// Writes `varint32(len)` followed by raw bytes. Returns bytes written.
    pub fn write_vbytes(&mut self, bytes: &[u8]) -> Result<usize, CodecError> {
        let len = u32::try_from(bytes.len()).map_err(|_| CodecError::VarintOverflow)?;
        let prefix = self.write_varint32(len)?;
        self.write_bytes(bytes)?;
        Ok(prefix + bytes.len())
    }

    /// Reads a length-prefixed byte blob.
    ///
    /// The whole read fails, and the cursor stays put, if fewer bytes remain
    /// than the prefix announces.
    pub fn read_vbytes(&mut self) -> Result<Vec<u8>, CodecError> {
        let start = self.offset;
        let (len, prefix) = self.read_varint32_at(start)?;
        let bytes = self.read_bytes_at(start + prefix, len as usize)?;
        self.offset = start + prefix + len as usize;
        Ok(bytes)
    }
}

impl Default for ByteBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
