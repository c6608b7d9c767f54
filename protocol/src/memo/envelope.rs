//! The binary envelope around an encrypted memo.
//!
//! ```text
//! from:      33-byte compressed public key
//! to:        33-byte compressed public key
//! nonce:     u64 little-endian
//! check:     u32 little-endian
//! encrypted: varint length + ciphertext
//! ```

use crate::codec::ByteBuffer;
use crate::config::PUBLIC_KEY_LENGTH;
use crate::crypto::PublicKey;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoEnvelope {
    pub from: PublicKey,
    pub to: PublicKey,
    pub nonce: u64,
    /// First four bytes of `sha256(key_material)`, little-endian. Lets the
    /// reader reject a wrong key before attempting decryption.
    pub check: u32,
    pub encrypted: Vec<u8>,
}

impl MemoEnvelope {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = ByteBuffer::new();
        buf.write_bytes(self.from.as_bytes())?;
        buf.write_bytes(self.to.as_bytes())?;
        buf.write_u64(self.nonce)?;
        buf.write_u32(self.check)?;
        buf.write_vbytes(&self.encrypted)?;
        Ok(buf.into_written())
    }

    /// Parses an envelope, giving both keys `address_prefix`.
    pub fn from_bytes(bytes: &[u8], address_prefix: &str) -> Result<Self> {
        let mut buf = ByteBuffer::wrap(bytes);
        let read_key = |buf: &mut ByteBuffer, field: &str| -> Result<PublicKey> {
            let raw = buf.read_bytes(PUBLIC_KEY_LENGTH).map_err(|e| Error::from(e).within(field))?;
            Ok(PublicKey::from_bytes(&raw)?.with_prefix(address_prefix))
        };
        let from = read_key(&mut buf, "from")?;
        let to = read_key(&mut buf, "to")?;
        let nonce = buf.read_u64().map_err(|e| Error::from(e).within("nonce"))?;
        let check = buf.read_u32().map_err(|e| Error::from(e).within("check"))?;
        let encrypted = buf
            .read_vbytes()
            .map_err(|e| Error::from(e).within("encrypted"))?;

        Ok(Self {
            from,
            to,
            nonce,
            check,
            encrypted,
        })
    }
}
