//! Length-prefixed field encoding.
//!
//! Every field and sequence element in the manifest is written as an
//! unaligned little-endian `u64` byte count followed by the payload it
//! describes.  The redundancy costs bytes but lets the decoder skip fields
//! it does not know and reject truncation at every step.
//!
//! The writer half is infallible (it appends to a `Vec<u8>` and patches the
//! prefix in place once the payload length is known).  The reader half
//! validates each prefix against the remaining buffer before consuming it.

use byteorder::{LittleEndian, ReadBytesExt};

use crate::{Error, Result};

/// Width of every length prefix, in bytes.
pub const LEN_PREFIX: usize = 8;

// ── Writer ───────────────────────────────────────────────────────────────────

/// Emit `[u64 field_len][payload]`, where the payload is whatever `payload`
/// appends to the buffer.  The prefix is patched after the fact so nested
/// fields compose without intermediate allocations.
pub fn write_field<F>(out: &mut Vec<u8>, payload: F)
where
    F: FnOnce(&mut Vec<u8>),
{
    let mark = out.len();
    out.extend_from_slice(&[0u8; LEN_PREFIX]);
    payload(out);
    let len = (out.len() - mark - LEN_PREFIX) as u64;
    out[mark..mark + LEN_PREFIX].copy_from_slice(&len.to_le_bytes());
}

pub fn write_u64_field(out: &mut Vec<u8>, value: u64) {
    write_field(out, |b| b.extend_from_slice(&value.to_le_bytes()));
}

pub fn write_u32_field(out: &mut Vec<u8>, value: u32) {
    write_field(out, |b| b.extend_from_slice(&value.to_le_bytes()));
}

pub fn write_u8_field(out: &mut Vec<u8>, value: u8) {
    write_field(out, |b| b.push(value));
}

/// String fields restate their byte count inside the payload: the field body
/// is `[u64 len][len bytes]`.  The inner length must agree with the outer
/// prefix; the decoder rejects any disagreement.
pub fn write_str_field(out: &mut Vec<u8>, value: &str) {
    write_field(out, |b| {
        b.extend_from_slice(&(value.len() as u64).to_le_bytes());
        b.extend_from_slice(value.as_bytes());
    });
}

/// An absent optional value is a zero-length field.
pub fn write_empty_field(out: &mut Vec<u8>) {
    out.extend_from_slice(&0u64.to_le_bytes());
}

// ── Reader ───────────────────────────────────────────────────────────────────

/// Cursor over a byte slice that consumes length-prefixed fields.
pub struct FieldReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn at_end(&self) -> bool {
        self.pos == self.buf.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(Error::CorruptedData(format!(
                "need {n} bytes, only {} remain",
                self.remaining()
            )));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read a raw little-endian u64 (used for length prefixes and the
    /// element count inside a sequence field).
    pub fn read_u64(&mut self) -> Result<u64> {
        let mut bytes = self.take(LEN_PREFIX)?;
        bytes
            .read_u64::<LittleEndian>()
            .map_err(|_| Error::CorruptedData("truncated length prefix".into()))
    }

    /// Read `[u64 len][len bytes]` and return the payload slice.
    pub fn read_field(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u64()?;
        if len > self.remaining() as u64 {
            return Err(Error::CorruptedData(format!(
                "field declares {len} bytes but only {} remain",
                self.remaining()
            )));
        }
        self.take(len as usize)
    }

    pub fn read_u64_field(&mut self) -> Result<u64> {
        let mut field = self.fixed_field(8)?;
        field
            .read_u64::<LittleEndian>()
            .map_err(|_| Error::CorruptedData("truncated u64 field".into()))
    }

    pub fn read_u32_field(&mut self) -> Result<u32> {
        let mut field = self.fixed_field(4)?;
        field
            .read_u32::<LittleEndian>()
            .map_err(|_| Error::CorruptedData("truncated u32 field".into()))
    }

    /// Optional u8 field: zero-length means absent.
    pub fn read_opt_u8_field(&mut self) -> Result<Option<u8>> {
        let field = self.read_field()?;
        match field.len() {
            0 => Ok(None),
            1 => Ok(Some(field[0])),
            n => Err(Error::CorruptedData(format!(
                "optional u8 field has length {n}"
            ))),
        }
    }

    pub fn read_str_field(&mut self) -> Result<String> {
        let field = self.read_field()?;
        let mut inner = FieldReader::new(field);
        let len = inner.read_u64()?;
        if len != inner.remaining() as u64 {
            return Err(Error::CorruptedData(format!(
                "string length {len} disagrees with field length {}",
                field.len()
            )));
        }
        let bytes = inner.take(len as usize)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| Error::CorruptedData("string field is not valid UTF-8".into()))
    }

    fn fixed_field(&mut self, width: usize) -> Result<&'a [u8]> {
        let field = self.read_field()?;
        if field.len() != width {
            return Err(Error::CorruptedData(format!(
                "primitive field has length {}, expected {width}",
                field.len()
            )));
        }
        Ok(field)
    }
}
