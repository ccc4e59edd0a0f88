//! Manifest records and their wire encoding.
//!
//! The layout is fixed: a version field, a length-prefixed entry sequence,
//! then an optional algorithm id.  Archives written by older tooling end
//! after the entry sequence; they decode with `algorithm_id = None` and the
//! decoder falls back to content sniffing.

use crate::serializer::{
    write_empty_field, write_field, write_str_field, write_u32_field, write_u64_field,
    write_u8_field, FieldReader, LEN_PREFIX,
};
use crate::{Error, Result};

/// Current manifest format version.
pub const MANIFEST_VERSION: u32 = 1;

/// One record per archived file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Relative path with `/` separators, as it will be recreated on disk.
    pub original_path: String,
    /// Locator into the data region, always of the form `offset:<decimal>`.
    pub encoded_path:  String,
    pub original_size: u64,
    /// Equals `original_size` in version 1; reserved for per-entry
    /// compression in a future format revision.
    pub encoded_size:  u64,
    /// CRC-32 (IEEE) of the raw file bytes.
    pub checksum:      u32,
}

impl ManifestEntry {
    fn encode(&self, out: &mut Vec<u8>) {
        write_field(out, |b| {
            write_str_field(b, &self.original_path);
            write_str_field(b, &self.encoded_path);
            write_u64_field(b, self.original_size);
            write_u64_field(b, self.encoded_size);
            write_u32_field(b, self.checksum);
        });
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        let mut r = FieldReader::new(bytes);
        let entry = Self {
            original_path: r.read_str_field()?,
            encoded_path:  r.read_str_field()?,
            original_size: r.read_u64_field()?,
            encoded_size:  r.read_u64_field()?,
            checksum:      r.read_u32_field()?,
        };
        // Fields added by future versions are length-prefixed; skip them.
        while !r.at_end() {
            r.read_field()?;
        }
        Ok(entry)
    }
}

/// The index record written at the head of every serialized archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub version:      u32,
    pub entries:      Vec<ManifestEntry>,
    /// Codec id used for the outer payload.  `None` on archives produced by
    /// tooling that predates the field.
    pub algorithm_id: Option<u8>,
}

impl Manifest {
    pub fn new(algorithm_id: u8) -> Self {
        Self {
            version:      MANIFEST_VERSION,
            entries:      Vec::new(),
            algorithm_id: Some(algorithm_id),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_u32_field(&mut out, self.version);
        write_field(&mut out, |b| {
            b.extend_from_slice(&(self.entries.len() as u64).to_le_bytes());
            for entry in &self.entries {
                entry.encode(b);
            }
        });
        match self.algorithm_id {
            Some(id) => write_u8_field(&mut out, id),
            None => write_empty_field(&mut out),
        }
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = FieldReader::new(bytes);
        let version = r.read_u32_field()?;

        let entries_field = r.read_field()?;
        let mut seq = FieldReader::new(entries_field);
        let count = seq.read_u64()?;
        // Every element carries at least its own length prefix; anything
        // claiming more elements than the buffer could hold is corrupt, and
        // checking first keeps the Vec allocation bounded by the input size.
        if count.saturating_mul(LEN_PREFIX as u64) > seq.remaining() as u64 {
            return Err(Error::CorruptedData(format!(
                "manifest declares {count} entries in {} bytes",
                seq.remaining()
            )));
        }
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            entries.push(ManifestEntry::decode(seq.read_field()?)?);
        }
        if !seq.at_end() {
            return Err(Error::CorruptedData(
                "trailing bytes after final manifest entry".into(),
            ));
        }

        // Legacy manifests end here; newer ones carry the algorithm id and
        // possibly fields this build does not know about.
        let algorithm_id = if r.at_end() {
            None
        } else {
            r.read_opt_u8_field()?
        };
        while !r.at_end() {
            r.read_field()?;
        }

        Ok(Self {
            version,
            entries,
            algorithm_id,
        })
    }
}
