//! In-memory archive container: one manifest plus one contiguous data
//! region holding every file's bytes in entry order.
//!
//! ```no_run
//! use zpak::archive::Archive;
//!
//! let mut ar = Archive::new(1);
//! ar.add_file("readme.txt", b"Hello, world!")?;
//! let bytes = ar.serialize();
//!
//! let parsed = Archive::parse(&bytes)?;
//! parsed.extract_to("out".as_ref())?;
//! # Ok::<(), zpak::Error>(())
//! ```
//!
//! # On-disk layout (before the outer codec is applied)
//!
//! ```text
//! offset 0    : u64 LE manifest_size
//! offset 8    : manifest payload (see manifest.rs)
//! offset 8+ms : data region, uncompressed concatenation of file bytes
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian};
use crc32fast::Hasher;
use tracing::debug;

use crate::manifest::{Manifest, ManifestEntry, MANIFEST_VERSION};
use crate::{Error, Result};

/// Prefix of every entry locator.
const OFFSET_PREFIX: &str = "offset:";

pub struct Archive {
    pub manifest: Manifest,
    pub data:     Vec<u8>,
}

impl Archive {
    // ── Build path ───────────────────────────────────────────────────────────

    /// Empty archive recording the codec the caller intends to compress the
    /// serialized bytes with.
    pub fn new(algorithm_id: u8) -> Self {
        Self {
            manifest: Manifest::new(algorithm_id),
            data:     Vec::new(),
        }
    }

    /// Append one file.  The entry's locator is the byte offset the data
    /// landed at; entry order therefore always matches layout order.
    pub fn add_file(&mut self, rel_path: &str, bytes: &[u8]) -> Result<()> {
        validate_entry_path(rel_path)?;
        if self
            .manifest
            .entries
            .iter()
            .any(|e| e.original_path == rel_path)
        {
            return Err(Error::InvalidPath {
                path:   rel_path.to_owned(),
                reason: "duplicate entry path",
            });
        }

        let offset = self.data.len() as u64;
        self.data.extend_from_slice(bytes);

        let mut hasher = Hasher::new();
        hasher.update(bytes);

        self.manifest.entries.push(ManifestEntry {
            original_path: rel_path.to_owned(),
            encoded_path:  format!("{OFFSET_PREFIX}{offset}"),
            original_size: bytes.len() as u64,
            encoded_size:  bytes.len() as u64,
            checksum:      hasher.finalize(),
        });
        Ok(())
    }

    // ── Wire form ────────────────────────────────────────────────────────────

    /// `[u64 manifest_size][manifest bytes][data bytes]`.
    pub fn serialize(&self) -> Vec<u8> {
        let manifest_bytes = self.manifest.to_bytes();
        let mut out = Vec::with_capacity(8 + manifest_bytes.len() + self.data.len());
        out.extend_from_slice(&(manifest_bytes.len() as u64).to_le_bytes());
        out.extend_from_slice(&manifest_bytes);
        out.extend_from_slice(&self.data);
        out
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 8 {
            return Err(Error::InvalidArchive(format!(
                "{} bytes is too short for the manifest size header",
                bytes.len()
            )));
        }
        let manifest_size = LittleEndian::read_u64(&bytes[..8]);
        if manifest_size > (bytes.len() - 8) as u64 {
            return Err(Error::InvalidArchive(format!(
                "manifest size {manifest_size} exceeds the {} bytes available",
                bytes.len() - 8
            )));
        }
        let manifest_end = 8 + manifest_size as usize;
        let manifest = Manifest::from_bytes(&bytes[8..manifest_end])?;
        if manifest.version > MANIFEST_VERSION {
            return Err(Error::UnsupportedManifestVersion(manifest.version));
        }
        Ok(Self {
            manifest,
            data: bytes[manifest_end..].to_vec(),
        })
    }

    // ── Extraction ───────────────────────────────────────────────────────────

    /// Locate an entry's bytes inside the data region, checking the locator
    /// and bounds but not the checksum.
    pub fn entry_data(&self, entry: &ManifestEntry) -> Result<&[u8]> {
        if entry.original_size != entry.encoded_size {
            return Err(Error::CorruptedData(format!(
                "entry {:?} sizes disagree: {} != {}",
                entry.original_path, entry.original_size, entry.encoded_size
            )));
        }
        let offset = parse_offset(&entry.encoded_path)?;
        let end = offset.checked_add(entry.original_size).ok_or_else(|| {
            Error::CorruptedData(format!("entry {:?} overflows u64", entry.original_path))
        })?;
        if end > self.data.len() as u64 {
            return Err(Error::CorruptedData(format!(
                "entry {:?} spans {offset}..{end} but the data region holds {} bytes",
                entry.original_path,
                self.data.len()
            )));
        }
        Ok(&self.data[offset as usize..end as usize])
    }

    /// Write every entry under `out_dir`, in manifest order.  Each entry's
    /// CRC is verified before its bytes touch the disk; a mismatch aborts
    /// the whole extraction.  Files already written stay where they are.
    pub fn extract_to(&self, out_dir: &Path) -> Result<()> {
        for entry in &self.manifest.entries {
            let dest = safe_join(out_dir, &entry.original_path)?;
            let bytes = self.entry_data(entry)?;

            let mut hasher = Hasher::new();
            hasher.update(bytes);
            let actual = hasher.finalize();
            if actual != entry.checksum {
                return Err(Error::ChecksumMismatch {
                    path:     entry.original_path.clone(),
                    expected: entry.checksum,
                    actual,
                });
            }

            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&dest, bytes)?;
            debug!(path = %entry.original_path, bytes = bytes.len(), "extracted");
        }
        Ok(())
    }
}

/// Parse the decimal tail of an `offset:<n>` locator.  Anything but pure
/// ASCII digits is corrupt; `u64::from_str` alone would admit a leading `+`.
fn parse_offset(encoded_path: &str) -> Result<u64> {
    let digits = encoded_path.strip_prefix(OFFSET_PREFIX).ok_or_else(|| {
        Error::CorruptedData(format!("locator {encoded_path:?} lacks the offset prefix"))
    })?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::CorruptedData(format!(
            "locator {encoded_path:?} has a non-decimal offset"
        )));
    }
    digits
        .parse::<u64>()
        .map_err(|_| Error::CorruptedData(format!("locator {encoded_path:?} offset overflows u64")))
}

/// Path rules every manifest entry must satisfy: non-empty, relative, no
/// `..` component, no empty or `.` segments.
fn validate_entry_path(path: &str) -> Result<()> {
    let reject = |reason| {
        Err(Error::InvalidPath {
            path: path.to_owned(),
            reason,
        })
    };
    if path.is_empty() {
        return reject("empty path");
    }
    if path.starts_with('/') {
        return reject("absolute path");
    }
    for segment in path.split('/') {
        match segment {
            "" => return reject("empty path segment"),
            "." | ".." => return reject("relative path segment"),
            _ => {}
        }
    }
    Ok(())
}

/// Join a manifest path onto the output directory, translating `/` to the
/// host separator.  Rejects any path that could land outside `out_dir`.
fn safe_join(out_dir: &Path, rel: &str) -> Result<PathBuf> {
    validate_entry_path(rel)
        .map_err(|_| Error::UnsafeExtractionPath(rel.to_owned()))?;
    let mut dest = out_dir.to_path_buf();
    for segment in rel.split('/') {
        // A segment that parses into more than one component smuggles in a
        // separator or drive prefix of the host OS.
        let part = Path::new(segment);
        if part.components().count() != 1 || part.is_absolute() {
            return Err(Error::UnsafeExtractionPath(rel.to_owned()));
        }
        dest.push(segment);
    }
    Ok(dest)
}
