//! Archive-to-directory façade.
//!
//! The manifest travels inside the compressed payload, so the outer codec
//! has to be identified from the compressed bytes themselves:
//!
//! 1. an explicit caller override wins,
//! 2. else the registry sniffs the leading bytes for a known magic number,
//! 3. else every codec is tried in registration order; the first whose
//!    output parses as an archive wins.
//!
//! The `algorithm_id` recorded in the manifest is advisory at this point.
//! An archive whose outer payload was re-compressed with a different codec
//! still decodes; a mismatch is logged, not fatal.

use std::fs;
use std::path::Path;

use tracing::{debug, info, trace, warn};

use crate::archive::Archive;
use crate::codec::{Codec, CodecRegistry};
use crate::{Error, Result};

#[derive(Default)]
pub struct Decoder {
    registry:        CodecRegistry,
    force_algorithm: Option<String>,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip identification and decompress with the named codec only.
    pub fn with_algorithm(name: impl Into<String>) -> Self {
        Self {
            registry:        CodecRegistry::new(),
            force_algorithm: Some(name.into()),
        }
    }

    /// Decompress and extract `archive_path` under `output_dir`.
    /// Returns the number of entries written.
    pub fn decode(&self, archive_path: &Path, output_dir: &Path) -> Result<usize> {
        let archive = self.read_archive(archive_path)?;
        if !output_dir.exists() {
            fs::create_dir_all(output_dir)?;
        }
        archive.extract_to(output_dir)?;
        info!(
            entries = archive.manifest.entries.len(),
            dir = %output_dir.display(),
            "archive extracted"
        );
        Ok(archive.manifest.entries.len())
    }

    /// Decompress and parse without touching the filesystem (used by
    /// `zpak list` and by extraction).
    pub fn read_archive(&self, archive_path: &Path) -> Result<Archive> {
        if !archive_path.is_file() {
            return Err(Error::PathNotFound(archive_path.to_owned()));
        }
        let raw = fs::read(archive_path)?;
        self.open_payload(&raw)
    }

    fn open_payload(&self, raw: &[u8]) -> Result<Archive> {
        if let Some(name) = &self.force_algorithm {
            let codec = self.registry.require(name)?;
            debug!(codec = codec.name(), "outer codec forced by caller");
            let plain = codec.decompress(raw, None)?;
            let archive = Archive::parse(&plain)?;
            note_recorded_algorithm(&archive, codec);
            return Ok(archive);
        }

        if let Some(codec) = self.registry.detect(raw) {
            debug!(codec = codec.name(), "outer codec identified by magic bytes");
            let plain = codec.decompress(raw, None)?;
            let archive = Archive::parse(&plain)?;
            note_recorded_algorithm(&archive, codec);
            return Ok(archive);
        }

        // No magic matched: sniff-and-try.  Success means the payload both
        // decompresses and parses; raw LZ4 in particular can "decompress"
        // garbage, so decompression alone proves nothing.
        for codec in self.registry.iter() {
            trace!(codec = codec.name(), "trial decompression");
            let plain = match codec.decompress(raw, None) {
                Ok(plain) => plain,
                Err(_) => continue,
            };
            match Archive::parse(&plain) {
                Ok(archive) => {
                    debug!(codec = codec.name(), "outer codec identified by trial");
                    note_recorded_algorithm(&archive, codec);
                    return Ok(archive);
                }
                // A payload that inflates cleanly into a manifest from a
                // future format version was really this codec's frame.
                Err(Error::UnsupportedManifestVersion(v)) => {
                    return Err(Error::UnsupportedManifestVersion(v))
                }
                Err(_) => continue,
            }
        }
        Err(Error::DecompressionFailed(
            "no registered codec accepts this payload".into(),
        ))
    }
}

fn note_recorded_algorithm(archive: &Archive, used: &dyn Codec) {
    if let Some(id) = archive.manifest.algorithm_id {
        if id != used.id() {
            warn!(
                recorded = id,
                used = used.id(),
                "manifest records a different codec than the outer payload"
            );
        }
    }
}
