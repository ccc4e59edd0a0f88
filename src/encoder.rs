//! Directory-to-archive façade.
//!
//! Walks the input tree depth-first with alphabetical ordering inside each
//! directory, so the same tree always produces the same entry order.  Only
//! regular files become entries; symlinks, sockets, devices and FIFOs are
//! skipped silently, and directories exist in the archive only by
//! implication of the files inside them.

use std::fs;
use std::io::Write;
use std::path::{Component, Path};

use tempfile::NamedTempFile;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::archive::Archive;
use crate::codec::{CodecRegistry, CompressionLevel};
use crate::{Error, Result};

/// Encoder configuration.  LZ4 at medium level unless told otherwise.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    pub algorithm: String,
    pub level:     CompressionLevel,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            algorithm: "lz4".to_owned(),
            level:     CompressionLevel::Medium,
        }
    }
}

/// What an encode run produced, for reporting.
#[derive(Debug, Clone, Copy)]
pub struct EncodeSummary {
    pub entries:       usize,
    pub input_bytes:   u64,
    pub archive_bytes: u64,
}

pub struct Encoder {
    registry: CodecRegistry,
    options:  EncodeOptions,
}

impl Encoder {
    pub fn new(options: EncodeOptions) -> Self {
        Self {
            registry: CodecRegistry::new(),
            options,
        }
    }

    /// Pack `input_dir` into a single compressed file at `output`.
    ///
    /// The output is written to a temporary sibling and renamed into place,
    /// so a failed run never leaves a torn archive behind.
    pub fn encode(&self, input_dir: &Path, output: &Path) -> Result<EncodeSummary> {
        if !input_dir.is_dir() {
            return Err(Error::PathNotFound(input_dir.to_owned()));
        }
        let codec = self.registry.require(&self.options.algorithm)?;

        let mut archive = Archive::new(codec.id());
        for entry in WalkDir::new(input_dir).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = manifest_path(input_dir, entry.path())?;
            let bytes = fs::read(entry.path())?;
            debug!(path = %rel, bytes = bytes.len(), "adding");
            archive.add_file(&rel, &bytes)?;
        }

        let serialized = archive.serialize();
        let compressed = codec.compress(&serialized, self.options.level)?;
        info!(
            codec = codec.name(),
            entries = archive.manifest.entries.len(),
            raw = serialized.len(),
            compressed = compressed.len(),
            "archive packed"
        );

        let parent = output.parent().filter(|p| !p.as_os_str().is_empty());
        let mut tmp = NamedTempFile::new_in(parent.unwrap_or_else(|| Path::new(".")))?;
        tmp.write_all(&compressed)?;
        tmp.persist(output).map_err(|e| Error::Io(e.error))?;

        Ok(EncodeSummary {
            entries:       archive.manifest.entries.len(),
            input_bytes:   archive.data.len() as u64,
            archive_bytes: compressed.len() as u64,
        })
    }
}

/// Relative path with forward slashes, as stored in the manifest.
fn manifest_path(root: &Path, path: &Path) -> Result<String> {
    let rel = path
        .strip_prefix(root)
        .map_err(|_| Error::InvalidPath {
            path:   path.display().to_string(),
            reason: "outside the input directory",
        })?;
    let segments: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(os) => Some(os.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Ok(segments.join("/"))
}
