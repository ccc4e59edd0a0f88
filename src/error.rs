//! Error types shared across the crate.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for zpak operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Input directory or archive file does not exist.
    #[error("path not found: {0}")]
    PathNotFound(PathBuf),

    /// Archive header is truncated or the declared manifest size is implausible.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// A length prefix, locator string, or bounds check failed during decode.
    #[error("corrupted data: {0}")]
    CorruptedData(String),

    /// CRC-32 of an entry's bytes does not match the manifest.
    #[error("checksum mismatch for {path}: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch {
        path:     String,
        expected: u32,
        actual:   u32,
    },

    /// Manifest version is newer than this build understands.
    #[error("unsupported manifest version: {0}")]
    UnsupportedManifestVersion(u32),

    #[error("compression failed: {0}")]
    CompressionFailed(String),

    /// Codec rejected the payload; also raised when every registered codec
    /// fails the sniff-and-try fallback.
    #[error("decompression failed: {0}")]
    DecompressionFailed(String),

    /// Requested algorithm name is not in the registry.
    #[error("unknown algorithm: {0}")]
    AlgorithmNotFound(String),

    /// An entry path violates the manifest path rules.
    #[error("invalid entry path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// Extraction destination would escape the output directory.
    #[error("extraction path escapes output directory: {0}")]
    UnsafeExtractionPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
