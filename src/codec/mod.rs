//! Compression codecs behind a common trait.
//!
//! One implementation per algorithm; the registry owns the instances and
//! hands out shared references.  Codecs hold no state between calls, so a
//! single instance serves any number of operations (streaming backends
//! create a fresh engine per call).

use crate::Result;

pub mod brotli;
pub mod lz4;
pub mod lzma;
pub mod registry;
pub mod zstd;

pub use registry::CodecRegistry;

/// Output growth step for streaming codecs: 64 KiB.
pub const STREAM_CHUNK: usize = 64 * 1024;

/// Three-point quality knob, mapped per codec to its native scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    Low,
    #[default]
    Medium,
    High,
}

pub trait Codec {
    /// Stable numeric id; written into the manifest's `algorithm_id` field.
    fn id(&self) -> u8;

    /// Human-readable name, case-sensitive for registry lookup.
    fn name(&self) -> &'static str;

    fn compress(&self, data: &[u8], level: CompressionLevel) -> Result<Vec<u8>>;

    /// Inflate `data`.  `size_hint`, when known, pre-sizes the output; the
    /// result is correct with or without it (modulo the LZ4 caveat noted on
    /// its implementation).
    fn decompress(&self, data: &[u8], size_hint: Option<usize>) -> Result<Vec<u8>>;

    /// Guaranteed upper bound on compressed output for `input_len` bytes.
    fn bound(&self, input_len: usize) -> usize;

    /// True only when the codec positively identifies its own frame.
    /// Codecs without reliable magic bytes always answer false.
    fn detect(&self, data: &[u8]) -> bool;
}
