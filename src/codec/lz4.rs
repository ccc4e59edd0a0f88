//! LZ4 block codec (id 1).

use lz4::block::{compress, compress_bound, decompress, CompressionMode};

use super::{Codec, CompressionLevel};
use crate::{Error, Result};

pub const LZ4_ID: u8 = 1;

/// Raw LZ4 blocks carry no size header and no magic bytes.  Compression is
/// cheap and fast; the cost shows up at decode time, where an archive
/// without a size hint forces a speculative buffer (see [`Codec::decompress`]).
pub struct Lz4Codec;

impl Codec for Lz4Codec {
    fn id(&self) -> u8 {
        LZ4_ID
    }

    fn name(&self) -> &'static str {
        "lz4"
    }

    fn compress(&self, data: &[u8], level: CompressionLevel) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let mode = match level {
            CompressionLevel::Low => CompressionMode::FAST(4),
            CompressionLevel::Medium => CompressionMode::FAST(1),
            CompressionLevel::High => CompressionMode::HIGHCOMPRESSION(9),
        };
        compress(data, Some(mode), false)
            .map_err(|e| Error::CompressionFailed(format!("lz4: {e}")))
    }

    /// Without a hint this retries with a doubling buffer, capped at 16x the
    /// compressed size.  Best-effort: a raw block has no end-of-stream
    /// marker, so pathological inputs can exhaust the cap and fail even
    /// though the data is valid.
    fn decompress(&self, data: &[u8], size_hint: Option<usize>) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(hint) = size_hint {
            let cap = hint.min(i32::MAX as usize) as i32;
            return decompress(data, Some(cap))
                .map_err(|e| Error::DecompressionFailed(format!("lz4: {e}")));
        }

        let ceiling = data.len().saturating_mul(16).max(1024);
        let mut cap = data.len().saturating_mul(2).max(64);
        loop {
            match decompress(data, Some(cap.min(i32::MAX as usize) as i32)) {
                Ok(out) => return Ok(out),
                Err(_) if cap < ceiling => cap = cap.saturating_mul(2),
                Err(e) => {
                    return Err(Error::DecompressionFailed(format!(
                        "lz4: {e} (gave up at {cap} byte buffer)"
                    )))
                }
            }
        }
    }

    fn bound(&self, input_len: usize) -> usize {
        compress_bound(input_len).unwrap_or(input_len + input_len / 255 + 16)
    }

    fn detect(&self, _data: &[u8]) -> bool {
        false
    }
}
