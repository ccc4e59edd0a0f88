//! Zstandard codec (id 2).

use super::{Codec, CompressionLevel};
use crate::{Error, Result};

pub const ZSTD_ID: u8 = 2;

/// Zstd frame magic number, little-endian on disk.
const MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

pub struct ZstdCodec;

impl Codec for ZstdCodec {
    fn id(&self) -> u8 {
        ZSTD_ID
    }

    fn name(&self) -> &'static str {
        "zstd"
    }

    fn compress(&self, data: &[u8], level: CompressionLevel) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let level = match level {
            CompressionLevel::Low => 1,
            CompressionLevel::Medium => 5,
            CompressionLevel::High => 9,
        };
        zstd::encode_all(data, level).map_err(|e| Error::CompressionFailed(format!("zstd: {e}")))
    }

    fn decompress(&self, data: &[u8], _size_hint: Option<usize>) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        // The frame header carries the content size; no hint needed.
        zstd::decode_all(data).map_err(|e| Error::DecompressionFailed(format!("zstd: {e}")))
    }

    fn bound(&self, input_len: usize) -> usize {
        zstd::zstd_safe::compress_bound(input_len)
    }

    fn detect(&self, data: &[u8]) -> bool {
        data.len() >= MAGIC.len() && data[..MAGIC.len()] == MAGIC
    }
}
