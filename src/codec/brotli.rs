//! Brotli codec (id 4).

use std::io::{ErrorKind, Read};

use brotli::enc::BrotliEncoderParams;

use super::{Codec, CompressionLevel, STREAM_CHUNK};
use crate::{Error, Result};

pub const BROTLI_ID: u8 = 4;

/// Brotli streams have no magic bytes, so this codec never claims a payload
/// during detection; it is only reachable via the manifest id, an explicit
/// request, or trial decompression.
pub struct BrotliCodec;

impl Codec for BrotliCodec {
    fn id(&self) -> u8 {
        BROTLI_ID
    }

    fn name(&self) -> &'static str {
        "brotli"
    }

    fn compress(&self, data: &[u8], level: CompressionLevel) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let params = BrotliEncoderParams {
            quality: match level {
                CompressionLevel::Low => 3,
                CompressionLevel::Medium => 6,
                CompressionLevel::High => 11,
            },
            lgwin: 22,
            ..Default::default()
        };
        let mut input = data;
        let mut out = Vec::with_capacity(STREAM_CHUNK.min(self.bound(data.len())));
        brotli::BrotliCompress(&mut input, &mut out, &params)
            .map_err(|e| Error::CompressionFailed(format!("brotli: {e}")))?;
        Ok(out)
    }

    fn decompress(&self, data: &[u8], size_hint: Option<usize>) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let mut reader = brotli::Decompressor::new(data, STREAM_CHUNK);
        let mut out = Vec::with_capacity(size_hint.unwrap_or(STREAM_CHUNK));
        let mut chunk = vec![0u8; STREAM_CHUNK];
        loop {
            match reader.read(&mut chunk) {
                Ok(0) => return Ok(out),
                Ok(n) => out.extend_from_slice(&chunk[..n]),
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::DecompressionFailed(format!("brotli: {e}"))),
            }
        }
    }

    fn bound(&self, input_len: usize) -> usize {
        input_len + (input_len >> 2) + 1024
    }

    fn detect(&self, _data: &[u8]) -> bool {
        false
    }
}
