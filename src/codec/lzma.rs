//! LZMA codec, xz stream framing (id 3).

use xz2::stream::{Action, Check, Status, Stream};

use super::{Codec, CompressionLevel, STREAM_CHUNK};
use crate::{Error, Result};

pub const LZMA_ID: u8 = 3;

/// xz stream header magic.
const MAGIC: [u8; 6] = [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00];

pub struct LzmaCodec;

impl Codec for LzmaCodec {
    fn id(&self) -> u8 {
        LZMA_ID
    }

    fn name(&self) -> &'static str {
        "lzma"
    }

    fn compress(&self, data: &[u8], level: CompressionLevel) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let preset = match level {
            CompressionLevel::Low => 1,
            CompressionLevel::Medium => 3,
            CompressionLevel::High => 9,
        };
        let stream = Stream::new_easy_encoder(preset, Check::Crc64)
            .map_err(|e| Error::CompressionFailed(format!("lzma: {e}")))?;
        run_stream(stream, data, STREAM_CHUNK)
            .map_err(|msg| Error::CompressionFailed(format!("lzma: {msg}")))
    }

    fn decompress(&self, data: &[u8], size_hint: Option<usize>) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let stream = Stream::new_stream_decoder(u64::MAX, 0)
            .map_err(|e| Error::DecompressionFailed(format!("lzma: {e}")))?;
        run_stream(stream, data, size_hint.unwrap_or(STREAM_CHUNK))
            .map_err(|msg| Error::DecompressionFailed(format!("lzma: {msg}")))
    }

    fn bound(&self, input_len: usize) -> usize {
        // lzma_stream_buffer_bound: worst case for incompressible input.
        input_len + input_len / 3 + 128
    }

    fn detect(&self, data: &[u8]) -> bool {
        data.len() >= MAGIC.len() && data[..MAGIC.len()] == MAGIC
    }
}

/// Drive a fresh liblzma engine over the whole input, growing the output in
/// fixed chunks until end-of-stream.  Stalling without reaching stream end
/// means the input was truncated.
fn run_stream(
    mut stream: Stream,
    input: &[u8],
    initial_capacity: usize,
) -> std::result::Result<Vec<u8>, String> {
    let mut out = Vec::with_capacity(initial_capacity.max(STREAM_CHUNK));
    loop {
        let consumed = stream.total_in() as usize;
        let produced = out.len();
        let status = stream
            .process_vec(&input[consumed..], &mut out, Action::Finish)
            .map_err(|e| e.to_string())?;
        if matches!(status, Status::StreamEnd) {
            return Ok(out);
        }
        if out.len() == out.capacity() {
            out.reserve(STREAM_CHUNK);
        } else if stream.total_in() as usize == consumed && out.len() == produced {
            return Err("stream ended prematurely".into());
        }
    }
}
