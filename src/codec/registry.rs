//! Catalogue of the built-in codecs.

use super::brotli::BrotliCodec;
use super::lz4::Lz4Codec;
use super::lzma::LzmaCodec;
use super::zstd::ZstdCodec;
use super::Codec;
use crate::{Error, Result};

/// Owns one instance of every codec, registered in ascending id order.
/// Lookups hand out non-owning references; the registry outlives them all.
pub struct CodecRegistry {
    codecs: Vec<Box<dyn Codec>>,
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self {
            codecs: vec![
                Box::new(Lz4Codec),
                Box::new(ZstdCodec),
                Box::new(LzmaCodec),
                Box::new(BrotliCodec),
            ],
        }
    }

    pub fn by_id(&self, id: u8) -> Option<&dyn Codec> {
        self.iter().find(|c| c.id() == id)
    }

    /// Case-sensitive name lookup.
    pub fn by_name(&self, name: &str) -> Option<&dyn Codec> {
        self.iter().find(|c| c.name() == name)
    }

    /// Name lookup that surfaces the registry error for callers passing
    /// user-supplied algorithm names.
    pub fn require(&self, name: &str) -> Result<&dyn Codec> {
        self.by_name(name)
            .ok_or_else(|| Error::AlgorithmNotFound(name.to_owned()))
    }

    /// First codec that positively identifies the payload's frame.
    /// Registration order decides; magic numbers are disjoint so at most one
    /// codec can claim any given payload.
    pub fn detect(&self, data: &[u8]) -> Option<&dyn Codec> {
        self.iter().find(|c| c.detect(data))
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Codec> {
        self.codecs.iter().map(|c| c.as_ref())
    }
}
