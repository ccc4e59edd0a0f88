pub mod archive;
pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod manifest;
pub mod serializer;

pub use archive::Archive;
pub use codec::{Codec, CodecRegistry, CompressionLevel};
pub use decoder::Decoder;
pub use encoder::{EncodeOptions, EncodeSummary, Encoder};
pub use error::{Error, Result};
pub use manifest::{Manifest, ManifestEntry, MANIFEST_VERSION};
