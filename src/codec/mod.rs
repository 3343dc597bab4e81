//! Compression collaborator seam.
//!
//! The CAR format stores each regular file as an LZH- or LZC-compressed
//! blob, but the algorithms themselves live outside this crate; the original
//! tooling links a vendor compression library for them. [`Codec`] is that
//! boundary: implementations are registered in a [`CodecRegistry`] and
//! dispatched by the algorithm id byte found in each blob header.
//!
//! A reader that hits an unregistered algorithm id MUST fail immediately;
//! there is no fallback codec.

use std::collections::HashMap;

use thiserror::Error;

/// Algorithm id byte for LZH blobs.
pub const ALG_LZH: u8 = 0x12;
/// Algorithm id byte for LZC blobs.
pub const ALG_LZC: u8 = 0x10;

/// Compression algorithm discriminant, as stored in the blob header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Lzh,
    Lzc,
}

impl Algorithm {
    /// The id byte written to disk.
    pub const fn id(self) -> u8 {
        match self {
            Algorithm::Lzh => ALG_LZH,
            Algorithm::Lzc => ALG_LZC,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            ALG_LZH => Some(Algorithm::Lzh),
            ALG_LZC => Some(Algorithm::Lzc),
            _ => None,
        }
    }

    /// Human-readable name. Diagnostics only, never parsed from disk.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Lzh => "lzh",
            Algorithm::Lzc => "lzc",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "lzh" => Some(Algorithm::Lzh),
            "lzc" => Some(Algorithm::Lzc),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("compression failed: {0}")]
    Compression(String),
    #[error("decompression failed: {0}")]
    Decompression(String),
    #[error("decompressed length mismatch: expected {expected} byte(s), got {actual}")]
    LengthMismatch { expected: u32, actual: u32 },
    /// Emitted when a blob names an algorithm with no registered codec.
    /// Decoding MUST NOT continue with a substitute.
    #[error("no codec registered for algorithm id {0:#04x}")]
    UnavailableCodec(u8),
}

/// One compression algorithm implementation.
pub trait Codec: Send + Sync {
    fn algorithm(&self) -> Algorithm;

    /// Compress `data`, returning the raw payload stored in a blob.
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;

    /// Decompress a blob payload. `expected_length` is the blob's declared
    /// uncompressed length; LZH/LZC streams need it to size their output.
    fn decompress(&self, data: &[u8], expected_length: u32) -> Result<Vec<u8>, CodecError>;
}

/// Registered codecs, keyed by algorithm id.
///
/// Ships empty: callers register the implementations they link against.
#[derive(Default)]
pub struct CodecRegistry {
    codecs: HashMap<u8, Box<dyn Codec>>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `codec` under its algorithm id, replacing any previous entry.
    pub fn register(&mut self, codec: Box<dyn Codec>) {
        self.codecs.insert(codec.algorithm().id(), codec);
    }

    pub fn get(&self, id: u8) -> Result<&dyn Codec, CodecError> {
        self.codecs
            .get(&id)
            .map(|codec| codec.as_ref())
            .ok_or(CodecError::UnavailableCodec(id))
    }

    pub fn contains(&self, id: u8) -> bool {
        self.codecs.contains_key(&id)
    }
}
