use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

use super::{eof, FormatError};
use crate::codec::Algorithm;

/// Magic bytes carried inside every compressed blob header.
pub const BLOB_MAGIC: [u8; 2] = [0x1f, 0x9d];
/// Fixed trailing header byte.
pub const BLOB_SPECIAL: u8 = 2;
/// Header bytes counted by `compressed_length` in addition to the payload.
pub const BLOB_HEADER_LEN: u32 = 8;

/// Self-describing compressed payload embedded in a regular-file record.
///
/// The on-wire `compressed_length` field is not stored: it is derived from
/// the payload on every encode, so a decoded blob always satisfies
/// `payload.len() == compressed_length - 8`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedBlob {
    pub uncompressed_length: u32,
    /// Raw algorithm id byte; unknown ids survive a decode/encode round trip.
    pub algorithm: u8,
    pub magic: [u8; 2],
    pub special: u8,
    pub payload: Vec<u8>,
}

impl CompressedBlob {
    pub fn new(algorithm: Algorithm, uncompressed_length: u32, payload: Vec<u8>) -> Self {
        Self {
            uncompressed_length,
            algorithm: algorithm.id(),
            magic: BLOB_MAGIC,
            special: BLOB_SPECIAL,
            payload,
        }
    }

    /// On-wire length field: the payload plus the 8 header bytes after it.
    pub fn compressed_length(&self) -> u32 {
        self.payload.len() as u32 + BLOB_HEADER_LEN
    }

    pub fn read<R: Read>(reader: &mut R) -> Result<Self, FormatError> {
        let compressed_length = reader
            .read_u32::<LittleEndian>()
            .map_err(|e| eof(e, "blob length"))?;
        let uncompressed_length = reader
            .read_u32::<LittleEndian>()
            .map_err(|e| eof(e, "blob uncompressed length"))?;
        let algorithm = reader.read_u8().map_err(|e| eof(e, "blob algorithm"))?;
        let mut magic = [0u8; 2];
        reader.read_exact(&mut magic).map_err(|e| eof(e, "blob magic"))?;
        let special = reader.read_u8().map_err(|e| eof(e, "blob special byte"))?;

        if compressed_length < BLOB_HEADER_LEN {
            return Err(FormatError::InvalidBlobLength(compressed_length));
        }
        let expected = (compressed_length - BLOB_HEADER_LEN) as usize;
        let mut payload = Vec::new();
        reader.take(expected as u64).read_to_end(&mut payload)?;
        if payload.len() != expected {
            return Err(FormatError::Truncated("compressed payload"));
        }

        Ok(Self { uncompressed_length, algorithm, magic, special, payload })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(self.compressed_length())?;
        writer.write_u32::<LittleEndian>(self.uncompressed_length)?;
        writer.write_u8(self.algorithm)?;
        writer.write_all(&self.magic)?;
        writer.write_u8(self.special)?;
        writer.write_all(&self.payload)?;
        Ok(())
    }
}
