use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

use super::blob::CompressedBlob;
use super::{eof, FormatError, Version};

/// Type tag of a regular file record, the only tag with a payload tail.
pub const TAG_REGULAR: [u8; 2] = *b"RG";
/// Type tag of a directory record.
pub const TAG_DIRECTORY: [u8; 2] = *b"DR";

/// One file's metadata-plus-payload unit inside the container.
///
/// The reserved fields have no known meaning; they are carried so that a
/// decode/encode round trip reproduces the input byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub perm_mode: u32,
    pub file_length: u32,
    pub reserved1: u32,
    pub reserved2: u32,
    pub timestamp: u32,
    pub reserved3: [u8; 10],
    pub filename: String,
    pub kind: RecordKind,
}

/// Tail of a record, selected by the on-wire type tag.
///
/// Only `"RG"` records carry a payload; every other tag is recognised but
/// ends right after the filename. `Regular` implies the `"RG"` tag, so an
/// `Other` value must never be built with that tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKind {
    Regular {
        reserved: [u8; 2],
        blob: CompressedBlob,
        checksum: i32,
    },
    Other {
        tag: [u8; 2],
    },
}

impl RecordKind {
    pub fn tag(&self) -> [u8; 2] {
        match self {
            RecordKind::Regular { .. } => TAG_REGULAR,
            RecordKind::Other { tag } => *tag,
        }
    }
}

impl FileRecord {
    pub fn read<R: Read>(reader: &mut R, version: Version) -> Result<Self, FormatError> {
        let mut tag = [0u8; 2];
        reader.read_exact(&mut tag).map_err(|e| eof(e, "record tag"))?;
        let (perm_mode, file_length, reserved1, reserved2, timestamp, reserved3, filename_length) =
            read_fixed(reader).map_err(|e| eof(e, "record header"))?;
        let filename = read_filename(reader, version, filename_length)?;

        let kind = if tag == TAG_REGULAR {
            let mut reserved = [0u8; 2];
            reader
                .read_exact(&mut reserved)
                .map_err(|e| eof(e, "record padding"))?;
            let blob = CompressedBlob::read(reader)?;
            // v200 stores the checksum unsigned, v201 signed. Same 32 bits
            // either way; the asymmetry is part of the format.
            let checksum = match version {
                Version::V200 => reader
                    .read_u32::<LittleEndian>()
                    .map_err(|e| eof(e, "checksum"))? as i32,
                Version::V201 => reader
                    .read_i32::<LittleEndian>()
                    .map_err(|e| eof(e, "checksum"))?,
            };
            RecordKind::Regular { reserved, blob, checksum }
        } else {
            RecordKind::Other { tag }
        };

        Ok(Self {
            perm_mode,
            file_length,
            reserved1,
            reserved2,
            timestamp,
            reserved3,
            filename,
            kind,
        })
    }

    pub fn write<W: Write>(&self, writer: &mut W, version: Version) -> Result<(), FormatError> {
        writer.write_all(&self.kind.tag())?;
        writer.write_u32::<LittleEndian>(self.perm_mode)?;
        writer.write_u32::<LittleEndian>(self.file_length)?;
        writer.write_u32::<LittleEndian>(self.reserved1)?;
        writer.write_u32::<LittleEndian>(self.reserved2)?;
        writer.write_u32::<LittleEndian>(self.timestamp)?;
        writer.write_all(&self.reserved3)?;

        // The length field is re-derived from the filename on every encode;
        // v201 reserves one extra byte for the null terminator.
        let name = self.filename.as_bytes();
        let filename_length = match version {
            Version::V200 => name.len(),
            Version::V201 => name.len() + 1,
        };
        let filename_length = u16::try_from(filename_length)
            .map_err(|_| FormatError::FilenameTooLong(name.len()))?;
        writer.write_u16::<LittleEndian>(filename_length)?;
        writer.write_all(name)?;
        if version == Version::V201 {
            writer.write_u8(0)?;
        }

        if let RecordKind::Regular { reserved, blob, checksum } = &self.kind {
            writer.write_all(reserved)?;
            blob.write(writer)?;
            match version {
                Version::V200 => writer.write_u32::<LittleEndian>(*checksum as u32)?,
                Version::V201 => writer.write_i32::<LittleEndian>(*checksum)?,
            }
        }
        Ok(())
    }
}

fn read_fixed<R: Read>(reader: &mut R) -> io::Result<(u32, u32, u32, u32, u32, [u8; 10], u16)> {
    let perm_mode = reader.read_u32::<LittleEndian>()?;
    let file_length = reader.read_u32::<LittleEndian>()?;
    let reserved1 = reader.read_u32::<LittleEndian>()?;
    let reserved2 = reader.read_u32::<LittleEndian>()?;
    let timestamp = reader.read_u32::<LittleEndian>()?;
    let mut reserved3 = [0u8; 10];
    reader.read_exact(&mut reserved3)?;
    let filename_length = reader.read_u16::<LittleEndian>()?;
    Ok((perm_mode, file_length, reserved1, reserved2, timestamp, reserved3, filename_length))
}

fn read_filename<R: Read>(
    reader: &mut R,
    version: Version,
    filename_length: u16,
) -> Result<String, FormatError> {
    let content_length = match version {
        Version::V200 => filename_length as usize,
        Version::V201 => {
            if filename_length == 0 {
                return Err(FormatError::InvalidFilenameLength(filename_length));
            }
            filename_length as usize - 1
        }
    };
    let mut name = vec![0u8; content_length];
    reader.read_exact(&mut name).map_err(|e| eof(e, "filename"))?;
    if version == Version::V201 {
        let terminator = reader.read_u8().map_err(|e| eof(e, "filename terminator"))?;
        if terminator != 0 {
            return Err(FormatError::UnterminatedFilename);
        }
    }
    String::from_utf8(name).map_err(|_| FormatError::NonUtf8Filename)
}
