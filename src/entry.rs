//! Semantic view over a decoded [`FileRecord`].

use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

use chrono::DateTime;
use crc32fast::Hasher;
use log::debug;

use crate::archive::ArchiveError;
use crate::codec::{Algorithm, CodecError, CodecRegistry};
use crate::filemode::filemode;
use crate::format::blob::CompressedBlob;
use crate::format::record::{FileRecord, RecordKind};

/// Archive checksum of `data`.
///
/// CAR checksums are CRC-32 values computed with an all-ones initial
/// remainder and without the final XOR, stored as a signed 32-bit integer.
/// A plain CRC-32 of the same bytes does not match.
pub fn checksum_of(data: &[u8]) -> i32 {
    let mut hasher = Hasher::new_with_initial(u32::MAX);
    hasher.update(data);
    (!hasher.finalize()) as i32
}

/// Read-only view deriving presentation and content operations from one
/// record. Mutation goes through the record's public fields.
#[derive(Debug, Clone, Copy)]
pub struct FileEntry<'a> {
    record: &'a FileRecord,
}

impl<'a> FileEntry<'a> {
    pub fn new(record: &'a FileRecord) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &'a FileRecord {
        self.record
    }

    pub fn filename(&self) -> &'a str {
        &self.record.filename
    }

    pub fn size(&self) -> u32 {
        self.record.file_length
    }

    pub fn mode(&self) -> u32 {
        self.record.perm_mode
    }

    /// Permissions in `-rwxr-xr-x` form.
    pub fn permissions(&self) -> String {
        filemode(self.record.perm_mode)
    }

    pub fn timestamp_raw(&self) -> u32 {
        self.record.timestamp
    }

    /// Modification time as e.g. `01 Jan 2020 12:34` (UTC).
    pub fn timestamp(&self) -> String {
        match DateTime::from_timestamp(i64::from(self.record.timestamp), 0) {
            Some(ts) => ts.format("%d %b %Y %H:%M").to_string(),
            None => self.record.timestamp.to_string(),
        }
    }

    pub fn is_regular(&self) -> bool {
        matches!(self.record.kind, RecordKind::Regular { .. })
    }

    pub fn checksum(&self) -> Option<i32> {
        match &self.record.kind {
            RecordKind::Regular { checksum, .. } => Some(*checksum),
            RecordKind::Other { .. } => None,
        }
    }

    pub fn compressed_size(&self) -> Option<u32> {
        self.blob().map(CompressedBlob::compressed_length)
    }

    pub fn algorithm(&self) -> Option<Algorithm> {
        self.blob().and_then(|blob| Algorithm::from_id(blob.algorithm))
    }

    /// Decompress the entry's payload through the registered collaborator.
    ///
    /// Fails when the entry carries no payload, the algorithm has no
    /// registered codec, the codec reports an error, or the decompressed
    /// size disagrees with the blob's declared uncompressed length.
    pub fn open(&self, codecs: &CodecRegistry) -> Result<Vec<u8>, ArchiveError> {
        let blob = self
            .blob()
            .ok_or_else(|| ArchiveError::NotAFile(self.record.filename.clone()))?;
        let codec = codecs.get(blob.algorithm)?;
        let data = codec.decompress(&blob.payload, blob.uncompressed_length)?;
        if data.len() as u64 != u64::from(blob.uncompressed_length) {
            return Err(CodecError::LengthMismatch {
                expected: blob.uncompressed_length,
                actual: data.len() as u32,
            }
            .into());
        }
        Ok(data)
    }

    /// Decompress and compare against the stored checksum.
    pub fn verify_checksum(&self, codecs: &CodecRegistry) -> Result<bool, ArchiveError> {
        let stored = self
            .checksum()
            .ok_or_else(|| ArchiveError::NotAFile(self.record.filename.clone()))?;
        let data = self.open(codecs)?;
        Ok(checksum_of(&data) == stored)
    }

    fn blob(&self) -> Option<&'a CompressedBlob> {
        match &self.record.kind {
            RecordKind::Regular { blob, .. } => Some(blob),
            RecordKind::Other { .. } => None,
        }
    }
}

/// Build a regular-file record from a file on the local filesystem.
///
/// Reads content and metadata, compresses through `codecs`, and stores the
/// archive checksum of the uncompressed bytes. A compression failure is an
/// error and produces no record.
pub fn from_disk<P: AsRef<Path>>(
    path: P,
    algorithm: Algorithm,
    codecs: &CodecRegistry,
) -> Result<FileRecord, ArchiveError> {
    let path = path.as_ref();
    let metadata = fs::metadata(path)?;
    let data = fs::read(path)?;

    let codec = codecs.get(algorithm.id())?;
    let payload = codec.compress(&data)?;
    debug!(
        "compressed {} ({} -> {} bytes)",
        path.display(),
        data.len(),
        payload.len()
    );

    let blob = CompressedBlob::new(algorithm, data.len() as u32, payload);
    let checksum = checksum_of(&data);
    let timestamp = metadata
        .modified()?
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0);

    Ok(FileRecord {
        perm_mode: unix_mode(&metadata),
        file_length: data.len() as u32,
        reserved1: 0,
        reserved2: 0,
        timestamp,
        reserved3: [0u8; 10],
        filename: path.to_string_lossy().into_owned(),
        kind: RecordKind::Regular { reserved: [0u8; 2], blob, checksum },
    })
}

#[cfg(unix)]
fn unix_mode(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::MetadataExt;
    metadata.mode()
}

#[cfg(not(unix))]
fn unix_mode(metadata: &fs::Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o100444
    } else {
        0o100644
    }
}
