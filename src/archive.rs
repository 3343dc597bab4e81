//! High-level [`Archive`] API, the primary embedding surface.
//!
//! ```no_run
//! use carchive::Archive;
//!
//! let ar = Archive::open("transport.car")?;
//! for entry in ar.entries() {
//!     println!("{} {:>10} {}", entry.permissions(), entry.size(), entry.filename());
//! }
//! # Ok::<(), carchive::ArchiveError>(())
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Serialize;
use thiserror::Error;

use crate::codec::{Algorithm, Codec, CodecError, CodecRegistry};
use crate::entry::{from_disk, FileEntry};
use crate::format::container::Container;
use crate::format::record::{FileRecord, RecordKind};
use crate::format::{FormatError, Version};

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("malformed archive: {0}")]
    Malformed(#[from] FormatError),
    #[error("codec failure: {0}")]
    Codec(#[from] CodecError),
    #[error("no such file in archive: {0}")]
    UnknownFile(String),
    #[error("entry {0} carries no file payload")]
    NotAFile(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

// ── FileInfo ──────────────────────────────────────────────────────────────────

/// Lightweight descriptor returned by [`Archive::list`].
#[derive(Debug, Clone, Serialize)]
pub struct FileInfo {
    pub name: String,
    pub size: u32,
    pub mode: String,
    pub modified: String,
    pub checksum: Option<i32>,
    pub compressed_size: Option<u32>,
    pub algorithm: Option<&'static str>,
}

impl From<FileEntry<'_>> for FileInfo {
    fn from(entry: FileEntry<'_>) -> Self {
        FileInfo {
            name: entry.filename().to_owned(),
            size: entry.size(),
            mode: entry.permissions(),
            modified: entry.timestamp(),
            checksum: entry.checksum(),
            compressed_size: entry.compressed_size(),
            algorithm: entry.algorithm().map(Algorithm::name),
        }
    }
}

// ── Archive ───────────────────────────────────────────────────────────────────

/// An open CAR archive: the decoded record list, the pinned version, the
/// backing file handle, and the registered compression collaborators.
///
/// The handle is scoped to this value: dropping the archive releases it on
/// every path, [`Archive::close`] being the explicit form.
pub struct Archive {
    path: PathBuf,
    fd: File,
    container: Container,
    codecs: CodecRegistry,
}

impl Archive {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Open an existing archive and decode it whole.
    ///
    /// Any decode failure means no `Archive` value exists afterwards: there
    /// is no partially populated state, and the handle is already released.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        let path = path.as_ref().to_owned();
        let mut fd = File::open(&path)?;
        let mut bytes = Vec::new();
        fd.read_to_end(&mut bytes)?;
        let container = Container::parse(&bytes)?;

        for record in &container.records {
            if let RecordKind::Regular { blob, .. } = &record.kind {
                if Algorithm::from_id(blob.algorithm).is_none() {
                    warn!(
                        "{}: unknown compression algorithm id {:#04x}",
                        record.filename, blob.algorithm
                    );
                }
            }
        }
        debug!(
            "opened {} ({}, {} record(s))",
            path.display(),
            container.version,
            container.records.len()
        );
        Ok(Self { path, fd, container, codecs: CodecRegistry::new() })
    }

    /// Create an empty archive on disk, pinned to version 2.01.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        Self::create_with_version(path, Version::V201)
    }

    pub fn create_with_version<P: AsRef<Path>>(
        path: P,
        version: Version,
    ) -> Result<Self, ArchiveError> {
        let path = path.as_ref().to_owned();
        let fd = File::create(&path)?;
        Ok(Self { path, fd, container: Container::new(version), codecs: CodecRegistry::new() })
    }

    // ── Codecs ───────────────────────────────────────────────────────────────

    /// Register a compression collaborator used by add/read/verify.
    pub fn register_codec(&mut self, codec: Box<dyn Codec>) {
        self.codecs.register(codec);
    }

    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }

    // ── Introspection ────────────────────────────────────────────────────────

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn version(&self) -> Version {
        self.container.version
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.container.records
    }

    pub fn records_mut(&mut self) -> &mut Vec<FileRecord> {
        &mut self.container.records
    }

    pub fn entries(&self) -> impl Iterator<Item = FileEntry<'_>> {
        self.container.records.iter().map(FileEntry::new)
    }

    /// Name → entry mapping. Later records shadow earlier ones with the same
    /// name; this mirrors the on-disk precedence rule and is what
    /// [`Archive::read_file`] resolves against.
    pub fn files_by_name(&self) -> HashMap<&str, FileEntry<'_>> {
        let mut files = HashMap::new();
        for record in &self.container.records {
            files.insert(record.filename.as_str(), FileEntry::new(record));
        }
        files
    }

    pub fn file_names(&self) -> Vec<&str> {
        self.files_by_name().into_keys().collect()
    }

    /// The entry a name currently resolves to (the last record with that
    /// name), if any.
    pub fn stat(&self, name: &str) -> Option<FileEntry<'_>> {
        self.container
            .records
            .iter()
            .rev()
            .find(|record| record.filename == name)
            .map(FileEntry::new)
    }

    /// Per-entry descriptors for listings.
    pub fn list(&self) -> Vec<FileInfo> {
        self.entries().map(FileInfo::from).collect()
    }

    // ── Content access ───────────────────────────────────────────────────────

    /// Decompressed contents of the named file.
    pub fn read_file(&self, name: &str) -> Result<Vec<u8>, ArchiveError> {
        let entry = self
            .stat(name)
            .ok_or_else(|| ArchiveError::UnknownFile(name.to_owned()))?;
        entry.open(&self.codecs)
    }

    /// Check the named file's stored checksum against its decompressed
    /// contents.
    pub fn verify(&self, name: &str) -> Result<bool, ArchiveError> {
        let entry = self
            .stat(name)
            .ok_or_else(|| ArchiveError::UnknownFile(name.to_owned()))?;
        entry.verify_checksum(&self.codecs)
    }

    // ── Mutation ─────────────────────────────────────────────────────────────

    /// Compress `path` with LZH and append it as a regular-file record.
    /// On failure nothing is appended.
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ArchiveError> {
        self.add_file_with(path, Algorithm::Lzh)
    }

    pub fn add_file_with<P: AsRef<Path>>(
        &mut self,
        path: P,
        algorithm: Algorithm,
    ) -> Result<(), ArchiveError> {
        let record = from_disk(path, algorithm, &self.codecs)?;
        self.container.records.push(record);
        Ok(())
    }

    /// Like [`Archive::add_file`] but stores `name` instead of the path
    /// string.
    pub fn add_file_as<P: AsRef<Path>>(
        &mut self,
        path: P,
        name: &str,
    ) -> Result<(), ArchiveError> {
        let mut record = from_disk(path, Algorithm::Lzh, &self.codecs)?;
        record.filename = name.to_owned();
        self.container.records.push(record);
        Ok(())
    }

    /// Serialize the whole archive and write it from offset 0.
    ///
    /// Full-overwrite semantics: the entire image is serialized in memory
    /// before the first write call. If the backing file was longer than the
    /// new image, the excess is not truncated here.
    pub fn write(&mut self) -> Result<(), ArchiveError> {
        let bytes = self.container.to_bytes()?;
        self.fd.seek(SeekFrom::Start(0))?;
        self.fd.write_all(&bytes)?;
        self.fd.flush()?;
        debug!("wrote {} byte(s) to {}", bytes.len(), self.path.display());
        Ok(())
    }

    /// Release the backing file handle. Dropping the archive has the same
    /// effect; `close` just makes the point explicit.
    pub fn close(self) {
        drop(self.fd);
    }
}
