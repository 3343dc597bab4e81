//! On-disk layout of the CAR container.
//!
//! A container is an 8-byte header (eyecatcher + version string) followed by
//! records back to back with no padding and no trailer. Record shape depends
//! on the container version and on the per-record type tag; see
//! [`record::FileRecord`]. All integers are little-endian.

use std::fmt;
use std::io;

use thiserror::Error;

pub mod blob;
pub mod container;
pub mod record;

pub use blob::CompressedBlob;
pub use container::Container;
pub use record::{FileRecord, RecordKind};

/// First four bytes of every CAR archive.
pub const EYECATCHER: &[u8; 4] = b"CAR ";

/// Container layout version, taken from the 4-byte version string in the
/// header. The two versions differ in filename encoding and in the
/// signedness of the record checksum field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    V200,
    V201,
}

impl Version {
    pub const fn as_str(self) -> &'static str {
        match self {
            Version::V200 => "2.00",
            Version::V201 => "2.01",
        }
    }

    pub const fn as_bytes(self) -> [u8; 4] {
        match self {
            Version::V200 => *b"2.00",
            Version::V201 => *b"2.01",
        }
    }

    pub fn from_bytes(bytes: &[u8; 4]) -> Option<Self> {
        match bytes {
            b"2.00" => Some(Version::V200),
            b"2.01" => Some(Version::V201),
            _ => None,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("invalid eyecatcher (not a CAR archive)")]
    InvalidEyecatcher,
    #[error("unsupported archive version: {0}")]
    UnsupportedVersion(String),
    #[error("truncated input while reading {0}")]
    Truncated(&'static str),
    #[error("invalid compressed blob length {0}")]
    InvalidBlobLength(u32),
    #[error("invalid filename length field {0}")]
    InvalidFilenameLength(u16),
    #[error("filename missing null terminator")]
    UnterminatedFilename,
    #[error("filename is not valid UTF-8")]
    NonUtf8Filename,
    #[error("filename too long ({0} bytes)")]
    FilenameTooLong(usize),
    #[error("malformed record at byte offset {offset}: {source}")]
    MalformedRecord {
        offset: u64,
        #[source]
        source: Box<FormatError>,
    },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Map an `UnexpectedEof` from the underlying reader to a truncation error
/// naming the field being read.
pub(crate) fn eof(err: io::Error, what: &'static str) -> FormatError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        FormatError::Truncated(what)
    } else {
        FormatError::Io(err)
    }
}
