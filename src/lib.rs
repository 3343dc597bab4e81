//! Reader and writer for the CAR archive container format.
//!
//! Supports both on-disk layouts (versions 2.00 and 2.01). The raw wire
//! codecs live in [`format`], the compression collaborator seam in [`codec`],
//! and the high-level [`Archive`] surface on top of both.

pub mod archive;
pub mod codec;
pub mod entry;
pub mod filemode;
pub mod format;

pub use archive::{Archive, ArchiveError, FileInfo};
pub use codec::{Algorithm, Codec, CodecError, CodecRegistry};
pub use entry::{checksum_of, FileEntry};
pub use filemode::filemode;
pub use format::{CompressedBlob, Container, FileRecord, FormatError, RecordKind, Version};
