use std::io::{Cursor, Read, Write};

use log::debug;

use super::record::FileRecord;
use super::{eof, FormatError, Version, EYECATCHER};

/// A fully decoded archive image: the version plus every record in on-disk
/// order. Order is meaningful: name lookups resolve to the last record
/// with a given filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub version: Version,
    pub records: Vec<FileRecord>,
}

impl Container {
    pub fn new(version: Version) -> Self {
        Self { version, records: Vec::new() }
    }

    /// Decode a whole archive from memory.
    ///
    /// Records are consumed back to back until the buffer is exhausted; a
    /// partial trailing record is a [`FormatError::MalformedRecord`].
    pub fn parse(bytes: &[u8]) -> Result<Self, FormatError> {
        let mut cursor = Cursor::new(bytes);

        let mut eyecatcher = [0u8; 4];
        cursor
            .read_exact(&mut eyecatcher)
            .map_err(|e| eof(e, "eyecatcher"))?;
        if &eyecatcher != EYECATCHER {
            return Err(FormatError::InvalidEyecatcher);
        }
        let mut version_bytes = [0u8; 4];
        cursor
            .read_exact(&mut version_bytes)
            .map_err(|e| eof(e, "version"))?;
        let version = Version::from_bytes(&version_bytes).ok_or_else(|| {
            FormatError::UnsupportedVersion(String::from_utf8_lossy(&version_bytes).into_owned())
        })?;

        let mut records = Vec::new();
        while (cursor.position() as usize) < bytes.len() {
            let offset = cursor.position();
            let record = FileRecord::read(&mut cursor, version)
                .map_err(|e| FormatError::MalformedRecord { offset, source: Box::new(e) })?;
            records.push(record);
        }
        debug!("parsed {} archive, {} record(s)", version, records.len());
        Ok(Self { version, records })
    }

    /// Slurp `reader` to the end and decode. The format has no trailer, so
    /// the whole source must be in memory before parsing starts.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self, FormatError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::parse(&bytes)
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), FormatError> {
        writer.write_all(EYECATCHER)?;
        writer.write_all(&self.version.as_bytes())?;
        for record in &self.records {
            record.write(writer, self.version)?;
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, FormatError> {
        let mut bytes = Vec::new();
        self.write(&mut bytes)?;
        Ok(bytes)
    }
}
