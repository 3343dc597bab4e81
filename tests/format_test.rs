use carchive::codec::Algorithm;
use carchive::format::blob::CompressedBlob;
use carchive::format::record::{FileRecord, RecordKind, TAG_DIRECTORY};
use carchive::format::{Container, FormatError, Version};
use carchive::{checksum_of, filemode, FileEntry};

fn sample_blob(payload: &[u8]) -> CompressedBlob {
    CompressedBlob::new(Algorithm::Lzh, payload.len() as u32, payload.to_vec())
}

fn regular_record(name: &str, content: &[u8]) -> FileRecord {
    FileRecord {
        perm_mode: 0o100644,
        file_length: content.len() as u32,
        reserved1: 0,
        reserved2: 0,
        timestamp: 0,
        reserved3: [0u8; 10],
        filename: name.to_owned(),
        kind: RecordKind::Regular {
            reserved: [0u8; 2],
            blob: sample_blob(content),
            checksum: checksum_of(content),
        },
    }
}

fn directory_record(name: &str) -> FileRecord {
    FileRecord {
        perm_mode: 0o040755,
        file_length: 0,
        reserved1: 0,
        reserved2: 0,
        timestamp: 0,
        reserved3: [0u8; 10],
        filename: name.to_owned(),
        kind: RecordKind::Other { tag: TAG_DIRECTORY },
    }
}

// ── Blob codec ───────────────────────────────────────────────────────────────

#[test]
fn test_blob_roundtrip() {
    let blob = sample_blob(b"some compressed bytes");
    let mut bytes = Vec::new();
    blob.write(&mut bytes).unwrap();
    let decoded = CompressedBlob::read(&mut bytes.as_slice()).unwrap();
    assert_eq!(decoded, blob);
}

#[test]
fn test_blob_length_field_is_recomputed() {
    let blob = sample_blob(b"0123456789");
    let mut bytes = Vec::new();
    blob.write(&mut bytes).unwrap();
    let field = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
    assert_eq!(field, 10 + 8);
}

#[test]
fn test_blob_truncated_payload() {
    let blob = sample_blob(b"0123456789");
    let mut bytes = Vec::new();
    blob.write(&mut bytes).unwrap();
    bytes.pop();
    assert!(matches!(
        CompressedBlob::read(&mut bytes.as_slice()),
        Err(FormatError::Truncated(_))
    ));
}

#[test]
fn test_blob_undersized_length_field() {
    // compressed_length below the 8 header bytes it must cover.
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&7u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&[0x12, 0x1f, 0x9d, 0x02]);
    assert!(matches!(
        CompressedBlob::read(&mut bytes.as_slice()),
        Err(FormatError::InvalidBlobLength(7))
    ));
}

// ── Record codec ─────────────────────────────────────────────────────────────

// Offsets within an encoded record: tag 0..2, fixed fields 2..22,
// reserved block 22..32, filename length field 32..34, filename from 34.

#[test]
fn test_v200_filename_is_raw() {
    let mut bytes = Vec::new();
    directory_record("abc").write(&mut bytes, Version::V200).unwrap();
    let field = u16::from_le_bytes(bytes[32..34].try_into().unwrap());
    assert_eq!(field, 3);
    assert_eq!(&bytes[34..], b"abc");
}

#[test]
fn test_v201_filename_is_null_terminated() {
    let mut bytes = Vec::new();
    directory_record("abc").write(&mut bytes, Version::V201).unwrap();
    let field = u16::from_le_bytes(bytes[32..34].try_into().unwrap());
    assert_eq!(field, 4);
    assert_eq!(&bytes[34..37], b"abc");
    assert_eq!(bytes[37], 0);
}

#[test]
fn test_v201_rejects_missing_terminator() {
    let mut bytes = Vec::new();
    directory_record("ab").write(&mut bytes, Version::V201).unwrap();
    *bytes.last_mut().unwrap() = b'Z';
    assert!(matches!(
        FileRecord::read(&mut bytes.as_slice(), Version::V201),
        Err(FormatError::UnterminatedFilename)
    ));
}

#[test]
fn test_non_regular_record_has_no_tail() {
    let record = directory_record("dir");
    let mut bytes = Vec::new();
    record.write(&mut bytes, Version::V200).unwrap();
    // tag + 20 fixed + 10 reserved + 2 length + 3 name, nothing after.
    assert_eq!(bytes.len(), 37);
    let decoded = FileRecord::read(&mut bytes.as_slice(), Version::V200).unwrap();
    assert_eq!(decoded, record);
}

#[test]
fn test_checksum_bytes_match_across_versions() {
    let mut record = regular_record("a", b"data");
    if let RecordKind::Regular { checksum, .. } = &mut record.kind {
        *checksum = -12345;
    }
    let mut v200 = Vec::new();
    let mut v201 = Vec::new();
    record.write(&mut v200, Version::V200).unwrap();
    record.write(&mut v201, Version::V201).unwrap();
    // v200 stores the field unsigned and v201 signed, but the bits agree.
    assert_eq!(v200[v200.len() - 4..], v201[v201.len() - 4..]);
}

// ── Container codec ──────────────────────────────────────────────────────────

#[test]
fn test_container_rejects_bad_eyecatcher() {
    let mut bytes = b"ZIP 2.01".to_vec();
    bytes.extend_from_slice(&[0u8; 4]);
    assert!(matches!(
        Container::parse(&bytes),
        Err(FormatError::InvalidEyecatcher)
    ));
}

#[test]
fn test_container_rejects_unknown_version() {
    match Container::parse(b"CAR 3.00") {
        Err(FormatError::UnsupportedVersion(v)) => assert_eq!(v, "3.00"),
        other => panic!("expected UnsupportedVersion, got {other:?}"),
    }
}

#[test]
fn test_container_header_only_is_empty() {
    let container = Container::parse(b"CAR 2.01").unwrap();
    assert_eq!(container.version, Version::V201);
    assert!(container.records.is_empty());
}

#[test]
fn test_container_partial_record_is_malformed() {
    let container = Container {
        version: Version::V201,
        records: vec![regular_record("a.txt", b"content")],
    };
    let mut bytes = container.to_bytes().unwrap();
    let valid_len = bytes.len();
    // A few stray bytes after the last record: not enough for another one.
    bytes.extend_from_slice(&[0x52, 0x47, 0x00]);
    match Container::parse(&bytes) {
        Err(FormatError::MalformedRecord { offset, .. }) => {
            assert_eq!(offset, valid_len as u64);
        }
        other => panic!("expected MalformedRecord, got {other:?}"),
    }
}

// ── Checksum convention ──────────────────────────────────────────────────────

#[test]
fn test_checksum_of_empty_is_zero() {
    assert_eq!(checksum_of(b""), 0);
}

#[test]
fn test_checksum_is_deterministic_and_flip_sensitive() {
    let data = b"the quick brown fox".to_vec();
    let reference = checksum_of(&data);
    assert_eq!(checksum_of(&data), reference);

    let mut flipped = data.clone();
    flipped[3] ^= 0x01;
    assert_ne!(checksum_of(&flipped), reference);
}

// ── Presentation ─────────────────────────────────────────────────────────────

#[test]
fn test_filemode_table() {
    assert_eq!(filemode(0o100755), "-rwxr-xr-x");
    assert_eq!(filemode(0o100644), "-rw-r--r--");
    assert_eq!(filemode(0o040755), "drwxr-xr-x");
    assert_eq!(filemode(0o120777), "lrwxrwxrwx");
    assert_eq!(filemode(0o104755), "-rwsr-xr-x");
    assert_eq!(filemode(0o104655), "-rwSr-xr-x");
    assert_eq!(filemode(0o041777), "drwxrwxrwt");
}

#[test]
fn test_timestamp_formatting() {
    let record = regular_record("t.txt", b"x");
    let entry = FileEntry::new(&record);
    assert_eq!(entry.timestamp(), "01 Jan 1970 00:00");
    assert_eq!(entry.permissions(), "-rw-r--r--");
}
