use proptest::prelude::*;

use carchive::format::record::TAG_REGULAR;
use carchive::{CompressedBlob, Container, FileRecord, RecordKind, Version};

fn arb_version() -> impl Strategy<Value = Version> {
    prop_oneof![Just(Version::V200), Just(Version::V201)]
}

fn arb_blob() -> impl Strategy<Value = CompressedBlob> {
    (
        any::<u32>(),
        any::<u8>(),
        any::<[u8; 2]>(),
        any::<u8>(),
        proptest::collection::vec(any::<u8>(), 0..256),
    )
        .prop_map(|(uncompressed_length, algorithm, magic, special, payload)| CompressedBlob {
            uncompressed_length,
            algorithm,
            magic,
            special,
            payload,
        })
}

fn arb_kind() -> impl Strategy<Value = RecordKind> {
    prop_oneof![
        (any::<[u8; 2]>(), arb_blob(), any::<i32>())
            .prop_map(|(reserved, blob, checksum)| RecordKind::Regular { reserved, blob, checksum }),
        any::<[u8; 2]>()
            .prop_filter("regular tag implies a payload tail", |tag| tag != &TAG_REGULAR)
            .prop_map(|tag| RecordKind::Other { tag }),
    ]
}

fn arb_record() -> impl Strategy<Value = FileRecord> {
    (
        any::<u32>(),
        any::<u32>(),
        any::<u32>(),
        any::<u32>(),
        any::<u32>(),
        any::<[u8; 10]>(),
        "[a-zA-Z0-9_./-]{0,40}",
        arb_kind(),
    )
        .prop_map(
            |(perm_mode, file_length, reserved1, reserved2, timestamp, reserved3, filename, kind)| {
                FileRecord {
                    perm_mode,
                    file_length,
                    reserved1,
                    reserved2,
                    timestamp,
                    reserved3,
                    filename,
                    kind,
                }
            },
        )
}

proptest! {
    // Reserved fields, unknown algorithm ids, and odd magic bytes must all
    // survive a decode/encode round trip untouched.
    #[test]
    fn record_roundtrip(record in arb_record(), version in arb_version()) {
        let mut bytes = Vec::new();
        record.write(&mut bytes, version).unwrap();
        let decoded = FileRecord::read(&mut bytes.as_slice(), version).unwrap();
        prop_assert_eq!(decoded, record);
    }

    #[test]
    fn container_roundtrip(
        records in proptest::collection::vec(arb_record(), 0..6),
        version in arb_version(),
    ) {
        let container = Container { version, records };
        let bytes = container.to_bytes().unwrap();
        prop_assert_eq!(Container::parse(&bytes).unwrap(), container);
    }

    // The v201 length field always stores content length + 1 and the name is
    // followed by exactly one null byte.
    #[test]
    fn v201_filename_length_law(name in "[a-z0-9_.]{1,60}") {
        let record = FileRecord {
            perm_mode: 0,
            file_length: 0,
            reserved1: 0,
            reserved2: 0,
            timestamp: 0,
            reserved3: [0u8; 10],
            filename: name.clone(),
            kind: RecordKind::Other { tag: *b"DR" },
        };
        let mut bytes = Vec::new();
        record.write(&mut bytes, Version::V201).unwrap();
        let field = u16::from_le_bytes([bytes[32], bytes[33]]);
        prop_assert_eq!(field as usize, name.len() + 1);
        prop_assert_eq!(&bytes[34..34 + name.len()], name.as_bytes());
        prop_assert_eq!(bytes[34 + name.len()], 0);
    }
}
