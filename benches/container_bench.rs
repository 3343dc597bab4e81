use criterion::{black_box, criterion_group, criterion_main, Criterion};

use carchive::codec::Algorithm;
use carchive::{checksum_of, CompressedBlob, Container, FileRecord, RecordKind, Version};

fn sample_container(files: usize, payload_len: usize) -> Container {
    let payload = vec![0x5a_u8; payload_len];
    let checksum = checksum_of(&payload);
    let records = (0..files)
        .map(|i| FileRecord {
            perm_mode: 0o100644,
            file_length: payload_len as u32,
            reserved1: 0,
            reserved2: 0,
            timestamp: 1_700_000_000,
            reserved3: [0u8; 10],
            filename: format!("data/file_{i:04}.bin"),
            kind: RecordKind::Regular {
                reserved: [0u8; 2],
                blob: CompressedBlob::new(Algorithm::Lzh, payload_len as u32, payload.clone()),
                checksum,
            },
        })
        .collect();
    Container { version: Version::V201, records }
}

fn bench_encode(c: &mut Criterion) {
    let container = sample_container(64, 16 * 1024);
    c.bench_function("encode_64x16k", |b| {
        b.iter(|| black_box(&container).to_bytes().unwrap())
    });
}

fn bench_parse(c: &mut Criterion) {
    let bytes = sample_container(64, 16 * 1024).to_bytes().unwrap();
    c.bench_function("parse_64x16k", |b| {
        b.iter(|| Container::parse(black_box(&bytes)).unwrap())
    });
}

fn bench_checksum(c: &mut Criterion) {
    let data = vec![0u8; 1024 * 1024];
    c.bench_function("checksum_1mb", |b| b.iter(|| checksum_of(black_box(&data))));
}

criterion_group!(benches, bench_encode, bench_parse, bench_checksum);
criterion_main!(benches);
