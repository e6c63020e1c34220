//! Benchmarks for redwire codec operations

use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use redwire::protocol::{encode_command, read_reply, Command};

fn codec_benchmarks(c: &mut Criterion) {
    let small = Command::new("GET").arg("benchmark:key");
    c.bench_function("encode_get", |b| {
        b.iter(|| encode_command(black_box(&small)))
    });

    let large = Command::new("SET")
        .arg("benchmark:key")
        .arg(vec![0xABu8; 4096]);
    c.bench_function("encode_set_4k", |b| {
        b.iter(|| encode_command(black_box(&large)))
    });

    let bulk_reply = {
        let mut bytes = b"$4096\r\n".to_vec();
        bytes.extend(std::iter::repeat(0xCDu8).take(4096));
        bytes.extend_from_slice(b"\r\n");
        bytes
    };
    c.bench_function("decode_bulk_4k", |b| {
        b.iter(|| {
            let mut cursor = Cursor::new(black_box(bulk_reply.as_slice()));
            read_reply(&mut cursor).unwrap()
        })
    });

    let array_reply = {
        let mut bytes = b"*64\r\n".to_vec();
        for i in 0..64 {
            bytes.extend_from_slice(format!("$9\r\nmember-{i:02}\r\n").as_bytes());
        }
        bytes
    };
    c.bench_function("decode_array_64", |b| {
        b.iter(|| {
            let mut cursor = Cursor::new(black_box(array_reply.as_slice()));
            read_reply(&mut cursor).unwrap()
        })
    });
}

criterion_group!(benches, codec_benchmarks);
criterion_main!(benches);
