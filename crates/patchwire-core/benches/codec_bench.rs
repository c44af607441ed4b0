//! Criterion benchmarks for patchwire-core byte transforms
//!
//! Run with: cargo bench -p patchwire-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use patchwire_core::{checksum, frame::split_frames, nibble, seven_bit};

const PAYLOAD_SIZES: &[usize] = &[64, 199, 1024, 4096];

fn generate_payload(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i * 31 % 256) as u8).collect()
}

fn bench_seven_bit(c: &mut Criterion) {
    let mut group = c.benchmark_group("SevenBit");

    for &size in PAYLOAD_SIZES {
        let raw = generate_payload(size);
        let packed = seven_bit::pack(&raw);

        group.bench_with_input(BenchmarkId::new("pack", size), &size, |b, _| {
            b.iter(|| black_box(seven_bit::pack(black_box(&raw))));
        });
        group.bench_with_input(BenchmarkId::new("unpack", size), &size, |b, _| {
            b.iter(|| black_box(seven_bit::unpack(black_box(&packed))));
        });
    }

    group.finish();
}

fn bench_checksum(c: &mut Criterion) {
    let mut group = c.benchmark_group("Checksum");

    for &size in PAYLOAD_SIZES {
        let data: Vec<u8> = generate_payload(size).iter().map(|b| b & 0x7F).collect();
        group.bench_with_input(BenchmarkId::new("checksum", size), &size, |b, _| {
            b.iter(|| black_box(checksum::checksum(black_box(&data))));
        });
    }

    group.finish();
}

fn bench_nibbles(c: &mut Criterion) {
    let raw = generate_payload(64 * 48);
    c.bench_function("nibblize_bank", |b| {
        b.iter(|| black_box(nibble::nibblize_low_first(black_box(&raw))));
    });
}

fn bench_split(c: &mut Criterion) {
    let mut stream = Vec::new();
    for i in 0..128u8 {
        stream.push(0xF0);
        stream.extend(std::iter::repeat_n(i & 0x7F, 100));
        stream.push(0xF7);
    }
    c.bench_function("split_128_frames", |b| {
        b.iter(|| black_box(split_frames(black_box(&stream)).count()));
    });
}

criterion_group!(benches, bench_seven_bit, bench_checksum, bench_nibbles, bench_split);
criterion_main!(benches);
