//! Decompression benchmarks for kcap-lzss
//!
//! Inputs are encoded once with the greedy reference encoder from the
//! integration tests; only decoding is measured.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use kcap_lzss::{LzssDecoder, decode_lzss};
use std::hint::black_box;
use std::io::Cursor;

#[path = "../tests/common/mod.rs"]
mod common;

/// Type alias for pattern generator functions
type PatternGenerator = fn(usize) -> Vec<u8>;

mod test_data {
    /// All bytes equal (long back-references only)
    pub fn uniform(size: usize) -> Vec<u8> {
        vec![0xAA; size]
    }

    /// Script-like text
    pub fn text_like(size: usize) -> Vec<u8> {
        super::common::sample_text(size)
    }

    /// No patterns (mostly literals)
    pub fn random(size: usize) -> Vec<u8> {
        super::common::noise(size)
    }

    /// Shift_JIS dialogue lines with script commands
    pub fn dialogue_like(size: usize) -> Vec<u8> {
        // 「こんにちは」 in Windows-31J.
        let line: &[u8] = b"\x81\x75\x82\xb1\x82\xf1\x82\xc9\x82\xbf\x82\xcd\x81\x76\r\n#wait 30\r\n";
        line.iter().copied().cycle().take(size).collect()
    }
}

mod data_sizes {
    pub const SMALL: usize = 4 * 1024;
    pub const MEDIUM: usize = 64 * 1024;
    pub const LARGE: usize = 256 * 1024;
}

/// Benchmark decompression speed for different data types
fn bench_decompression_data_types(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompression_data_types");

    let patterns: [(&str, PatternGenerator); 4] = [
        ("uniform", test_data::uniform as PatternGenerator),
        ("text", test_data::text_like as PatternGenerator),
        ("random", test_data::random as PatternGenerator),
        ("dialogue", test_data::dialogue_like as PatternGenerator),
    ];

    let size = data_sizes::MEDIUM;
    for (name, generator) in patterns {
        let region = common::encode(&generator(size));

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &region, |b, region| {
            b.iter(|| {
                let decompressed = decode_lzss(black_box(region)).unwrap();
                black_box(decompressed);
            });
        });
    }

    group.finish();
}

/// Benchmark decompression throughput across input sizes
fn bench_decompression_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompression_sizes");

    for size in [data_sizes::SMALL, data_sizes::MEDIUM, data_sizes::LARGE] {
        let region = common::encode(&test_data::text_like(size));

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &region, |b, region| {
            b.iter(|| {
                let decompressed = decode_lzss(black_box(region)).unwrap();
                black_box(decompressed);
            });
        });
    }

    group.finish();
}

/// Benchmark the effect of the caller's read buffer size
fn bench_read_buffer_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_buffer_sizes");

    let size = data_sizes::MEDIUM;
    let region = common::encode(&test_data::text_like(size));

    for buffer in [1usize, 64, 512, 8192] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(buffer), &region, |b, region| {
            let mut out = vec![0u8; buffer];
            b.iter(|| {
                let mut decoder = LzssDecoder::new(Cursor::new(black_box(&region[..]))).unwrap();
                while decoder.decompress(&mut out).unwrap() > 0 {}
                black_box(decoder.total_out());
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_decompression_data_types,
    bench_decompression_sizes,
    bench_read_buffer_sizes
);
criterion_main!(benches);
