//! Benchmarks for composite key encoding and decoding.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use mdkey_core::{ColumnSplit, KeyCodec, PlanMode};

/// A retail-style schema: store, product, day, channel, promo flag, region.
const CARDINALITIES: [u64; 6] = [1_200, 85_000, 3_650, 5, 2, 37];

fn rows(n: u64) -> Vec<Vec<u64>> {
    (0..n)
        .map(|i| CARDINALITIES.iter().enumerate().map(|(d, &c)| (i * 31 + d as u64 * 7) % c).collect())
        .collect()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("mdkey_encode");
    group.throughput(Throughput::Elements(1_000));
    let rows = rows(1_000);

    for mode in [PlanMode::Minimal, PlanMode::IncrementedFill] {
        let codec = KeyCodec::from_cardinalities(&CARDINALITIES, mode).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(mode), &rows, |b, rows| {
            b.iter(|| {
                let mut buf = Vec::with_capacity(rows.len() * codec.key_len());
                for row in rows {
                    codec.encode_to(black_box(row), &mut buf).unwrap();
                }
                buf
            });
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("mdkey_decode");
    group.throughput(Throughput::Elements(1_000));

    for mode in [PlanMode::Minimal, PlanMode::IncrementedFill] {
        let codec = KeyCodec::from_cardinalities(&CARDINALITIES, mode).unwrap();
        let keys: Vec<_> = rows(1_000).iter().map(|r| codec.encode(r).unwrap()).collect();
        group.bench_with_input(BenchmarkId::from_parameter(mode), &keys, |b, keys| {
            b.iter(|| {
                for key in keys {
                    black_box(codec.decode(black_box(key)).unwrap());
                }
            });
        });
    }

    group.finish();
}

fn bench_decode_one(c: &mut Criterion) {
    let mut group = c.benchmark_group("mdkey_decode_one");
    group.throughput(Throughput::Elements(1_000));

    let split = ColumnSplit::new([2, 1, 3]);
    let codecs = [
        ("minimal", KeyCodec::from_cardinalities(&CARDINALITIES, PlanMode::Minimal).unwrap()),
        (
            "incremented_fill",
            KeyCodec::from_cardinalities(&CARDINALITIES, PlanMode::IncrementedFill).unwrap(),
        ),
        (
            "split",
            KeyCodec::from_column_split(&CARDINALITIES, &split, PlanMode::Minimal).unwrap(),
        ),
    ];

    for (name, codec) in &codecs {
        let keys: Vec<_> = rows(1_000).iter().map(|r| codec.encode(r).unwrap()).collect();
        group.bench_function(*name, |b| {
            b.iter(|| {
                for key in &keys {
                    black_box(codec.decode_one(black_box(key), 2).unwrap());
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode, bench_decode_one);
criterion_main!(benches);
