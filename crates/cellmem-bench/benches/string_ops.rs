//! Criterion micro-benchmarks for cell-backed string construction and edits.

use std::hint::black_box;

use cellmem_bench::{mutable_string, sample_text, SIZES};
use cellmem_string::{CellString, MutableCellString};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

/// Benchmark: build a string (one allocation per byte) and drop it.
fn bench_construct(c: &mut Criterion) {
    let mut group = c.benchmark_group("construct");
    for len in SIZES {
        let text = sample_text(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &text, |b, text| {
            b.iter(|| black_box(CellString::new(text).unwrap()));
        });
    }
    group.finish();
}

/// Benchmark: reassemble the full text from its cells.
fn bench_to_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_text");
    for len in SIZES {
        let s = mutable_string(len).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(len), &s, |b, s| {
            b.iter(|| black_box(s.to_text().unwrap()));
        });
    }
    group.finish();
}

/// Benchmark: insert at the front then remove it again, shifting every handle twice.
fn bench_insert_remove_front(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_remove_front");
    for len in SIZES {
        let mut s = mutable_string(len).unwrap();
        group.bench_function(BenchmarkId::from_parameter(len), |b| {
            b.iter(|| {
                s.insert_at('#', 0).unwrap();
                black_box(s.remove_at(0).unwrap());
            });
        });
    }
    group.finish();
}

/// Benchmark: append a short suffix to a fresh string.
fn bench_append(c: &mut Criterion) {
    let suffix = sample_text(16);
    c.bench_function("append_16_to_256", |b| {
        b.iter_batched(
            || mutable_string(256).unwrap(),
            |mut s: MutableCellString| {
                s.append(&suffix).unwrap();
                s
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

/// Benchmark: substring search over the reassembled text.
fn bench_contains(c: &mut Criterion) {
    let s = mutable_string(4096).unwrap();
    c.bench_function("contains_4096", |b| {
        b.iter(|| black_box(s.contains("xyz{|}").unwrap()));
    });
}

criterion_group!(
    benches,
    bench_construct,
    bench_to_text,
    bench_insert_remove_front,
    bench_append,
    bench_contains
);
criterion_main!(benches);
