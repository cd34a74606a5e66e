//! Query benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use memdex_bench::populated_store;

/// Benchmark indexed lookups on a fixed store.
fn bench_indexed(c: &mut Criterion) {
    let mut group = c.benchmark_group("indexed");
    let (store, _) = populated_store(10_000, 8);

    group.bench_function("equals_age", |b| {
        b.iter(|| {
            store
                .query()
                .field("age")
                .equals(black_box(42))
                .execute()
                .unwrap()
        });
    });

    group.bench_function("contains_name", |b| {
        b.iter(|| {
            store
                .query()
                .field("name")
                .contains(black_box("ab"))
                .execute()
                .unwrap()
        });
    });

    group.bench_function("in_age", |b| {
        b.iter(|| {
            store
                .query()
                .field("age")
                .is_in(black_box([20, 30, 40]))
                .execute()
                .unwrap()
        });
    });

    group.finish();
}

/// Benchmark range scans, which are linear in stored records.
fn bench_range_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_scan");

    for size in [1_000, 10_000, 100_000].iter() {
        let (store, _) = populated_store(*size, 8);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                store
                    .query()
                    .field("age")
                    .between(black_box(30), black_box(40))
                    .count()
                    .unwrap()
            });
        });
    }
    group.finish();
}

/// Benchmark a range combined with an indexed condition.
fn bench_combined(c: &mut Criterion) {
    let (store, _) = populated_store(10_000, 8);

    c.bench_function("contains_and_range", |b| {
        b.iter(|| {
            store
                .query()
                .field("name")
                .contains(black_box("a"))
                .field("age")
                .gte(black_box(50))
                .limit(50)
                .execute()
                .unwrap()
        });
    });
}

criterion_group!(benches, bench_indexed, bench_range_scan, bench_combined);
criterion_main!(benches);
