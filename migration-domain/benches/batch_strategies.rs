//! Benchmarks for the batch strategies (C1, §4.1) across input sizes
//! representative of a small project (hundreds of entities) through a large
//! one (tens of thousands).
//!
//! Run with `cargo bench --bench batch_strategies`.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use migration_domain::batch_strategies::{
    configure_optimal_batch_size, estimate_processing_time, AdaptiveBatchStrategy, BatchStrategy, EntityTypeBatchStrategy, SizeBatchStrategy,
};

const SIZES: [usize; 4] = [100, 1_000, 10_000, 50_000];

fn uniform_items(count: usize) -> Vec<u32> {
    (0..count as u32).map(|i| 1 + i % 20).collect()
}

fn typed_items(count: usize) -> Vec<(u8, u32)> {
    (0..count as u32).map(|i| ((i % 4) as u8, i)).collect()
}

fn bench_size_strategy(c: &mut Criterion) {
    let mut group = c.benchmark_group("size_batch_strategy");
    for size in SIZES {
        let items = uniform_items(size);
        group.bench_with_input(BenchmarkId::new("pack", size), &items, |b, items| {
            b.iter(|| {
                let mut strategy = SizeBatchStrategy::new(100.0, |n: &u32| *n as f64);
                black_box(strategy.batch(items.clone()))
            });
        });
    }
    group.finish();
}

fn bench_entity_type_strategy(c: &mut Criterion) {
    let mut group = c.benchmark_group("entity_type_batch_strategy");
    for size in SIZES {
        let items = typed_items(size);
        group.bench_with_input(BenchmarkId::new("group_and_split", size), &items, |b, items| {
            b.iter(|| {
                let mut strategy = EntityTypeBatchStrategy::new(50, |(ty, _): &(u8, u32)| ty.to_string());
                black_box(strategy.batch(items.clone()))
            });
        });
    }
    group.finish();
}

fn bench_adaptive_strategy(c: &mut Criterion) {
    let mut group = c.benchmark_group("adaptive_batch_strategy");
    for size in SIZES {
        let items = uniform_items(size);
        group.bench_with_input(BenchmarkId::new("batch_then_adapt", size), &items, |b, items| {
            b.iter(|| {
                let mut strategy = AdaptiveBatchStrategy::new(50, 10, 200, 1.0, 0.5);
                let batches = strategy.batch(items.clone());
                strategy.adapt(1.5);
                black_box(batches)
            });
        });
    }
    group.finish();
}

fn bench_configure_optimal_batch_size(c: &mut Criterion) {
    c.bench_function("configure_optimal_batch_size", |b| {
        b.iter(|| black_box(configure_optimal_batch_size(black_box(50_000), 2048.0, 0.5, 8, Some(6_000.0), 10, 5_000)));
    });
}

fn bench_estimate_processing_time(c: &mut Criterion) {
    let history: Vec<(u64, f64)> = (1..=20).map(|i| (i * 50, i as f64 * 0.8)).collect();
    c.bench_function("estimate_processing_time", |b| {
        b.iter(|| black_box(estimate_processing_time(black_box(&history), 733, 0.02)));
    });
}

criterion_group!(
    benches,
    bench_size_strategy,
    bench_entity_type_strategy,
    bench_adaptive_strategy,
    bench_configure_optimal_batch_size,
    bench_estimate_processing_time,
);
criterion_main!(benches);
