//! Strategy Benchmark
//!
//! Times fill and single-group invalidation for each strategy on the
//! in-memory store:
//! - fill: 50 groups x 200 members
//! - invalidate: one group out of a pre-filled store

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

use keyspace_bench::dataset::Dataset;
use keyspace_bench::scenario::fill;
use keyspace_bench::strategy::{ScanMode, StrategyKind};
use keyspace_common::InMemoryStore;

const GROUPS: u32 = 50;
const MEMBERS: u32 = 200;

fn dataset() -> Dataset {
    Dataset::new(GROUPS, MEMBERS, "Lorem Ipsum is simply dummy text")
}

fn fill_benchmarks(c: &mut Criterion) {
    let dataset = dataset();
    let mut group = c.benchmark_group("fill");
    group.sample_size(10);

    for kind in StrategyKind::ALL {
        let strategy = kind.build(ScanMode::Keys, 1000);
        for batch_size in [1usize, 100] {
            group.bench_with_input(
                BenchmarkId::new(kind.as_str(), batch_size),
                &batch_size,
                |b, &batch_size| {
                    b.iter_batched(
                        InMemoryStore::new,
                        |mut store| {
                            fill(&mut store, strategy.as_ref(), &dataset, batch_size).unwrap();
                            black_box(store)
                        },
                        BatchSize::LargeInput,
                    )
                },
            );
        }
    }

    group.finish();
}

fn invalidate_benchmarks(c: &mut Criterion) {
    let dataset = dataset();
    let mut group = c.benchmark_group("invalidate");

    let variants = [
        (StrategyKind::Flat, ScanMode::Keys),
        (StrategyKind::Flat, ScanMode::Scan),
        (StrategyKind::Hashed, ScanMode::Keys),
        (StrategyKind::Indexed, ScanMode::Keys),
    ];
    for (kind, scan) in variants {
        let strategy = kind.build(scan, 1000);
        let mut template = InMemoryStore::new();
        fill(&mut template, strategy.as_ref(), &dataset, 1000).unwrap();

        group.bench_function(BenchmarkId::new(kind.as_str(), scan), |b| {
            b.iter_batched(
                || template.clone(),
                |mut store| black_box(strategy.invalidate(&mut store, GROUPS).unwrap()),
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, fill_benchmarks, invalidate_benchmarks);
criterion_main!(benches);
