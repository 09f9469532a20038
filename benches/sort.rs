//! Criterion benchmarks for the unsigned sort pipeline.
//!
//! Run with:
//!   cargo bench --bench sort
//!
//! Sizes are chosen to land one benchmark in each regime: insertion, radix,
//! and the parallel split/merge path.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};

use gaugekit::sort::{sort, INSERTION_MAX, RADIX_MAX};

fn pseudo_random(n: usize) -> Vec<u32> {
    let mut state = 0x2545_F491u32;
    (0..n)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state
        })
        .collect()
}

fn bench_sort_regimes(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort_u32");

    for &n in &[INSERTION_MAX, 100_000, RADIX_MAX * 4] {
        let input = pseudo_random(n);
        group.throughput(Throughput::Bytes((n * 4) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &input, |b, input| {
            b.iter_batched_ref(
                || input.clone(),
                |values| sort(values),
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sort_regimes);
criterion_main!(benches);
