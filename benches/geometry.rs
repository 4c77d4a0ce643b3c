//! Benchmarks for point cloud generation.
//!
//! Run with: `cargo bench --bench geometry`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tornado::TornadoShape;

fn bench_generate(c: &mut Criterion) {
    let shape = TornadoShape::new();
    let mut group = c.benchmark_group("generate");

    for count in [500_i64, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut rng = SmallRng::seed_from_u64(1);
            b.iter(|| shape.generate(black_box(count), &mut rng))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_generate);
criterion_main!(benches);
