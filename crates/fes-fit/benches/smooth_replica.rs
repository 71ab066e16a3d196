use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fes_fit::colvar::ColvarSamples;
use fes_fit::grid::GridSpec;
use fes_fit::krr::{smooth_replica, KernelRidge};

fn replica(n: usize) -> ColvarSamples {
    let x: Vec<f64> = (0..n).map(|i| -1.5 + 3.0 * i as f64 / (n - 1) as f64).collect();
    let y = x.iter().map(|v| 10.0 * (v * v - 1.0).powi(2)).collect();
    ColvarSamples { x, y }
}

fn bench_smooth(c: &mut Criterion) {
    let samples = replica(500);
    let grid = GridSpec::SMOOTHING.build().expect("grid");
    let opts = KernelRidge::default();
    c.bench_function("smooth_replica_500", |b| {
        b.iter(|| smooth_replica(black_box(&samples), &grid, &opts).expect("smooth"))
    });
}

criterion_group!(benches, bench_smooth);
criterion_main!(benches);
