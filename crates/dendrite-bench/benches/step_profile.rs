//! Criterion benchmarks for full time steps on the reference profiles.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use dendrite_bench::{reference_profile, volume_profile};
use dendrite_engine::{NullSink, TimeIntegrator};

fn bench_step_40k(c: &mut Criterion) {
    let mut sim = TimeIntegrator::new(reference_profile(42, u64::MAX)).unwrap();
    // Warm up: the first step assembles both operators.
    sim.step(&mut NullSink).unwrap();

    c.bench_function("step_40k", |b| {
        b.iter(|| black_box(sim.step(&mut NullSink).unwrap()));
    });
}

fn bench_step_64k_3d(c: &mut Criterion) {
    let mut sim = TimeIntegrator::new(volume_profile(42, u64::MAX)).unwrap();
    sim.step(&mut NullSink).unwrap();

    c.bench_function("step_64k_3d", |b| {
        b.iter(|| black_box(sim.step(&mut NullSink).unwrap()));
    });
}

fn bench_20_steps_40k(c: &mut Criterion) {
    c.bench_function("20_steps_40k", |b| {
        b.iter(|| {
            let mut sim = TimeIntegrator::new(reference_profile(42, 20)).unwrap();
            black_box(sim.run(&mut NullSink).unwrap());
        });
    });
}

criterion_group!(benches, bench_step_40k, bench_step_64k_3d, bench_20_steps_40k);
criterion_main!(benches);
