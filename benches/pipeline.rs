//! # Sensor Pipeline Benchmarks
//!
//! Measures blur, demosaic and the full simulation at a few frame sizes.
//!
//! Run: `cargo bench --bench pipeline`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use cfa_sensor_sim::color::demosaic::demosaic;
use cfa_sensor_sim::pipeline::{SimulationParams, simulate};
use cfa_sensor_sim::scene;
use cfa_sensor_sim::sensor::optics::{Kernel, convolve};
use cfa_sensor_sim::{DemosaicAlgo, Orientation};

const SIZES: &[(usize, usize)] = &[(160, 120), (320, 240), (640, 480)];

fn bench_blur(c: &mut Criterion) {
    let mut group = c.benchmark_group("blur");
    let kernel = Kernel::gaussian(7, 1.5).unwrap();

    for &(w, h) in SIZES {
        let grid: Vec<f64> = scene::gradient(w, h).data().iter().map(|v| v * 65535.0).collect();
        group.throughput(Throughput::Elements((w * h) as u64));
        group.bench_with_input(BenchmarkId::new("gaussian_7x7", w), &grid, |b, grid| {
            b.iter(|| black_box(convolve(grid, w, h, &kernel)))
        });
    }
    group.finish();
}

fn bench_demosaic(c: &mut Criterion) {
    let mut group = c.benchmark_group("demosaic");
    let (w, h) = (320, 240);
    let mosaic: Vec<f64> = scene::checkerboard(w, h, 8, 8)
        .data()
        .iter()
        .map(|v| v * 255.0)
        .collect();
    group.throughput(Throughput::Elements((w * h) as u64));

    for &algo in DemosaicAlgo::ALL {
        group.bench_function(algo.name(), |b| {
            b.iter(|| black_box(demosaic(&mosaic, w, h, Orientation::Rggb, algo)))
        });
    }
    group.finish();
}

fn bench_simulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulate");
    group.sample_size(20);

    for &(w, h) in SIZES {
        let params = SimulationParams {
            width: w,
            height: h,
            seed: Some(42),
            ..SimulationParams::default()
        };
        group.throughput(Throughput::Elements((w * h) as u64));
        group.bench_with_input(BenchmarkId::new("default", w), &params, |b, params| {
            b.iter(|| black_box(simulate(params).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_blur, bench_demosaic, bench_simulate);
criterion_main!(benches);
