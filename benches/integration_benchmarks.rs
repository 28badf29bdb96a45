//! Integration Benchmarks
//!
//! Measures the Euler loop and the export path for trajectories of
//! increasing horizon.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use episim::prelude::*;
use episim::visualization::ExportConfig;

fn params(simulation_time: f64) -> EpidemicParams {
    EpidemicParams {
        simulation_time,
        ..EpidemicParams::default()
    }
}

/// Full integration, model construction included.
fn bench_integrate(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrate");
    group.sample_size(50);
    group.confidence_level(0.95);

    for days in [21.0, 90.0, 360.0] {
        group.bench_with_input(BenchmarkId::new("days", days), &days, |b, &days| {
            b.iter(|| {
                let model = EpidemicModel::new(params(days)).unwrap_or_else(|e| panic!("{e}"));
                black_box(model.integrate())
            });
        });
    }

    group.finish();
}

/// Jidoka inspection over the reference trajectory.
fn bench_jidoka(c: &mut Criterion) {
    let trajectory = EpidemicModel::new(params(360.0))
        .unwrap_or_else(|e| panic!("{e}"))
        .integrate();
    let guard = JidokaGuard::default();

    c.bench_function("jidoka_inspect", |b| {
        b.iter(|| black_box(guard.inspect(black_box(&trajectory))));
    });
}

/// CSV serialization into memory, full and decimated.
fn bench_export(c: &mut Criterion) {
    let trajectory = EpidemicModel::new(params(360.0))
        .unwrap_or_else(|e| panic!("{e}"))
        .integrate();
    let mut group = c.benchmark_group("export_csv");

    for decimation in [1usize, 100] {
        let exporter = Exporter::with_config(ExportConfig {
            format: ExportFormat::Csv,
            decimation,
        });
        group.bench_with_input(
            BenchmarkId::new("decimation", decimation),
            &decimation,
            |b, _| {
                b.iter(|| {
                    let mut buffer = Vec::with_capacity(4 << 20);
                    let _ = exporter.write_csv(&trajectory, &mut buffer);
                    black_box(buffer.len())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_integrate, bench_jidoka, bench_export);
criterion_main!(benches);
