//! Transform strategy benchmark suite
//!
//! - Per-element transform: sequential vs rayon thread pool
//! - Descriptive statistics over the value column
//! - CSV parsing of a generated dataset

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dataproc_bench::benches::{stats, transform};
use dataproc_bench::dataset::{load_table, write_rows, GenerateConfig};
use std::fs;
use tempfile::TempDir;

fn values(n: usize) -> Vec<i64> {
    (0..n as i64).map(|i| (i * 7_919) % 4_951 + 50).collect()
}

fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");

    for (n, label) in [(10_000, "10k"), (100_000, "100k"), (1_000_000, "1m")] {
        let data = values(n);

        group.bench_with_input(BenchmarkId::new("sequential", label), &data, |b, data| {
            b.iter(|| transform::run_sequential(black_box(data), 4))
        });

        for workers in [2, 4, 8] {
            group.bench_with_input(
                BenchmarkId::new(format!("threads_{workers}"), label),
                &data,
                |b, data| b.iter(|| transform::run_threads(black_box(data), workers).unwrap()),
            );
        }
    }

    group.finish();
}

fn bench_statistics(c: &mut Criterion) {
    let mut group = c.benchmark_group("statistics");

    for (n, label) in [(10_000, "10k"), (100_000, "100k")] {
        let data = values(n);
        group.bench_with_input(BenchmarkId::new("compute", label), &data, |b, data| {
            b.iter(|| stats::compute(black_box(data)).unwrap())
        });
    }

    group.finish();
}

fn bench_csv_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("csv_read");
    group.sample_size(20);

    let temp_dir = TempDir::new().unwrap();
    for (rows, label) in [(10_000u64, "10k"), (100_000, "100k")] {
        let path = temp_dir.path().join(format!("dataset_{label}.csv"));
        let file = fs::File::create(&path).unwrap();
        write_rows(file, rows, &GenerateConfig::default()).unwrap();

        group.bench_with_input(BenchmarkId::new("load_table", label), &path, |b, path| {
            b.iter(|| load_table(black_box(path)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_transform, bench_statistics, bench_csv_read);
criterion_main!(benches);
