//! Criterion benchmarks for model training.
//!
//! Run with: `cargo bench -p aether-runner`
//!
//! Benchmarks:
//! 1. Single regression tree on one year of features
//! 2. Full forest training per period
//! 3. Next-close prediction

use aether_core::data::synthetic::generate_until;
use aether_core::domain::{DataSource, Period};
use aether_core::features::{process, EnrichedSeries};
use aether_runner::forest::{RegressionTree, TreeParams};
use aether_runner::{train, FeatureMatrix, ModelConfig};
use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn enriched(period: Period) -> EnrichedSeries {
    let anchor = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
    process(&generate_until("AAPL", period, anchor), DataSource::SampleData).unwrap()
}

fn bench_tree(c: &mut Criterion) {
    let matrix = FeatureMatrix::from_series(&enriched(Period::OneYear));
    let sample: Vec<usize> = (0..matrix.len()).collect();
    c.bench_function("tree_fit_1y", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(42);
            RegressionTree::fit(
                black_box(matrix.rows()),
                black_box(matrix.labels()),
                sample.clone(),
                TreeParams::default(),
                &mut rng,
            )
        })
    });
}

fn bench_train(c: &mut Criterion) {
    let mut group = c.benchmark_group("train");
    group.sample_size(10);
    for period in [Period::OneYear, Period::FiveYears] {
        let series = enriched(period);
        group.bench_with_input(BenchmarkId::from_parameter(period), &series, |b, s| {
            b.iter(|| train(black_box(s), &ModelConfig::default()))
        });
    }
    group.finish();
}

fn bench_predict(c: &mut Criterion) {
    let series = enriched(Period::OneYear);
    let model = train(&series, &ModelConfig::default()).unwrap();
    c.bench_function("predict_next", |b| {
        b.iter(|| model.predict_next(black_box(&series)))
    });
}

criterion_group!(benches, bench_tree, bench_train, bench_predict);
criterion_main!(benches);
