//! Benchmarks for the scoring hot path: indicator derivation, trend
//! quality, and the full six-category score over a year of daily bars.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use uptrend_core::config::ScoringConfig;
use uptrend_core::domain::{Bar, PriceSeries};
use uptrend_core::indicators::IndicatorFrame;
use uptrend_core::quality::{trend_quality, DEFAULT_LOOKBACK};
use uptrend_core::scoring::compute_score;

fn bench_series(n: usize) -> PriceSeries {
    let base_date = chrono::NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let bars: Vec<Bar> = (0..n)
        .map(|i| {
            let close = 100.0 + i as f64 * 0.2 + (i as f64 * 0.31).sin() * 4.0;
            let open = close - 0.5;
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1_000_000 + (i as u64 % 7) * 50_000,
            }
        })
        .collect();
    PriceSeries::new("BENCH", bars).unwrap()
}

fn bench_indicator_frame(c: &mut Criterion) {
    let series = bench_series(260);
    c.bench_function("indicator_frame_260", |b| {
        b.iter(|| IndicatorFrame::compute(black_box(&series)))
    });
}

fn bench_trend_quality(c: &mut Criterion) {
    let series = bench_series(260);
    c.bench_function("trend_quality_60", |b| {
        b.iter(|| trend_quality(black_box(&series), DEFAULT_LOOKBACK))
    });
}

fn bench_full_score(c: &mut Criterion) {
    let series = bench_series(260);
    let frame = IndicatorFrame::compute(&series);
    let cfg = ScoringConfig::default();
    c.bench_function("compute_score_260", |b| {
        b.iter(|| compute_score(black_box(&series), black_box(&frame), black_box(&cfg)))
    });
}

criterion_group!(
    benches,
    bench_indicator_frame,
    bench_trend_quality,
    bench_full_score
);
criterion_main!(benches);
