//! Walk-forward backtest — per-window threshold optimization and
//! out-of-sample trade evaluation.
//!
//! The available date range is tiled into train+test windows: each window
//! trains on `train_window_days`, tests on the immediately following
//! `test_window_days`, and the next window's train period starts where the
//! current train period ended. Test segments are therefore contiguous and
//! non-overlapping.

pub mod score;

pub use score::{ScoringProfile, SimplifiedProfile};

use crate::config::BacktestConfig;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use uptrend_core::domain::PriceSeries;

/// Errors that abort a backtest before any window runs.
#[derive(Debug, Error)]
pub enum BacktestError {
    #[error("no price data: the dataset is empty")]
    EmptyDataset,
}

/// One train/test window over the dataset's date range.
///
/// Invariants: `test_start == train_end`, and the next window's
/// `train_start` equals this window's `train_end`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowSpec {
    pub index: usize,
    pub train_start: NaiveDate,
    pub train_end: NaiveDate,
    pub test_start: NaiveDate,
    pub test_end: NaiveDate,
}

/// Trade outcome classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
}

/// A signal that was taken on the test slice: entry at the signal bar's
/// close, exit a fixed holding period later (clipped to the series end).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub ticker: String,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_score: f64,
    /// Fractional return over the holding period.
    #[serde(rename = "return")]
    pub return_pct: f64,
    pub outcome: Outcome,
    /// Index of the window that produced this trade.
    pub window: usize,
}

/// Per-window statistics over the test-phase trades.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowStats {
    pub total_trades: usize,
    pub win_rate: f64,
    pub avg_return: f64,
    pub total_return: f64,
    /// Win rate of trades entered at score >= 80.
    pub tier1_win_rate: f64,
    /// Win rate of trades entered at 70 <= score < 80.
    pub tier2_win_rate: f64,
}

/// Everything a single window produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowResult {
    pub spec: WindowSpec,
    pub best_threshold: f64,
    pub stats: WindowStats,
    pub trades: Vec<Trade>,
}

/// Aggregate statistics across all windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub total_windows: usize,
    pub total_trades: usize,
    pub overall_win_rate: f64,
    pub total_return: f64,
    pub avg_return_per_trade: f64,
}

/// Full backtest output: per-window results plus the aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    pub windows: Vec<WindowResult>,
    pub summary: BacktestSummary,
}

impl BacktestReport {
    /// Flattened trade log across all windows, the durable artifact.
    pub fn all_trades(&self) -> impl Iterator<Item = &Trade> {
        self.windows.iter().flat_map(|w| w.trades.iter())
    }
}

/// Observer for backtest progress.
pub trait BacktestProgress {
    fn on_window_start(&self, spec: &WindowSpec, total: usize);
    fn on_threshold_tried(&self, threshold: f64, avg_return: f64, signals: usize);
    fn on_window_complete(&self, result: &WindowResult);
    fn on_complete(&self, summary: &BacktestSummary);
}

/// Progress reporter that prints to stdout.
pub struct StdoutBacktestProgress;

impl BacktestProgress for StdoutBacktestProgress {
    fn on_window_start(&self, spec: &WindowSpec, total: usize) {
        println!(
            "=== Window {}/{total}: train {} to {}, test {} to {} ===",
            spec.index + 1,
            spec.train_start,
            spec.train_end,
            spec.test_start,
            spec.test_end
        );
    }

    fn on_threshold_tried(&self, threshold: f64, avg_return: f64, signals: usize) {
        println!(
            "  threshold {threshold}: avg return {:.2}%, {signals} signals",
            avg_return * 100.0
        );
    }

    fn on_window_complete(&self, result: &WindowResult) {
        println!(
            "  chose {} → {} trades, win rate {:.1}%, avg return {:.2}%",
            result.best_threshold,
            result.stats.total_trades,
            result.stats.win_rate * 100.0,
            result.stats.avg_return * 100.0
        );
    }

    fn on_complete(&self, summary: &BacktestSummary) {
        println!();
        println!("Backtest summary");
        println!("  windows:          {}", summary.total_windows);
        println!("  trades:           {}", summary.total_trades);
        println!("  overall win rate: {:.1}%", summary.overall_win_rate * 100.0);
        println!("  total return:     {:.2}%", summary.total_return * 100.0);
        println!(
            "  avg return/trade: {:.2}%",
            summary.avg_return_per_trade * 100.0
        );
    }
}

/// No-op observer.
pub struct NullBacktestProgress;

impl BacktestProgress for NullBacktestProgress {
    fn on_window_start(&self, _: &WindowSpec, _: usize) {}
    fn on_threshold_tried(&self, _: f64, _: f64, _: usize) {}
    fn on_window_complete(&self, _: &WindowResult) {}
    fn on_complete(&self, _: &BacktestSummary) {}
}

/// Tile `[min_date, max_date]` into walk-forward windows.
///
/// Stops once train+test would pass `max_date`; a tail shorter than one
/// full window is left uncovered.
pub fn build_windows(
    min_date: NaiveDate,
    max_date: NaiveDate,
    cfg: &BacktestConfig,
) -> Vec<WindowSpec> {
    let train = chrono::Duration::days(cfg.train_window_days);
    let test = chrono::Duration::days(cfg.test_window_days);

    let mut windows = Vec::new();
    let mut current_start = min_date;
    while current_start + train + test <= max_date {
        let train_end = current_start + train;
        let test_end = train_end + test;
        windows.push(WindowSpec {
            index: windows.len(),
            train_start: current_start,
            train_end,
            test_start: train_end,
            test_end,
        });
        current_start = train_end;
    }
    windows
}

/// Signals on one series: every bar whose score meets the threshold, with
/// its realized return over the holding period.
fn signal_returns(
    series: &PriceSeries,
    scores: &[f64],
    threshold: f64,
    holding_period: usize,
) -> Vec<(usize, f64)> {
    let bars = series.bars();
    let n = bars.len();
    let mut out = Vec::new();
    for i in 0..n {
        if scores[i] >= threshold {
            let exit = (i + holding_period).min(n - 1);
            let entry_price = bars[i].close;
            if entry_price > 0.0 {
                let ret = (bars[exit].close - entry_price) / entry_price;
                out.push((i, ret));
            }
        }
    }
    out
}

/// Pick the threshold with the best average return per signal on the train
/// slices. The comparison is strictly-greater, so ties keep the first
/// (lowest) threshold tried. A threshold with no signals averages 0.
pub fn optimize_threshold(
    train: &BTreeMap<String, PriceSeries>,
    profile: &dyn ScoringProfile,
    cfg: &BacktestConfig,
    progress: &dyn BacktestProgress,
) -> f64 {
    let mut best: Option<(f64, f64)> = None;

    for &threshold in &cfg.thresholds {
        let mut total_return = 0.0;
        let mut num_signals = 0usize;

        for series in train.values() {
            let scores = profile.daily_scores(series);
            for (_, ret) in signal_returns(series, &scores, threshold, cfg.holding_period) {
                total_return += ret;
                num_signals += 1;
            }
        }

        let avg_return = total_return / num_signals.max(1) as f64;
        progress.on_threshold_tried(threshold, avg_return, num_signals);

        if best.map_or(true, |(_, score)| avg_return > score) {
            best = Some((threshold, avg_return));
        }
    }

    best.expect("thresholds validated non-empty").0
}

/// Apply a threshold to the test slices, recording every signal as a trade.
pub fn run_test_phase(
    test: &BTreeMap<String, PriceSeries>,
    profile: &dyn ScoringProfile,
    threshold: f64,
    window_index: usize,
    cfg: &BacktestConfig,
) -> Vec<Trade> {
    let mut trades = Vec::new();

    for (ticker, series) in test {
        let scores = profile.daily_scores(series);
        let bars = series.bars();
        for (entry, ret) in signal_returns(series, &scores, threshold, cfg.holding_period) {
            let exit = (entry + cfg.holding_period).min(bars.len() - 1);
            trades.push(Trade {
                ticker: ticker.clone(),
                entry_date: bars[entry].date,
                exit_date: bars[exit].date,
                entry_price: bars[entry].close,
                exit_price: bars[exit].close,
                entry_score: scores[entry],
                return_pct: ret,
                outcome: if ret > 0.0 { Outcome::Win } else { Outcome::Loss },
                window: window_index,
            });
        }
    }

    trades
}

fn win_rate_of<'a>(trades: impl Iterator<Item = &'a Trade>) -> (usize, f64) {
    let mut total = 0usize;
    let mut wins = 0usize;
    for trade in trades {
        total += 1;
        if trade.outcome == Outcome::Win {
            wins += 1;
        }
    }
    let rate = if total > 0 {
        wins as f64 / total as f64
    } else {
        0.0
    };
    (total, rate)
}

/// Compute per-window statistics including the score-tier breakdown.
pub fn window_stats(trades: &[Trade]) -> WindowStats {
    if trades.is_empty() {
        return WindowStats {
            total_trades: 0,
            win_rate: 0.0,
            avg_return: 0.0,
            total_return: 0.0,
            tier1_win_rate: 0.0,
            tier2_win_rate: 0.0,
        };
    }

    let total_return: f64 = trades.iter().map(|t| t.return_pct).sum();
    let (total, win_rate) = win_rate_of(trades.iter());
    let (_, tier1_win_rate) = win_rate_of(trades.iter().filter(|t| t.entry_score >= 80.0));
    let (_, tier2_win_rate) = win_rate_of(
        trades
            .iter()
            .filter(|t| t.entry_score >= 70.0 && t.entry_score < 80.0),
    );

    WindowStats {
        total_trades: total,
        win_rate,
        avg_return: total_return / total as f64,
        total_return,
        tier1_win_rate,
        tier2_win_rate,
    }
}

/// Aggregate window results: trade-weighted win rate, summed returns.
pub fn aggregate(windows: &[WindowResult]) -> BacktestSummary {
    let total_trades: usize = windows.iter().map(|w| w.stats.total_trades).sum();
    let weighted_wins: f64 = windows
        .iter()
        .map(|w| w.stats.total_trades as f64 * w.stats.win_rate)
        .sum();
    let total_return: f64 = windows.iter().map(|w| w.stats.total_return).sum();

    BacktestSummary {
        total_windows: windows.len(),
        total_trades,
        overall_win_rate: if total_trades > 0 {
            weighted_wins / total_trades as f64
        } else {
            0.0
        },
        total_return,
        avg_return_per_trade: if total_trades > 0 {
            total_return / total_trades as f64
        } else {
            0.0
        },
    }
}

/// Run the full walk-forward backtest over a multi-ticker dataset.
pub fn run_walk_forward(
    dataset: &BTreeMap<String, PriceSeries>,
    profile: &dyn ScoringProfile,
    cfg: &BacktestConfig,
    progress: &dyn BacktestProgress,
) -> Result<BacktestReport, BacktestError> {
    let min_date = dataset
        .values()
        .filter_map(|s| s.first_date())
        .min()
        .ok_or(BacktestError::EmptyDataset)?;
    let max_date = dataset
        .values()
        .filter_map(|s| s.last_date())
        .max()
        .ok_or(BacktestError::EmptyDataset)?;

    let windows = build_windows(min_date, max_date, cfg);
    let total_windows = windows.len();
    let mut results = Vec::with_capacity(total_windows);

    for spec in windows {
        progress.on_window_start(&spec, total_windows);

        let mut train = BTreeMap::new();
        let mut test = BTreeMap::new();
        for (ticker, series) in dataset {
            let train_slice = series.slice_dates(spec.train_start, spec.train_end);
            if !train_slice.is_empty() {
                train.insert(ticker.clone(), train_slice);
            }
            let test_slice = series.slice_dates(spec.test_start, spec.test_end);
            if !test_slice.is_empty() {
                test.insert(ticker.clone(), test_slice);
            }
        }

        let best_threshold = optimize_threshold(&train, profile, cfg, progress);
        let trades = run_test_phase(&test, profile, best_threshold, spec.index, cfg);
        let stats = window_stats(&trades);

        let result = WindowResult {
            spec,
            best_threshold,
            stats,
            trades,
        };
        progress.on_window_complete(&result);
        results.push(result);
    }

    let summary = aggregate(&results);
    progress.on_complete(&summary);

    Ok(BacktestReport {
        windows: results,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn windows_tile_contiguously() {
        let cfg = BacktestConfig::default();
        let windows = build_windows(date(2020, 1, 1), date(2023, 1, 1), &cfg);
        assert!(!windows.is_empty());

        for w in &windows {
            assert_eq!(w.test_start, w.train_end);
            assert_eq!(w.train_end - w.train_start, chrono::Duration::days(252));
            assert_eq!(w.test_end - w.test_start, chrono::Duration::days(63));
            assert!(w.test_end <= date(2023, 1, 1));
        }
        for pair in windows.windows(2) {
            assert_eq!(pair[1].train_start, pair[0].train_end);
            assert_eq!(pair[1].test_start, pair[0].test_end);
        }
    }

    #[test]
    fn windows_stop_before_max_date() {
        let cfg = BacktestConfig::default();
        // Exactly one window fits in 315 days; 314 fits none
        let windows = build_windows(date(2020, 1, 1), date(2020, 1, 1) + chrono::Duration::days(315), &cfg);
        assert_eq!(windows.len(), 1);
        let windows = build_windows(date(2020, 1, 1), date(2020, 1, 1) + chrono::Duration::days(314), &cfg);
        assert!(windows.is_empty());
    }

    #[test]
    fn window_stats_empty() {
        let stats = window_stats(&[]);
        assert_eq!(stats.total_trades, 0);
        assert_eq!(stats.win_rate, 0.0);
        assert_eq!(stats.avg_return, 0.0);
    }

    fn trade(score: f64, ret: f64) -> Trade {
        Trade {
            ticker: "T".into(),
            entry_date: date(2021, 1, 4),
            exit_date: date(2021, 2, 4),
            entry_price: 100.0,
            exit_price: 100.0 * (1.0 + ret),
            entry_score: score,
            return_pct: ret,
            outcome: if ret > 0.0 { Outcome::Win } else { Outcome::Loss },
            window: 0,
        }
    }

    #[test]
    fn window_stats_tier_breakdown() {
        let trades = vec![
            trade(85.0, 0.10),  // tier1 win
            trade(82.0, -0.05), // tier1 loss
            trade(75.0, 0.02),  // tier2 win
            trade(60.0, -0.01), // neither bucket
        ];
        let stats = window_stats(&trades);
        assert_eq!(stats.total_trades, 4);
        assert!((stats.win_rate - 0.5).abs() < 1e-12);
        assert!((stats.tier1_win_rate - 0.5).abs() < 1e-12);
        assert!((stats.tier2_win_rate - 1.0).abs() < 1e-12);
        assert!((stats.total_return - 0.06).abs() < 1e-12);
    }

    #[test]
    fn zero_return_is_a_loss() {
        let t = trade(70.0, 0.0);
        assert_eq!(t.outcome, Outcome::Loss);
    }

    #[test]
    fn aggregate_weights_win_rate_by_trades() {
        let mk = |n: usize, wins: usize, total_return: f64| WindowResult {
            spec: WindowSpec {
                index: 0,
                train_start: date(2020, 1, 1),
                train_end: date(2020, 9, 9),
                test_start: date(2020, 9, 9),
                test_end: date(2020, 11, 11),
            },
            best_threshold: 70.0,
            stats: WindowStats {
                total_trades: n,
                win_rate: wins as f64 / n as f64,
                avg_return: total_return / n as f64,
                total_return,
                tier1_win_rate: 0.0,
                tier2_win_rate: 0.0,
            },
            trades: vec![],
        };

        let windows = vec![mk(10, 6, 0.5), mk(30, 12, -0.3)];
        let summary = aggregate(&windows);
        assert_eq!(summary.total_trades, 40);
        // (10*0.6 + 30*0.4) / 40 = 0.45
        assert!((summary.overall_win_rate - 0.45).abs() < 1e-12);
        assert!((summary.total_return - 0.2).abs() < 1e-12);
        assert!((summary.avg_return_per_trade - 0.005).abs() < 1e-12);
    }

    #[test]
    fn aggregate_empty_is_zeroes() {
        let summary = aggregate(&[]);
        assert_eq!(summary.total_trades, 0);
        assert_eq!(summary.overall_win_rate, 0.0);
        assert_eq!(summary.avg_return_per_trade, 0.0);
    }

    #[test]
    fn empty_dataset_errors() {
        let dataset = BTreeMap::new();
        let cfg = BacktestConfig::default();
        let result = run_walk_forward(
            &dataset,
            &SimplifiedProfile::default(),
            &cfg,
            &NullBacktestProgress,
        );
        assert!(matches!(result, Err(BacktestError::EmptyDataset)));
    }
}
