//! Uptrend Runner — scan orchestration, walk-forward backtester, exports.
//!
//! This crate builds on `uptrend-core` to provide:
//! - The per-ticker scan pipeline with skip accounting and progress
//!   observers (no process-wide logging state)
//! - The walk-forward backtester with its simplified per-day scoring
//!   profile and threshold optimization
//! - TOML run configuration with content-addressed run ids
//! - CSV/JSON artifact export (scan tables, the backtest trade log)

pub mod backtest;
pub mod config;
pub mod export;
pub mod scanner;

pub use backtest::{
    aggregate, build_windows, optimize_threshold, run_test_phase, run_walk_forward,
    BacktestError, BacktestProgress, BacktestReport, BacktestSummary, NullBacktestProgress,
    Outcome, ScoringProfile, SimplifiedProfile, StdoutBacktestProgress, Trade, WindowResult,
    WindowSpec, WindowStats,
};
pub use config::{run_id, BacktestConfig, RunConfigError, RunId, ScanConfig};
pub use export::{
    export_scan_csv, export_trades_csv, save_backtest_artifacts, save_scan_artifacts,
};
pub use scanner::{
    scan_many, scan_ticker, NullScanProgress, ScanOutcome, ScanProgress, ScanRecord,
    SkipReason, SkippedTicker, StdoutScanProgress,
};
