//! Artifact export — CSV and JSON outputs for scans and backtests.
//!
//! The backtest trade log is the durable output of a backtest run: one row
//! per trade. Scan exports flatten each record into a single row, with one
//! file per audience (all scanned, early uptrends, established uptrends).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::backtest::{BacktestReport, Outcome, Trade};
use crate::scanner::{ScanOutcome, ScanRecord};

// ─── Trade log ──────────────────────────────────────────────────────

/// Export the trade log as CSV.
///
/// Columns: ticker, entry_date, exit_date, entry_price, exit_price,
/// entry_score, return, outcome, window
pub fn export_trades_csv<'a>(trades: impl Iterator<Item = &'a Trade>) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "ticker",
        "entry_date",
        "exit_date",
        "entry_price",
        "exit_price",
        "entry_score",
        "return",
        "outcome",
        "window",
    ])?;

    for t in trades {
        wtr.write_record([
            t.ticker.as_str(),
            &t.entry_date.to_string(),
            &t.exit_date.to_string(),
            &format!("{:.4}", t.entry_price),
            &format!("{:.4}", t.exit_price),
            &format!("{:.1}", t.entry_score),
            &format!("{:.6}", t.return_pct),
            match t.outcome {
                Outcome::Win => "win",
                Outcome::Loss => "loss",
            },
            &t.window.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Scan records ───────────────────────────────────────────────────

/// Flatten scan records into CSV rows with the breakdown and early-detail
/// columns consumers expect.
pub fn export_scan_csv<'a>(records: impl Iterator<Item = &'a ScanRecord>) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "ticker",
        "score",
        "tier",
        "current_price",
        "volatility_20",
        "volatility_50",
        "is_early_uptrend",
        "is_established_uptrend",
        "trend_strength",
        "momentum_quality",
        "volume_profile",
        "price_structure",
        "risk_reward",
        "trend_quality",
        "choppiness_index",
        "efficiency_ratio",
        "early_score",
        "ma20_cross_recent",
        "volume_spike",
        "rsi_healthy",
        "rsi",
        "adx_rising",
        "adx",
        "macd_cross_recent",
        "breakout",
        "days_in_uptrend",
    ])?;

    for r in records {
        wtr.write_record([
            r.ticker.as_str(),
            &format!("{:.1}", r.score),
            r.tier.label(),
            &format!("{:.4}", r.price),
            &format!("{:.2}", r.volatility_20),
            &format!("{:.2}", r.volatility_50),
            &r.is_early_uptrend.to_string(),
            &r.is_established_uptrend.to_string(),
            &format!("{:.1}", r.breakdown.trend_strength),
            &format!("{:.1}", r.breakdown.momentum_quality),
            &format!("{:.1}", r.breakdown.volume_profile),
            &format!("{:.1}", r.breakdown.price_structure),
            &format!("{:.1}", r.breakdown.risk_reward),
            &format!("{:.1}", r.breakdown.trend_quality),
            &format!("{:.1}", r.breakdown.details.trend_quality.choppiness_index),
            &format!("{:.3}", r.breakdown.details.trend_quality.efficiency_ratio),
            &r.early.score.to_string(),
            &r.early.ma20_cross_recent.to_string(),
            &r.early.volume_spike.to_string(),
            &r.early.rsi_healthy.to_string(),
            &format!("{:.1}", r.early.rsi),
            &r.early.adx_rising.to_string(),
            &format!("{:.1}", r.early.adx),
            &r.early.macd_cross_recent.to_string(),
            &r.early.breakout.to_string(),
            &r.established.days_in_uptrend.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundles ───────────────────────────────────────────────

/// Save the scan artifact set under `out_dir/scan_{run_id}/`:
/// `all_scanned.csv`, `early_uptrends.csv`, `established_uptrends.csv`,
/// and `summary.json` (full records plus the skip ledger).
pub fn save_scan_artifacts(
    outcome: &ScanOutcome,
    out_dir: &Path,
    run_id: &str,
) -> Result<PathBuf> {
    let run_dir = out_dir.join(format!("scan_{run_id}"));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create {}", run_dir.display()))?;

    let all = export_scan_csv(outcome.records.iter())?;
    std::fs::write(run_dir.join("all_scanned.csv"), all)?;

    let early = export_scan_csv(outcome.early_uptrends())?;
    std::fs::write(run_dir.join("early_uptrends.csv"), early)?;

    let established = export_scan_csv(outcome.established_uptrends())?;
    std::fs::write(run_dir.join("established_uptrends.csv"), established)?;

    let summary =
        serde_json::to_string_pretty(outcome).context("failed to serialize scan outcome")?;
    std::fs::write(run_dir.join("summary.json"), summary)?;

    Ok(run_dir)
}

/// Save the backtest artifact set under `out_dir/backtest_{run_id}/`:
/// `trades.csv` (the durable trade log) and `summary.json`.
pub fn save_backtest_artifacts(
    report: &BacktestReport,
    out_dir: &Path,
    run_id: &str,
) -> Result<PathBuf> {
    let run_dir = out_dir.join(format!("backtest_{run_id}"));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create {}", run_dir.display()))?;

    let trades = export_trades_csv(report.all_trades())?;
    std::fs::write(run_dir.join("trades.csv"), trades)?;

    let summary =
        serde_json::to_string_pretty(report).context("failed to serialize backtest report")?;
    std::fs::write(run_dir.join("summary.json"), summary)?;

    Ok(run_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backtest::{BacktestSummary, Trade, WindowResult, WindowSpec, WindowStats};
    use chrono::NaiveDate;

    fn sample_trade() -> Trade {
        Trade {
            ticker: "AAPL".into(),
            entry_date: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
            exit_date: NaiveDate::from_ymd_opt(2021, 3, 30).unwrap(),
            entry_price: 120.5,
            exit_price: 131.25,
            entry_score: 85.0,
            return_pct: (131.25 - 120.5) / 120.5,
            outcome: Outcome::Win,
            window: 2,
        }
    }

    #[test]
    fn trades_csv_has_header_and_rows() {
        let trades = vec![sample_trade()];
        let csv = export_trades_csv(trades.iter()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "ticker,entry_date,exit_date,entry_price,exit_price,entry_score,return,outcome,window"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("AAPL,2021-03-01,2021-03-30,120.5000,131.2500,85.0,"));
        assert!(row.ends_with("win,2"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn trades_csv_loss_outcome() {
        let mut t = sample_trade();
        t.return_pct = -0.02;
        t.outcome = Outcome::Loss;
        let trades = vec![t];
        let csv = export_trades_csv(trades.iter()).unwrap();
        assert!(csv.contains(",loss,"));
    }

    #[test]
    fn backtest_artifacts_round_trip() {
        let report = BacktestReport {
            windows: vec![WindowResult {
                spec: WindowSpec {
                    index: 0,
                    train_start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                    train_end: NaiveDate::from_ymd_opt(2020, 9, 9).unwrap(),
                    test_start: NaiveDate::from_ymd_opt(2020, 9, 9).unwrap(),
                    test_end: NaiveDate::from_ymd_opt(2020, 11, 11).unwrap(),
                },
                best_threshold: 70.0,
                stats: WindowStats {
                    total_trades: 1,
                    win_rate: 1.0,
                    avg_return: 0.09,
                    total_return: 0.09,
                    tier1_win_rate: 1.0,
                    tier2_win_rate: 0.0,
                },
                trades: vec![sample_trade()],
            }],
            summary: BacktestSummary {
                total_windows: 1,
                total_trades: 1,
                overall_win_rate: 1.0,
                total_return: 0.09,
                avg_return_per_trade: 0.09,
            },
        };

        let dir = tempfile::tempdir().unwrap();
        let run_dir = save_backtest_artifacts(&report, dir.path(), "testrun").unwrap();
        assert!(run_dir.join("trades.csv").exists());
        assert!(run_dir.join("summary.json").exists());

        let summary: BacktestReport = serde_json::from_str(
            &std::fs::read_to_string(run_dir.join("summary.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(summary.summary.total_trades, 1);
        assert_eq!(summary.windows[0].trades[0].ticker, "AAPL");
    }
}
