//! Scan pipeline: fetch → indicators → classify → score, one ticker per
//! call stack, with per-ticker skip accounting.
//!
//! A single ticker's failure never aborts a scan. Every skip is reported
//! to the progress observer with its reason, so partial results stay
//! attributable.

use crate::config::ScanConfig;
use serde::{Deserialize, Serialize};
use uptrend_core::classify::{
    classify_early, classify_established, EarlyDetail, EstablishedDetail, MIN_ESTABLISHED_BARS,
};
use uptrend_core::data::{DataError, DataProvider};
use uptrend_core::domain::PriceSeries;
use uptrend_core::indicators::IndicatorFrame;
use uptrend_core::quality::smoothed_derivatives;
use uptrend_core::scoring::{adjust_tier_for_volatility, compute_score, ScoreBreakdown, Tier};

/// Sigma for the smoothed price/velocity/acceleration snapshot overlay.
const DERIVATIVE_SIGMA: f64 = 3.0;

/// Per-ticker result record exposed to export and chart consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    pub ticker: String,
    pub price: f64,

    // Moving averages
    pub ma20: f64,
    pub ma50: f64,
    pub ma200: f64,

    // Momentum
    pub rsi: f64,
    pub adx: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,

    // Bollinger Bands
    pub bb_upper: f64,
    pub bb_middle: f64,
    pub bb_lower: f64,

    // Smoothed price and derivatives
    pub smoothed_price: f64,
    pub velocity: f64,
    pub acceleration: f64,

    // Price relative to MAs (%)
    pub pct_from_ma20: f64,
    pub pct_from_ma50: f64,
    pub pct_from_ma200: f64,

    // Volume
    pub volume: u64,
    pub avg_volume_50: f64,

    // Volatility
    pub volatility_20: f64,
    pub volatility_50: f64,

    // Classification
    pub is_early_uptrend: bool,
    pub early: EarlyDetail,
    pub is_established_uptrend: bool,
    pub established: EstablishedDetail,

    // Scoring
    pub score: f64,
    /// Final tier, after the volatility modifier stage when enabled.
    pub tier: Tier,
    pub breakdown: ScoreBreakdown,
}

/// Why a ticker produced no record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SkipReason {
    /// The source returned nothing, or fewer bars than evaluation needs.
    NoData(String),
    /// The data layer failed (network, auth, format). Logged and skipped.
    Collaborator(String),
}

impl SkipReason {
    fn from_error(err: &DataError) -> Self {
        match err {
            DataError::NoData { .. }
            | DataError::SymbolNotFound { .. }
            | DataError::InsufficientHistory { .. } => SkipReason::NoData(err.to_string()),
            _ => SkipReason::Collaborator(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedTicker {
    pub ticker: String,
    pub reason: SkipReason,
}

/// Scan results: every scored record, sorted by score descending, plus the
/// skip ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub records: Vec<ScanRecord>,
    pub skipped: Vec<SkippedTicker>,
    /// Records dropped by market filters (price floor, volatility caps).
    pub filtered_out: usize,
}

impl ScanOutcome {
    pub fn early_uptrends(&self) -> impl Iterator<Item = &ScanRecord> {
        self.records.iter().filter(|r| r.is_early_uptrend)
    }

    pub fn established_uptrends(&self) -> impl Iterator<Item = &ScanRecord> {
        self.records.iter().filter(|r| r.is_established_uptrend)
    }

    pub fn skipped_no_data(&self) -> usize {
        self.skipped
            .iter()
            .filter(|s| matches!(s.reason, SkipReason::NoData(_)))
            .count()
    }

    pub fn skipped_collaborator(&self) -> usize {
        self.skipped.len() - self.skipped_no_data()
    }
}

/// Observer for scan progress. Replaces any process-wide logger: the
/// context object is handed into each invocation explicitly.
pub trait ScanProgress {
    fn on_start(&self, ticker: &str, index: usize, total: usize);
    fn on_scanned(&self, ticker: &str, record: &ScanRecord);
    fn on_skipped(&self, ticker: &str, reason: &SkipReason);
    fn on_filtered(&self, ticker: &str, why: &str);
    fn on_complete(&self, scanned: usize, skipped: usize, filtered: usize);
}

/// Progress reporter that prints to stdout.
pub struct StdoutScanProgress;

impl ScanProgress for StdoutScanProgress {
    fn on_start(&self, ticker: &str, index: usize, total: usize) {
        println!("[{}/{}] Scanning {ticker}", index + 1, total);
    }

    fn on_scanned(&self, ticker: &str, record: &ScanRecord) {
        println!(
            "  {ticker}: score {:.0} ({}){}{}",
            record.score,
            record.tier,
            if record.is_early_uptrend { " [early]" } else { "" },
            if record.is_established_uptrend {
                " [established]"
            } else {
                ""
            },
        );
    }

    fn on_skipped(&self, ticker: &str, reason: &SkipReason) {
        match reason {
            SkipReason::NoData(msg) => println!("  SKIP {ticker}: {msg}"),
            SkipReason::Collaborator(msg) => println!("  FAIL {ticker}: {msg}"),
        }
    }

    fn on_filtered(&self, ticker: &str, why: &str) {
        println!("  FILTER {ticker}: {why}");
    }

    fn on_complete(&self, scanned: usize, skipped: usize, filtered: usize) {
        println!("\nScan complete: {scanned} scored, {skipped} skipped, {filtered} filtered");
    }
}

/// No-op observer.
pub struct NullScanProgress;

impl ScanProgress for NullScanProgress {
    fn on_start(&self, _: &str, _: usize, _: usize) {}
    fn on_scanned(&self, _: &str, _: &ScanRecord) {}
    fn on_skipped(&self, _: &str, _: &SkipReason) {}
    fn on_filtered(&self, _: &str, _: &str) {}
    fn on_complete(&self, _: usize, _: usize, _: usize) {}
}

/// Scan a single ticker into a full record.
///
/// Requires 200 bars (the established classifier's window); shorter
/// histories surface as `InsufficientHistory` and become a NoData skip.
pub fn scan_ticker(
    provider: &dyn DataProvider,
    ticker: &str,
    cfg: &ScanConfig,
) -> Result<ScanRecord, DataError> {
    let series = provider.fetch_daily(ticker, cfg.history_days)?;
    if series.len() < MIN_ESTABLISHED_BARS {
        return Err(DataError::InsufficientHistory {
            symbol: ticker.to_string(),
            got: series.len(),
            need: MIN_ESTABLISHED_BARS,
        });
    }

    let frame = IndicatorFrame::compute(&series);
    Ok(build_record(ticker, &series, &frame, cfg))
}

fn build_record(
    ticker: &str,
    series: &PriceSeries,
    frame: &IndicatorFrame,
    cfg: &ScanConfig,
) -> ScanRecord {
    let n = series.len();
    let last = n - 1;
    let bars = series.bars();
    let close = bars[last].close;

    let (is_early, early) = classify_early(series, frame, &cfg.classifier);
    let (is_established, established) = classify_established(series, frame, &cfg.classifier);

    let breakdown = compute_score(series, frame, &cfg.scoring);
    let score = breakdown.total;

    // Volatility tier modifier: a separate stage after score-based
    // assignment, enabled by construction-time config only.
    let tier = if cfg.scoring.volatility_tier_modifier {
        adjust_tier_for_volatility(
            breakdown.tier,
            frame.volatility_20[last],
            &cfg.scoring.volatility_thresholds,
        )
    } else {
        breakdown.tier
    };

    let derivatives = smoothed_derivatives(&series.closes(), DERIVATIVE_SIGMA);

    let tail_volumes = series.tail(50);
    let avg_volume_50 = tail_volumes
        .iter()
        .map(|b| b.volume as f64)
        .sum::<f64>()
        / tail_volumes.len() as f64;

    let pct_from = |ma: f64| if ma > 0.0 { (close - ma) / ma * 100.0 } else { 0.0 };

    ScanRecord {
        ticker: ticker.to_string(),
        price: close,
        ma20: frame.ma20[last],
        ma50: frame.ma50[last],
        ma200: frame.ma200[last],
        rsi: frame.rsi[last],
        adx: frame.adx[last],
        macd: frame.macd[last],
        macd_signal: frame.macd_signal[last],
        macd_histogram: frame.macd_histogram[last],
        bb_upper: frame.bb_upper[last],
        bb_middle: frame.bb_middle[last],
        bb_lower: frame.bb_lower[last],
        smoothed_price: derivatives.smoothed[last],
        velocity: derivatives.velocity[last],
        acceleration: derivatives.acceleration[last],
        pct_from_ma20: pct_from(frame.ma20[last]),
        pct_from_ma50: pct_from(frame.ma50[last]),
        pct_from_ma200: pct_from(frame.ma200[last]),
        volume: bars[last].volume,
        avg_volume_50,
        volatility_20: frame.volatility_20[last],
        volatility_50: frame.volatility_50[last],
        is_early_uptrend: is_early,
        early,
        is_established_uptrend: is_established,
        established,
        score,
        tier,
        breakdown,
    }
}

/// Hard volatility caps per tier (scan filter stage, disabled by default).
fn passes_volatility_filters(record: &ScanRecord, cfg: &ScanConfig) -> bool {
    let filters = &cfg.volatility_filters;
    if !filters.enabled {
        return true;
    }
    match record.tier {
        Tier::Tier1 => !(record.volatility_20 > filters.max_for_tier1),
        Tier::Tier2 => !(record.volatility_20 > filters.max_for_tier2),
        _ => true,
    }
}

/// Scan a list of tickers sequentially.
///
/// Errors from the data layer are caught per ticker and recorded; the scan
/// always runs to completion. Results are sorted by score, best first.
pub fn scan_many(
    provider: &dyn DataProvider,
    tickers: &[String],
    cfg: &ScanConfig,
    progress: &dyn ScanProgress,
) -> ScanOutcome {
    let universe: &[String] = match cfg.max_stocks {
        Some(max) if tickers.len() > max => &tickers[..max],
        _ => tickers,
    };

    let mut records = Vec::new();
    let mut skipped = Vec::new();
    let mut filtered_out = 0usize;

    for (index, ticker) in universe.iter().enumerate() {
        progress.on_start(ticker, index, universe.len());

        let record = match scan_ticker(provider, ticker, cfg) {
            Ok(record) => record,
            Err(err) => {
                let reason = SkipReason::from_error(&err);
                progress.on_skipped(ticker, &reason);
                skipped.push(SkippedTicker {
                    ticker: ticker.clone(),
                    reason,
                });
                continue;
            }
        };

        if record.price < cfg.min_price {
            progress.on_filtered(ticker, "below minimum price");
            filtered_out += 1;
            continue;
        }
        if !passes_volatility_filters(&record, cfg) {
            progress.on_filtered(ticker, "over tier volatility cap");
            filtered_out += 1;
            continue;
        }

        progress.on_scanned(ticker, &record);
        records.push(record);
    }

    // Best first
    records.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    progress.on_complete(records.len(), skipped.len(), filtered_out);

    ScanOutcome {
        records,
        skipped,
        filtered_out,
    }
}
