//! Data provider trait and structured error types.
//!
//! The trait abstracts over data sources (Polygon aggregates, synthetic
//! bars) so the scan and backtest pipelines can swap implementations and
//! tests can run offline. A provider call is an opaque, potentially slow,
//! blocking operation; callers tolerate arbitrary per-ticker latency and
//! treat any error as "skip this ticker", never as a fatal condition.

use crate::domain::PriceSeries;
use thiserror::Error;

/// Structured errors from data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no data returned for {symbol}")]
    NoData { symbol: String },

    #[error("insufficient history for {symbol}: {got} bars, need {need}")]
    InsufficientHistory {
        symbol: String,
        got: usize,
        need: usize,
    },

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("network error: {0}")]
    Network(String),

    #[error("response format changed: {0}")]
    ResponseFormat(String),

    #[error("authentication failed: {0}")]
    Auth(String),
}

/// Trait for daily-bar data sources.
///
/// Contract: bars come back strictly ascending by date with no duplicates
/// (enforced by `PriceSeries` construction inside every implementation);
/// an empty result is an explicit error, never a silent empty series.
pub trait DataProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch roughly `days` calendar days of daily bars for `symbol`.
    fn fetch_daily(&self, symbol: &str, days: u32) -> Result<PriceSeries, DataError>;
}
