//! PriceSeries — an ordered, validated sequence of daily bars.

use super::Bar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors raised when constructing a series.
#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("bars out of order at index {index}: {prev} followed by {next}")]
    OutOfOrder {
        index: usize,
        prev: NaiveDate,
        next: NaiveDate,
    },
    #[error("duplicate date at index {index}: {date}")]
    DuplicateDate { index: usize, date: NaiveDate },
}

/// Ordered sequence of daily bars for one symbol.
///
/// Invariant: dates are strictly ascending with no duplicates, enforced at
/// construction. A series is exclusively owned by the pipeline invocation
/// that fetched it; derived indicator columns are separate allocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Build a series, validating date ordering.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        for i in 1..bars.len() {
            let prev = bars[i - 1].date;
            let next = bars[i].date;
            if next == prev {
                return Err(SeriesError::DuplicateDate {
                    index: i,
                    date: next,
                });
            }
            if next < prev {
                return Err(SeriesError::OutOfOrder {
                    index: i,
                    prev,
                    next,
                });
            }
        }
        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Close column as a fresh vector.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// High column as a fresh vector.
    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    /// Low column as a fresh vector.
    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    /// Volume column as f64 for rolling arithmetic.
    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume as f64).collect()
    }

    /// Sub-series of bars with `start <= date < end`.
    ///
    /// Validation is inherited: a slice of an ordered series is ordered.
    pub fn slice_dates(&self, start: NaiveDate, end: NaiveDate) -> PriceSeries {
        let bars = self
            .bars
            .iter()
            .filter(|b| b.date >= start && b.date < end)
            .cloned()
            .collect();
        PriceSeries {
            symbol: self.symbol.clone(),
            bars,
        }
    }

    /// The trailing `n` bars (all bars when the series is shorter).
    pub fn tail(&self, n: usize) -> &[Bar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }
}
