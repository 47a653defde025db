//! Synthetic data provider — deterministic random-walk bars.
//!
//! Used by tests and offline runs. Each symbol seeds its own RNG, so the
//! same symbol always produces the same series regardless of fetch order.
//! Bars land on weekdays ending at a fixed anchor date.

use super::provider::{DataError, DataProvider};
use crate::domain::{Bar, PriceSeries};
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Anchor for generated histories; keeps runs reproducible.
const ANCHOR: (i32, u32, u32) = (2024, 12, 31);

pub struct SyntheticProvider {
    /// Annualized drift applied to the walk, e.g. 0.15 for a mild uptrend.
    drift: f64,
    /// Daily volatility of the walk, e.g. 0.02.
    daily_vol: f64,
}

impl SyntheticProvider {
    pub fn new() -> Self {
        Self {
            drift: 0.15,
            daily_vol: 0.02,
        }
    }

    pub fn with_drift(mut self, drift: f64) -> Self {
        self.drift = drift;
        self
    }

    pub fn with_daily_vol(mut self, daily_vol: f64) -> Self {
        self.daily_vol = daily_vol;
        self
    }

    fn seed_for(symbol: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        symbol.hash(&mut hasher);
        hasher.finish()
    }
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch_daily(&self, symbol: &str, days: u32) -> Result<PriceSeries, DataError> {
        let (y, m, d) = ANCHOR;
        let end = NaiveDate::from_ymd_opt(y, m, d).expect("valid anchor date");
        let start = end - chrono::Duration::days(days as i64);

        let mut rng = StdRng::seed_from_u64(Self::seed_for(symbol));
        let mut price = 50.0 + rng.gen_range(0.0..100.0);
        let daily_drift = self.drift / 252.0;

        let mut bars = Vec::new();
        let mut date = start;
        while date <= end {
            if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                let shock: f64 = rng.gen_range(-1.0..1.0) * self.daily_vol;
                let open = price;
                price *= 1.0 + daily_drift + shock;
                let close = price;
                let spread = price * rng.gen_range(0.001..0.01);
                let high = open.max(close) + spread;
                let low = (open.min(close) - spread).max(0.01);
                let volume = rng.gen_range(500_000..5_000_000);
                bars.push(Bar {
                    date,
                    open,
                    high,
                    low,
                    close,
                    volume,
                });
            }
            date += chrono::Duration::days(1);
        }

        if bars.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
            });
        }

        PriceSeries::new(symbol, bars)
            .map_err(|e| DataError::ResponseFormat(format!("{symbol}: {e}")))
    }
}
