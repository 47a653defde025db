//! Indicator derivation — pure functions from price columns to value columns.
//!
//! Every function takes an immutable input slice and returns a fresh
//! `Vec<f64>` of the same length. Entries before an indicator's warmup
//! length are `f64::NAN`; a NaN is "criterion not met" for every consumer,
//! never zero. Columns are assembled once per series into an
//! [`IndicatorFrame`](frame::IndicatorFrame) before any classification or
//! scoring runs.
//!
//! Rolling windows follow the same convention throughout: a window that
//! contains any NaN yields NaN, and the first valid output sits at index
//! `window - 1` of the first fully-populated window.

pub mod adx;
pub mod bollinger;
pub mod ema;
pub mod frame;
pub mod macd;
pub mod rsi;
pub mod volatility;

pub use adx::{adx, true_range};
pub use bollinger::{bollinger, BollingerBands};
pub use ema::ema_of_series;
pub use frame::IndicatorFrame;
pub use macd::{macd, MacdOutput};
pub use rsi::rsi;
pub use volatility::annualized_volatility;

/// Rolling mean over `window` values.
///
/// NaN inside the window poisons that output position only; the window
/// keeps rolling and recovers once the NaN leaves it.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if window == 0 || n < window {
        return out;
    }

    let mut sum = 0.0;
    let mut nan_in_window = 0usize;
    for i in 0..n {
        let entering = values[i];
        if entering.is_nan() {
            nan_in_window += 1;
        } else {
            sum += entering;
        }
        if i >= window {
            let leaving = values[i - window];
            if leaving.is_nan() {
                nan_in_window -= 1;
            } else {
                sum -= leaving;
            }
        }
        if i + 1 >= window && nan_in_window == 0 {
            out[i] = sum / window as f64;
        }
    }
    out
}

/// Rolling sample standard deviation (ddof = 1) over `window` values.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if window < 2 || n < window {
        return out;
    }

    for i in (window - 1)..n {
        let slice = &values[i + 1 - window..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mean = slice.iter().sum::<f64>() / window as f64;
        let var = slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (window - 1) as f64;
        out[i] = var.sqrt();
    }
    out
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            let high = open.max(close) + 1.0;
            let low = open.min(close) - 1.0;
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high,
                low,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
