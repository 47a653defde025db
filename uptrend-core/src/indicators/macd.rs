//! MACD — Moving Average Convergence Divergence.
//!
//! macd = EMA(close, fast) - EMA(close, slow)
//! signal = EMA(macd, signal_span)
//! histogram = macd - signal

use crate::indicators::ema_of_series;

/// The MACD line, its signal line, and their difference.
#[derive(Debug, Clone)]
pub struct MacdOutput {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Compute MACD(fast, slow, signal_span) over close prices.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal_span: usize) -> MacdOutput {
    let n = closes.len();
    let ema_fast = ema_of_series(closes, fast);
    let ema_slow = ema_of_series(closes, slow);

    let mut macd_line = vec![f64::NAN; n];
    for i in 0..n {
        if !ema_fast[i].is_nan() && !ema_slow[i].is_nan() {
            macd_line[i] = ema_fast[i] - ema_slow[i];
        }
    }

    let signal = ema_of_series(&macd_line, signal_span);

    let mut histogram = vec![f64::NAN; n];
    for i in 0..n {
        if !macd_line[i].is_nan() && !signal[i].is_nan() {
            histogram[i] = macd_line[i] - signal[i];
        }
    }

    MacdOutput {
        macd: macd_line,
        signal,
        histogram,
    }
}
