//! RSI — Relative Strength Index over rolling mean gains/losses.
//!
//! Gains and losses are rolling means (not Wilder smoothing): the average
//! of positive close deltas divided by the average negative-delta magnitude.
//! RSI = 100 - 100/(1 + gain/loss).
//!
//! When the loss average is exactly zero the ratio is undefined and the
//! output is NaN. Consumers treat NaN as "not healthy" (range checks fail
//! conservatively); this must never panic.

use crate::indicators::rolling_mean;

/// Compute RSI over close prices.
pub fn rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let n = closes.len();
    let mut gains = vec![0.0; n];
    let mut losses = vec![0.0; n];

    // Index 0 has no delta and contributes zero to the first window.
    for i in 1..n {
        let delta = closes[i] - closes[i - 1];
        if delta.is_nan() {
            gains[i] = f64::NAN;
            losses[i] = f64::NAN;
        } else if delta > 0.0 {
            gains[i] = delta;
        } else if delta < 0.0 {
            losses[i] = -delta;
        }
    }

    let avg_gain = rolling_mean(&gains, period);
    let avg_loss = rolling_mean(&losses, period);

    let mut out = vec![f64::NAN; n];
    for i in 0..n {
        let g = avg_gain[i];
        let l = avg_loss[i];
        if g.is_nan() || l.is_nan() || l == 0.0 {
            continue;
        }
        let rs = g / l;
        out[i] = 100.0 - 100.0 / (1.0 + rs);
    }
    out
}
