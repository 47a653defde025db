//! ADX — trend strength from directional movement, rolling-mean variant.
//!
//! Steps:
//! 1. True range per bar (first bar: high - low, no prior close)
//! 2. +DM / -DM keep only the dominant, positive move per bar
//! 3. 14-bar rolling means of TR, +DM, -DM
//! 4. +DI = 100 * mean(+DM) / mean(TR), same for -DI
//! 5. DX = 100 * |+DI - -DI| / (+DI + -DI), NaN when the DI sum is 0
//! 6. ADX = 14-bar rolling mean of DX
//!
//! Deliberately uses plain rolling means rather than Wilder's exponential
//! smoothing; consumers depend on this exact variant.

use crate::domain::Bar;
use crate::indicators::rolling_mean;

/// True range series. The first bar has no prior close and falls back to
/// its own high-low range.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    let n = bars.len();
    let mut tr = vec![f64::NAN; n];
    if n == 0 {
        return tr;
    }
    tr[0] = bars[0].high - bars[0].low;
    for i in 1..n {
        let prev_close = bars[i - 1].close;
        tr[i] = (bars[i].high - bars[i].low)
            .max((bars[i].high - prev_close).abs())
            .max((bars[i].low - prev_close).abs());
    }
    tr
}

/// Compute ADX over the bar series.
pub fn adx(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let result = vec![f64::NAN; n];
    if n < 2 {
        return result;
    }

    let mut plus_dm = vec![0.0; n];
    let mut minus_dm = vec![0.0; n];
    for i in 1..n {
        let up_move = bars[i].high - bars[i - 1].high;
        let down_move = bars[i - 1].low - bars[i].low;

        if up_move.is_nan() || down_move.is_nan() {
            plus_dm[i] = f64::NAN;
            minus_dm[i] = f64::NAN;
            continue;
        }

        if up_move > down_move && up_move > 0.0 {
            plus_dm[i] = up_move;
        }
        if down_move > up_move && down_move > 0.0 {
            minus_dm[i] = down_move;
        }
    }

    let atr = rolling_mean(&true_range(bars), period);
    let avg_plus_dm = rolling_mean(&plus_dm, period);
    let avg_minus_dm = rolling_mean(&minus_dm, period);

    let mut dx = vec![f64::NAN; n];
    for i in 0..n {
        if atr[i].is_nan() || avg_plus_dm[i].is_nan() || avg_minus_dm[i].is_nan() || atr[i] == 0.0
        {
            continue;
        }
        let plus_di = 100.0 * avg_plus_dm[i] / atr[i];
        let minus_di = 100.0 * avg_minus_dm[i] / atr[i];
        let di_sum = plus_di + minus_di;
        if di_sum != 0.0 {
            dx[i] = 100.0 * (plus_di - minus_di).abs() / di_sum;
        }
    }

    rolling_mean(&dx, period)
}
