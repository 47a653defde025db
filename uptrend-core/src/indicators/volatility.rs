//! Realized volatility — annualized rolling stdev of daily returns.

use crate::indicators::rolling_std;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Annualized volatility in percent: rolling sample stdev of simple daily
/// returns, scaled by sqrt(252) * 100.
pub fn annualized_volatility(closes: &[f64], period: usize) -> Vec<f64> {
    let n = closes.len();
    let mut returns = vec![f64::NAN; n];
    for i in 1..n {
        if closes[i - 1] != 0.0 {
            returns[i] = (closes[i] - closes[i - 1]) / closes[i - 1];
        }
    }

    rolling_std(&returns, period)
        .into_iter()
        .map(|v| v * TRADING_DAYS_PER_YEAR.sqrt() * 100.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;

    #[test]
    fn warmup_accounts_for_missing_first_return() {
        // returns[0] is undefined, so the first valid window ends at `period`
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i % 2) as f64).collect();
        let vol = annualized_volatility(&closes, 20);
        assert!(vol[19].is_nan());
        assert!(!vol[20].is_nan());
    }

    #[test]
    fn constant_prices_zero_volatility() {
        let closes = vec![100.0; 30];
        let vol = annualized_volatility(&closes, 20);
        assert_approx(vol[25], 0.0, 1e-10);
    }

    #[test]
    fn volatile_series_higher_than_calm() {
        let calm: Vec<f64> = (0..60).map(|i| 100.0 * 1.001_f64.powi(i)).collect();
        let mut wild = vec![100.0];
        for i in 1..60 {
            let factor = if i % 2 == 0 { 1.05 } else { 0.96 };
            wild.push(wild[i - 1] * factor);
        }
        let calm_vol = *annualized_volatility(&calm, 20).last().unwrap();
        let wild_vol = *annualized_volatility(&wild, 20).last().unwrap();
        assert!(wild_vol > calm_vol);
    }
}
