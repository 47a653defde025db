//! Bollinger Bands — rolling mean with bands at a stdev multiple.

use crate::indicators::{rolling_mean, rolling_std};

/// Upper/middle/lower band columns.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

/// Compute Bollinger Bands(period, num_std) over close prices.
pub fn bollinger(closes: &[f64], period: usize, num_std: f64) -> BollingerBands {
    let n = closes.len();
    let middle = rolling_mean(closes, period);
    let std = rolling_std(closes, period);

    let mut upper = vec![f64::NAN; n];
    let mut lower = vec![f64::NAN; n];
    for i in 0..n {
        if !middle[i].is_nan() && !std[i].is_nan() {
            upper[i] = middle[i] + std[i] * num_std;
            lower[i] = middle[i] - std[i] * num_std;
        }
    }

    BollingerBands {
        upper,
        middle,
        lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn bands_bracket_the_middle() {
        let closes: Vec<f64> = (0..40)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 4.0)
            .collect();
        let bands = bollinger(&closes, 20, 2.0);
        for i in 19..closes.len() {
            assert!(bands.upper[i] >= bands.middle[i]);
            assert!(bands.lower[i] <= bands.middle[i]);
        }
    }

    #[test]
    fn constant_series_collapses_bands() {
        let closes = vec![50.0; 30];
        let bands = bollinger(&closes, 20, 2.0);
        assert_approx(bands.upper[29], 50.0, DEFAULT_EPSILON);
        assert_approx(bands.middle[29], 50.0, DEFAULT_EPSILON);
        assert_approx(bands.lower[29], 50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn warmup_is_nan() {
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
        let bands = bollinger(&closes, 20, 2.0);
        for i in 0..19 {
            assert!(bands.upper[i].is_nan());
            assert!(bands.middle[i].is_nan());
            assert!(bands.lower[i].is_nan());
        }
        assert!(!bands.middle[19].is_nan());
    }
}
