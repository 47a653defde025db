//! Trend quality — how smooth vs choppy recent price action has been.
//!
//! Three complementary measurements over a trailing window:
//! 1. Efficiency Ratio (Kaufman): net displacement / total path length
//! 2. Choppiness Index: log-ratio of summed true range to the window's
//!    high-low span
//! 3. Deviation from a Gaussian-smoothed copy of the closes
//!
//! The three are blended into [0,1] and quantized to a 0/2/4/7/10 score.

pub mod gaussian;

pub use gaussian::{gaussian_smooth, gradient, smoothed_derivatives, SmoothedDerivatives};

use crate::domain::PriceSeries;

/// Default trailing window for trend-quality measurement.
pub const DEFAULT_LOOKBACK: usize = 60;

/// Sigma for the deviation smoother.
const DEVIATION_SIGMA: f64 = 5.0;

/// Measured smoothness of the trailing window.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendQualityResult {
    /// Net move / path length, in [0,1]; 1 = perfectly direct.
    pub efficiency_ratio: f64,
    /// Roughly [0,100]; lower = smoother, 50 = neutral.
    pub choppiness_index: f64,
    /// Mean percent deviation of close from its smoothed copy.
    pub avg_deviation_pct: f64,
    /// Blended smoothness in [0,1].
    pub combined: f64,
    /// Quantized quality: 0, 2, 4, 7, or 10.
    pub score: u32,
}

impl TrendQualityResult {
    /// Neutral defaults used when fewer than 20 bars are available.
    fn neutral() -> Self {
        Self {
            efficiency_ratio: 0.0,
            choppiness_index: 50.0,
            avg_deviation_pct: 5.0,
            combined: 0.0,
            score: 0,
        }
    }
}

/// Measure trend quality over the trailing `lookback` bars (or the whole
/// series when shorter). Returns neutral defaults below 20 bars.
pub fn trend_quality(series: &PriceSeries, lookback: usize) -> TrendQualityResult {
    let window = series.tail(lookback.min(series.len()));
    let n = window.len();
    if n < 20 {
        return TrendQualityResult::neutral();
    }

    let closes: Vec<f64> = window.iter().map(|b| b.close).collect();
    let highs: Vec<f64> = window.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = window.iter().map(|b| b.low).collect();

    // Efficiency Ratio: net displacement over total path length
    let direction = (closes[n - 1] - closes[0]).abs();
    let path: f64 = (1..n).map(|i| (closes[i] - closes[i - 1]).abs()).sum();
    let efficiency_ratio = if path > 0.0 { direction / path } else { 0.0 };

    // Choppiness Index over the window's true ranges
    let tr_sum: f64 = (1..n)
        .map(|i| {
            (highs[i] - lows[i])
                .max((highs[i] - closes[i - 1]).abs())
                .max((lows[i] - closes[i - 1]).abs())
        })
        .sum();
    let high_low_range = highs.iter().cloned().fold(f64::MIN, f64::max)
        - lows.iter().cloned().fold(f64::MAX, f64::min);
    let choppiness_index = if high_low_range > 0.0 && tr_sum > 0.0 {
        100.0 * (tr_sum / high_low_range).log10() / (n as f64).log10()
    } else {
        50.0
    };

    // Deviation from the smoothed trend line
    let smoothed = gaussian_smooth(&closes, DEVIATION_SIGMA);
    let deviations: Vec<f64> = (0..n)
        .filter(|&i| smoothed[i] > 0.0)
        .map(|i| (closes[i] - smoothed[i]).abs() / smoothed[i] * 100.0)
        .collect();
    let avg_deviation_pct = if deviations.is_empty() {
        5.0
    } else {
        deviations.iter().sum::<f64>() / deviations.len() as f64
    };

    // Blend: ER and CI carry most of the weight, deviation is complementary.
    // CI normalization: 38 reads as very smooth, 62 as very choppy.
    let ci_score = ((62.0 - choppiness_index) / 24.0).clamp(0.0, 1.0);
    let dev_score = ((3.0 - avg_deviation_pct) / 3.0).clamp(0.0, 1.0);
    let combined = efficiency_ratio * 0.4 + ci_score * 0.4 + dev_score * 0.2;

    let score = quantize(combined);

    TrendQualityResult {
        efficiency_ratio,
        choppiness_index,
        avg_deviation_pct,
        combined,
        score,
    }
}

/// Fixed breakpoints from combined smoothness to the 0-10 quality score.
fn quantize(combined: f64) -> u32 {
    if combined >= 0.70 {
        10
    } else if combined >= 0.55 {
        7
    } else if combined >= 0.40 {
        4
    } else if combined >= 0.25 {
        2
    } else {
        0
    }
}
