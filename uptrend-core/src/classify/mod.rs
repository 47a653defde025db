//! Uptrend classification — early (breakout-stage) vs established
//! (sustained-trend) states.
//!
//! Both classifications are stateless reads over a series and its
//! precomputed indicator columns. They are not mutually exclusive.
//!
//! Edge rule: a NaN indicator value makes the test that reads it fail.
//! Rust float comparisons against NaN return false, so the checks below
//! are written with the indicator on the passing side of each comparison.

use crate::config::ClassifierConfig;
use crate::domain::PriceSeries;
use crate::indicators::IndicatorFrame;
use serde::{Deserialize, Serialize};

/// Bars required before early-uptrend evaluation produces a verdict.
pub const MIN_EARLY_BARS: usize = 60;

/// Bars required before established-uptrend evaluation produces a verdict.
pub const MIN_ESTABLISHED_BARS: usize = 200;

/// Supporting detail for the early-uptrend decision.
///
/// `Default` is the empty detail returned below the gating length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EarlyDetail {
    pub ma20_cross_recent: bool,
    pub volume_spike: bool,
    pub rsi_healthy: bool,
    pub rsi: f64,
    pub adx_rising: bool,
    pub adx: f64,
    pub macd_cross_recent: bool,
    pub breakout: bool,
    /// Points accumulated, 0..=8.
    pub score: u32,
}

/// Supporting detail for the established-uptrend decision.
///
/// The higher-high/higher-low observations are recorded for consumers but
/// do not participate in the verdict.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EstablishedDetail {
    pub mas_stacked: bool,
    pub days_in_uptrend: usize,
    pub higher_highs: bool,
    pub higher_lows: bool,
    pub adx: f64,
    pub adx_strong: bool,
}

/// Count consecutive closes above MA20, walking backward from the latest
/// bar until the first break. A NaN MA20 counts as a break.
pub fn days_above_ma20(series: &PriceSeries, frame: &IndicatorFrame) -> usize {
    let bars = series.bars();
    let mut days = 0;
    for i in (0..bars.len()).rev() {
        if bars[i].close > frame.ma20[i] {
            days += 1;
        } else {
            break;
        }
    }
    days
}

/// Detect an early uptrend: a breakout scored on six criteria worth up to
/// 8 points. Requires at least [`MIN_EARLY_BARS`] bars.
pub fn classify_early(
    series: &PriceSeries,
    frame: &IndicatorFrame,
    cfg: &ClassifierConfig,
) -> (bool, EarlyDetail) {
    let n = series.len();
    if n < MIN_EARLY_BARS {
        return (false, EarlyDetail::default());
    }

    let bars = series.bars();
    let last = n - 1;
    let mut detail = EarlyDetail::default();
    let mut score = 0u32;

    // 1. Close crossed above MA20 within the last few bars (2 pts)
    for i in n.saturating_sub(cfg.ma_cross_lookback).max(1)..n {
        if bars[i - 1].close <= frame.ma20[i - 1] && bars[i].close > frame.ma20[i] {
            detail.ma20_cross_recent = true;
            break;
        }
    }
    if detail.ma20_cross_recent {
        score += 2;
    }

    // 2. Volume spike vs the 50-bar average (2 pts)
    detail.volume_spike =
        bars[last].volume as f64 > frame.volume_ma50[last] * cfg.volume_spike_multiplier;
    if detail.volume_spike {
        score += 2;
    }

    // 3. RSI in the healthy band, not overbought (1 pt)
    detail.rsi = frame.rsi[last];
    detail.rsi_healthy = frame.rsi[last] >= 50.0 && frame.rsi[last] <= 70.0;
    if detail.rsi_healthy {
        score += 1;
    }

    // 4. ADX above 20 and rising vs 5 bars back (1 pt)
    detail.adx = frame.adx[last];
    detail.adx_rising = frame.adx[last] > 20.0 && frame.adx[last] > frame.adx[n - 5];
    if detail.adx_rising {
        score += 1;
    }

    // 5. MACD crossed above its signal within the last few bars (1 pt)
    for i in n.saturating_sub(cfg.macd_cross_lookback).max(1)..n {
        if frame.macd[i - 1] <= frame.macd_signal[i - 1]
            && frame.macd[i] > frame.macd_signal[i]
        {
            detail.macd_cross_recent = true;
            break;
        }
    }
    if detail.macd_cross_recent {
        score += 1;
    }

    // 6. Close above the prior 20-bar high, current bar excluded (1 pt)
    let prior_high = bars[n - 20..last]
        .iter()
        .map(|b| b.high)
        .fold(f64::MIN, f64::max);
    detail.breakout = bars[last].close > prior_high;
    if detail.breakout {
        score += 1;
    }

    detail.score = score;
    (score >= cfg.early_min_score, detail)
}

/// Detect an established uptrend: stacked moving averages, a sustained run
/// above MA20, and a strong ADX must all hold. Requires at least
/// [`MIN_ESTABLISHED_BARS`] bars. No partial credit.
pub fn classify_established(
    series: &PriceSeries,
    frame: &IndicatorFrame,
    cfg: &ClassifierConfig,
) -> (bool, EstablishedDetail) {
    let n = series.len();
    if n < MIN_ESTABLISHED_BARS {
        return (false, EstablishedDetail::default());
    }

    let bars = series.bars();
    let last = n - 1;
    let mut detail = EstablishedDetail::default();

    detail.mas_stacked = bars[last].close > frame.ma20[last]
        && frame.ma20[last] > frame.ma50[last]
        && frame.ma50[last] > frame.ma200[last];

    detail.days_in_uptrend = days_above_ma20(series, frame);

    // Stride-5 higher-high / higher-low observation over the last 30 bars
    let window = &bars[n - 30..];
    let highs: Vec<f64> = window.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = window.iter().map(|b| b.low).collect();
    detail.higher_highs = (2..highs.len())
        .step_by(5)
        .all(|i| highs[i] >= highs[i - 1] || highs[i] >= highs[i - 2]);
    detail.higher_lows = (2..lows.len())
        .step_by(5)
        .all(|i| lows[i] >= lows[i - 1] || lows[i] >= lows[i - 2]);

    detail.adx = frame.adx[last];
    detail.adx_strong = frame.adx[last] > cfg.established_adx_threshold;

    let is_established = detail.mas_stacked
        && detail.days_in_uptrend >= cfg.established_min_days
        && detail.adx_strong;

    (is_established, detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    fn frame_for(closes: &[f64]) -> (PriceSeries, IndicatorFrame) {
        let series = PriceSeries::new("TEST", make_bars(closes)).unwrap();
        let frame = IndicatorFrame::compute(&series);
        (series, frame)
    }

    fn rising_closes(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn early_gated_below_60_bars() {
        let (series, frame) = frame_for(&rising_closes(59));
        let (is_early, detail) = classify_early(&series, &frame, &ClassifierConfig::default());
        assert!(!is_early);
        assert_eq!(detail, EarlyDetail::default());
    }

    #[test]
    fn established_gated_below_200_bars() {
        let (series, frame) = frame_for(&rising_closes(199));
        let (is_est, detail) =
            classify_established(&series, &frame, &ClassifierConfig::default());
        assert!(!is_est);
        assert_eq!(detail, EstablishedDetail::default());
    }

    #[test]
    fn established_on_long_riser() {
        // 300 rising bars: MAs stacked, price above MA20 throughout,
        // directional movement pegged upward so ADX is high
        let (series, frame) = frame_for(&rising_closes(300));
        let (is_est, detail) =
            classify_established(&series, &frame, &ClassifierConfig::default());
        assert!(detail.mas_stacked);
        assert!(detail.days_in_uptrend >= 20);
        assert!(detail.adx_strong, "adx={}", detail.adx);
        assert!(is_est);
        assert!(detail.higher_highs);
        assert!(detail.higher_lows);
    }

    #[test]
    fn flat_oscillation_is_neither() {
        let closes: Vec<f64> = (0..260)
            .map(|i| 100.0 + if i % 2 == 0 { 3.0 } else { -3.0 })
            .collect();
        let (series, frame) = frame_for(&closes);
        let cfg = ClassifierConfig::default();
        let (is_early, _) = classify_early(&series, &frame, &cfg);
        let (is_est, _) = classify_established(&series, &frame, &cfg);
        assert!(!is_early);
        assert!(!is_est);
    }

    #[test]
    fn days_above_ma20_stops_at_first_break() {
        // Down for a long stretch, then 25 closes above the MA20
        let mut closes: Vec<f64> = (0..275).map(|i| 300.0 - i as f64 * 0.5).collect();
        let base = *closes.last().unwrap();
        for i in 0..25 {
            closes.push(base + 20.0 + i as f64 * 2.0);
        }
        let (series, frame) = frame_for(&closes);
        assert_eq!(days_above_ma20(&series, &frame), 25);
    }

    #[test]
    fn nan_ma20_fails_days_count() {
        let (series, frame) = frame_for(&rising_closes(10));
        // MA20 never warm on 10 bars → every comparison fails
        assert_eq!(days_above_ma20(&series, &frame), 0);
    }

    #[test]
    fn breakout_excludes_current_bar() {
        // Final close above every prior high
        let mut closes = rising_closes(80);
        let last = closes.len() - 1;
        closes[last] = 500.0;
        let (series, frame) = frame_for(&closes);
        let (_, detail) = classify_early(&series, &frame, &ClassifierConfig::default());
        assert!(detail.breakout);
    }

    #[test]
    fn early_threshold_respects_config() {
        // A pure riser earns breakout-style points; with min score 0 the
        // verdict flips to true regardless of the accumulated score
        let (series, frame) = frame_for(&rising_closes(80));
        let lenient = ClassifierConfig {
            early_min_score: 0,
            ..Default::default()
        };
        let (is_early, _) = classify_early(&series, &frame, &lenient);
        assert!(is_early);
    }
}
