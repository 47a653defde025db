//! The six scoring categories, each with fixed point buckets.
//!
//! Bucket thresholds are deliberately independent of the configured weight
//! map. Every chain's final arm is the floor bucket, which is also where a
//! NaN input lands (all comparisons against NaN are false).

use crate::classify::days_above_ma20;
use crate::domain::PriceSeries;
use crate::indicators::IndicatorFrame;
use crate::quality::TrendQualityResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrendStrengthDetail {
    pub adx: f64,
    pub adx_score: f64,
    pub ma20_slope_pct: f64,
    pub slope_score: f64,
    pub days_in_uptrend: usize,
    pub days_score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MomentumDetail {
    pub rsi: f64,
    pub rsi_score: f64,
    pub macd_histogram: f64,
    pub macd_score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolumeDetail {
    pub volume_trend_score: f64,
    pub relative_volume: f64,
    pub rel_vol_score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructureDetail {
    pub support_touches: usize,
    pub support_score: f64,
    pub avg_pullback_pct: f64,
    pub pullback_score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskRewardDetail {
    pub distance_from_ma20_pct: f64,
    pub distance_score: f64,
    pub room_to_resistance_pct: f64,
    pub resistance_score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrendQualityDetail {
    pub choppiness_index: f64,
    pub efficiency_ratio: f64,
    pub avg_deviation_pct: f64,
    pub trend_quality_combined: f64,
    pub choppiness_score: f64,
    pub efficiency_score: f64,
    pub deviation_score: f64,
}

/// Trend strength (0-20): ADX level, MA20 slope, days in uptrend.
pub fn score_trend_strength(
    series: &PriceSeries,
    frame: &IndicatorFrame,
) -> (f64, TrendStrengthDetail) {
    let n = series.len();
    let last = n - 1;
    let mut detail = TrendStrengthDetail::default();

    // ADX level (0-8)
    let adx = frame.adx[last];
    detail.adx = adx;
    detail.adx_score = if adx > 40.0 {
        8.0
    } else if adx > 30.0 {
        6.0
    } else if adx > 25.0 {
        4.0
    } else {
        2.0
    };

    // MA20 slope over 5 bars (0-8)
    let ma20_5d_ago = frame.ma20[n.saturating_sub(5)];
    let slope = (frame.ma20[last] - ma20_5d_ago) / ma20_5d_ago * 100.0;
    detail.ma20_slope_pct = slope;
    detail.slope_score = if slope > 3.0 {
        8.0
    } else if slope > 1.5 {
        6.0
    } else if slope > 0.5 {
        3.0
    } else {
        0.0
    };

    // Days in uptrend, sweet spot 20-60 (0-4)
    let days = days_above_ma20(series, frame);
    detail.days_in_uptrend = days;
    detail.days_score = if (20..=60).contains(&days) {
        4.0
    } else if (61..=120).contains(&days) {
        2.0
    } else if days > 120 {
        1.0
    } else {
        0.0
    };

    let score = detail.adx_score + detail.slope_score + detail.days_score;
    (score, detail)
}

/// Momentum quality (0-18): RSI position and MACD histogram behavior.
pub fn score_momentum_quality(
    series: &PriceSeries,
    frame: &IndicatorFrame,
) -> (f64, MomentumDetail) {
    let n = series.len();
    let last = n - 1;
    let mut detail = MomentumDetail::default();

    // RSI position (0-9); NaN (e.g. a zero loss average) takes the floor
    let rsi = frame.rsi[last];
    detail.rsi = rsi;
    detail.rsi_score = if (55.0..=65.0).contains(&rsi) {
        9.0
    } else if (50.0..55.0).contains(&rsi) || (rsi > 65.0 && rsi <= 70.0) {
        6.0
    } else if rsi > 70.0 && rsi <= 80.0 {
        3.0
    } else {
        1.0
    };

    // MACD histogram direction and sign (0-9)
    let hist = frame.macd_histogram[last];
    let hist_5d_ago = frame.macd_histogram[n.saturating_sub(5)];
    detail.macd_histogram = hist;
    detail.macd_score = if hist > 0.0 && hist > hist_5d_ago {
        9.0
    } else if hist > 0.0 {
        6.0
    } else if hist > hist_5d_ago {
        3.0
    } else {
        0.0
    };

    let score = detail.rsi_score + detail.macd_score;
    (score, detail)
}

/// Volume profile (0-17): up-day vs down-day volume, relative volume.
pub fn score_volume_profile(
    series: &PriceSeries,
    frame: &IndicatorFrame,
) -> (f64, VolumeDetail) {
    let n = series.len();
    let bars = series.bars();
    let last = n - 1;
    let mut detail = VolumeDetail::default();

    // Volume trend over the last 5 bars (0-9)
    let mut up_volumes = Vec::new();
    let mut down_volumes = Vec::new();
    for i in n.saturating_sub(5).max(1)..n {
        if bars[i].close > bars[i - 1].close {
            up_volumes.push(bars[i].volume as f64);
        } else {
            down_volumes.push(bars[i].volume as f64);
        }
    }
    detail.volume_trend_score = if !up_volumes.is_empty() && !down_volumes.is_empty() {
        let avg_up = up_volumes.iter().sum::<f64>() / up_volumes.len() as f64;
        let avg_down = down_volumes.iter().sum::<f64>() / down_volumes.len() as f64;
        if avg_up > avg_down * 1.2 {
            9.0
        } else if avg_up > avg_down {
            5.0
        } else {
            2.0
        }
    } else {
        4.0
    };

    // Relative volume vs the 50-bar average (0-8)
    let rel = bars[last].volume as f64 / frame.volume_ma50[last];
    detail.relative_volume = rel;
    detail.rel_vol_score = if rel > 1.5 {
        8.0
    } else if rel > 1.2 {
        6.0
    } else if rel > 0.8 {
        4.0
    } else {
        2.0
    };

    let score = detail.volume_trend_score + detail.rel_vol_score;
    (score, detail)
}

/// Price structure (0-17): MA20 support touches, pullback depth.
pub fn score_price_structure(
    series: &PriceSeries,
    frame: &IndicatorFrame,
) -> (f64, StructureDetail) {
    let n = series.len();
    let bars = series.bars();
    let mut detail = StructureDetail::default();

    // Support quality: closes near MA20 over the trailing window, latest
    // bar excluded (0-9)
    let mut touches = 0usize;
    for i in n.saturating_sub(60)..n.saturating_sub(1) {
        if (bars[i].low - frame.ma20[i]).abs() / frame.ma20[i] < 0.02 {
            touches += 1;
        }
    }
    detail.support_touches = touches;
    detail.support_score = if touches >= 3 {
        9.0
    } else if touches >= 2 {
        5.0
    } else {
        2.0
    };

    // Pullback depth: 5-bar local high to the following 5-bar low (0-8)
    let window = &bars[n.saturating_sub(60)..];
    let highs: Vec<f64> = window.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = window.iter().map(|b| b.low).collect();
    let mut pullbacks = Vec::new();
    for i in 5..highs.len() {
        let local_high = highs[i - 5..i].iter().cloned().fold(f64::MIN, f64::max);
        let subsequent_low = lows[i..(i + 5).min(lows.len())]
            .iter()
            .cloned()
            .fold(f64::MAX, f64::min);
        let pct = (local_high - subsequent_low) / local_high * 100.0;
        if pct > 0.0 {
            pullbacks.push(pct);
        }
    }
    if pullbacks.is_empty() {
        detail.avg_pullback_pct = 0.0;
        detail.pullback_score = 4.0;
    } else {
        let avg = pullbacks.iter().sum::<f64>() / pullbacks.len() as f64;
        detail.avg_pullback_pct = avg;
        detail.pullback_score = if avg < 10.0 {
            8.0
        } else if avg < 15.0 {
            5.0
        } else {
            3.0
        };
    }

    let score = detail.support_score + detail.pullback_score;
    (score, detail)
}

/// Risk/reward setup (0-13): distance from MA20, room to the 60-bar high.
pub fn score_risk_reward(
    series: &PriceSeries,
    frame: &IndicatorFrame,
) -> (f64, RiskRewardDetail) {
    let n = series.len();
    let bars = series.bars();
    let last = n - 1;
    let mut detail = RiskRewardDetail::default();

    // Distance from MA20 (0-7)
    let distance = (bars[last].close - frame.ma20[last]) / frame.ma20[last] * 100.0;
    detail.distance_from_ma20_pct = distance;
    detail.distance_score = if distance.abs() < 5.0 {
        7.0
    } else if distance.abs() < 10.0 {
        4.0
    } else {
        2.0
    };

    // Room to the trailing 60-bar high (0-6)
    let recent_high = bars[n.saturating_sub(60)..]
        .iter()
        .map(|b| b.high)
        .fold(f64::MIN, f64::max);
    let room = (recent_high - bars[last].close) / bars[last].close * 100.0;
    detail.room_to_resistance_pct = room;
    detail.resistance_score = if room > 10.0 {
        6.0
    } else if room > 5.0 {
        4.0
    } else {
        1.0
    };

    let score = detail.distance_score + detail.resistance_score;
    (score, detail)
}

/// Trend quality (0-15): choppiness, efficiency, deviation re-bucketed.
pub fn score_trend_quality(tq: &TrendQualityResult) -> (f64, TrendQualityDetail) {
    let mut detail = TrendQualityDetail {
        choppiness_index: tq.choppiness_index,
        efficiency_ratio: tq.efficiency_ratio,
        avg_deviation_pct: tq.avg_deviation_pct,
        trend_quality_combined: tq.combined,
        ..Default::default()
    };

    // Choppiness Index (0-6): 38 reads very smooth, 62 very choppy
    let ci = tq.choppiness_index;
    detail.choppiness_score = if ci < 40.0 {
        6.0
    } else if ci < 47.0 {
        5.0
    } else if ci < 53.0 {
        3.0
    } else if ci < 58.0 {
        2.0
    } else {
        0.0
    };

    // Efficiency Ratio (0-5)
    let er = tq.efficiency_ratio;
    detail.efficiency_score = if er > 0.5 {
        5.0
    } else if er > 0.35 {
        4.0
    } else if er > 0.2 {
        2.0
    } else {
        0.0
    };

    // Price deviation (0-4)
    let dev = tq.avg_deviation_pct;
    detail.deviation_score = if dev < 1.0 {
        4.0
    } else if dev < 2.0 {
        3.0
    } else if dev < 3.0 {
        2.0
    } else {
        0.0
    };

    let score = detail.choppiness_score + detail.efficiency_score + detail.deviation_score;
    (score, detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;
    use crate::quality::{trend_quality, DEFAULT_LOOKBACK};

    fn setup(closes: &[f64]) -> (PriceSeries, IndicatorFrame) {
        let series = PriceSeries::new("TEST", make_bars(closes)).unwrap();
        let frame = IndicatorFrame::compute(&series);
        (series, frame)
    }

    fn rising(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn trend_strength_within_bounds() {
        let (series, frame) = setup(&rising(250));
        let (score, detail) = score_trend_strength(&series, &frame);
        assert!((0.0..=20.0).contains(&score));
        assert_eq!(
            score,
            detail.adx_score + detail.slope_score + detail.days_score
        );
    }

    #[test]
    fn trend_strength_strong_riser_gets_adx_points() {
        let (series, frame) = setup(&rising(250));
        let (_, detail) = score_trend_strength(&series, &frame);
        // Uninterrupted directional movement pegs ADX at the top bucket
        assert_eq!(detail.adx_score, 8.0);
    }

    #[test]
    fn momentum_nan_rsi_takes_floor() {
        // Monotonic riser: loss average is zero → RSI is NaN → floor bucket
        let (series, frame) = setup(&rising(250));
        let (score, detail) = score_momentum_quality(&series, &frame);
        assert!(detail.rsi.is_nan());
        assert_eq!(detail.rsi_score, 1.0);
        assert!((0.0..=18.0).contains(&score));
    }

    #[test]
    fn momentum_rsi_sweet_spot() {
        // Mild two-steps-up-one-down drift keeps RSI in the upper band
        let mut closes = vec![100.0];
        for i in 1..250 {
            let prev = closes[i - 1];
            closes.push(if i % 3 == 2 { prev - 0.45 } else { prev + 0.5 });
        }
        let (series, frame) = setup(&closes);
        let (_, detail) = score_momentum_quality(&series, &frame);
        assert!(detail.rsi > 50.0 && detail.rsi < 80.0, "rsi={}", detail.rsi);
        assert!(detail.rsi_score >= 3.0);
    }

    #[test]
    fn volume_profile_flat_volume_mid_bucket() {
        // make_bars uses constant volume: relative volume is exactly 1.0
        let (series, frame) = setup(&rising(250));
        let (score, detail) = score_volume_profile(&series, &frame);
        assert_eq!(detail.rel_vol_score, 4.0);
        assert!((0.0..=17.0).contains(&score));
    }

    #[test]
    fn volume_profile_all_up_days_one_sided() {
        // Strict riser: every day is an up day → one-sided sample → 4 pts
        let (series, frame) = setup(&rising(250));
        let (_, detail) = score_volume_profile(&series, &frame);
        assert_eq!(detail.volume_trend_score, 4.0);
    }

    #[test]
    fn price_structure_bounds() {
        let (series, frame) = setup(&rising(250));
        let (score, detail) = score_price_structure(&series, &frame);
        assert!((0.0..=17.0).contains(&score));
        assert_eq!(score, detail.support_score + detail.pullback_score);
    }

    #[test]
    fn risk_reward_extended_price_penalized() {
        // Parabolic finish leaves price far above MA20 with no room left
        let mut closes = rising(240);
        for i in 0..10 {
            let prev = *closes.last().unwrap();
            closes.push(prev * 1.08 + i as f64);
        }
        let (series, frame) = setup(&closes);
        let (_, detail) = score_risk_reward(&series, &frame);
        assert!(detail.distance_from_ma20_pct > 10.0);
        assert_eq!(detail.distance_score, 2.0);
        assert_eq!(detail.resistance_score, 1.0);
    }

    #[test]
    fn trend_quality_buckets() {
        let smooth = TrendQualityResult {
            efficiency_ratio: 0.9,
            choppiness_index: 30.0,
            avg_deviation_pct: 0.5,
            combined: 0.9,
            score: 10,
        };
        let (score, detail) = score_trend_quality(&smooth);
        assert_eq!(score, 15.0);
        assert_eq!(detail.choppiness_score, 6.0);
        assert_eq!(detail.efficiency_score, 5.0);
        assert_eq!(detail.deviation_score, 4.0);

        let choppy = TrendQualityResult {
            efficiency_ratio: 0.05,
            choppiness_index: 70.0,
            avg_deviation_pct: 6.0,
            combined: 0.05,
            score: 0,
        };
        let (score, _) = score_trend_quality(&choppy);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn trend_quality_from_real_series() {
        let (series, _) = setup(&rising(250));
        let tq = trend_quality(&series, DEFAULT_LOOKBACK);
        let (score, _) = score_trend_quality(&tq);
        assert!((0.0..=15.0).contains(&score));
        assert!(score >= 10.0, "clean riser should score high, got {score}");
    }
}
