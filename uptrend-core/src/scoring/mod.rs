//! Six-category weighted scoring and tiering.
//!
//! This is the full scoring profile used by the live scan path. The
//! walk-forward backtester deliberately carries its own simplified per-day
//! profile; the two are separate, named code paths and must not be unified.

pub mod categories;
pub mod tier;

pub use categories::{
    score_momentum_quality, score_price_structure, score_risk_reward, score_trend_quality,
    score_trend_strength, score_volume_profile, MomentumDetail, RiskRewardDetail,
    StructureDetail, TrendQualityDetail, TrendStrengthDetail, VolumeDetail,
};
pub use tier::{adjust_tier_for_volatility, Tier};

use crate::config::ScoringConfig;
use crate::domain::PriceSeries;
use crate::indicators::IndicatorFrame;
use crate::quality::{trend_quality, DEFAULT_LOOKBACK};
use serde::{Deserialize, Serialize};

/// Nested per-category detail, exported alongside the subscores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreDetails {
    pub trend: TrendStrengthDetail,
    pub momentum: MomentumDetail,
    pub volume: VolumeDetail,
    pub structure: StructureDetail,
    pub risk_reward: RiskRewardDetail,
    pub trend_quality: TrendQualityDetail,
}

/// Total score, category subscores, nested detail, and the score-derived
/// tier (before any volatility adjustment stage).
///
/// Invariant: `total` equals the sum of the six subscores, clamped to
/// [0,100] as a defensive final step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub total: f64,
    pub trend_strength: f64,
    pub momentum_quality: f64,
    pub volume_profile: f64,
    pub price_structure: f64,
    pub risk_reward: f64,
    pub trend_quality: f64,
    pub details: ScoreDetails,
    pub tier: Tier,
}

/// Score a series across all six categories.
///
/// The weight map in `cfg` is informational only — buckets are fixed. The
/// config is still taken here so the volatility modifier stage and exports
/// can share one validated source of knobs.
///
/// Requires a non-empty series; the scan pipeline gates at 200 bars before
/// scoring.
pub fn compute_score(
    series: &PriceSeries,
    frame: &IndicatorFrame,
    _cfg: &ScoringConfig,
) -> ScoreBreakdown {
    let (trend_strength, trend) = score_trend_strength(series, frame);
    let (momentum_quality, momentum) = score_momentum_quality(series, frame);
    let (volume_profile, volume) = score_volume_profile(series, frame);
    let (price_structure, structure) = score_price_structure(series, frame);
    let (risk_reward, rr) = score_risk_reward(series, frame);

    let tq = trend_quality(series, DEFAULT_LOOKBACK);
    let (trend_quality_score, tq_detail) = score_trend_quality(&tq);

    let total = (trend_strength
        + momentum_quality
        + volume_profile
        + price_structure
        + risk_reward
        + trend_quality_score)
        .clamp(0.0, 100.0);

    ScoreBreakdown {
        total,
        trend_strength,
        momentum_quality,
        volume_profile,
        price_structure,
        risk_reward,
        trend_quality: trend_quality_score,
        details: ScoreDetails {
            trend,
            momentum,
            volume,
            structure,
            risk_reward: rr,
            trend_quality: tq_detail,
        },
        tier: Tier::from_score(total),
    }
}
