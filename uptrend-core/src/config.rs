//! Scan configuration — fully-enumerated knobs with documented defaults.
//!
//! Every optional behavior (volatility tier modifier, hard volatility
//! filters) is an explicit named field selected at construction; there are
//! no runtime flag lookups. Validation failures are fatal at load time.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors. Fatal at startup, never mid-scan.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("negative weight for {category}: {value}")]
    NegativeWeight { category: &'static str, value: f64 },
    #[error("volatility thresholds inverted: low {low} > high {high}")]
    InvertedVolatilityThresholds { low: f64, high: f64 },
    #[error("early uptrend minimum score {value} exceeds the 8-point scale")]
    EarlyMinScoreOutOfRange { value: u32 },
    #[error("zero-length lookback for {field}")]
    ZeroLookback { field: &'static str },
}

/// Category weight map.
///
/// Informational labeling only: the weights are carried through exports and
/// reports, but each category's point buckets are fixed thresholds that the
/// weights never rescale. Kept for compatibility with the established
/// 100-point breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub trend_strength: f64,
    pub momentum_quality: f64,
    pub volume_profile: f64,
    pub price_structure: f64,
    pub risk_reward: f64,
    pub trend_quality: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            trend_strength: 20.0,
            momentum_quality: 18.0,
            volume_profile: 17.0,
            price_structure: 17.0,
            risk_reward: 13.0,
            trend_quality: 15.0,
        }
    }
}

impl ScoringWeights {
    pub fn total(&self) -> f64 {
        self.trend_strength
            + self.momentum_quality
            + self.volume_profile
            + self.price_structure
            + self.risk_reward
            + self.trend_quality
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let entries = [
            ("trend_strength", self.trend_strength),
            ("momentum_quality", self.momentum_quality),
            ("volume_profile", self.volume_profile),
            ("price_structure", self.price_structure),
            ("risk_reward", self.risk_reward),
            ("trend_quality", self.trend_quality),
        ];
        for (category, value) in entries {
            if value < 0.0 {
                return Err(ConfigError::NegativeWeight { category, value });
            }
        }
        Ok(())
    }
}

/// Volatility bands for the optional tier modifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolatilityTierThresholds {
    /// Below this 20-day volatility (%) a trend counts as smooth.
    pub low: f64,
    /// Above this 20-day volatility (%) a trend counts as choppy/risky.
    pub high: f64,
}

impl Default for VolatilityTierThresholds {
    fn default() -> Self {
        Self {
            low: 25.0,
            high: 40.0,
        }
    }
}

/// Hard per-tier volatility caps applied as a scan filter stage.
///
/// More aggressive than the tier modifier: records over the cap are removed
/// rather than downgraded. Tier 3 and Tier 4 have no caps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolatilityFilters {
    pub enabled: bool,
    pub max_for_tier1: f64,
    pub max_for_tier2: f64,
}

impl Default for VolatilityFilters {
    fn default() -> Self {
        Self {
            enabled: false,
            max_for_tier1: 35.0,
            max_for_tier2: 50.0,
        }
    }
}

/// Scorer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,
    /// Enables the post-scoring volatility tier adjustment stage.
    pub volatility_tier_modifier: bool,
    pub volatility_thresholds: VolatilityTierThresholds,
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        let t = self.volatility_thresholds;
        if t.low > t.high {
            return Err(ConfigError::InvertedVolatilityThresholds {
                low: t.low,
                high: t.high,
            });
        }
        Ok(())
    }
}

/// Classifier configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Minimum early-uptrend points (of 8) to classify as early.
    pub early_min_score: u32,
    /// MA20 cross must have happened within this many bars.
    pub ma_cross_lookback: usize,
    /// MACD/signal cross must have happened within this many bars.
    pub macd_cross_lookback: usize,
    /// Volume spike threshold as a multiple of the 50-bar volume average.
    pub volume_spike_multiplier: f64,
    /// Minimum consecutive closes above MA20 for an established uptrend.
    pub established_min_days: usize,
    /// ADX floor for an established uptrend.
    pub established_adx_threshold: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            early_min_score: 5,
            ma_cross_lookback: 5,
            macd_cross_lookback: 10,
            volume_spike_multiplier: 1.5,
            established_min_days: 20,
            established_adx_threshold: 25.0,
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.early_min_score > 8 {
            return Err(ConfigError::EarlyMinScoreOutOfRange {
                value: self.early_min_score,
            });
        }
        if self.ma_cross_lookback == 0 {
            return Err(ConfigError::ZeroLookback {
                field: "ma_cross_lookback",
            });
        }
        if self.macd_cross_lookback == 0 {
            return Err(ConfigError::ZeroLookback {
                field: "macd_cross_lookback",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_100() {
        let w = ScoringWeights::default();
        assert!((w.total() - 100.0).abs() < 1e-12);
    }

    #[test]
    fn negative_weight_rejected() {
        let cfg = ScoringConfig {
            weights: ScoringWeights {
                momentum_quality: -1.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NegativeWeight {
                category: "momentum_quality",
                ..
            })
        ));
    }

    #[test]
    fn inverted_volatility_thresholds_rejected() {
        let cfg = ScoringConfig {
            volatility_thresholds: VolatilityTierThresholds {
                low: 50.0,
                high: 40.0,
            },
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvertedVolatilityThresholds { .. })
        ));
    }

    #[test]
    fn default_configs_validate() {
        assert!(ScoringConfig::default().validate().is_ok());
        assert!(ClassifierConfig::default().validate().is_ok());
    }

    #[test]
    fn early_min_score_capped_at_8() {
        let cfg = ClassifierConfig {
            early_min_score: 9,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::EarlyMinScoreOutOfRange { value: 9 })
        ));
    }

    #[test]
    fn toml_roundtrip_with_defaults() {
        // Partial config files rely on serde(default) for every knob
        let cfg: ScoringConfig = serde_json::from_str(r#"{"volatility_tier_modifier": true}"#).unwrap();
        assert!(cfg.volatility_tier_modifier);
        assert_eq!(cfg.weights, ScoringWeights::default());
    }
}
