//! Tier assignment and the optional volatility tier modifier.

use crate::config::VolatilityTierThresholds;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete quality bucket, 1 best. Pure function of the total score, with
/// an optional volatility adjustment applied as a separate stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Tier1,
    Tier2,
    Tier3,
    Tier4,
}

impl Tier {
    /// Half-open score bands: [80,∞) → 1, [60,80) → 2, [40,60) → 3, else 4.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Tier::Tier1
        } else if score >= 60.0 {
            Tier::Tier2
        } else if score >= 40.0 {
            Tier::Tier3
        } else {
            Tier::Tier4
        }
    }

    /// Display label used in exports and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Tier1 => "Tier 1: Prime Movers",
            Tier::Tier2 => "Tier 2: Solid Performers",
            Tier::Tier3 => "Tier 3: Momentum Plays",
            Tier::Tier4 => "Tier 4: Watch List",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Volatility-based tier adjustment, applied after score-based assignment
/// when enabled:
///
/// - Tier 1 + high vol → Tier 2 (downgrade)
/// - Tier 2 + low vol → Tier 1 (upgrade)
/// - Tier 3 + low vol → Tier 2 (upgrade)
/// - everything else unchanged (Tier 4 never moves)
///
/// A NaN volatility (warmup) matches neither band and leaves the tier
/// unchanged.
pub fn adjust_tier_for_volatility(
    tier: Tier,
    volatility_20: f64,
    thresholds: &VolatilityTierThresholds,
) -> Tier {
    let is_low = volatility_20 < thresholds.low;
    let is_high = volatility_20 > thresholds.high;

    match tier {
        Tier::Tier1 if is_high => Tier::Tier2,
        Tier::Tier2 if is_low => Tier::Tier1,
        Tier::Tier3 if is_low => Tier::Tier2,
        other => other,
    }
}
