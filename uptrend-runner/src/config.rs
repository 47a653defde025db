//! Serializable run configuration (TOML) and content-addressed run ids.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use uptrend_core::config::{ClassifierConfig, ConfigError, ScoringConfig, VolatilityFilters};

/// Unique identifier for a run (content-addressable hash).
pub type RunId = String;

/// Errors from loading or validating run configuration. Fatal at startup.
#[derive(Debug, Error)]
pub enum RunConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Invalid(#[from] ConfigError),
    #[error("backtest thresholds must not be empty")]
    EmptyThresholds,
    #[error("backtest {field} must be positive, got {value}")]
    NonPositiveWindow { field: &'static str, value: i64 },
}

/// Scan configuration: market filters plus the core scoring/classifier
/// knobs. Every field has a default, so partial TOML files work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScanConfig {
    /// Calendar days of history to request per ticker (365 covers the
    /// 200 trading days the established classifier needs).
    pub history_days: u32,
    /// Minimum last close; cheaper tickers are filtered, not skipped.
    pub min_price: f64,
    /// Cap on tickers scanned, for quick test runs.
    pub max_stocks: Option<usize>,
    pub scoring: ScoringConfig,
    pub classifier: ClassifierConfig,
    pub volatility_filters: VolatilityFilters,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            history_days: 365,
            min_price: 5.0,
            max_stocks: None,
            scoring: ScoringConfig::default(),
            classifier: ClassifierConfig::default(),
            volatility_filters: VolatilityFilters::default(),
        }
    }
}

impl ScanConfig {
    pub fn from_toml(text: &str) -> Result<Self, RunConfigError> {
        let cfg: ScanConfig = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, RunConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| RunConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> Result<(), RunConfigError> {
        self.scoring.validate()?;
        self.classifier.validate()?;
        Ok(())
    }
}

/// Walk-forward backtest configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BacktestConfig {
    /// Training window in calendar days (one trading year).
    pub train_window_days: i64,
    /// Test window in calendar days (one quarter).
    pub test_window_days: i64,
    /// Fixed holding period per signal, in bars.
    pub holding_period: usize,
    /// Entry-score thresholds tried during optimization, lowest first.
    pub thresholds: Vec<f64>,
    /// Bars of indicator warmup before daily scoring starts.
    pub warmup_bars: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            train_window_days: 252,
            test_window_days: 63,
            holding_period: 21,
            thresholds: vec![60.0, 70.0, 80.0, 90.0],
            warmup_bars: 50,
        }
    }
}

impl BacktestConfig {
    pub fn from_toml(text: &str) -> Result<Self, RunConfigError> {
        let cfg: BacktestConfig = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), RunConfigError> {
        if self.thresholds.is_empty() {
            return Err(RunConfigError::EmptyThresholds);
        }
        if self.train_window_days <= 0 {
            return Err(RunConfigError::NonPositiveWindow {
                field: "train_window_days",
                value: self.train_window_days,
            });
        }
        if self.test_window_days <= 0 {
            return Err(RunConfigError::NonPositiveWindow {
                field: "test_window_days",
                value: self.test_window_days,
            });
        }
        Ok(())
    }
}

/// Deterministic hash id over a config and the ticker universe.
///
/// Two runs with identical inputs share an id, which names their artifact
/// directories.
pub fn run_id<T: Serialize>(config: &T, tickers: &[String]) -> RunId {
    let payload = serde_json::json!({
        "config": config,
        "tickers": tickers,
    });
    let json = serde_json::to_string(&payload).expect("config serialization failed");
    blake3::hash(json.as_bytes()).to_hex().to_string()
}
