//! IndicatorFrame — every derived column for one series, computed once.

use crate::domain::PriceSeries;
use crate::indicators::{adx, annualized_volatility, bollinger, macd, rolling_mean, rsi};

const MA_SHORT: usize = 20;
const MA_MEDIUM: usize = 50;
const MA_LONG: usize = 200;
const RSI_PERIOD: usize = 14;
const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SIGNAL: usize = 9;
const ADX_PERIOD: usize = 14;
const BB_PERIOD: usize = 20;
const BB_STD: f64 = 2.0;
const VOL_SHORT: usize = 20;
const VOL_LONG: usize = 50;
const VOLUME_MA: usize = 50;

/// Parallel indicator columns aligned 1:1 with the bars of one series.
///
/// Built once before classification and scoring, then only read. Entries
/// before a column's warmup length are NaN and count as "criterion not met"
/// in every downstream test.
#[derive(Debug, Clone)]
pub struct IndicatorFrame {
    pub ma20: Vec<f64>,
    pub ma50: Vec<f64>,
    pub ma200: Vec<f64>,
    pub rsi: Vec<f64>,
    pub macd: Vec<f64>,
    pub macd_signal: Vec<f64>,
    pub macd_histogram: Vec<f64>,
    pub adx: Vec<f64>,
    pub bb_upper: Vec<f64>,
    pub bb_middle: Vec<f64>,
    pub bb_lower: Vec<f64>,
    pub volatility_20: Vec<f64>,
    pub volatility_50: Vec<f64>,
    pub volume_ma50: Vec<f64>,
    len: usize,
}

impl IndicatorFrame {
    /// Derive every column from the series.
    pub fn compute(series: &PriceSeries) -> Self {
        let closes = series.closes();
        let volumes = series.volumes();

        let macd_out = macd(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);
        let bands = bollinger(&closes, BB_PERIOD, BB_STD);

        Self {
            ma20: rolling_mean(&closes, MA_SHORT),
            ma50: rolling_mean(&closes, MA_MEDIUM),
            ma200: rolling_mean(&closes, MA_LONG),
            rsi: rsi(&closes, RSI_PERIOD),
            macd: macd_out.macd,
            macd_signal: macd_out.signal,
            macd_histogram: macd_out.histogram,
            adx: adx(series.bars(), ADX_PERIOD),
            bb_upper: bands.upper,
            bb_middle: bands.middle,
            bb_lower: bands.lower,
            volatility_20: annualized_volatility(&closes, VOL_SHORT),
            volatility_50: annualized_volatility(&closes, VOL_LONG),
            volume_ma50: rolling_mean(&volumes, VOLUME_MA),
            len: series.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
