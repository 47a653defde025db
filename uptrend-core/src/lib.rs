//! Uptrend Core — signal classification and scoring engine.
//!
//! This crate contains the heart of the scanner:
//! - Domain types (bars, validated price series)
//! - Indicator derivation into parallel columns (IndicatorFrame)
//! - Trend-quality measurement (efficiency ratio, choppiness, deviation)
//! - Early / established uptrend classification
//! - Six-category 0-100 scoring with tiering and the optional volatility
//!   tier modifier stage
//! - Data provider seam (Polygon aggregates client, synthetic generator)
//!
//! Everything is single-threaded and synchronous: one series, one
//! indicator frame, one call stack. Derivations are pure functions from an
//! immutable series to fresh columns; nothing mutates shared state.

pub mod classify;
pub mod config;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod quality;
pub mod scoring;
