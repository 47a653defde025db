//! Polygon.io aggregates data provider.
//!
//! Fetches daily OHLCV bars from the v2 aggregates endpoint, adjusted for
//! splits, sorted ascending at the source and re-validated on parse (the
//! provider must never hand rows out of order to the pipeline). Handles
//! rate limiting and retries transient failures with exponential backoff.

use super::provider::{DataError, DataProvider};
use super::rate_limit::RateLimiter;
use crate::domain::{Bar, PriceSeries};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.polygon.io";

/// Aggregates API response.
#[derive(Debug, Deserialize)]
struct AggsResponse {
    results: Option<Vec<AggBar>>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AggBar {
    /// Window start, Unix milliseconds.
    t: i64,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    v: f64,
}

/// Polygon.io data provider.
pub struct PolygonProvider {
    client: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
    limiter: RateLimiter,
    max_retries: u32,
    base_delay: Duration,
}

impl PolygonProvider {
    pub fn new(api_key: impl Into<String>, max_requests_per_minute: Option<u32>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            limiter: RateLimiter::new(max_requests_per_minute),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }

    /// Override the API host (test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn aggregates_url(&self, symbol: &str, days: u32) -> String {
        let end = chrono::Local::now().date_naive();
        let start = end - chrono::Duration::days(days as i64);
        format!(
            "{}/v2/aggs/ticker/{symbol}/range/1/day/{start}/{end}\
             ?adjusted=true&sort=asc&apiKey={}",
            self.base_url, self.api_key
        )
    }

    fn parse_response(symbol: &str, resp: AggsResponse) -> Result<PriceSeries, DataError> {
        let results = resp.results.unwrap_or_default();
        if results.is_empty() {
            return match resp.status.as_deref() {
                Some("NOT_FOUND") => Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                }),
                _ => Err(DataError::NoData {
                    symbol: symbol.to_string(),
                }),
            };
        }

        let mut bars = Vec::with_capacity(results.len());
        for agg in results {
            let date = chrono::DateTime::from_timestamp_millis(agg.t)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    DataError::ResponseFormat(format!("invalid timestamp: {}", agg.t))
                })?;
            bars.push(Bar {
                date,
                open: agg.o,
                high: agg.h,
                low: agg.l,
                close: agg.c,
                volume: agg.v as u64,
            });
        }

        PriceSeries::new(symbol, bars)
            .map_err(|e| DataError::ResponseFormat(format!("{symbol}: {e}")))
    }

    fn fetch_with_retry(&self, symbol: &str, days: u32) -> Result<PriceSeries, DataError> {
        let url = self.aggregates_url(symbol, days);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                std::thread::sleep(self.base_delay * 2u32.pow(attempt - 1));
            }
            self.limiter.acquire();

            match self.client.get(&url).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(60);
                        last_error = Some(DataError::RateLimited {
                            retry_after_secs: retry_after,
                        });
                        continue;
                    }

                    if status == reqwest::StatusCode::UNAUTHORIZED
                        || status == reqwest::StatusCode::FORBIDDEN
                    {
                        return Err(DataError::Auth(format!("HTTP {status} for {symbol}")));
                    }

                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(DataError::SymbolNotFound {
                            symbol: symbol.to_string(),
                        });
                    }

                    if !status.is_success() {
                        last_error =
                            Some(DataError::Network(format!("HTTP {status} for {symbol}")));
                        continue;
                    }

                    let parsed: AggsResponse = resp.json().map_err(|e| {
                        DataError::ResponseFormat(format!(
                            "failed to parse response for {symbol}: {e}"
                        ))
                    })?;
                    return Self::parse_response(symbol, parsed);
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(DataError::Network(e.to_string()));
                        continue;
                    }
                    return Err(DataError::Network(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Network("max retries exceeded".into())))
    }
}

impl DataProvider for PolygonProvider {
    fn name(&self) -> &str {
        "polygon"
    }

    fn fetch_daily(&self, symbol: &str, days: u32) -> Result<PriceSeries, DataError> {
        self.fetch_with_retry(symbol, days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agg(t: i64, c: f64) -> AggBar {
        AggBar {
            t,
            o: c - 1.0,
            h: c + 1.0,
            l: c - 2.0,
            c,
            v: 10_000.0,
        }
    }

    const DAY_MS: i64 = 86_400_000;

    #[test]
    fn parse_ascending_bars() {
        let resp = AggsResponse {
            results: Some(vec![agg(DAY_MS, 100.0), agg(2 * DAY_MS, 101.0)]),
            status: Some("OK".into()),
        };
        let series = PolygonProvider::parse_response("AAPL", resp).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.symbol(), "AAPL");
        assert_eq!(series.bars()[1].close, 101.0);
    }

    #[test]
    fn parse_empty_results_is_no_data() {
        let resp = AggsResponse {
            results: Some(vec![]),
            status: Some("OK".into()),
        };
        let err = PolygonProvider::parse_response("AAPL", resp).unwrap_err();
        assert!(matches!(err, DataError::NoData { .. }));
    }

    #[test]
    fn parse_missing_results_not_found() {
        let resp = AggsResponse {
            results: None,
            status: Some("NOT_FOUND".into()),
        };
        let err = PolygonProvider::parse_response("NOPE", resp).unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound { .. }));
    }

    #[test]
    fn parse_rejects_out_of_order_rows() {
        let resp = AggsResponse {
            results: Some(vec![agg(2 * DAY_MS, 101.0), agg(DAY_MS, 100.0)]),
            status: Some("OK".into()),
        };
        let err = PolygonProvider::parse_response("AAPL", resp).unwrap_err();
        assert!(matches!(err, DataError::ResponseFormat(_)));
    }

    #[test]
    fn response_json_shape() {
        let json = r#"{
            "ticker": "AAPL",
            "status": "OK",
            "resultsCount": 1,
            "results": [{"t": 86400000, "o": 99.0, "h": 101.0, "l": 98.0, "c": 100.0, "v": 5000.5}]
        }"#;
        let resp: AggsResponse = serde_json::from_str(json).unwrap();
        let series = PolygonProvider::parse_response("AAPL", resp).unwrap();
        assert_eq!(series.bars()[0].volume, 5000);
    }
}
