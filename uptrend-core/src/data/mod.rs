//! Market data access — provider trait, HTTP client, synthetic generator.

pub mod polygon;
pub mod provider;
pub mod rate_limit;
pub mod synthetic;

pub use polygon::PolygonProvider;
pub use provider::{DataError, DataProvider};
pub use rate_limit::RateLimiter;
pub use synthetic::SyntheticProvider;
