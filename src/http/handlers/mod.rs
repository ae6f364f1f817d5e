//! Route handlers

pub mod cron;
pub mod health;
pub mod launch;
pub mod stats;
pub mod tokens;
pub mod trade;
pub mod trending;

use serde::Deserialize;

/// Feed size when the caller does not ask for one
pub const DEFAULT_LIMIT: usize = 30;

/// Largest feed a caller can ask for
pub const MAX_LIMIT: usize = 100;

/// `?category=&limit=` of the feed routes, kept as raw strings so bad values
/// fall back to defaults instead of rejecting the request
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub category: Option<String>,
    pub limit: Option<String>,
}

impl FeedQuery {
    pub fn limit(&self) -> usize {
        parse_limit(self.limit.as_deref())
    }

    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or("hot")
    }
}

/// Parse a `limit` value: missing or unparsable gives the default, anything
/// else is clamped to 1..=100
pub fn parse_limit(value: Option<&str>) -> usize {
    match value.map(str::trim).and_then(|v| v.parse::<i64>().ok()) {
        Some(limit) => limit.clamp(1, MAX_LIMIT as i64) as usize,
        None => DEFAULT_LIMIT,
    }
}
