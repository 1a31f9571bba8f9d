//! Scrape request validation.

use serde_json::Value;

use crate::error::{Result, ScrapeError};

/// Largest `max_results` a single run may request.
pub const MAX_RESULTS_LIMIT: u32 = 200;

/// A validated request to run a scrape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeRequest {
    query: String,
    max_results: u32,
}

impl ScrapeRequest {
    /// Validates a query and result count.
    ///
    /// The query is trimmed and must not be empty; `max_results` must lie
    /// in `1..=MAX_RESULTS_LIMIT`.
    pub fn new(query: &str, max_results: i64) -> Result<Self> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ScrapeError::Validation("'query' is required".to_string()));
        }
        if max_results < 1 || max_results > i64::from(MAX_RESULTS_LIMIT) {
            return Err(ScrapeError::Validation(format!(
                "'max_results' must be between 1 and {MAX_RESULTS_LIMIT}"
            )));
        }

        Ok(Self {
            query: query.to_string(),
            max_results: max_results as u32,
        })
    }

    /// Validates a loosely-typed JSON body.
    ///
    /// Anything that is not an object is treated as an empty object.
    /// `max_results` may be an integer, a float (truncated toward zero), or a
    /// string holding an integer.
    pub fn from_json(body: &Value) -> Result<Self> {
        let query = body.get("query").and_then(Value::as_str).unwrap_or("");
        if query.trim().is_empty() {
            return Err(ScrapeError::Validation("'query' is required".to_string()));
        }

        let max_results = body
            .get("max_results")
            .and_then(coerce_integer)
            .ok_or_else(|| {
                ScrapeError::Validation("'max_results' must be an integer".to_string())
            })?;

        Self::new(query, max_results)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn max_results(&self) -> u32 {
        self.max_results
    }
}

fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
