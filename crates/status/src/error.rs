//! Health probe error types.

use thiserror::Error;

/// Reasons a health check can fail.
///
/// Both variants end up displayed the same way; the distinction only
/// shows in logs.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The request could not be sent or the body could not be read.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The body was not valid JSON.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
