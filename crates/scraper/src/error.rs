//! Scrape error types.

use listings::ListingError;
use thiserror::Error;

/// Errors that can occur while validating or executing a scrape run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The request was rejected before a run was opened.
    #[error("{0}")]
    Validation(String),

    /// The scraper could not produce listings.
    #[error("Scraper error: {0}")]
    Scraper(String),

    /// Listing store error.
    #[error("Listing store error: {0}")]
    Store(#[from] ListingError),
}

/// Convenience type alias for scrape results.
pub type Result<T> = std::result::Result<T, ScrapeError>;
