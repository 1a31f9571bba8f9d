use thiserror::Error;

use crate::{PropertyId, ScrapeRunId};

/// Errors that can occur when interacting with a listing store.
#[derive(Debug, Error)]
pub enum ListingError {
    /// A property with this listing URL is already stored.
    #[error("Duplicate listing: {listing_url}")]
    Duplicate { listing_url: String },

    /// The referenced property does not exist.
    #[error("Property not found: {0}")]
    PropertyNotFound(PropertyId),

    /// The referenced scrape run does not exist.
    #[error("Scrape run not found: {0}")]
    ScrapeRunNotFound(ScrapeRunId),

    /// A row could not be written or read back as a valid record.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for listing store operations.
pub type Result<T> = std::result::Result<T, ListingError>;
