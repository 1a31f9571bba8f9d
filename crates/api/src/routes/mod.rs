//! HTTP route handlers.

pub mod health;
pub mod metrics;
pub mod properties;
pub mod scrape;

use listings::ListingStore;
use scraper::{MockScraper, ScrapeService};

/// Shared application state accessible from all handlers.
pub struct AppState<S: ListingStore> {
    pub store: S,
    pub scrape_service: ScrapeService<S, MockScraper>,
}
