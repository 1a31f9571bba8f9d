//! Listing scrapers and the scrape run ingestion pipeline.
//!
//! A scrape run follows these steps:
//! 1. Open a `scrape_runs` row in the `started` state
//! 2. Ask the [`Scraper`] for up to `max_results` listings
//! 3. Insert each listing, skipping URLs that are already stored
//! 4. Close the run with its counts and a bounded sample of errors
//!
//! If the scraper itself fails, the run is closed as `failed`.

pub mod error;
pub mod mock;
pub mod request;
pub mod service;

pub use error::{Result, ScrapeError};
pub use mock::MockScraper;
pub use request::{MAX_RESULTS_LIMIT, ScrapeRequest};
pub use service::{MAX_ERROR_SAMPLES, ScrapeService, ScrapeSummary, Scraper};
