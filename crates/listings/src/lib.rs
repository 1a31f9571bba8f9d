//! Listing storage for BRRRR Radar.
//!
//! Holds the property, photo, analysis and scrape run data model, the
//! [`ListingStore`] trait, and its in-memory and PostgreSQL implementations.

pub mod error;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod query;
pub mod seed;
pub mod store;

pub use common::{Money, PropertyId, ScrapeRunId};
pub use error::{ListingError, Result};
pub use memory::InMemoryListingStore;
pub use model::{
    AnalysisResult, ErrorSample, NewAnalysis, NewProperty, Property, PropertyPhoto, ScrapeRun,
    ScrapeRunOutcome, ScrapeRunStatus,
};
pub use postgres::PostgresListingStore;
pub use query::{PropertyPage, PropertyQuery};
pub use store::ListingStore;
