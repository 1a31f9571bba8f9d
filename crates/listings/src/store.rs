use async_trait::async_trait;

use crate::{
    AnalysisResult, NewAnalysis, NewProperty, Property, PropertyId, PropertyPage, PropertyPhoto,
    PropertyQuery, Result, ScrapeRun, ScrapeRunId, ScrapeRunOutcome,
};

/// Number of runs returned by the run listing endpoint.
pub const RECENT_RUNS_LIMIT: usize = 50;

/// Core trait for listing store implementations.
///
/// A listing store persists properties with their photos and analyses,
/// plus the bookkeeping rows of scrape runs.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Returns one page of properties matching the query, newest first.
    ///
    /// Paging values are clamped before use.
    async fn search_properties(&self, query: PropertyQuery) -> Result<PropertyPage>;

    /// Loads a property with its photos.
    async fn get_property(&self, id: PropertyId) -> Result<Option<Property>>;

    /// Checks whether a property with this listing URL is stored.
    async fn property_exists(&self, listing_url: &str) -> Result<bool>;

    /// Inserts a property.
    ///
    /// Fails with `Duplicate` if the listing URL is already stored.
    async fn insert_property(&self, property: NewProperty) -> Result<Property>;

    /// Attaches a photo to a property.
    ///
    /// Fails with `PropertyNotFound` if the property does not exist.
    async fn add_photo(
        &self,
        property_id: PropertyId,
        photo_url: &str,
        sort_order: i32,
    ) -> Result<PropertyPhoto>;

    /// Records the analysis for a property, replacing any previous one.
    async fn upsert_analysis(&self, analysis: NewAnalysis) -> Result<AnalysisResult>;

    /// Returns the analysis for a property, if any.
    async fn get_analysis(&self, property_id: PropertyId) -> Result<Option<AnalysisResult>>;

    /// Opens a scrape run in the `started` state.
    async fn create_scrape_run(&self, query: &str, max_results: Option<i32>) -> Result<ScrapeRun>;

    /// Closes a scrape run, stamping `finished_at` with the current time.
    ///
    /// Fails with `ScrapeRunNotFound` if the run does not exist.
    async fn finish_scrape_run(&self, id: ScrapeRunId, outcome: ScrapeRunOutcome)
    -> Result<ScrapeRun>;

    /// Returns up to `limit` runs, most recently started first.
    async fn list_scrape_runs(&self, limit: usize) -> Result<Vec<ScrapeRun>>;

    /// Loads a single scrape run.
    async fn get_scrape_run(&self, id: ScrapeRunId) -> Result<Option<ScrapeRun>>;
}

/// Extension trait providing convenience methods for listing stores.
#[async_trait]
pub trait ListingStoreExt: ListingStore {
    /// Inserts a property and its photos in `sort_order` 1..=N.
    async fn insert_with_photos(
        &self,
        property: NewProperty,
        photo_urls: Vec<String>,
    ) -> Result<Property> {
        let inserted = self.insert_property(property).await?;
        for (index, url) in photo_urls.iter().enumerate() {
            let sort_order = i32::try_from(index + 1).unwrap_or(i32::MAX);
            self.add_photo(inserted.id, url, sort_order).await?;
        }
        Ok(self.get_property(inserted.id).await?.unwrap_or(inserted))
    }

    /// Returns the most recent runs shown by the run listing.
    async fn recent_scrape_runs(&self) -> Result<Vec<ScrapeRun>> {
        self.list_scrape_runs(RECENT_RUNS_LIMIT).await
    }
}

// Blanket implementation for all ListingStore implementations
impl<T: ListingStore + ?Sized> ListingStoreExt for T {}
