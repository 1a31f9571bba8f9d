use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    AnalysisResult, ListingError, NewAnalysis, NewProperty, Property, PropertyId, PropertyPage,
    PropertyPhoto, PropertyQuery, Result, ScrapeRun, ScrapeRunId, ScrapeRunOutcome,
    ScrapeRunStatus, store::ListingStore,
};

#[derive(Debug, Default)]
struct State {
    properties: Vec<Property>,
    analyses: HashMap<PropertyId, AnalysisResult>,
    scrape_runs: Vec<ScrapeRun>,
    next_property_id: i64,
    next_photo_id: i64,
    next_analysis_id: i64,
    next_run_id: i64,
    fail_on_insert: bool,
}

/// In-memory listing store for testing and local development.
///
/// This implementation keeps every row in memory and provides
/// the same interface as the PostgreSQL implementation.
#[derive(Debug, Clone, Default)]
pub struct InMemoryListingStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryListingStore {
    /// Creates a new empty in-memory listing store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of properties stored.
    pub async fn property_count(&self) -> usize {
        self.state.read().await.properties.len()
    }

    /// Makes every subsequent `insert_property` call fail.
    pub async fn set_fail_on_insert(&self, fail: bool) {
        self.state.write().await.fail_on_insert = fail;
    }

    /// Clears all rows.
    pub async fn clear(&self) {
        *self.state.write().await = State::default();
    }
}

#[async_trait]
impl ListingStore for InMemoryListingStore {
    async fn search_properties(&self, query: PropertyQuery) -> Result<PropertyPage> {
        let query = query.clamped();
        let state = self.state.read().await;

        let mut matching: Vec<&Property> = state
            .properties
            .iter()
            .filter(|p| query.matches(p))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(query.page_size as usize)
            .cloned()
            .collect();

        Ok(PropertyPage {
            items,
            total,
            page: query.page,
            page_size: query.page_size,
        })
    }

    async fn get_property(&self, id: PropertyId) -> Result<Option<Property>> {
        let state = self.state.read().await;
        Ok(state.properties.iter().find(|p| p.id == id).cloned())
    }

    async fn property_exists(&self, listing_url: &str) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state
            .properties
            .iter()
            .any(|p| p.listing_url == listing_url))
    }

    async fn insert_property(&self, property: NewProperty) -> Result<Property> {
        property.validate()?;
        let mut state = self.state.write().await;

        if state.fail_on_insert {
            return Err(ListingError::InvalidData(format!(
                "insert rejected for {}",
                property.listing_url
            )));
        }

        // Unique constraint simulation
        if state
            .properties
            .iter()
            .any(|p| p.listing_url == property.listing_url)
        {
            return Err(ListingError::Duplicate {
                listing_url: property.listing_url,
            });
        }

        state.next_property_id += 1;
        let now = Utc::now();
        let stored = Property {
            id: PropertyId::new(state.next_property_id),
            listing_source: property.listing_source,
            listing_url: property.listing_url,
            address: property.address,
            city: property.city,
            state: property.state,
            zip: property.zip,
            price: property.price,
            beds: property.beds,
            baths: property.baths,
            sqft: property.sqft,
            description: property.description,
            scraped_at: property.scraped_at,
            created_at: now,
            updated_at: now,
            photos: Vec::new(),
        };
        state.properties.push(stored.clone());

        Ok(stored)
    }

    async fn add_photo(
        &self,
        property_id: PropertyId,
        photo_url: &str,
        sort_order: i32,
    ) -> Result<PropertyPhoto> {
        let mut state = self.state.write().await;
        state.next_photo_id += 1;
        let photo = PropertyPhoto {
            id: state.next_photo_id,
            property_id,
            photo_url: photo_url.to_string(),
            sort_order,
        };

        let property = state
            .properties
            .iter_mut()
            .find(|p| p.id == property_id)
            .ok_or(ListingError::PropertyNotFound(property_id))?;
        property.photos.push(photo.clone());
        property.photos.sort_by_key(|p| (p.sort_order, p.id));

        Ok(photo)
    }

    async fn upsert_analysis(&self, analysis: NewAnalysis) -> Result<AnalysisResult> {
        let mut state = self.state.write().await;
        if !state
            .properties
            .iter()
            .any(|p| p.id == analysis.property_id)
        {
            return Err(ListingError::PropertyNotFound(analysis.property_id));
        }

        let existing_id = state.analyses.get(&analysis.property_id).map(|a| a.id);
        let id = match existing_id {
            Some(id) => id,
            None => {
                state.next_analysis_id += 1;
                state.next_analysis_id
            }
        };
        let result = AnalysisResult {
            id,
            property_id: analysis.property_id,
            score_total: analysis.score_total,
            score_breakdown: analysis.score_breakdown,
            reasons: analysis.reasons,
            analyzed_at: Utc::now(),
        };
        state.analyses.insert(analysis.property_id, result.clone());

        Ok(result)
    }

    async fn get_analysis(&self, property_id: PropertyId) -> Result<Option<AnalysisResult>> {
        Ok(self.state.read().await.analyses.get(&property_id).cloned())
    }

    async fn create_scrape_run(&self, query: &str, max_results: Option<i32>) -> Result<ScrapeRun> {
        let mut state = self.state.write().await;
        state.next_run_id += 1;
        let run = ScrapeRun {
            id: ScrapeRunId::new(state.next_run_id),
            query: query.to_string(),
            max_results,
            status: ScrapeRunStatus::Started,
            started_at: Utc::now(),
            finished_at: None,
            properties_found: 0,
            error_count: 0,
            error_samples: None,
        };
        state.scrape_runs.push(run.clone());

        Ok(run)
    }

    async fn finish_scrape_run(
        &self,
        id: ScrapeRunId,
        outcome: ScrapeRunOutcome,
    ) -> Result<ScrapeRun> {
        let mut state = self.state.write().await;
        let run = state
            .scrape_runs
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(ListingError::ScrapeRunNotFound(id))?;

        run.status = outcome.status;
        run.finished_at = Some(Utc::now());
        run.properties_found = outcome.properties_found;
        run.error_count = outcome.error_count;
        run.error_samples = outcome.samples_or_none();

        Ok(run.clone())
    }

    async fn list_scrape_runs(&self, limit: usize) -> Result<Vec<ScrapeRun>> {
        let state = self.state.read().await;
        let mut runs = state.scrape_runs.clone();
        runs.sort_by(|a, b| b.started_at.cmp(&a.started_at).then(b.id.cmp(&a.id)));
        runs.truncate(limit);
        Ok(runs)
    }

    async fn get_scrape_run(&self, id: ScrapeRunId) -> Result<Option<ScrapeRun>> {
        let state = self.state.read().await;
        Ok(state.scrape_runs.iter().find(|r| r.id == id).cloned())
    }
}
