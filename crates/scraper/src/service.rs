//! Scrape run orchestration.

use std::time::Instant;

use async_trait::async_trait;
use common::ScrapeRunId;
use listings::{
    ErrorSample, ListingError, ListingStore, NewProperty, ScrapeRun, ScrapeRunOutcome,
    ScrapeRunStatus,
};
use serde::Serialize;

use crate::error::{Result, ScrapeError};
use crate::request::ScrapeRequest;

/// Maximum number of per-listing errors kept on a run.
pub const MAX_ERROR_SAMPLES: usize = 10;

/// Source of listings for a query.
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Returns up to `max_results` listings matching `query`.
    async fn scrape(&self, query: &str, max_results: u32) -> Result<Vec<NewProperty>>;
}

/// Counts reported back to the caller once a run finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapeSummary {
    pub run_id: ScrapeRunId,
    pub status: ScrapeRunStatus,
    pub query: String,
    pub max_results: u32,
    pub properties_found: usize,
    pub inserted_count: usize,
    pub skipped_count: usize,
    pub error_count: usize,
}

#[derive(Debug, Default)]
struct IngestTally {
    inserted: usize,
    skipped: usize,
    errors: usize,
    samples: Vec<ErrorSample>,
}

impl IngestTally {
    fn record_error(&mut self, listing_url: &str, err: &ListingError) {
        self.errors += 1;
        if self.samples.len() < MAX_ERROR_SAMPLES {
            self.samples
                .push(ErrorSample::for_listing(listing_url, err.to_string()));
        }
    }
}

/// Runs scrapes and ingests their listings into a store.
pub struct ScrapeService<S, P>
where
    S: ListingStore,
    P: Scraper,
{
    store: S,
    scraper: P,
}

impl<S, P> ScrapeService<S, P>
where
    S: ListingStore,
    P: Scraper,
{
    /// Creates a new scrape service.
    pub fn new(store: S, scraper: P) -> Self {
        Self { store, scraper }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Executes one scrape run synchronously and returns its summary.
    ///
    /// Duplicate listings are counted as skipped. Per-listing insert
    /// failures are counted as errors and do not abort the run. A scraper
    /// failure closes the run as `failed` and is returned to the caller.
    #[tracing::instrument(skip(self, request), fields(query = request.query(), max_results = request.max_results()))]
    pub async fn run(&self, request: ScrapeRequest) -> Result<ScrapeSummary> {
        metrics::counter!("scrape_runs_total").increment(1);
        let started = Instant::now();

        let max_results = i32::try_from(request.max_results()).ok();
        let run = self
            .store
            .create_scrape_run(request.query(), max_results)
            .await?;
        tracing::info!(run_id = %run.id, "scrape run started");

        match self.ingest(&run, &request).await {
            Ok(summary) => {
                let duration = started.elapsed().as_secs_f64();
                metrics::histogram!("scrape_run_duration_seconds").record(duration);
                metrics::counter!("scrape_properties_inserted")
                    .increment(summary.inserted_count as u64);
                tracing::info!(
                    run_id = %run.id,
                    status = %summary.status,
                    inserted = summary.inserted_count,
                    skipped = summary.skipped_count,
                    errors = summary.error_count,
                    duration,
                    "scrape run finished"
                );
                Ok(summary)
            }
            Err(e) => {
                metrics::counter!("scrape_runs_failed").increment(1);
                metrics::histogram!("scrape_run_duration_seconds")
                    .record(started.elapsed().as_secs_f64());
                tracing::error!(run_id = %run.id, error = %e, "scrape run failed");
                self.mark_failed(run.id, &e).await;
                Err(e)
            }
        }
    }

    async fn ingest(&self, run: &ScrapeRun, request: &ScrapeRequest) -> Result<ScrapeSummary> {
        let items = self
            .scraper
            .scrape(request.query(), request.max_results())
            .await?;
        let found = items.len();

        let mut tally = IngestTally::default();
        for item in items {
            let listing_url = item.listing_url.clone();
            match self.ingest_one(item).await {
                Ok(true) => tally.inserted += 1,
                Ok(false) => tally.skipped += 1,
                Err(e) => {
                    tracing::warn!(%listing_url, error = %e, "failed to ingest listing");
                    tally.record_error(&listing_url, &e);
                }
            }
        }

        let status = if tally.errors == 0 {
            ScrapeRunStatus::Succeeded
        } else {
            ScrapeRunStatus::SucceededWithErrors
        };
        let finished = self
            .store
            .finish_scrape_run(
                run.id,
                ScrapeRunOutcome {
                    status,
                    properties_found: i32::try_from(found).unwrap_or(i32::MAX),
                    error_count: i32::try_from(tally.errors).unwrap_or(i32::MAX),
                    error_samples: tally.samples,
                },
            )
            .await?;

        Ok(ScrapeSummary {
            run_id: finished.id,
            status: finished.status,
            query: request.query().to_string(),
            max_results: request.max_results(),
            properties_found: found,
            inserted_count: tally.inserted,
            skipped_count: tally.skipped,
            error_count: tally.errors,
        })
    }

    /// Inserts one listing. Returns false if it was already stored.
    async fn ingest_one(&self, item: NewProperty) -> std::result::Result<bool, ListingError> {
        if self.store.property_exists(&item.listing_url).await? {
            return Ok(false);
        }
        match self.store.insert_property(item).await {
            Ok(_) => Ok(true),
            // Lost a race with a concurrent insert of the same URL.
            Err(ListingError::Duplicate { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Closes a run as failed. Errors here are logged, not returned.
    async fn mark_failed(&self, run_id: ScrapeRunId, cause: &ScrapeError) {
        let outcome = ScrapeRunOutcome {
            status: ScrapeRunStatus::Failed,
            properties_found: 0,
            error_count: 1,
            error_samples: vec![ErrorSample::general(cause.to_string())],
        };
        if let Err(e) = self.store.finish_scrape_run(run_id, outcome).await {
            tracing::warn!(%run_id, error = %e, "could not mark scrape run as failed");
        }
    }
}
