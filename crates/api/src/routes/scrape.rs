//! Scrape run trigger and history endpoints.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use common::ScrapeRunId;
use listings::store::ListingStoreExt;
use listings::{ErrorSample, ListingStore, ScrapeRun, ScrapeRunStatus};
use scraper::{ScrapeRequest, ScrapeSummary};
use serde::Serialize;

use super::AppState;
use crate::error::ApiError;

// -- Response types --

#[derive(Debug, Serialize)]
pub struct ScrapeRunSummaryResponse {
    pub id: ScrapeRunId,
    pub query: String,
    pub max_results: Option<i32>,
    pub status: ScrapeRunStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub properties_found: i32,
    pub error_count: i32,
}

#[derive(Debug, Serialize)]
pub struct ScrapeRunListResponse {
    pub items: Vec<ScrapeRunSummaryResponse>,
}

#[derive(Debug, Serialize)]
pub struct ScrapeRunDetailResponse {
    #[serde(flatten)]
    pub run: ScrapeRunSummaryResponse,
    pub error_samples: Option<Vec<ErrorSample>>,
}

impl From<ScrapeRun> for ScrapeRunDetailResponse {
    fn from(run: ScrapeRun) -> Self {
        let error_samples = run.error_samples.clone();
        Self {
            run: run.into(),
            error_samples,
        }
    }
}

impl From<ScrapeRun> for ScrapeRunSummaryResponse {
    fn from(run: ScrapeRun) -> Self {
        Self {
            id: run.id,
            query: run.query,
            max_results: run.max_results,
            status: run.status,
            started_at: run.started_at,
            finished_at: run.finished_at,
            properties_found: run.properties_found,
            error_count: run.error_count,
        }
    }
}

// -- Handlers --

/// POST /scrape/run: run the scraper synchronously and ingest its listings.
///
/// The body is read leniently: anything that is not a JSON object is
/// treated as `{}` and fails validation on the missing query.
#[tracing::instrument(skip(state, body))]
pub async fn run<S: ListingStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    body: Bytes,
) -> Result<Json<ScrapeSummary>, ApiError> {
    let payload: serde_json::Value =
        serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    let request = ScrapeRequest::from_json(&payload)?;

    let summary = state.scrape_service.run(request).await?;
    Ok(Json(summary))
}

/// GET /scrape/runs: the most recent runs, newest first.
#[tracing::instrument(skip(state))]
pub async fn list<S: ListingStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<ScrapeRunListResponse>, ApiError> {
    let runs = state.store.recent_scrape_runs().await?;
    Ok(Json(ScrapeRunListResponse {
        items: runs.into_iter().map(Into::into).collect(),
    }))
}

/// GET /scrape/runs/{id}: a single run including its error samples.
#[tracing::instrument(skip(state))]
pub async fn get<S: ListingStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ScrapeRunDetailResponse>, ApiError> {
    let not_found = || ApiError::NotFound(format!("ScrapeRun {id} not found"));

    let run_id = id
        .parse::<i64>()
        .map(ScrapeRunId::new)
        .map_err(|_| not_found())?;
    let run = state
        .store
        .get_scrape_run(run_id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(run.into()))
}
