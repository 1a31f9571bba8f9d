//! HTTP backend for BRRRR Radar.
//!
//! Provides the health endpoint polled by the status page, property search,
//! and synchronous scrape runs, with structured logging (tracing) and
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use listings::ListingStore;
use metrics_exporter_prometheus::PrometheusHandle;
use scraper::{MockScraper, ScrapeService};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: ListingStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
    cors_origin: &str,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/properties", get(routes::properties::list::<S>))
        .route("/scrape/run", post(routes::scrape::run::<S>))
        .route("/scrape/runs", get(routes::scrape::list::<S>))
        .route("/scrape/runs/{id}", get(routes::scrape::get::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(cors_layer(cors_origin))
        .layer(TraceLayer::new_for_http())
}

/// Allows cross-origin calls from the configured frontend origin only.
pub fn cors_layer(origin: &str) -> CorsLayer {
    let origin = origin.parse::<HeaderValue>().unwrap_or_else(|_| {
        tracing::warn!(%origin, "invalid CORS origin, using default");
        HeaderValue::from_static(config::DEFAULT_CORS_ORIGIN)
    });

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Creates the default application state backed by the mock scraper.
pub fn create_default_state<S: ListingStore + Clone + 'static>(store: S) -> Arc<AppState<S>> {
    let scrape_service = ScrapeService::new(store.clone(), MockScraper::new());
    Arc::new(AppState {
        store,
        scrape_service,
    })
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set.
pub fn init_tracing(default_filter: &str) {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
