//! Liveness endpoint polled by the status page.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health: reports that the backend process is up.
///
/// Does not touch the listing store.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
