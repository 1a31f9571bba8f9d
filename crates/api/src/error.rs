//! API error types with HTTP response mapping.
//!
//! Every error is rendered as
//! `{"error": {"code": ..., "message": ..., "details": ...}}`, with
//! `details` omitted when there is nothing to add.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use listings::ListingError;
use scraper::ScrapeError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Listing store error.
    Listing(ListingError),
    /// Scrape run error.
    Scrape(ScrapeError),
    /// Internal server error.
    Internal(String),
}

struct ErrorBody {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Option<serde_json::Value>,
}

impl ErrorBody {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self {
            ApiError::NotFound(msg) => ErrorBody::new(StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::BadRequest(msg) => {
                ErrorBody::new(StatusCode::BAD_REQUEST, "bad_request", msg)
            }
            ApiError::Listing(err) => listing_error_body(err),
            ApiError::Scrape(err) => scrape_error_body(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                ErrorBody::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
            }
        };

        let mut error = serde_json::json!({
            "code": body.code,
            "message": body.message,
        });
        if let Some(details) = body.details {
            error["details"] = details;
        }
        (body.status, axum::Json(serde_json::json!({ "error": error }))).into_response()
    }
}

fn listing_error_body(err: ListingError) -> ErrorBody {
    match &err {
        ListingError::PropertyNotFound(_) | ListingError::ScrapeRunNotFound(_) => {
            ErrorBody::new(StatusCode::NOT_FOUND, "not_found", err.to_string())
        }
        ListingError::Duplicate { .. } => {
            ErrorBody::new(StatusCode::CONFLICT, "conflict", err.to_string())
        }
        ListingError::InvalidData(_) => {
            ErrorBody::new(StatusCode::BAD_REQUEST, "bad_request", err.to_string())
        }
        _ => {
            tracing::error!(error = %err, "listing store failure");
            ErrorBody::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                err.to_string(),
            )
        }
    }
}

fn scrape_error_body(err: ScrapeError) -> ErrorBody {
    match err {
        ScrapeError::Validation(msg) => ErrorBody::new(StatusCode::BAD_REQUEST, "bad_request", msg),
        other => ErrorBody::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "scrape_failed",
            "Scrape run failed",
        )
        .with_details(serde_json::json!({ "reason": other.to_string() })),
    }
}

impl From<ListingError> for ApiError {
    fn from(err: ListingError) -> Self {
        ApiError::Listing(err)
    }
}

impl From<ScrapeError> for ApiError {
    fn from(err: ScrapeError) -> Self {
        ApiError::Scrape(err)
    }
}
