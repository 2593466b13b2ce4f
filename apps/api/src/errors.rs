use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::crawl::CrawlError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upstream fetch failed: {0}")]
    UpstreamFetch(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<CrawlError> for AppError {
    fn from(err: CrawlError) -> Self {
        match err {
            CrawlError::HostNotAllowed(_) | CrawlError::InvalidUrl { .. } => {
                AppError::Validation(err.to_string())
            }
            CrawlError::ListingFetch(_) | CrawlError::PostingFetch(_) => {
                AppError::UpstreamFetch(err.to_string())
            }
            CrawlError::NothingExtracted(_) => AppError::NotFound("no_skills_found".to_string()),
            CrawlError::Store(e) => AppError::Store(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UpstreamFetch(msg) => {
                tracing::warn!("Upstream fetch error: {msg}");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_FETCH_ERROR", msg.clone())
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::fetcher::FetchError;

    #[test]
    fn test_crawl_errors_map_to_status_codes() {
        let cases = [
            (CrawlError::HostNotAllowed("evil.com".into()), StatusCode::BAD_REQUEST),
            (CrawlError::NothingExtracted("u".into()), StatusCode::NOT_FOUND),
            (
                CrawlError::ListingFetch(FetchError::Status { url: "u".into(), status: 503 }),
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }
}
