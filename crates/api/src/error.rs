//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::ServiceError;
use etag_cache::TagError;
use thiserror::Error;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found.
    #[error("{0}")]
    NotFound(String),
    /// A conditional request named a tag that is not current.
    #[error("The cart was modified since it was last fetched")]
    PreconditionFailed,
    /// Application service error.
    #[error(transparent)]
    Service(#[from] ServiceError),
    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::PreconditionFailed => {
                metrics::counter!("http_precondition_failed_total").increment(1);
                (
                    StatusCode::PRECONDITION_FAILED,
                    ApiError::PreconditionFailed.to_string(),
                )
            }
            ApiError::Service(err) => service_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn service_error_to_response(err: ServiceError) -> (StatusCode, String) {
    if !err.is_client_error() {
        tracing::error!(error = %err, "cart service failure");
        return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string());
    }

    let status = match &err {
        ServiceError::CartNotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::ArticleAlreadyAdded(_) | ServiceError::Conflict(_) => StatusCode::CONFLICT,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, err.to_string())
}

impl From<TagError> for ApiError {
    fn from(err: TagError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
