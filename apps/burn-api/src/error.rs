//! Error types for the burn API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use field_burner::{BurnError, RequestError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} is required")]
    MissingInput(&'static str),

    #[error("Invalid {0}")]
    InvalidInput(&'static str),

    #[error("Request body is too large")]
    PayloadTooLarge,

    #[error("Could not read PDF: {0}")]
    MalformedDocument(String),

    #[error("File not found: {0}")]
    NotFound(String),

    /// Anything the caller cannot fix. Details are logged, never returned.
    #[error("Burn failed: {0}")]
    BurnFailed(#[from] anyhow::Error),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::MissingInput(what) => ApiError::MissingInput(what),
            RequestError::InvalidInput(what) => ApiError::InvalidInput(what),
        }
    }
}

impl From<BurnError> for ApiError {
    fn from(err: BurnError) -> Self {
        match err {
            BurnError::MalformedDocument(msg) => ApiError::MalformedDocument(msg),
            other => ApiError::BurnFailed(other.into()),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::BurnFailed(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::MissingInput(_) => {
                (StatusCode::BAD_REQUEST, "MISSING_INPUT", self.to_string())
            }
            ApiError::InvalidInput(_) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", self.to_string())
            }
            ApiError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                self.to_string(),
            ),
            ApiError::MalformedDocument(msg) => {
                tracing::warn!("Rejected document: {}", msg);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "MALFORMED_DOCUMENT",
                    "Could not read PDF".to_string(),
                )
            }
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", "Not found".to_string()),
            ApiError::BurnFailed(e) => {
                tracing::error!("Burn failed: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "BURN_FAILED",
                    "Failed to sign PDF".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            error: message,
            code,
        };

        (status, Json(body)).into_response()
    }
}
