//! Error types for revu-intake
//!
//! `PipelineError` is the failure taxonomy of a single submission;
//! `ApiError` is what HTTP handlers return.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure of one pipeline stage
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// Caller supplied no usable review text (never retried)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Classifier transport or provider failure
    #[error("Classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    /// Classifier answered with a label outside the fixed set (never retried)
    #[error("Unrecognized sentiment label: {0:?}")]
    UnrecognizedSentimentLabel(String),

    /// Record store write or read failure
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Notification sink failure
    #[error("Dispatch unavailable: {0}")]
    DispatchUnavailable(String),

    /// Stored row no longer decodes into a review record (never retried)
    #[error("Corrupt review record: {0}")]
    CorruptRecord(String),
}

impl PipelineError {
    /// Infrastructure faults are retried with backoff; everything else is final
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PipelineError::ClassifierUnavailable(_)
                | PipelineError::StoreUnavailable(_)
                | PipelineError::DispatchUnavailable(_)
        )
    }

    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::Validation(_) => "VALIDATION_ERROR",
            PipelineError::ClassifierUnavailable(_) => "CLASSIFIER_UNAVAILABLE",
            PipelineError::UnrecognizedSentimentLabel(_) => "UNRECOGNIZED_SENTIMENT_LABEL",
            PipelineError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            PipelineError::DispatchUnavailable(_) => "DISPATCH_UNAVAILABLE",
            PipelineError::CorruptRecord(_) => "CORRUPT_RECORD",
        }
    }

    /// HTTP status: caller faults are 4xx, integration bugs 500, outages 503
    pub fn status(&self) -> StatusCode {
        match self {
            PipelineError::Validation(_) => StatusCode::BAD_REQUEST,
            PipelineError::UnrecognizedSentimentLabel(_) | PipelineError::CorruptRecord(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            PipelineError::ClassifierUnavailable(_)
            | PipelineError::StoreUnavailable(_)
            | PipelineError::DispatchUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Pipeline stage failure
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Pipeline(ref err) => (err.status(), err.code(), err.to_string()),
        };

        if status.is_server_error() {
            tracing::error!(code = error_code, "{}", message);
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
