//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;
use vidcheck_analysis::ServiceError;
use vidcheck_models::{
    AnalysisEnvelope, ValidationError, ANALYSIS_FAILED_MESSAGE, MAX_FILE_SIZE, MISSING_INPUT_MESSAGE,
};

/// Returned when the body is over the limit and its length is unknown or
/// within the file size policy.
pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "Request body too large";

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{}", MISSING_INPUT_MESSAGE)]
    MissingInput,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Body rejected by the request size limit before it was read.
    #[error("Payload too large (content-length: {content_length:?})")]
    PayloadTooLarge { content_length: Option<u64> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Analysis error: {0}")]
    Analysis(ServiceError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingInput | ApiError::BadRequest(_) | ApiError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Analysis(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Analysis(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            ApiError::MissingInput => "missing_input",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Validation(e) => e.code(),
            ApiError::PayloadTooLarge { .. } => "payload_too_large",
            ApiError::NotFound(_) => "not_found",
            ApiError::Analysis(ServiceError::Rejected(_)) => "rejected",
            ApiError::Analysis(_) | ApiError::Internal(_) => "internal",
        }
    }

    /// Message safe to return to the caller.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::MissingInput => MISSING_INPUT_MESSAGE.to_string(),
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => msg.clone(),
            ApiError::Validation(e) => e.to_string(),
            ApiError::PayloadTooLarge {
                content_length: Some(size_bytes),
            } if *size_bytes > MAX_FILE_SIZE => ValidationError::FileTooLarge {
                size_bytes: *size_bytes,
            }
            .to_string(),
            ApiError::PayloadTooLarge { .. } => PAYLOAD_TOO_LARGE_MESSAGE.to_string(),
            ApiError::Analysis(e) => e.public_message(),
            ApiError::Internal(_) => ANALYSIS_FAILED_MESSAGE.to_string(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::MissingInput => ApiError::MissingInput,
            other => ApiError::Analysis(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal causes stay in the logs.
        if status.is_server_error() {
            error!(error = %self, "Analysis error");
        }

        let body = AnalysisEnvelope::error(self.public_message());
        (status, Json(body)).into_response()
    }
}
