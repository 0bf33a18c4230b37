//! Error types for analysis operations.

use std::time::Duration;

use thiserror::Error;
use vidcheck_models::{ANALYSIS_FAILED_MESSAGE, MISSING_INPUT_MESSAGE};

/// Result type for analysis operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors that can occur while analyzing a video.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("No video file or URL provided")]
    MissingInput,

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Analysis service returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Analysis timed out after {0:?}")]
    Timeout(Duration),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True when the caller sent something the service cannot analyze.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ServiceError::MissingInput | ServiceError::Rejected(_))
    }

    /// Message safe to show to the caller.
    ///
    /// Faults originating in this process map to a generic message; the
    /// detailed cause is only available through `Display` for logging.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::MissingInput => MISSING_INPUT_MESSAGE.to_string(),
            ServiceError::Rejected(message) => message.clone(),
            ServiceError::Remote { message, .. } => message.clone(),
            ServiceError::Timeout(_)
            | ServiceError::Transport(_)
            | ServiceError::InvalidResponse(_)
            | ServiceError::Internal(_) => ANALYSIS_FAILED_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ServiceError::InvalidResponse(e.to_string())
        } else {
            ServiceError::Transport(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_message_hides_internal_detail() {
        let err = ServiceError::internal("model weights missing at /opt/models");
        assert_eq!(err.public_message(), "Failed to analyze video");
        assert!(err.to_string().contains("/opt/models"));
    }

    #[test]
    fn test_client_errors() {
        assert!(ServiceError::MissingInput.is_client_error());
        assert_eq!(
            ServiceError::MissingInput.public_message(),
            "No video file or URL provided"
        );
        assert!(!ServiceError::Timeout(Duration::from_secs(1)).is_client_error());
    }
}
