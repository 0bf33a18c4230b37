//! The analysis service trait.

use async_trait::async_trait;
use tracing::error;
use vidcheck_models::{AnalysisResponse, AnalysisResult};

use crate::error::ServiceResult;
use crate::request::AnalysisRequest;

/// Accepts a video reference and produces a classification.
///
/// Implementations must be swappable without touching the orchestrator or
/// the validator: the request shape, the result shape and the error
/// semantics of [`crate::ServiceError`] are the whole contract.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Name of the backend for logging.
    fn name(&self) -> &'static str;

    /// Analyze a request.
    async fn analyze(&self, request: AnalysisRequest) -> ServiceResult<AnalysisResult>;

    /// Analyze a request and fold the outcome into an [`AnalysisResponse`].
    ///
    /// Faults are logged with their cause; the response only carries the
    /// public message.
    async fn respond(&self, request: AnalysisRequest) -> AnalysisResponse {
        match self.analyze(request).await {
            Ok(result) => AnalysisResponse::success(result),
            Err(e) => {
                if !e.is_client_error() {
                    error!(service = self.name(), error = %e, "Video analysis error");
                }
                AnalysisResponse::failure(e.public_message())
            }
        }
    }
}
