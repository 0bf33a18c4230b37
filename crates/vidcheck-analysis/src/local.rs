//! In-process analysis service.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{info, warn};
use vidcheck_models::AnalysisResult;

use crate::error::ServiceResult;
use crate::request::AnalysisRequest;
use crate::scoring::ScoringStrategy;
use crate::service::AnalysisService;

/// Runs a [`ScoringStrategy`] in the current process.
///
/// Requests without a file or URL fail immediately, before any simulated
/// processing time is spent.
#[derive(Clone)]
pub struct LocalAnalysisService {
    strategy: Arc<dyn ScoringStrategy>,
}

impl LocalAnalysisService {
    pub fn new(strategy: Arc<dyn ScoringStrategy>) -> Self {
        Self { strategy }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }
}

#[async_trait]
impl AnalysisService for LocalAnalysisService {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn analyze(&self, request: AnalysisRequest) -> ServiceResult<AnalysisResult> {
        let input = request.into_input().map_err(|e| {
            warn!("Rejected analysis request: {}", e);
            e
        })?;

        let start = Instant::now();
        let result = self.strategy.score(&input).await?;

        info!(
            strategy = self.strategy.name(),
            input = input.kind(),
            ai_generated = result.is_ai_generated,
            confidence = result.confidence,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Video analyzed"
        );

        Ok(result)
    }
}
