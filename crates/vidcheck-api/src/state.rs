//! Application state.

use std::sync::Arc;

use vidcheck_analysis::{
    build_strategy, AnalysisService, DelayProvider, LocalAnalysisService, RandomDelay,
};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub analysis: Arc<dyn AnalysisService>,
    /// Name of the configured scoring strategy, reported by `/ready`
    pub strategy: &'static str,
}

impl AppState {
    /// Create state with the configured in-process scoring strategy.
    pub fn new(config: ApiConfig) -> Self {
        Self::with_delay(config, Arc::new(RandomDelay))
    }

    /// Create state with a custom delay provider for the scorer.
    pub fn with_delay(config: ApiConfig, delay: Arc<dyn DelayProvider>) -> Self {
        let strategy = build_strategy(config.scoring_strategy, delay, config.analysis_delay);
        let name = strategy.name();
        Self {
            config,
            analysis: Arc::new(LocalAnalysisService::new(strategy)),
            strategy: name,
        }
    }

    /// Create state around an existing analysis service.
    pub fn with_service(
        config: ApiConfig,
        analysis: Arc<dyn AnalysisService>,
        strategy: &'static str,
    ) -> Self {
        Self {
            config,
            analysis,
            strategy,
        }
    }
}
