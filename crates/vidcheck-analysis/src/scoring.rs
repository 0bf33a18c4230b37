//! Scoring strategies.
//!
//! A [`ScoringStrategy`] turns one resolved [`AnalysisInput`] into an
//! [`AnalysisResult`]. The mock strategy draws random values; a real model
//! backend implements the same trait and is selected through configuration.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use tracing::debug;
use vidcheck_models::{round_to_tenth, AnalysisResult, VideoDetails};

use crate::delay::{DelayBounds, DelayProvider};
use crate::error::{ServiceError, ServiceResult};
use crate::request::AnalysisInput;

/// Format reported when the input carries no file extension (URL submissions).
pub const DEFAULT_FORMAT: &str = "MP4";

/// Produces a classification for a video.
#[async_trait]
pub trait ScoringStrategy: Send + Sync {
    /// Get the name of this strategy for logging and readiness checks.
    fn name(&self) -> &'static str;

    /// Score a single input.
    async fn score(&self, input: &AnalysisInput) -> ServiceResult<AnalysisResult>;
}

/// Parameters of the mock scorer's random draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockScoringParams {
    pub min_confidence: f64,
    pub max_confidence: f64,
    /// Probability that a video is classified as AI-generated
    pub ai_probability: f64,
    pub min_duration_secs: f64,
    pub max_duration_secs: f64,
}

impl Default for MockScoringParams {
    fn default() -> Self {
        Self {
            min_confidence: 70.0,
            max_confidence: 100.0,
            ai_probability: 0.4,
            min_duration_secs: 10.0,
            max_duration_secs: 130.0,
        }
    }
}

impl MockScoringParams {
    /// Reject parameters the random draws cannot sample from.
    pub fn check(&self) -> ServiceResult<()> {
        if !(0.0..=1.0).contains(&self.ai_probability) {
            return Err(ServiceError::internal(format!(
                "ai_probability out of range: {}",
                self.ai_probability
            )));
        }
        check_range("confidence", self.min_confidence, self.max_confidence)?;
        check_range("duration", self.min_duration_secs, self.max_duration_secs)
    }
}

fn check_range(label: &str, min: f64, max: f64) -> ServiceResult<()> {
    if !min.is_finite() || !max.is_finite() || min > max {
        return Err(ServiceError::internal(format!(
            "invalid {} range: {}..={}",
            label, min, max
        )));
    }
    Ok(())
}

/// Placeholder scorer: waits a simulated processing time, then returns
/// random but well-formed values.
///
/// `processing_time_ms` is the simulated delay actually reported by the
/// delay provider, and `is_ai_generated` is drawn independently of the
/// confidence.
pub struct MockScoringStrategy {
    delay: Arc<dyn DelayProvider>,
    bounds: DelayBounds,
    params: MockScoringParams,
}

impl MockScoringStrategy {
    pub fn new(delay: Arc<dyn DelayProvider>, bounds: DelayBounds) -> Self {
        Self {
            delay,
            bounds,
            params: MockScoringParams::default(),
        }
    }

    pub fn with_params(mut self, params: MockScoringParams) -> Self {
        self.params = params;
        self
    }

    pub fn bounds(&self) -> DelayBounds {
        self.bounds
    }
}

#[async_trait]
impl ScoringStrategy for MockScoringStrategy {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn score(&self, input: &AnalysisInput) -> ServiceResult<AnalysisResult> {
        let waited = self.delay.delay(self.bounds).await;
        let params = self.params;

        params.check()?;

        // ThreadRng is !Send; draw everything after the await point.
        let (confidence, is_ai_generated, duration_seconds) = {
            let mut rng = rand::thread_rng();
            (
                rng.gen_range(params.min_confidence..=params.max_confidence),
                rng.gen_bool(params.ai_probability),
                rng.gen_range(params.min_duration_secs..=params.max_duration_secs),
            )
        };

        let result = AnalysisResult {
            is_ai_generated,
            confidence: round_to_tenth(confidence),
            processing_time_ms: (waited.as_secs_f64() * 1000.0).round() as u64,
            video_details: VideoDetails {
                duration_seconds,
                format: input
                    .file_format()
                    .unwrap_or_else(|| DEFAULT_FORMAT.to_string()),
                size_bytes: input.size_bytes(),
            },
        };

        debug!(
            input = input.kind(),
            confidence = result.confidence,
            ai = result.is_ai_generated,
            "Mock scoring complete"
        );

        Ok(result)
    }
}

/// Scoring backends selectable through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyKind {
    #[default]
    Mock,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Mock => "mock",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(StrategyKind::Mock),
            other => Err(format!("unknown scoring strategy '{}'", other)),
        }
    }
}

/// Build the strategy for `kind`.
pub fn build_strategy(
    kind: StrategyKind,
    delay: Arc<dyn DelayProvider>,
    bounds: DelayBounds,
) -> Arc<dyn ScoringStrategy> {
    match kind {
        StrategyKind::Mock => Arc::new(MockScoringStrategy::new(delay, bounds)),
    }
}
