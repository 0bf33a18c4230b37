//! API configuration.

use std::time::Duration;

use tracing::warn;
use vidcheck_analysis::{DelayBounds, StrategyKind};
use vidcheck_models::MAX_FILE_SIZE;

/// Multipart framing allowance on top of the largest accepted upload.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Request timeout
    pub request_timeout: Duration,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Expose `/metrics`
    pub metrics_enabled: bool,
    /// Simulated analysis time of the mock scorer
    pub analysis_delay: DelayBounds,
    /// Scoring backend
    pub scoring_strategy: StrategyKind,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            request_timeout: Duration::from_secs(30),
            max_body_size: default_max_body_size(),
            environment: "development".to_string(),
            metrics_enabled: true,
            analysis_delay: DelayBounds::analysis_default(),
            scoring_strategy: StrategyKind::Mock,
        }
    }
}

fn default_max_body_size() -> usize {
    MAX_FILE_SIZE as usize + MULTIPART_OVERHEAD
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = DelayBounds::analysis_default();
        let min_delay_ms =
            env_parse("ANALYSIS_MIN_DELAY_MS").unwrap_or(defaults.min.as_millis() as u64);
        let max_delay_ms =
            env_parse("ANALYSIS_MAX_DELAY_MS").unwrap_or(defaults.max.as_millis() as u64);

        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_parse("API_PORT").unwrap_or(8000),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
            request_timeout: Duration::from_secs(env_parse("REQUEST_TIMEOUT").unwrap_or(30)),
            max_body_size: env_parse("MAX_BODY_SIZE").unwrap_or_else(default_max_body_size),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            analysis_delay: DelayBounds::from_millis(min_delay_ms, max_delay_ms),
            scoring_strategy: parse_strategy(std::env::var("SCORING_STRATEGY").ok().as_deref()),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

/// Unknown strategy names fall back to the mock scorer.
fn parse_strategy(value: Option<&str>) -> StrategyKind {
    match value {
        None => StrategyKind::default(),
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("{}; falling back to {}", e, StrategyKind::default());
            StrategyKind::default()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_limit_covers_largest_upload() {
        let config = ApiConfig::default();
        assert!(config.max_body_size > MAX_FILE_SIZE as usize);
    }

    #[test]
    fn test_parse_strategy_fallback() {
        assert_eq!(parse_strategy(None), StrategyKind::Mock);
        assert_eq!(parse_strategy(Some("mock")), StrategyKind::Mock);
        assert_eq!(parse_strategy(Some("tensorflow")), StrategyKind::Mock);
    }
}
