//! Health check handlers.

use axum::extract::State;
use axum::http::Uri;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub analysis: AnalysisCheck,
}

#[derive(Serialize)]
pub struct AnalysisCheck {
    pub status: String,
    /// Analysis backend (`local`, `http`)
    pub service: String,
    /// Configured scoring strategy
    pub strategy: String,
}

/// Readiness check endpoint (readiness probe).
///
/// The analysis backend is in-process, so readiness reports its
/// configuration rather than probing a dependency.
pub async fn ready(State(state): State<AppState>) -> Json<ReadinessResponse> {
    Json(ReadinessResponse {
        status: "ready".to_string(),
        checks: ReadinessChecks {
            analysis: AnalysisCheck {
                status: "ok".to_string(),
                service: state.analysis.name().to_string(),
                strategy: state.strategy.to_string(),
            },
        },
    })
}

/// Fallback for unknown routes.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}
