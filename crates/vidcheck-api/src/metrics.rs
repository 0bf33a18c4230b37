//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "vidcheck_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "vidcheck_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "vidcheck_http_requests_in_flight";

    // Analysis metrics
    pub const ANALYSES_COMPLETED_TOTAL: &str = "vidcheck_analyses_completed_total";
    pub const ANALYSES_REJECTED_TOTAL: &str = "vidcheck_analyses_rejected_total";
    pub const ANALYSES_FAILED_TOTAL: &str = "vidcheck_analyses_failed_total";
    pub const ANALYSIS_DURATION_SECONDS: &str = "vidcheck_analysis_duration_seconds";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a successful analysis.
pub fn record_analysis_completed(source: &str, ai_generated: bool, duration_secs: f64) {
    let labels = [
        ("source", source.to_string()),
        ("verdict", if ai_generated { "ai" } else { "authentic" }.to_string()),
    ];
    counter!(names::ANALYSES_COMPLETED_TOTAL, &labels).increment(1);
    histogram!(names::ANALYSIS_DURATION_SECONDS, "source" => source.to_string())
        .record(duration_secs);
}

/// Record a request refused before or by the analysis service.
pub fn record_analysis_rejected(reason: &str) {
    counter!(names::ANALYSES_REJECTED_TOTAL, "reason" => reason.to_string()).increment(1);
}

/// Record an analysis fault.
pub fn record_analysis_failed(source: &str) {
    counter!(names::ANALYSES_FAILED_TOTAL, "source" => source.to_string()).increment(1);
}

/// Collapse unknown paths so probes can't inflate label cardinality.
fn sanitize_path(path: &str) -> String {
    match path {
        "/api/analyze-video" | "/health" | "/healthz" | "/ready" | "/metrics" => path.to_string(),
        _ => "/:unmatched".to_string(),
    }
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("/api/analyze-video"), "/api/analyze-video");
        assert_eq!(sanitize_path("/healthz"), "/healthz");
        assert_eq!(sanitize_path("/wp-admin/setup.php"), "/:unmatched");
    }
}
