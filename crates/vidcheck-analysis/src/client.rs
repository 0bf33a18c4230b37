//! HTTP client for a remote analysis endpoint.
//!
//! Requests are sent as `multipart/form-data` with a `video` file part or a
//! `url` text part, and responses are parsed as the `{success, result, error}`
//! envelope regardless of status code.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, StatusCode};
use tracing::{debug, warn};
use vidcheck_models::{
    AnalysisEnvelope, AnalysisResponse, AnalysisResult, ANALYSIS_FAILED_MESSAGE,
    MISSING_INPUT_MESSAGE,
};

use crate::error::{ServiceError, ServiceResult};
use crate::request::AnalysisRequest;
use crate::service::AnalysisService;

/// Path of the analysis endpoint relative to the server base URL.
pub const ANALYZE_VIDEO_PATH: &str = "/api/analyze-video";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for a VidCheck-compatible analysis server.
#[derive(Clone)]
pub struct HttpAnalysisClient {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpAnalysisClient {
    /// Create a client for the server at `base_url`.
    pub fn new(base_url: &str) -> ServiceResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a per-request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> ServiceResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), ANALYZE_VIDEO_PATH),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_form(request: AnalysisRequest) -> Form {
        let mut form = Form::new();
        if let Some(video) = request.video {
            let part = Part::stream(Body::from(video.content)).file_name(video.file_name);
            form = form.part("video", part);
        }
        if let Some(url) = request.url {
            form = form.text("url", url);
        }
        form
    }

    /// Map a status code and envelope into the service contract.
    fn interpret(status: StatusCode, envelope: AnalysisEnvelope) -> ServiceResult<AnalysisResult> {
        match envelope.into_response() {
            AnalysisResponse::Success { result } if status.is_success() => Ok(result),
            AnalysisResponse::Success { .. } => Err(ServiceError::InvalidResponse(format!(
                "success envelope with status {}",
                status
            ))),
            AnalysisResponse::Failure { error_message } if status.is_client_error() => {
                if error_message == MISSING_INPUT_MESSAGE {
                    Err(ServiceError::MissingInput)
                } else {
                    Err(ServiceError::Rejected(error_message))
                }
            }
            AnalysisResponse::Failure { error_message } => Err(ServiceError::Remote {
                status: status.as_u16(),
                message: error_message,
            }),
        }
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisClient {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn analyze(&self, request: AnalysisRequest) -> ServiceResult<AnalysisResult> {
        debug!(endpoint = %self.endpoint, "Posting analysis request");

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(Self::build_form(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ServiceError::Timeout(self.timeout)
                } else {
                    ServiceError::from(e)
                }
            })?;

        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<AnalysisEnvelope>(&body) {
            Ok(envelope) => Self::interpret(status, envelope),
            Err(e) if status.is_success() => {
                Err(ServiceError::InvalidResponse(format!("malformed envelope: {}", e)))
            }
            Err(_) => {
                warn!(status = status.as_u16(), "Analysis server returned a non-JSON error body");
                Err(ServiceError::Remote {
                    status: status.as_u16(),
                    message: ANALYSIS_FAILED_MESSAGE.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::UploadedVideo;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn success_body() -> serde_json::Value {
        json!({
            "success": true,
            "result": {
                "isAIGenerated": false,
                "confidence": 83.4,
                "processingTime": 2450,
                "videoDetails": {"duration": 61.2, "format": "MP4", "size": 0}
            }
        })
    }

    #[tokio::test]
    async fn test_url_request_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ANALYZE_VIDEO_PATH))
            .and(body_string_contains("name=\"url\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpAnalysisClient::new(&server.uri()).unwrap();
        let result = client
            .analyze(AnalysisRequest::with_url("https://example.com/a.mp4"))
            .await
            .unwrap();

        assert!(!result.is_ai_generated);
        assert_eq!(result.confidence, 83.4);
        assert_eq!(result.processing_time_ms, 2450);
    }

    #[tokio::test]
    async fn test_file_request_uses_video_part() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ANALYZE_VIDEO_PATH))
            .and(body_string_contains("name=\"video\"; filename=\"clip.mp4\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpAnalysisClient::new(&format!("{}/", server.uri())).unwrap();
        let request = AnalysisRequest::with_video(UploadedVideo::new("clip.mp4", b"data".to_vec()));
        assert!(client.analyze(request).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_input_maps_to_client_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"success": false, "error": "No video file or URL provided"})),
            )
            .mount(&server)
            .await;

        let client = HttpAnalysisClient::new(&server.uri()).unwrap();
        let err = client.analyze(AnalysisRequest::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::MissingInput));
    }

    #[tokio::test]
    async fn test_server_error_keeps_remote_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({"success": false, "error": "Failed to analyze video"})),
            )
            .mount(&server)
            .await;

        let client = HttpAnalysisClient::new(&server.uri()).unwrap();
        let response = client
            .respond(AnalysisRequest::with_url("https://example.com/a.mp4"))
            .await;
        assert_eq!(response, AnalysisResponse::failure("Failed to analyze video"));
    }

    #[tokio::test]
    async fn test_non_json_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let client = HttpAnalysisClient::new(&server.uri()).unwrap();
        let err = client
            .analyze(AnalysisRequest::with_url("https://example.com/a.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Remote { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = HttpAnalysisClient::new(&server.uri()).unwrap();
        let err = client
            .analyze(AnalysisRequest::with_url("https://example.com/a.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(success_body())
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client =
            HttpAnalysisClient::with_timeout(&server.uri(), Duration::from_millis(50)).unwrap();
        let err = client
            .analyze(AnalysisRequest::with_url("https://example.com/a.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Timeout(_)));
    }

    #[test]
    fn test_endpoint_joining() {
        let client = HttpAnalysisClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8000/api/analyze-video");
    }
}
