//! Analysis result data models.
//!
//! This module defines the result contract shared by the analysis service,
//! the HTTP endpoint and the stage orchestrator:
//! - [`AnalysisResult`]: the classification payload
//! - [`AnalysisResponse`]: success-or-failure union used inside Rust code
//! - [`AnalysisEnvelope`]: the `{success, result, error}` JSON body on the wire
//!
//! Wire field names (`isAIGenerated`, `processingTime`, `videoDetails.duration`,
//! `videoDetails.size`) are kept stable for existing clients.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Error returned when a request carries neither a file nor a URL.
pub const MISSING_INPUT_MESSAGE: &str = "No video file or URL provided";

/// Generic error returned for any unexpected analysis fault.
pub const ANALYSIS_FAILED_MESSAGE: &str = "Failed to analyze video";

/// Fallback used by clients when a failed envelope carries no error text.
pub const CLIENT_FAILURE_MESSAGE: &str = "Analysis failed";

/// Lower bound of a reported confidence score.
pub const MIN_CONFIDENCE: f64 = 0.0;

/// Upper bound of a reported confidence score.
pub const MAX_CONFIDENCE: f64 = 100.0;

/// Basic properties of the analyzed video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoDetails {
    /// Duration in seconds
    #[serde(rename = "duration")]
    pub duration_seconds: f64,

    /// Container format, uppercase extension (e.g. `MP4`)
    pub format: String,

    /// Size in bytes (0 for URL submissions)
    #[serde(rename = "size")]
    pub size_bytes: u64,
}

/// Classification of a video.
///
/// Immutable once produced; the receiver owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisResult {
    /// Whether the video is classified as AI-generated
    #[serde(rename = "isAIGenerated")]
    pub is_ai_generated: bool,

    /// Certainty of the classification, 0-100 with one decimal
    pub confidence: f64,

    /// Time spent analyzing, in milliseconds
    #[serde(rename = "processingTime")]
    pub processing_time_ms: u64,

    #[serde(rename = "videoDetails")]
    pub video_details: VideoDetails,
}

impl AnalysisResult {
    /// Human-readable verdict.
    pub fn verdict(&self) -> &'static str {
        if self.is_ai_generated {
            "AI-generated"
        } else {
            "authentic"
        }
    }

    /// Check that the confidence is within 0-100.
    pub fn has_valid_confidence(&self) -> bool {
        (MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&self.confidence)
    }
}

/// Round to one decimal place.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Outcome of an analysis request.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResponse {
    Success { result: AnalysisResult },
    Failure { error_message: String },
}

impl AnalysisResponse {
    pub fn success(result: AnalysisResult) -> Self {
        Self::Success { result }
    }

    pub fn failure(error_message: impl Into<String>) -> Self {
        Self::Failure {
            error_message: error_message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The result, if the analysis succeeded.
    pub fn into_result(self) -> Option<AnalysisResult> {
        match self {
            Self::Success { result } => Some(result),
            Self::Failure { .. } => None,
        }
    }
}

/// JSON body exchanged with the analysis endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisEnvelope {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalysisResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisEnvelope {
    /// Failure envelope with the given error text.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(message.into()),
        }
    }

    /// Interpret an envelope received from the service.
    ///
    /// Only `success: true` with a result present counts as success; anything
    /// else is a failure carrying the envelope's error or a generic message.
    pub fn into_response(self) -> AnalysisResponse {
        match (self.success, self.result) {
            (true, Some(result)) => AnalysisResponse::Success { result },
            _ => AnalysisResponse::Failure {
                error_message: self
                    .error
                    .unwrap_or_else(|| CLIENT_FAILURE_MESSAGE.to_string()),
            },
        }
    }
}

impl From<AnalysisResponse> for AnalysisEnvelope {
    fn from(response: AnalysisResponse) -> Self {
        match response {
            AnalysisResponse::Success { result } => Self {
                success: true,
                result: Some(result),
                error: None,
            },
            AnalysisResponse::Failure { error_message } => Self::error(error_message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            is_ai_generated: true,
            confidence: 87.3,
            processing_time_ms: 2512,
            video_details: VideoDetails {
                duration_seconds: 42.5,
                format: "MP4".to_string(),
                size_bytes: 1024,
            },
        }
    }

    #[test]
    fn test_result_wire_names() {
        let json = serde_json::to_value(sample_result()).unwrap();
        assert_eq!(json["isAIGenerated"], true);
        assert_eq!(json["confidence"], 87.3);
        assert_eq!(json["processingTime"], 2512);
        assert_eq!(json["videoDetails"]["duration"], 42.5);
        assert_eq!(json["videoDetails"]["format"], "MP4");
        assert_eq!(json["videoDetails"]["size"], 1024);
    }

    #[test]
    fn test_success_envelope() {
        let envelope = AnalysisEnvelope::from(AnalysisResponse::success(sample_result()));
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_missing_input_envelope() {
        let json = serde_json::to_value(AnalysisEnvelope::error(MISSING_INPUT_MESSAGE)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "error": "No video file or URL provided"})
        );
    }

    #[test]
    fn test_envelope_into_response() {
        let ok: AnalysisEnvelope = serde_json::from_value(serde_json::json!({
            "success": true,
            "result": serde_json::to_value(sample_result()).unwrap(),
        }))
        .unwrap();
        assert_eq!(ok.into_response(), AnalysisResponse::success(sample_result()));

        let failed: AnalysisEnvelope =
            serde_json::from_str(r#"{"success": false, "error": "Failed to analyze video"}"#).unwrap();
        assert_eq!(
            failed.into_response(),
            AnalysisResponse::failure(ANALYSIS_FAILED_MESSAGE)
        );
    }

    #[test]
    fn test_success_without_result_is_failure() {
        let envelope: AnalysisEnvelope = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert_eq!(
            envelope.into_response(),
            AnalysisResponse::failure(CLIENT_FAILURE_MESSAGE)
        );
    }

    #[test]
    fn test_round_to_tenth() {
        assert_eq!(round_to_tenth(87.349), 87.3);
        assert_eq!(round_to_tenth(99.96), 100.0);
        assert_eq!(round_to_tenth(70.0), 70.0);
    }

    #[test]
    fn test_verdict() {
        let mut result = sample_result();
        assert_eq!(result.verdict(), "AI-generated");
        result.is_ai_generated = false;
        assert_eq!(result.verdict(), "authentic");
        assert!(result.has_valid_confidence());
    }
}
