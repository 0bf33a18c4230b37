//! Submission validation.
//!
//! Validation is a pure function of a submission and the policy constants in
//! [`crate::policy`]. Expected invalid input is reported as a
//! [`ValidationOutcome`] (or a [`ValidationError`] through [`check`]), never as
//! a panic. URLs are inspected syntactically only; no network access happens
//! here.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::policy::{bytes_to_mb, is_supported_format, supported_formats_label, MAX_FILE_SIZE, MAX_FILE_SIZE_MB};
use crate::submission::{file_extension, VideoFile, VideoSource, VideoSubmission};

/// Reasons a submission is rejected before it enters the pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("File size exceeds {}MB limit. Current size: {:.1}MB", MAX_FILE_SIZE_MB, size_in_mb(.size_bytes))]
    FileTooLarge { size_bytes: u64 },

    #[error("Unsupported format. Please use: {}", supported_formats_label())]
    UnsupportedFormat,

    #[error("Please enter a video URL")]
    EmptyUrl,

    #[error("Invalid URL format")]
    InvalidUrl,

    #[error("URL must use http or https (got '{scheme}')")]
    UnsupportedScheme { scheme: String },
}

impl ValidationError {
    /// Stable machine-readable code for logs and metrics labels.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::FileTooLarge { .. } => "file_too_large",
            ValidationError::UnsupportedFormat => "unsupported_format",
            ValidationError::EmptyUrl => "empty_url",
            ValidationError::InvalidUrl => "invalid_url",
            ValidationError::UnsupportedScheme { .. } => "unsupported_scheme",
        }
    }
}

fn size_in_mb(size_bytes: &u64) -> f64 {
    bytes_to_mb(*size_bytes)
}

/// Result of validating a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self {
            valid: true,
            error_reason: None,
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            error_reason: Some(reason.into()),
        }
    }
}

impl From<Result<(), ValidationError>> for ValidationOutcome {
    fn from(result: Result<(), ValidationError>) -> Self {
        match result {
            Ok(()) => Self::valid(),
            Err(e) => Self::invalid(e.to_string()),
        }
    }
}

/// Validate a submission against the intake policy.
pub fn validate(submission: &VideoSubmission) -> ValidationOutcome {
    check(submission).into()
}

/// Validate a submission, returning the typed rejection reason.
pub fn check(submission: &VideoSubmission) -> Result<(), ValidationError> {
    match &submission.source {
        VideoSource::File(file) => validate_file(file),
        VideoSource::Url(url) => validate_url(url).map(|_| ()),
    }
}

/// Validate an uploaded file's declared size and extension.
pub fn validate_file(file: &VideoFile) -> Result<(), ValidationError> {
    if file.size > MAX_FILE_SIZE {
        return Err(ValidationError::FileTooLarge {
            size_bytes: file.size,
        });
    }

    match file.extension() {
        Some(ext) if is_supported_format(ext) => Ok(()),
        _ => Err(ValidationError::UnsupportedFormat),
    }
}

/// Validate a remote video URL and return it parsed.
///
/// The URL must be absolute, use `http` or `https`, and its last path
/// segment must end in a supported extension (any case).
pub fn validate_url(raw: &str) -> Result<Url, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }

    let url = Url::parse(raw).map_err(|_| ValidationError::InvalidUrl)?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::UnsupportedScheme {
            scheme: url.scheme().to_string(),
        });
    }

    let last_segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();

    match file_extension(last_segment) {
        Some(ext) if is_supported_format(ext) => Ok(url),
        _ => Err(ValidationError::UnsupportedFormat),
    }
}

/// A submission that passed validation.
///
/// The only way to obtain one is through `TryFrom<VideoSubmission>`, so code
/// taking a `ValidatedSubmission` cannot receive rejected input.
#[derive(Debug, Clone)]
pub struct ValidatedSubmission(VideoSubmission);

impl ValidatedSubmission {
    pub fn submission(&self) -> &VideoSubmission {
        &self.0
    }

    pub fn into_inner(self) -> VideoSubmission {
        self.0
    }
}

impl TryFrom<VideoSubmission> for ValidatedSubmission {
    type Error = ValidationError;

    fn try_from(submission: VideoSubmission) -> Result<Self, Self::Error> {
        check(&submission)?;
        Ok(Self(submission))
    }
}

impl AsRef<VideoSubmission> for ValidatedSubmission {
    fn as_ref(&self) -> &VideoSubmission {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    fn file(name: &str, size: u64) -> VideoSubmission {
        VideoSubmission::file(VideoFile::declared(name, size))
    }

    #[test]
    fn test_oversized_file_reports_size() {
        let outcome = validate(&file("clip.mp4", 310 * MB));
        assert!(!outcome.valid);
        let reason = outcome.error_reason.unwrap();
        assert!(reason.contains("310.0MB"), "{}", reason);
        assert!(reason.contains("300MB limit"), "{}", reason);
    }

    #[test]
    fn test_file_at_limit_is_accepted() {
        assert!(validate(&file("clip.mp4", MAX_FILE_SIZE)).valid);

        let outcome = validate(&file("clip.mp4", MAX_FILE_SIZE + 1));
        assert!(!outcome.valid);
        assert!(outcome.error_reason.unwrap().contains("300.0MB"));
    }

    #[test]
    fn test_size_checked_before_format() {
        let err = check(&file("clip.mkv", 400 * MB)).unwrap_err();
        assert_eq!(err, ValidationError::FileTooLarge { size_bytes: 400 * MB });
    }

    #[test]
    fn test_unsupported_file_extensions() {
        for name in ["clip.mkv", "clip", "clip.", "mp4", "clip.mp4.zip"] {
            let outcome = validate(&file(name, MB));
            assert!(!outcome.valid, "{} should be rejected", name);
            assert_eq!(
                outcome.error_reason.as_deref(),
                Some("Unsupported format. Please use: MP4, AVI, MOV, WEBM")
            );
        }
    }

    #[test]
    fn test_file_extension_case_insensitive() {
        for name in ["a.mp4", "b.AVI", "c.Mov", "d.WEBM", "e.tar.webm"] {
            assert!(validate(&file(name, MB)).valid, "{} should be accepted", name);
        }
    }

    #[test]
    fn test_url_unsupported_format() {
        let outcome = validate(&VideoSubmission::url("https://example.com/video.mkv"));
        assert!(!outcome.valid);
        assert!(outcome
            .error_reason
            .unwrap()
            .contains("MP4, AVI, MOV, WEBM"));
    }

    #[test]
    fn test_url_extension_case_insensitive() {
        for url in [
            "https://example.com/a/video.MP4",
            "http://example.com/clip.mov",
            "https://cdn.example.com/x/y/z.WEBM?token=abc#t=10",
        ] {
            assert!(validate_url(url).is_ok(), "{} should be accepted", url);
        }
    }

    #[test]
    fn test_url_scheme_must_be_http() {
        let err = validate_url("ftp://example.com/video.mp4").unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnsupportedScheme {
                scheme: "ftp".to_string()
            }
        );
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_malformed_url() {
        assert_eq!(
            validate_url("not a url").unwrap_err(),
            ValidationError::InvalidUrl
        );
        assert_eq!(
            validate_url("/relative/video.mp4").unwrap_err(),
            ValidationError::InvalidUrl
        );
    }

    #[test]
    fn test_blank_url() {
        assert_eq!(validate_url("   ").unwrap_err(), ValidationError::EmptyUrl);
    }

    #[test]
    fn test_url_extension_must_be_in_last_segment() {
        assert_eq!(
            validate_url("https://example.com/video.mp4/").unwrap_err(),
            ValidationError::UnsupportedFormat
        );
        assert_eq!(
            validate_url("https://example.com/video.mp4/watch").unwrap_err(),
            ValidationError::UnsupportedFormat
        );
        assert_eq!(
            validate_url("https://example.com").unwrap_err(),
            ValidationError::UnsupportedFormat
        );
    }

    #[test]
    fn test_validation_is_idempotent() {
        let submission = VideoSubmission::url("https://example.com/video.mkv");
        assert_eq!(validate(&submission), validate(&submission));

        let submission = file("clip.mp4", MB);
        assert_eq!(validate(&submission), validate(&submission));
    }

    #[test]
    fn test_validated_submission_gate() {
        let ok = ValidatedSubmission::try_from(file("clip.mp4", MB));
        assert!(ok.is_ok());

        let rejected = ValidatedSubmission::try_from(VideoSubmission::url("ftp://x.com/a.mp4"));
        assert!(rejected.is_err());
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(ValidationOutcome::invalid("nope")).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["errorReason"], "nope");

        let json = serde_json::to_value(ValidationOutcome::valid()).unwrap();
        assert!(json.get("errorReason").is_none());
    }
}
