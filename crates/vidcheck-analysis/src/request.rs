//! Analysis request shapes.
//!
//! An [`AnalysisRequest`] mirrors the multipart form accepted by the analysis
//! endpoint: an optional `video` file part and an optional `url` text part.
//! [`AnalysisRequest::into_input`] resolves it to exactly one [`AnalysisInput`].

use bytes::Bytes;
use vidcheck_models::{file_extension, ValidatedSubmission, VideoSource};

use crate::error::{ServiceError, ServiceResult};

/// The `video` file part of a request.
#[derive(Clone)]
pub struct UploadedVideo {
    pub file_name: String,
    pub content: Bytes,
}

impl UploadedVideo {
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

impl std::fmt::Debug for UploadedVideo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedVideo")
            .field("file_name", &self.file_name)
            .field("size", &self.content.len())
            .finish()
    }
}

/// Raw request as received at the service boundary. Either part may be absent.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    pub video: Option<UploadedVideo>,
    pub url: Option<String>,
}

/// A request resolved to exactly one video source.
#[derive(Debug, Clone)]
pub enum AnalysisInput {
    Video(UploadedVideo),
    Url(String),
}

impl AnalysisInput {
    /// Uppercased extension of the uploaded file, if any.
    pub fn file_format(&self) -> Option<String> {
        match self {
            AnalysisInput::Video(video) => {
                file_extension(&video.file_name).map(|ext| ext.to_ascii_uppercase())
            }
            AnalysisInput::Url(_) => None,
        }
    }

    /// Uploaded size in bytes; 0 for URLs.
    pub fn size_bytes(&self) -> u64 {
        match self {
            AnalysisInput::Video(video) => video.size(),
            AnalysisInput::Url(_) => 0,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisInput::Video(_) => "file",
            AnalysisInput::Url(_) => "url",
        }
    }
}

impl AnalysisRequest {
    pub fn with_video(video: UploadedVideo) -> Self {
        Self {
            video: Some(video),
            url: None,
        }
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            video: None,
            url: Some(url.into()),
        }
    }

    /// Resolve to a single input. A file part takes precedence over a URL;
    /// blank URLs count as absent.
    pub fn into_input(self) -> ServiceResult<AnalysisInput> {
        if let Some(video) = self.video {
            return Ok(AnalysisInput::Video(video));
        }
        match self.url {
            Some(url) if !url.trim().is_empty() => Ok(AnalysisInput::Url(url)),
            _ => Err(ServiceError::MissingInput),
        }
    }
}

impl From<&ValidatedSubmission> for AnalysisRequest {
    fn from(submission: &ValidatedSubmission) -> Self {
        match &submission.submission().source {
            VideoSource::File(file) => {
                Self::with_video(UploadedVideo::new(file.name.clone(), file.content.clone()))
            }
            VideoSource::Url(url) => Self::with_url(url.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidcheck_models::{VideoFile, VideoSubmission};

    #[test]
    fn test_empty_request_is_missing_input() {
        let err = AnalysisRequest::default().into_input().unwrap_err();
        assert!(matches!(err, ServiceError::MissingInput));

        let err = AnalysisRequest::with_url("  ").into_input().unwrap_err();
        assert!(matches!(err, ServiceError::MissingInput));
    }

    #[test]
    fn test_video_takes_precedence() {
        let request = AnalysisRequest {
            video: Some(UploadedVideo::new("clip.webm", vec![1u8, 2, 3])),
            url: Some("https://example.com/a.mp4".to_string()),
        };
        let input = request.into_input().unwrap();
        assert_eq!(input.kind(), "file");
        assert_eq!(input.file_format().as_deref(), Some("WEBM"));
        assert_eq!(input.size_bytes(), 3);
    }

    #[test]
    fn test_from_validated_submission() {
        let submission = ValidatedSubmission::try_from(VideoSubmission::file(VideoFile::new(
            "clip.mov",
            vec![0u8; 10],
        )))
        .unwrap();
        let request = AnalysisRequest::from(&submission);
        assert_eq!(request.video.as_ref().map(|v| v.size()), Some(10));
        assert!(request.url.is_none());

        let submission =
            ValidatedSubmission::try_from(VideoSubmission::url("https://example.com/a.mp4")).unwrap();
        let request = AnalysisRequest::from(&submission);
        assert!(request.video.is_none());
        assert_eq!(request.url.as_deref(), Some("https://example.com/a.mp4"));
    }
}
