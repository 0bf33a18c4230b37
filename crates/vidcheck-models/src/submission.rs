//! Video submission models.

use std::fmt;

use bytes::Bytes;
use chrono::Utc;
use rand::Rng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the random part of a generated [`SubmissionId`].
const RANDOM_SUFFIX_LEN: usize = 11;

/// Opaque identifier for a submission.
///
/// Generated ids are a base-36 millisecond timestamp followed by a random
/// base-36 suffix. Uniqueness is best-effort only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SubmissionId(pub String);

impl SubmissionId {
    /// Generate a new time-prefixed id.
    pub fn new() -> Self {
        let millis = Utc::now().timestamp_millis().max(0) as u64;
        let mut rng = rand::thread_rng();
        let suffix: String = (0..RANDOM_SUFFIX_LEN)
            .map(|_| BASE36_DIGITS[rng.gen_range(0..BASE36_DIGITS.len())] as char)
            .collect();
        Self(format!("{}{}", to_base36(millis), suffix))
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SubmissionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Extension of a file name: the text after the last `.`, if non-empty.
pub fn file_extension(name: &str) -> Option<&str> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}

/// An in-memory video file.
///
/// `size` is the declared size of the file. It normally equals the content
/// length, but callers that only inspect metadata may declare a size without
/// loading the bytes.
#[derive(Clone)]
pub struct VideoFile {
    pub name: String,
    pub size: u64,
    pub content: Bytes,
}

impl VideoFile {
    /// Create a file whose size is the content length.
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            size: content.len() as u64,
            content,
        }
    }

    /// Create a metadata-only file with a declared size and no content.
    pub fn declared(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            content: Bytes::new(),
        }
    }

    /// File extension as written in the name.
    pub fn extension(&self) -> Option<&str> {
        file_extension(&self.name)
    }
}

impl fmt::Debug for VideoFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoFile")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("content_len", &self.content.len())
            .finish()
    }
}

/// Where the video comes from. Exactly one source per submission.
#[derive(Debug, Clone)]
pub enum VideoSource {
    /// Uploaded file
    File(VideoFile),
    /// Remote video URL
    Url(String),
}

/// A user-provided video reference entering the pipeline.
#[derive(Debug, Clone)]
pub struct VideoSubmission {
    pub id: SubmissionId,
    pub source: VideoSource,
}

impl VideoSubmission {
    /// Submission backed by an uploaded file.
    pub fn file(file: VideoFile) -> Self {
        Self {
            id: SubmissionId::new(),
            source: VideoSource::File(file),
        }
    }

    /// Submission backed by a remote URL.
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            id: SubmissionId::new(),
            source: VideoSource::Url(url.into()),
        }
    }

    /// Short description for logs (file name or URL).
    pub fn describe(&self) -> &str {
        match &self.source {
            VideoSource::File(file) => &file.name,
            VideoSource::Url(url) => url,
        }
    }

    pub fn is_url(&self) -> bool {
        matches!(self.source, VideoSource::Url(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_700_000_000_000), "loyw3v28");
    }

    #[test]
    fn test_submission_id_shape() {
        let id = SubmissionId::new();
        assert!(id.as_str().len() > RANDOM_SUFFIX_LEN);
        assert!(id
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_submission_ids_differ() {
        let a = SubmissionId::new();
        let b = SubmissionId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("clip.mp4"), Some("mp4"));
        assert_eq!(file_extension("archive.tar.MOV"), Some("MOV"));
        assert_eq!(file_extension("noext"), None);
        assert_eq!(file_extension("trailing."), None);
    }

    #[test]
    fn test_video_file_size_follows_content() {
        let file = VideoFile::new("a.mp4", vec![0u8; 42]);
        assert_eq!(file.size, 42);

        let declared = VideoFile::declared("b.mp4", 1024);
        assert_eq!(declared.size, 1024);
        assert!(declared.content.is_empty());
    }

    #[test]
    fn test_debug_omits_content() {
        let file = VideoFile::new("a.mp4", vec![7u8; 3]);
        let debug = format!("{:?}", file);
        assert!(debug.contains("content_len: 3"));
    }
}
