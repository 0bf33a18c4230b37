//! Current submission and its preview resource.
//!
//! Selecting a file acquires a [`PreviewHandle`] from the registry. The handle
//! is released when the selection is replaced, cleared, or handed off for
//! processing and then dropped.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::debug;
use vidcheck_models::{
    SubmissionId, ValidatedSubmission, ValidationError, VideoFile, VideoSource, VideoSubmission,
};

/// Tracks how many previews are alive.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<AtomicUsize>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire a preview for `file`.
    pub fn acquire(&self, id: &SubmissionId, file: &VideoFile) -> PreviewHandle {
        self.live.fetch_add(1, Ordering::AcqRel);
        debug!(submission_id = %id, file = %file.name, "Preview acquired");
        PreviewHandle {
            submission_id: id.clone(),
            file_name: file.name.clone(),
            live: Arc::clone(&self.live),
        }
    }

    /// Number of previews not yet released.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }
}

/// A preview of a selected file, released on drop.
#[derive(Debug)]
pub struct PreviewHandle {
    submission_id: SubmissionId,
    file_name: String,
    live: Arc<AtomicUsize>,
}

impl PreviewHandle {
    pub fn submission_id(&self) -> &SubmissionId {
        &self.submission_id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::AcqRel);
        debug!(submission_id = %self.submission_id, "Preview released");
    }
}

/// A validated submission held for processing, plus its preview.
#[derive(Debug)]
pub struct Selected {
    pub submission: ValidatedSubmission,
    pub preview: Option<PreviewHandle>,
}

/// Holds at most one selected submission.
#[derive(Debug, Default)]
pub struct Selection {
    registry: PreviewRegistry,
    current: Option<Selected>,
}

impl Selection {
    pub fn new(registry: PreviewRegistry) -> Self {
        Self {
            registry,
            current: None,
        }
    }

    /// Validate `submission` and make it current.
    ///
    /// An invalid submission leaves the previous selection in place.
    pub fn select(&mut self, submission: VideoSubmission) -> Result<&Selected, ValidationError> {
        let validated = ValidatedSubmission::try_from(submission)?;
        let preview = match &validated.submission().source {
            VideoSource::File(file) => Some(self.registry.acquire(&validated.submission().id, file)),
            VideoSource::Url(_) => None,
        };

        // Assigning drops the superseded selection and its preview.
        let selected = self.current.insert(Selected {
            submission: validated,
            preview,
        });
        Ok(selected)
    }

    pub fn current(&self) -> Option<&Selected> {
        self.current.as_ref()
    }

    /// Hand the selection off for processing.
    pub fn take(&mut self) -> Option<Selected> {
        self.current.take()
    }

    /// Discard the selection.
    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn registry(&self) -> &PreviewRegistry {
        &self.registry
    }
}
