//! Shared data models for the VidCheck backend.
//!
//! This crate provides Serde-serializable types for:
//! - Video submissions (uploaded files and remote URLs)
//! - Intake policy and submission validation
//! - Processing stages and observable progress state
//! - Analysis results and the `{success, result, error}` wire envelope

pub mod analysis;
pub mod policy;
pub mod processing;
pub mod submission;
pub mod validation;

// Re-export common types
pub use analysis::{
    round_to_tenth, AnalysisEnvelope, AnalysisResponse, AnalysisResult, VideoDetails, ANALYSIS_FAILED_MESSAGE,
    CLIENT_FAILURE_MESSAGE, MISSING_INPUT_MESSAGE,
};
pub use policy::{
    format_file_size, supported_formats_label, MAX_FILE_SIZE, MAX_FILE_SIZE_MB, SUPPORTED_FORMATS,
};
pub use processing::{ProcessingStage, ProcessingState};
pub use submission::{file_extension, SubmissionId, VideoFile, VideoSource, VideoSubmission};
pub use validation::{
    check, validate, validate_file, validate_url, ValidatedSubmission, ValidationError,
    ValidationOutcome,
};
