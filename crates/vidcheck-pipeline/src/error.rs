//! Pipeline error types.

use std::path::PathBuf;

use thiserror::Error;
use vidcheck_analysis::ServiceError;
use vidcheck_models::ValidationError;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors raised while preparing or running a submission outside the
/// orchestrator's structured outcomes.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Another analysis is already running")]
    Busy,

    #[error("Analysis failed: {0}")]
    Failed(String),
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Exit code for the CLI: 2 for rejected input, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Validation(_) => 2,
            _ => 1,
        }
    }
}
