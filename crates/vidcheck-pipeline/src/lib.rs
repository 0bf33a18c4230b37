//! Submission pipeline.
//!
//! - [`StageOrchestrator`]: drives a validated submission through the fixed
//!   processing stages and the analysis service, one run at a time
//! - [`progress`]: progress events emitted during a run
//! - [`Selection`]: the current submission and its scoped preview resource

pub mod error;
pub mod orchestrator;
pub mod progress;
pub mod selection;

pub use error::{PipelineError, PipelineResult};
pub use orchestrator::{
    OrchestratorConfig, OrchestratorPhase, RunOutcome, StageOrchestrator, DEFAULT_SERVICE_TIMEOUT,
};
pub use progress::{ProgressEvent, ProgressReceiver, ProgressSender};
pub use selection::{PreviewHandle, PreviewRegistry, Selected, Selection};
