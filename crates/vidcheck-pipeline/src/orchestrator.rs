//! Stage orchestrator.
//!
//! Drives one validated submission through the fixed stage sequence, then
//! calls the analysis service and maps its outcome to a terminal state:
//!
//! ```text
//! Idle -> Running(stage) x5 -> Completed | Failed -> Idle
//! ```
//!
//! Only one run may be in flight per orchestrator. A second call to
//! [`StageOrchestrator::run`] while a run is active returns
//! [`RunOutcome::Busy`] without touching the state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::{error, info, warn};
use vidcheck_analysis::{AnalysisRequest, AnalysisService, DelayBounds, DelayProvider, ServiceError};
use vidcheck_models::{AnalysisResult, ProcessingStage, ProcessingState, ValidatedSubmission};

use crate::progress::ProgressSender;

/// Default bound on the analysis service call.
pub const DEFAULT_SERVICE_TIMEOUT: Duration = Duration::from_secs(30);

/// Orchestrator tuning.
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorConfig {
    /// Pacing delay drawn for each stage
    pub stage_delay: DelayBounds,
    /// Upper bound on the analysis service call; expiry is a failure
    pub service_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            stage_delay: DelayBounds::stage_default(),
            service_timeout: DEFAULT_SERVICE_TIMEOUT,
        }
    }
}

/// Coarse lifecycle phase of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorPhase {
    Idle,
    Running { stage: ProcessingStage },
    Completed,
    Failed,
}

impl OrchestratorPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrchestratorPhase::Idle => "idle",
            OrchestratorPhase::Running { .. } => "running",
            OrchestratorPhase::Completed => "completed",
            OrchestratorPhase::Failed => "failed",
        }
    }
}

/// Terminal outcome of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(AnalysisResult),
    /// The run failed. `reason` is the caller-safe message from the service.
    Failed { reason: String },
    /// Another run was in flight; nothing was done.
    Busy,
}

impl RunOutcome {
    /// The result, or `None` for any failure.
    pub fn into_result(self) -> Option<AnalysisResult> {
        match self {
            RunOutcome::Completed(result) => Some(result),
            RunOutcome::Failed { .. } | RunOutcome::Busy => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, RunOutcome::Busy)
    }
}

/// Drives submissions through the processing stages.
pub struct StageOrchestrator {
    service: Arc<dyn AnalysisService>,
    delay: Arc<dyn DelayProvider>,
    config: OrchestratorConfig,
    state_tx: watch::Sender<ProcessingState>,
    phase_tx: watch::Sender<OrchestratorPhase>,
    in_flight: AtomicBool,
}

/// Releases the single-flight slot and returns to idle, including when the
/// run future is dropped mid-flight.
struct InFlightGuard<'a> {
    orchestrator: &'a StageOrchestrator,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(orchestrator: &'a StageOrchestrator) -> Option<Self> {
        orchestrator
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { orchestrator })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.orchestrator.state_tx.send_replace(ProcessingState::idle());
        self.orchestrator.phase_tx.send_replace(OrchestratorPhase::Idle);
        self.orchestrator.in_flight.store(false, Ordering::Release);
    }
}

impl StageOrchestrator {
    pub fn new(
        service: Arc<dyn AnalysisService>,
        delay: Arc<dyn DelayProvider>,
        config: OrchestratorConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(ProcessingState::idle());
        let (phase_tx, _) = watch::channel(OrchestratorPhase::Idle);
        Self {
            service,
            delay,
            config,
            state_tx,
            phase_tx,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Current processing state.
    pub fn state(&self) -> ProcessingState {
        self.state_tx.borrow().clone()
    }

    pub fn phase(&self) -> OrchestratorPhase {
        *self.phase_tx.borrow()
    }

    /// Watch processing state changes.
    pub fn subscribe(&self) -> watch::Receiver<ProcessingState> {
        self.state_tx.subscribe()
    }

    /// Watch phase changes.
    pub fn subscribe_phase(&self) -> watch::Receiver<OrchestratorPhase> {
        self.phase_tx.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run one submission to completion.
    ///
    /// Dropping the returned future abandons the run: the pending service
    /// call is cancelled and the orchestrator returns to idle.
    pub async fn run(&self, submission: ValidatedSubmission, progress: &ProgressSender) -> RunOutcome {
        let id = submission.submission().id.clone();

        let Some(_guard) = InFlightGuard::acquire(self) else {
            warn!(submission_id = %id, "Rejected submission: another analysis is in flight");
            progress.rejected(&id);
            return RunOutcome::Busy;
        };

        let started = Instant::now();
        info!(submission_id = %id, source = submission.submission().describe(), "Starting analysis run");

        self.state_tx.send_replace(ProcessingState::idle());
        progress.started(&id);

        for stage in ProcessingStage::ALL {
            self.phase_tx.send_replace(OrchestratorPhase::Running { stage });
            self.state_tx.send_replace(ProcessingState::running(stage));
            progress.stage_started(&id, stage);
            self.delay.delay(self.config.stage_delay).await;
        }

        progress.awaiting_service(&id);
        let request = AnalysisRequest::from(&submission);
        let call = tokio::time::timeout(self.config.service_timeout, self.service.analyze(request));

        let outcome = match call.await {
            Ok(Ok(result)) => RunOutcome::Completed(result),
            Ok(Err(e)) => {
                error!(submission_id = %id, service = self.service.name(), error = %e, "Analysis error");
                RunOutcome::Failed {
                    reason: e.public_message(),
                }
            }
            Err(_) => {
                let e = ServiceError::Timeout(self.config.service_timeout);
                error!(submission_id = %id, service = self.service.name(), error = %e, "Analysis error");
                RunOutcome::Failed {
                    reason: e.public_message(),
                }
            }
        };

        // Terminal transition: processing ends in the same step that
        // surfaces the outcome.
        match &outcome {
            RunOutcome::Completed(result) => {
                self.phase_tx.send_replace(OrchestratorPhase::Completed);
                self.state_tx.send_replace(ProcessingState::idle());
                progress.completed(&id, result.clone());
                info!(
                    submission_id = %id,
                    verdict = result.verdict(),
                    confidence = result.confidence,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Analysis run completed"
                );
            }
            RunOutcome::Failed { reason } => {
                self.phase_tx.send_replace(OrchestratorPhase::Failed);
                self.state_tx.send_replace(ProcessingState::idle());
                progress.failed(&id, reason.clone());
            }
            RunOutcome::Busy => {}
        }

        outcome
    }
}
