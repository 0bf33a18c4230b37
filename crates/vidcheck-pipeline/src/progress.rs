//! Progress reporting for orchestrated runs.
//!
//! The orchestrator emits [`ProgressEvent`]s through a [`ProgressSender`]
//! without knowing where they end up (terminal output, logs, a UI). Events
//! carry the submission id so several runs can share one sink.

use tokio::sync::mpsc;
use vidcheck_models::{AnalysisResult, ProcessingStage, SubmissionId};

/// Progress event emitted during a run.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// The run was accepted and state reset to idle
    Started,

    /// A stage began; `progress_percent` is already published
    StageStarted {
        stage: ProcessingStage,
        progress_percent: f64,
    },

    /// All stages done, waiting on the analysis service
    AwaitingService,

    /// Analysis succeeded
    Completed { result: AnalysisResult },

    /// Analysis failed or timed out
    Failed { error: String },

    /// Another run was in flight; this one never started
    Rejected,
}

impl ProgressEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProgressEvent::Completed { .. } | ProgressEvent::Failed { .. } | ProgressEvent::Rejected
        )
    }
}

/// Progress sender for async contexts.
///
/// Uses a bounded channel to avoid blocking the run; events are dropped if
/// the channel is full.
#[derive(Clone)]
pub struct ProgressSender {
    tx: mpsc::Sender<(SubmissionId, ProgressEvent)>,
}

impl ProgressSender {
    pub fn new(tx: mpsc::Sender<(SubmissionId, ProgressEvent)>) -> Self {
        Self { tx }
    }

    /// Send a progress event (non-blocking).
    pub fn send(&self, id: &SubmissionId, event: ProgressEvent) {
        let _ = self.tx.try_send((id.clone(), event));
    }

    pub fn started(&self, id: &SubmissionId) {
        self.send(id, ProgressEvent::Started);
    }

    pub fn stage_started(&self, id: &SubmissionId, stage: ProcessingStage) {
        self.send(
            id,
            ProgressEvent::StageStarted {
                stage,
                progress_percent: stage.progress_percent(),
            },
        );
    }

    pub fn awaiting_service(&self, id: &SubmissionId) {
        self.send(id, ProgressEvent::AwaitingService);
    }

    pub fn completed(&self, id: &SubmissionId, result: AnalysisResult) {
        self.send(id, ProgressEvent::Completed { result });
    }

    pub fn failed(&self, id: &SubmissionId, error: impl Into<String>) {
        self.send(
            id,
            ProgressEvent::Failed {
                error: error.into(),
            },
        );
    }

    pub fn rejected(&self, id: &SubmissionId) {
        self.send(id, ProgressEvent::Rejected);
    }
}

/// Progress receiver for collecting events.
pub struct ProgressReceiver {
    rx: mpsc::Receiver<(SubmissionId, ProgressEvent)>,
}

impl ProgressReceiver {
    /// Receive the next progress event.
    pub async fn recv(&mut self) -> Option<(SubmissionId, ProgressEvent)> {
        self.rx.recv().await
    }

    /// Try to receive a progress event without blocking.
    pub fn try_recv(&mut self) -> Option<(SubmissionId, ProgressEvent)> {
        self.rx.try_recv().ok()
    }

    /// Drain everything currently buffered.
    pub fn drain(&mut self) -> Vec<(SubmissionId, ProgressEvent)> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

/// Create a progress channel pair.
pub fn channel() -> (ProgressSender, ProgressReceiver) {
    let (tx, rx) = mpsc::channel(32);
    (ProgressSender::new(tx), ProgressReceiver { rx })
}

/// A no-op progress sender for when progress reporting is not needed.
pub fn noop_sender() -> ProgressSender {
    let (tx, _rx) = mpsc::channel(1);
    ProgressSender::new(tx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_progress_channel() {
        let (sender, mut receiver) = channel();
        let id = SubmissionId::from("abc");

        sender.started(&id);
        sender.stage_started(&id, ProcessingStage::ExtractingFrames);
        sender.failed(&id, "boom");

        let (event_id, event1) = receiver.recv().await.unwrap();
        assert_eq!(event_id, id);
        assert!(matches!(event1, ProgressEvent::Started));

        let (_, event2) = receiver.recv().await.unwrap();
        assert!(matches!(
            event2,
            ProgressEvent::StageStarted { progress_percent, .. } if progress_percent == 40.0
        ));

        let (_, event3) = receiver.recv().await.unwrap();
        assert!(event3.is_terminal());
    }

    #[test]
    fn test_noop_sender_does_not_block() {
        let sender = noop_sender();
        let id = SubmissionId::from("abc");
        for stage in ProcessingStage::ALL {
            sender.stage_started(&id, stage);
        }
    }
}
