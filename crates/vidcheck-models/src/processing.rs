//! Processing stages and observable progress state.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One named phase of the processing sequence, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStage {
    Uploading,
    ExtractingFrames,
    RunningInference,
    CalculatingConfidence,
    Finalizing,
}

impl ProcessingStage {
    /// All stages in the order a run visits them.
    pub const ALL: [ProcessingStage; 5] = [
        ProcessingStage::Uploading,
        ProcessingStage::ExtractingFrames,
        ProcessingStage::RunningInference,
        ProcessingStage::CalculatingConfidence,
        ProcessingStage::Finalizing,
    ];

    /// Label shown to the user while the stage runs.
    pub fn label(&self) -> &'static str {
        match self {
            ProcessingStage::Uploading => "Uploading video...",
            ProcessingStage::ExtractingFrames => "Extracting frames...",
            ProcessingStage::RunningInference => "Running AI analysis...",
            ProcessingStage::CalculatingConfidence => "Calculating confidence...",
            ProcessingStage::Finalizing => "Finalizing results...",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStage::Uploading => "uploading",
            ProcessingStage::ExtractingFrames => "extracting_frames",
            ProcessingStage::RunningInference => "running_inference",
            ProcessingStage::CalculatingConfidence => "calculating_confidence",
            ProcessingStage::Finalizing => "finalizing",
        }
    }

    /// Zero-based position in [`ProcessingStage::ALL`].
    pub fn index(&self) -> usize {
        match self {
            ProcessingStage::Uploading => 0,
            ProcessingStage::ExtractingFrames => 1,
            ProcessingStage::RunningInference => 2,
            ProcessingStage::CalculatingConfidence => 3,
            ProcessingStage::Finalizing => 4,
        }
    }

    /// Progress reported when this stage starts: `(index + 1) / N * 100`.
    pub fn progress_percent(&self) -> f64 {
        (self.index() + 1) as f64 / Self::ALL.len() as f64 * 100.0
    }

    pub fn is_last(&self) -> bool {
        self.index() == Self::ALL.len() - 1
    }
}

impl fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of a submission's processing progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingState {
    pub is_processing: bool,
    /// 0-100, non-decreasing within one run
    pub progress_percent: f64,
    pub current_stage_label: String,
}

impl ProcessingState {
    /// The state outside of any run.
    pub fn idle() -> Self {
        Self {
            is_processing: false,
            progress_percent: 0.0,
            current_stage_label: String::new(),
        }
    }

    /// The state while `stage` is running.
    pub fn running(stage: ProcessingStage) -> Self {
        Self {
            is_processing: true,
            progress_percent: stage.progress_percent(),
            current_stage_label: stage.label().to_string(),
        }
    }

    pub fn is_idle(&self) -> bool {
        !self.is_processing && self.progress_percent == 0.0
    }

    /// Progress rounded to a whole percent for display.
    pub fn display_percent(&self) -> u8 {
        self.progress_percent.round().clamp(0.0, 100.0) as u8
    }
}

impl Default for ProcessingState {
    fn default() -> Self {
        Self::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_progress() {
        let progress: Vec<f64> = ProcessingStage::ALL
            .iter()
            .map(|s| s.progress_percent())
            .collect();
        assert_eq!(progress, vec![20.0, 40.0, 60.0, 80.0, 100.0]);
    }

    #[test]
    fn test_stage_index_matches_order() {
        for (i, stage) in ProcessingStage::ALL.iter().enumerate() {
            assert_eq!(stage.index(), i);
        }
        assert!(ProcessingStage::Finalizing.is_last());
        assert!(!ProcessingStage::Uploading.is_last());
    }

    #[test]
    fn test_running_state() {
        let state = ProcessingState::running(ProcessingStage::RunningInference);
        assert!(state.is_processing);
        assert_eq!(state.current_stage_label, "Running AI analysis...");
        assert_eq!(state.display_percent(), 60);
    }

    #[test]
    fn test_idle_state_serialization() {
        let json = serde_json::to_value(ProcessingState::idle()).unwrap();
        assert_eq!(json["isProcessing"], false);
        assert_eq!(json["progressPercent"], 0.0);
        assert_eq!(json["currentStageLabel"], "");
    }
}
