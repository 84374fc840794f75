//! Run stages and the tracker that walks them.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::metrics;

/// Stage of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Generating,
    Parsing,
    Rendering,
    SynthesizingAudio,
    ProbingDuration,
    Reconciling,
    Muxing,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Generating => "generating",
            PipelineStage::Parsing => "parsing",
            PipelineStage::Rendering => "rendering",
            PipelineStage::SynthesizingAudio => "synthesizing_audio",
            PipelineStage::ProbingDuration => "probing_duration",
            PipelineStage::Reconciling => "reconciling",
            PipelineStage::Muxing => "muxing",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }

    /// Whether a run may move from `self` to `next`.
    ///
    /// Probing and reconciling degrade instead of failing, so they have no
    /// edge to `Failed`.
    pub fn can_transition_to(&self, next: PipelineStage) -> bool {
        use PipelineStage::*;
        match (*self, next) {
            (Generating, Parsing) => true,
            (Parsing, Rendering) => true,
            (Rendering, SynthesizingAudio) | (Rendering, Done) => true,
            (SynthesizingAudio, ProbingDuration) => true,
            (ProbingDuration, Reconciling) => true,
            (Reconciling, Muxing) => true,
            (Muxing, Done) => true,
            (ProbingDuration, Failed) | (Reconciling, Failed) => false,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Records the stages a run passes through and how long each took.
#[derive(Debug)]
pub struct StageTracker {
    run_id: String,
    current: PipelineStage,
    entered_at: Instant,
    trace: Vec<PipelineStage>,
}

impl StageTracker {
    pub fn new(run_id: impl Into<String>, initial: PipelineStage) -> Self {
        Self {
            run_id: run_id.into(),
            current: initial,
            entered_at: Instant::now(),
            trace: vec![initial],
        }
    }

    pub fn current(&self) -> PipelineStage {
        self.current
    }

    /// Every stage entered so far, in order.
    pub fn trace(&self) -> &[PipelineStage] {
        &self.trace
    }

    pub fn into_trace(self) -> Vec<PipelineStage> {
        self.trace
    }

    /// Move to `next`, recording the time spent in the current stage.
    pub fn advance(&mut self, next: PipelineStage) {
        if !self.current.can_transition_to(next) {
            warn!(
                run_id = %self.run_id,
                from = %self.current,
                to = %next,
                "Unexpected stage transition"
            );
            debug_assert!(false, "invalid stage transition {} -> {}", self.current, next);
        }

        let elapsed = self.entered_at.elapsed().as_secs_f64();
        metrics::record_stage_duration(self.current, elapsed);
        debug!(
            run_id = %self.run_id,
            from = %self.current,
            to = %next,
            elapsed_secs = elapsed,
            "Stage transition"
        );

        self.current = next;
        self.entered_at = Instant::now();
        self.trace.push(next);
    }

    /// Move to `Failed` unless the run already ended.
    pub fn fail(&mut self) {
        if !self.current.is_terminal() {
            self.advance(PipelineStage::Failed);
        }
    }
}
