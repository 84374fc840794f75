//! Structured run logging utilities.
//!
//! Every event of a run carries its run id and topic, so the log lines of
//! concurrent runs can be told apart.

use mathvid_models::RunId;
use tracing::{error, info, warn, Span};

use crate::stage::PipelineStage;

/// Run logger for structured logging with consistent formatting.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
    topic: String,
}

impl RunLogger {
    /// Create a logger for one run.
    ///
    /// Long topics are shortened in log fields.
    pub fn new(run_id: &RunId, topic: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            topic: topic.chars().take(80).collect(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            topic = %self.topic,
            "Run started: {}", message
        );
    }

    pub fn log_stage(&self, stage: PipelineStage) {
        info!(
            run_id = %self.run_id,
            stage = %stage,
            "Run stage: {}", stage
        );
    }

    /// Log a degradation: the run continues with a fallback.
    pub fn log_warning(&self, message: &str) {
        warn!(
            run_id = %self.run_id,
            topic = %self.topic,
            "Run warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            run_id = %self.run_id,
            topic = %self.topic,
            "Run failed: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            topic = %self.topic,
            "Run completed: {}", message
        );
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Span that wraps the whole run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("run", run_id = %self.run_id, topic = %self.topic)
    }
}
