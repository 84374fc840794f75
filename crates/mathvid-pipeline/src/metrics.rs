//! Pipeline metrics, recorded through the `metrics` facade.
//!
//! Nothing is exported unless the host process installs a recorder.

use metrics::{counter, histogram};

use crate::stage::PipelineStage;

/// Metric names as constants for consistency.
pub mod names {
    pub const RUNS_STARTED_TOTAL: &str = "mathvid_runs_started_total";
    pub const RUNS_COMPLETED_TOTAL: &str = "mathvid_runs_completed_total";
    pub const RUNS_FAILED_TOTAL: &str = "mathvid_runs_failed_total";
    pub const DEGRADATIONS_TOTAL: &str = "mathvid_degradations_total";
    pub const STAGE_DURATION_SECONDS: &str = "mathvid_stage_duration_seconds";
}

pub fn record_run_started() {
    counter!(names::RUNS_STARTED_TOTAL).increment(1);
}

pub fn record_run_completed(narrated: bool) {
    let labels = [("narrated", narrated.to_string())];
    counter!(names::RUNS_COMPLETED_TOTAL, &labels).increment(1);
}

/// Record a hard failure by error kind.
pub fn record_run_failed(kind: &'static str) {
    let labels = [("kind", kind.to_string())];
    counter!(names::RUNS_FAILED_TOTAL, &labels).increment(1);
}

/// Record a fallback taken instead of failing.
pub fn record_degradation(kind: &'static str) {
    let labels = [("kind", kind.to_string())];
    counter!(names::DEGRADATIONS_TOTAL, &labels).increment(1);
}

pub fn record_stage_duration(stage: PipelineStage, duration_secs: f64) {
    let labels = [("stage", stage.as_str().to_string())];
    histogram!(names::STAGE_DURATION_SECONDS, &labels).record(duration_secs);
}
