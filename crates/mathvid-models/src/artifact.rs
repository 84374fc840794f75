//! Media artifacts moving through a pipeline run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A video produced by the render engine, relocated to its canonical path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedArtifact {
    pub path: PathBuf,
    /// Filled in by the duration prober on demand, never at render time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
}

impl RenderedArtifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            duration_seconds: None,
        }
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }
}

/// Successful result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub final_artifact_path: PathBuf,
    pub caption_track: String,
    /// Whether narration audio was muxed into the artifact
    pub narrated: bool,
}

impl PipelineOutcome {
    /// File name of the final artifact, as served by the web UI.
    pub fn file_name(&self) -> Option<&str> {
        file_name_of(&self.final_artifact_path)
    }
}

fn file_name_of(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}
