//! Pipeline error types.
//!
//! Only hard failures live here. Missing response sections, probe failures
//! and trim failures degrade in place and never become a `PipelineError`.

use std::path::PathBuf;

use mathvid_ai::AiError;
use mathvid_media::MediaError;
use thiserror::Error;

use crate::stage::PipelineStage;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to generate scene code: {0}")]
    GenerationFailed(#[source] AiError),

    #[error("Failed to render video: {0}")]
    RenderFailed(#[source] MediaError),

    #[error("Video file not found after rendering under {}", .0.display())]
    ArtifactNotFound(PathBuf),

    #[error("Failed to generate audio: {0}")]
    SynthesisFailed(#[source] AiError),

    #[error("Failed to combine audio and video: {0}")]
    MuxFailed(#[source] MediaError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Classify a render-stage media error.
    pub fn from_render(err: MediaError) -> Self {
        match err {
            MediaError::ArtifactNotFound(dir) => Self::ArtifactNotFound(dir),
            other => Self::RenderFailed(other),
        }
    }

    /// Stage the run was in when this error aborted it.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            PipelineError::GenerationFailed(_) => Some(PipelineStage::Generating),
            PipelineError::RenderFailed(_) | PipelineError::ArtifactNotFound(_) => {
                Some(PipelineStage::Rendering)
            }
            PipelineError::SynthesisFailed(_) => Some(PipelineStage::SynthesizingAudio),
            PipelineError::MuxFailed(_) => Some(PipelineStage::Muxing),
            PipelineError::Config(_) | PipelineError::Io(_) => None,
        }
    }

    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::GenerationFailed(_) => "generation_failed",
            PipelineError::RenderFailed(_) => "render_failed",
            PipelineError::ArtifactNotFound(_) => "artifact_not_found",
            PipelineError::SynthesisFailed(_) => "synthesis_failed",
            PipelineError::MuxFailed(_) => "mux_failed",
            PipelineError::Config(_) => "config",
            PipelineError::Io(_) => "io",
        }
    }

    /// Captured subprocess output, when the failure came from one.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            PipelineError::RenderFailed(e) | PipelineError::MuxFailed(e) => e.stderr(),
            _ => None,
        }
    }
}
