//! Seams between the pipeline and the external media tools.
//!
//! The orchestrator only talks to these traits, so runs can be driven with
//! fakes in tests and with the real binaries in production.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use mathvid_models::RenderedArtifact;

use crate::command::FfmpegRunner;
use crate::error::MediaResult;
use crate::mux::mux_audio_video;
use crate::probe::{probe_duration_or, ProbedDuration, DEFAULT_DURATION_FALLBACK_SECS};
use crate::reconcile::{reconcile_audio, ReconciledAudio};
use crate::render::ManimRenderer;

/// Turns scene code into a rendered video.
#[async_trait]
pub trait SceneRenderer: Send + Sync {
    /// Render `code` and return the artifact at its canonical path.
    async fn render(&self, code: &str, scene: &str) -> MediaResult<RenderedArtifact>;
}

/// Probe, trim and mux operations used on the narrated path.
#[async_trait]
pub trait MediaTools: Send + Sync {
    /// Duration of `video`; never fails, falls back to a configured default.
    async fn probe_duration(&self, video: &Path) -> ProbedDuration;

    /// Cut `audio` to `target_secs`; never fails, falls back to the original.
    async fn reconcile(&self, audio: &Path, target_secs: f64) -> ReconciledAudio;

    /// Replace `video` with a copy carrying `audio` as its soundtrack.
    async fn mux(&self, video: &Path, audio: &Path) -> MediaResult<()>;
}

#[async_trait]
impl SceneRenderer for ManimRenderer {
    async fn render(&self, code: &str, scene: &str) -> MediaResult<RenderedArtifact> {
        self.render_scene(code, scene).await
    }
}

/// FFmpeg/FFprobe settings.
#[derive(Debug, Clone)]
pub struct ToolkitSettings {
    pub ffmpeg_bin: String,
    pub ffprobe_bin: String,
    /// Codec for trimmed narration
    pub trim_audio_codec: String,
    /// Codec for the soundtrack of the muxed artifact
    pub mux_audio_codec: String,
    pub fallback_duration_secs: f64,
    pub timeout: Option<Duration>,
}

impl Default for ToolkitSettings {
    fn default() -> Self {
        Self {
            ffmpeg_bin: "ffmpeg".to_string(),
            ffprobe_bin: "ffprobe".to_string(),
            trim_audio_codec: "libmp3lame".to_string(),
            mux_audio_codec: "aac".to_string(),
            fallback_duration_secs: DEFAULT_DURATION_FALLBACK_SECS,
            timeout: None,
        }
    }
}

/// [`MediaTools`] backed by the FFmpeg CLI.
#[derive(Debug, Clone)]
pub struct FfmpegToolkit {
    settings: ToolkitSettings,
    runner: FfmpegRunner,
}

impl FfmpegToolkit {
    pub fn new(settings: ToolkitSettings) -> Self {
        let runner = FfmpegRunner::new()
            .with_binary(settings.ffmpeg_bin.clone())
            .with_timeout(settings.timeout);
        Self { settings, runner }
    }

    pub fn settings(&self) -> &ToolkitSettings {
        &self.settings
    }

}

#[async_trait]
impl MediaTools for FfmpegToolkit {
    async fn probe_duration(&self, video: &Path) -> ProbedDuration {
        probe_duration_or(&self.settings.ffprobe_bin, video, self.settings.fallback_duration_secs).await
    }

    async fn reconcile(&self, audio: &Path, target_secs: f64) -> ReconciledAudio {
        reconcile_audio(&self.runner, audio, target_secs, &self.settings.trim_audio_codec).await
    }

    async fn mux(&self, video: &Path, audio: &Path) -> MediaResult<()> {
        mux_audio_video(&self.runner, video, audio, &self.settings.mux_audio_codec).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = ToolkitSettings::default();
        assert_eq!(settings.mux_audio_codec, "aac");
        assert_eq!(settings.fallback_duration_secs, 10.0);
        assert!(settings.timeout.is_none());
    }

    #[tokio::test]
    async fn test_probe_uses_configured_fallback() {
        let toolkit = FfmpegToolkit::new(ToolkitSettings {
            ffprobe_bin: "no-such-ffprobe-binary".to_string(),
            fallback_duration_secs: 4.5,
            ..ToolkitSettings::default()
        });

        let dir = tempfile::TempDir::new().unwrap();
        let video = dir.path().join("Scene.mp4");
        std::fs::write(&video, b"frames").unwrap();

        let probed = toolkit.probe_duration(&video).await;
        assert_eq!(probed, ProbedDuration::Fallback(4.5));
    }
}
