//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

use mathvid_media::{RenderSettings, ToolkitSettings, DEFAULT_DURATION_FALLBACK_SECS};

/// Settings for every run of the pipeline.
///
/// Built once at startup and shared by reference; no stage reads the
/// environment on its own.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Class name the generated scene must define
    pub scene_name: String,
    /// Parent of the per-render engine media directories
    pub media_root: PathBuf,
    /// Canonical directory for finished videos
    pub output_dir: PathBuf,
    /// Scene sources and narration audio
    pub scratch_dir: PathBuf,
    pub manim_bin: String,
    pub ffmpeg_bin: String,
    pub ffprobe_bin: String,
    /// Engine quality preset flag
    pub quality_flag: String,
    /// Directory name the engine uses for that preset
    pub quality_dir: String,
    pub trim_audio_codec: String,
    pub mux_audio_codec: String,
    /// Duration used when the rendered video cannot be probed
    pub fallback_duration_secs: f64,
    /// Optional limit for each subprocess; unbounded when unset
    pub subprocess_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scene_name: "MathExplanationScene".to_string(),
            media_root: PathBuf::from("media"),
            output_dir: PathBuf::from("media/videos/generated/480p15"),
            scratch_dir: std::env::temp_dir().join("mathvid"),
            manim_bin: "manim".to_string(),
            ffmpeg_bin: "ffmpeg".to_string(),
            ffprobe_bin: "ffprobe".to_string(),
            quality_flag: "-ql".to_string(),
            quality_dir: "480p15".to_string(),
            trim_audio_codec: "libmp3lame".to_string(),
            mux_audio_codec: "aac".to_string(),
            fallback_duration_secs: DEFAULT_DURATION_FALLBACK_SECS,
            subprocess_timeout: None,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            scene_name: std::env::var("MATHVID_SCENE_NAME").unwrap_or(defaults.scene_name),
            media_root: std::env::var("MATHVID_MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.media_root),
            output_dir: std::env::var("MATHVID_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            scratch_dir: std::env::var("MATHVID_SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.scratch_dir),
            manim_bin: std::env::var("MANIM_BIN").unwrap_or(defaults.manim_bin),
            ffmpeg_bin: std::env::var("FFMPEG_BIN").unwrap_or(defaults.ffmpeg_bin),
            ffprobe_bin: std::env::var("FFPROBE_BIN").unwrap_or(defaults.ffprobe_bin),
            quality_flag: std::env::var("MATHVID_QUALITY_FLAG").unwrap_or(defaults.quality_flag),
            quality_dir: std::env::var("MATHVID_QUALITY_DIR").unwrap_or(defaults.quality_dir),
            trim_audio_codec: std::env::var("MATHVID_TRIM_AUDIO_CODEC")
                .unwrap_or(defaults.trim_audio_codec),
            mux_audio_codec: std::env::var("MATHVID_MUX_AUDIO_CODEC")
                .unwrap_or(defaults.mux_audio_codec),
            fallback_duration_secs: std::env::var("MATHVID_DURATION_FALLBACK_SECS")
                .ok()
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|s| s.is_finite() && *s > 0.0)
                .unwrap_or(defaults.fallback_duration_secs),
            subprocess_timeout: std::env::var("MATHVID_SUBPROCESS_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|s| *s > 0)
                .map(Duration::from_secs),
        }
    }

    /// Settings for the render engine wrapper.
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            manim_bin: self.manim_bin.clone(),
            media_root: self.media_root.clone(),
            output_dir: self.output_dir.clone(),
            scratch_dir: self.scratch_dir.clone(),
            quality_flag: self.quality_flag.clone(),
            quality_dir: self.quality_dir.clone(),
            timeout: self.subprocess_timeout,
        }
    }

    /// Settings for the FFmpeg/FFprobe wrappers.
    pub fn toolkit_settings(&self) -> ToolkitSettings {
        ToolkitSettings {
            ffmpeg_bin: self.ffmpeg_bin.clone(),
            ffprobe_bin: self.ffprobe_bin.clone(),
            trim_audio_codec: self.trim_audio_codec.clone(),
            mux_audio_codec: self.mux_audio_codec.clone(),
            fallback_duration_secs: self.fallback_duration_secs,
            timeout: self.subprocess_timeout,
        }
    }

    /// Directories the pipeline writes into.
    pub fn writable_dirs(&self) -> [&PathBuf; 3] {
        [&self.media_root, &self.output_dir, &self.scratch_dir]
    }

    /// Create every directory the pipeline writes into.
    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in self.writable_dirs() {
            tokio::fs::create_dir_all(dir).await?;
        }
        Ok(())
    }
}
