//! Audio duration reconciliation.
//!
//! Narration is synthesized independently of the animation, so its length
//! rarely matches the rendered video. Audio longer than the video is cut to
//! the video's duration; shorter audio is left alone (never padded or
//! stretched).

use std::path::Path;
use tracing::{info, warn};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::scratch::ScratchFile;

/// Outcome of a best-effort trim.
#[derive(Debug)]
pub enum ReconciledAudio {
    /// A new, truncated file distinct from the input
    Trimmed(ScratchFile),
    /// Trimming failed; the caller keeps using the original audio
    Untrimmed,
}

impl ReconciledAudio {
    /// The audio path to mux: the trimmed file, or `original` when untrimmed.
    pub fn select<'a>(&'a self, original: &'a Path) -> &'a Path {
        match self {
            ReconciledAudio::Trimmed(file) => file.path(),
            ReconciledAudio::Untrimmed => original,
        }
    }

    pub fn is_trimmed(&self) -> bool {
        matches!(self, ReconciledAudio::Trimmed(_))
    }
}

/// Truncate `audio` to `target_secs` into a new scratch file beside it.
///
/// The output is named `<stem>_adjusted_<random>.<ext>`. On failure the
/// partial output is deleted before the error is returned.
pub async fn trim_audio(
    runner: &FfmpegRunner,
    audio: &Path,
    target_secs: f64,
    codec: &str,
) -> MediaResult<ScratchFile> {
    let dir = audio.parent().unwrap_or_else(|| Path::new("."));
    let stem = audio
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "audio".to_string());
    let ext = audio
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_else(|| "mp3".to_string());

    let output = ScratchFile::create_in(dir, &format!("{}_adjusted_", stem), &format!(".{}", ext))?;

    let cmd = FfmpegCommand::new(audio, output.path())
        .trim_to(target_secs)
        .audio_codec(codec);

    runner.run(&cmd).await?;

    info!(
        "Trimmed audio to {:.3}s: {} -> {}",
        target_secs,
        audio.display(),
        output.path().display()
    );
    Ok(output)
}

/// Trim `audio` to `target_secs`, falling back to the untrimmed original.
pub async fn reconcile_audio(
    runner: &FfmpegRunner,
    audio: &Path,
    target_secs: f64,
    codec: &str,
) -> ReconciledAudio {
    if !target_secs.is_finite() || target_secs <= 0.0 {
        warn!(target_secs, "Refusing to trim audio to a non-positive duration");
        return ReconciledAudio::Untrimmed;
    }

    match trim_audio(runner, audio, target_secs, codec).await {
        Ok(file) => ReconciledAudio::Trimmed(file),
        Err(e) => {
            warn!(
                audio = %audio.display(),
                "Could not adjust audio duration: {}", e
            );
            ReconciledAudio::Untrimmed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_select_prefers_trimmed_file() {
        let dir = TempDir::new().unwrap();
        let original = dir.path().join("narration.mp3");
        let trimmed = ScratchFile::create_in(dir.path(), "narration_adjusted_", ".mp3").unwrap();
        let trimmed_path = trimmed.path().to_path_buf();

        let reconciled = ReconciledAudio::Trimmed(trimmed);
        assert_eq!(reconciled.select(&original), trimmed_path.as_path());
        assert_eq!(ReconciledAudio::Untrimmed.select(&original), original.as_path());
    }

    #[tokio::test]
    async fn test_failed_trim_falls_back_and_leaves_no_output() {
        let dir = TempDir::new().unwrap();
        let audio = dir.path().join("narration.mp3");
        std::fs::write(&audio, b"id3").unwrap();

        let runner = FfmpegRunner::new().with_binary("no-such-ffmpeg-binary");
        let reconciled = reconcile_audio(&runner, &audio, 10.0, "libmp3lame").await;

        assert!(!reconciled.is_trimmed());
        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1, "only the original audio should remain");
    }

    #[tokio::test]
    async fn test_non_positive_target_is_untrimmed() {
        let runner = FfmpegRunner::new();
        let reconciled = reconcile_audio(&runner, Path::new("narration.mp3"), 0.0, "libmp3lame").await;
        assert!(!reconciled.is_trimmed());
    }
}
