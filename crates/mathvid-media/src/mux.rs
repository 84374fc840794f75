//! Audio/video muxing.

use std::path::Path;
use tracing::{debug, info};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::scratch::ScratchFile;

/// Combine `video` and `audio` into one file that replaces `video` in place.
///
/// The video stream is copied untouched, the audio stream is re-encoded with
/// `audio_codec`, and the result stops at the shorter of the two. FFmpeg
/// writes to a temporary file in the video's directory which is renamed over
/// `video` only once the command succeeds, so the canonical path never holds
/// a half-written file. On failure the temporary file is removed and `video`
/// is left as it was.
pub async fn mux_audio_video(
    runner: &FfmpegRunner,
    video: &Path,
    audio: &Path,
    audio_codec: &str,
) -> MediaResult<()> {
    let dir = video.parent().unwrap_or_else(|| Path::new("."));
    let ext = video
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_else(|| "mp4".to_string());

    let staged = ScratchFile::create_in(dir, ".mux_", &format!(".{}", ext))?;

    let cmd = FfmpegCommand::new(video, staged.path())
        .add_input(audio)
        .copy_video()
        .audio_codec(audio_codec)
        .shortest();

    info!(
        "Muxing audio into video: {} + {}",
        video.display(),
        audio.display()
    );

    runner
        .run_with_progress(&cmd, |progress| {
            debug!(
                out_time_ms = progress.out_time_ms,
                speed = progress.speed,
                complete = progress.is_complete,
                "Mux progress"
            );
        })
        .await?;

    staged.persist(video)?;

    info!("Muxed artifact ready: {}", video.display());
    Ok(())
}
