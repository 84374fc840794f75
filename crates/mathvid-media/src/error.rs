//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while rendering, probing, trimming or muxing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("{0} not found in PATH")]
    ToolNotFound(String),

    #[error("Render engine failed: {message}")]
    RenderFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("Video file not found after rendering under {}", .0.display())]
    ArtifactNotFound(PathBuf),

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("FFprobe output has no usable format.duration")]
    MissingDuration,

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    /// Create a render failure error.
    pub fn render_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::RenderFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create an FFprobe failure error.
    pub fn ffprobe_failed(message: impl Into<String>, stderr: Option<String>) -> Self {
        Self::FfprobeFailed {
            message: message.into(),
            stderr,
        }
    }

    /// Captured stderr of the failed subprocess, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            MediaError::RenderFailed { stderr, .. }
            | MediaError::FfmpegFailed { stderr, .. }
            | MediaError::FfprobeFailed { stderr, .. } => stderr.as_deref(),
            _ => None,
        }
    }
}

/// Keep the last `max_lines` lines of a subprocess stderr dump.
pub(crate) fn stderr_tail(stderr: &[u8], max_lines: usize) -> Option<String> {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return None;
    }
    let start = lines.len().saturating_sub(max_lines);
    Some(lines[start..].join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stderr_tail_keeps_last_lines() {
        let tail = stderr_tail(b"one\ntwo\n\nthree\nfour\n", 2).unwrap();
        assert_eq!(tail, "three\nfour");
    }

    #[test]
    fn test_stderr_tail_empty() {
        assert!(stderr_tail(b"\n  \n", 5).is_none());
    }

    #[test]
    fn test_stderr_accessor() {
        let err = MediaError::render_failed("exit 1", Some("NameError".into()), Some(1));
        assert_eq!(err.stderr(), Some("NameError"));
        assert!(MediaError::MissingDuration.stderr().is_none());
    }
}
