//! FFprobe duration inspection.

use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::warn;

use crate::command::check_tool;
use crate::error::{stderr_tail, MediaError, MediaResult};

/// Duration assumed when a rendered artifact cannot be probed.
pub const DEFAULT_DURATION_FALLBACK_SECS: f64 = 10.0;

/// Outcome of a best-effort duration probe.
///
/// Probing never fails from the caller's point of view: a failure yields
/// [`ProbedDuration::Fallback`] carrying the configured default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbedDuration {
    /// Duration reported by the prober
    Measured(f64),
    /// Prober failed; the configured default is used
    Fallback(f64),
}

impl ProbedDuration {
    pub fn seconds(&self) -> f64 {
        match self {
            ProbedDuration::Measured(s) | ProbedDuration::Fallback(s) => *s,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ProbedDuration::Fallback(_))
    }
}

/// FFprobe `-show_format` JSON output.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    /// FFprobe prints this as a string, other tools as a number
    duration: Option<serde_json::Value>,
}

/// Probe a media file for its container duration in seconds.
pub async fn probe_duration(ffprobe: &str, path: impl AsRef<Path>) -> MediaResult<f64> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    check_tool(ffprobe)?;

    let output = Command::new(ffprobe)
        .args(["-v", "quiet", "-print_format", "json", "-show_format"])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::ffprobe_failed(
            format!("FFprobe exited with {}", output.status),
            stderr_tail(&output.stderr, 10),
        ));
    }

    parse_duration(&output.stdout)
}

/// Probe a media file, substituting `fallback` on any failure.
pub async fn probe_duration_or(ffprobe: &str, path: impl AsRef<Path>, fallback: f64) -> ProbedDuration {
    let path = path.as_ref();
    match probe_duration(ffprobe, path).await {
        Ok(seconds) => ProbedDuration::Measured(seconds),
        Err(e) => {
            warn!(
                path = %path.display(),
                fallback_secs = fallback,
                "Could not get video duration: {}", e
            );
            ProbedDuration::Fallback(fallback)
        }
    }
}

/// Extract a positive, finite `format.duration` from FFprobe JSON.
fn parse_duration(stdout: &[u8]) -> MediaResult<f64> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;

    let seconds = match probe.format.duration {
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        _ => None,
    };

    seconds
        .filter(|s| s.is_finite() && *s > 0.0)
        .ok_or(MediaError::MissingDuration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_string() {
        let json = br#"{"format":{"filename":"Scene.mp4","duration":"12.400000"}}"#;
        assert!((parse_duration(json).unwrap() - 12.4).abs() < 1e-9);
    }

    #[test]
    fn test_parse_duration_number() {
        let json = br#"{"format":{"duration":7.5}}"#;
        assert_eq!(parse_duration(json).unwrap(), 7.5);
    }

    #[test]
    fn test_parse_duration_missing_field() {
        let json = br#"{"format":{"filename":"Scene.mp4"}}"#;
        assert!(matches!(parse_duration(json), Err(MediaError::MissingDuration)));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(matches!(parse_duration(b"not json"), Err(MediaError::JsonParse(_))));
        assert!(parse_duration(br#"{"format":{"duration":"N/A"}}"#).is_err());
        assert!(parse_duration(br#"{"format":{"duration":"0"}}"#).is_err());
        assert!(parse_duration(br#"{}"#).is_err());
    }

    #[tokio::test]
    async fn test_missing_file_falls_back() {
        let probed = probe_duration_or("ffprobe", "/nonexistent/Scene.mp4", DEFAULT_DURATION_FALLBACK_SECS).await;
        assert_eq!(probed, ProbedDuration::Fallback(10.0));
        assert_eq!(probed.seconds(), 10.0);
        assert!(probed.is_fallback());
    }

    #[tokio::test]
    async fn test_missing_prober_falls_back() {
        let dir = tempfile::TempDir::new().unwrap();
        let video = dir.path().join("Scene.mp4");
        std::fs::write(&video, b"not really a video").unwrap();

        let probed = probe_duration_or("no-such-ffprobe-binary", &video, 10.0).await;
        assert_eq!(probed, ProbedDuration::Fallback(10.0));
    }
}
