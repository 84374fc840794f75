//! Scene rendering through the Manim CLI.
//!
//! Manim decides where its output lands: `<media_dir>/videos/<source stem>/<quality>/<Scene>.mp4`.
//! Every render gets its own `--media_dir` under `<media_root>/runs/`, so
//! discovery only ever sees files written by this render, even when several
//! renders run at once. The located video is moved to the canonical output
//! directory; the scratch source and the run directory are deleted on every
//! exit path.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, SystemTime};

use mathvid_models::RenderedArtifact;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::command::check_tool;
use crate::error::{stderr_tail, MediaError, MediaResult};
use crate::fs_utils::replace_file;
use crate::scratch::ScratchFile;

/// Lines of engine output attached to a render failure.
const RENDER_LOG_TAIL_LINES: usize = 20;

/// Render engine settings.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Engine binary name or path
    pub manim_bin: String,
    /// Parent of the per-render media directories
    pub media_root: PathBuf,
    /// Canonical directory for finished artifacts
    pub output_dir: PathBuf,
    /// Where scene sources are written before rendering
    pub scratch_dir: PathBuf,
    /// Quality preset flag passed to the engine
    pub quality_flag: String,
    /// Directory name the engine uses for that preset
    pub quality_dir: String,
    /// Kill the engine after this long
    pub timeout: Option<Duration>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            manim_bin: "manim".to_string(),
            media_root: PathBuf::from("media"),
            output_dir: PathBuf::from("generated"),
            scratch_dir: std::env::temp_dir(),
            quality_flag: "-ql".to_string(),
            quality_dir: "480p15".to_string(),
            timeout: None,
        }
    }
}

/// Renders scene code to a video at a canonical path.
#[derive(Debug, Clone)]
pub struct ManimRenderer {
    settings: RenderSettings,
}

impl ManimRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Render `code`, which must define a scene class named `scene`.
    ///
    /// Returns the artifact at `<output_dir>/<scene>.mp4`, replacing any
    /// earlier render with the same name.
    pub async fn render_scene(&self, code: &str, scene: &str) -> MediaResult<RenderedArtifact> {
        let settings = &self.settings;
        check_tool(&settings.manim_bin)?;

        let source = ScratchFile::create_in(&settings.scratch_dir, "scene_", ".py")?;
        tokio::fs::write(source.path(), code).await?;

        let runs_dir = settings.media_root.join("runs");
        tokio::fs::create_dir_all(&runs_dir).await?;
        let run_dir = tempfile::Builder::new().prefix("run_").tempdir_in(&runs_dir)?;

        info!(
            scene = scene,
            source = %source.path().display(),
            media_dir = %run_dir.path().display(),
            "Rendering scene"
        );

        self.run_engine(source.path(), scene, run_dir.path()).await?;

        let stem = source
            .path()
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let rendered = find_rendered_video(run_dir.path(), &stem, scene, &settings.quality_dir)
            .ok_or_else(|| MediaError::ArtifactNotFound(run_dir.path().join("videos")))?;

        let file_name = rendered
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| format!("{}.mp4", scene).into());
        let dest = settings.output_dir.join(file_name);

        replace_file(&rendered, &dest).await?;

        info!(scene = scene, artifact = %dest.display(), "Scene rendered");
        Ok(RenderedArtifact::new(dest))
    }

    async fn run_engine(&self, source: &Path, scene: &str, media_dir: &Path) -> MediaResult<()> {
        let settings = &self.settings;

        let mut cmd = Command::new(&settings.manim_bin);
        cmd.arg(source)
            .arg(scene)
            .arg(&settings.quality_flag)
            .arg("--media_dir")
            .arg(media_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("Running render engine: {:?}", cmd.as_std());

        let output = match settings.timeout {
            Some(limit) => match tokio::time::timeout(limit, cmd.output()).await {
                Ok(result) => result?,
                Err(_) => {
                    warn!("Render engine timed out after {:?}", limit);
                    return Err(MediaError::Timeout(limit.as_secs()));
                }
            },
            None => cmd.output().await?,
        };

        if output.status.success() {
            return Ok(());
        }

        // Manim reports tracebacks on either stream depending on version
        let log = stderr_tail(&output.stderr, RENDER_LOG_TAIL_LINES)
            .or_else(|| stderr_tail(&output.stdout, RENDER_LOG_TAIL_LINES));

        Err(MediaError::render_failed(
            format!("Render engine exited with {}", output.status),
            log,
            output.status.code(),
        ))
    }
}

/// Locate the video written by one render inside its run directory.
///
/// The exact expected path wins; otherwise the newest `*.mp4` under
/// `<run_dir>/videos/*/<quality_dir>/` is taken.
pub fn find_rendered_video(run_dir: &Path, stem: &str, scene: &str, quality_dir: &str) -> Option<PathBuf> {
    let videos = run_dir.join("videos");

    let exact = videos.join(stem).join(quality_dir).join(format!("{}.mp4", scene));
    if exact.is_file() {
        return Some(exact);
    }

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in std::fs::read_dir(&videos).ok()?.flatten() {
        let quality = entry.path().join(quality_dir);
        let Ok(files) = std::fs::read_dir(&quality) else {
            continue;
        };
        for file in files.flatten() {
            let path = file.path();
            if path.extension().map_or(true, |e| e != "mp4") || !path.is_file() {
                continue;
            }
            let modified = file
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            if newest.as_ref().map_or(true, |(t, _)| modified > *t) {
                newest = Some((modified, path));
            }
        }
    }

    if let Some((_, path)) = &newest {
        debug!("Exact render path missing, using {}", path.display());
    }
    newest.map(|(_, path)| path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"frames").unwrap();
    }

    #[test]
    fn test_find_prefers_exact_path() {
        let run = TempDir::new().unwrap();
        let exact = run.path().join("videos/scene_abc/480p15/GeneratedScene.mp4");
        touch(&run.path().join("videos/other/480p15/Other.mp4"));
        touch(&exact);

        let found = find_rendered_video(run.path(), "scene_abc", "GeneratedScene", "480p15");
        assert_eq!(found, Some(exact));
    }

    #[test]
    fn test_find_falls_back_to_any_video_in_run() {
        let run = TempDir::new().unwrap();
        let only = run.path().join("videos/renamed/480p15/Renamed.mp4");
        touch(&only);
        touch(&run.path().join("videos/renamed/480p15/partial_movie_files.txt"));

        let found = find_rendered_video(run.path(), "scene_abc", "GeneratedScene", "480p15");
        assert_eq!(found, Some(only));
    }

    #[test]
    fn test_find_ignores_other_quality_dirs() {
        let run = TempDir::new().unwrap();
        touch(&run.path().join("videos/scene_abc/1080p60/GeneratedScene.mp4"));

        assert!(find_rendered_video(run.path(), "scene_abc", "GeneratedScene", "480p15").is_none());
    }

    #[test]
    fn test_find_in_empty_run() {
        let run = TempDir::new().unwrap();
        assert!(find_rendered_video(run.path(), "scene_abc", "GeneratedScene", "480p15").is_none());
    }

    #[tokio::test]
    async fn test_missing_engine_is_reported_before_scratch_is_written() {
        let dir = TempDir::new().unwrap();
        let renderer = ManimRenderer::new(RenderSettings {
            manim_bin: "no-such-manim-binary".to_string(),
            media_root: dir.path().join("media"),
            output_dir: dir.path().join("generated"),
            scratch_dir: dir.path().join("scratch"),
            ..RenderSettings::default()
        });

        let err = renderer.render_scene("class GeneratedScene: pass", "GeneratedScene").await.unwrap_err();
        assert!(matches!(err, MediaError::ToolNotFound(_)));
        assert!(!dir.path().join("scratch").exists());
    }
}
