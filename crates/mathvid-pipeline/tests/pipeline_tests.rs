//! Orchestrator scenarios driven through fake seams.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use mathvid_ai::{AiError, AiResult, SpeechSynthesizer, TextGenerator};
use mathvid_media::{MediaError, MediaResult, MediaTools, ProbedDuration, ReconciledAudio, SceneRenderer, ScratchFile};
use mathvid_models::{GenerationRequest, Level, RenderedArtifact};
use mathvid_pipeline::{Degradation, Pipeline, PipelineConfig, PipelineError, PipelineStage, VideoPipeline};

const FULL_RESPONSE: &str = "MANIM_CODE:\n```python\nX\n```\nVOICE_SCRIPT:\nHello\nSUBTITLES:\nWEBVTT...";
const SILENT_RESPONSE: &str = "MANIM_CODE:\n```python\nX\n```\nVOICE_SCRIPT:\n\nSUBTITLES:\nWEBVTT...";

struct FakeGenerator {
    response: Option<String>,
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> AiResult<String> {
        assert!(prompt.contains("MathExplanationScene"));
        self.response
            .clone()
            .ok_or_else(|| AiError::empty_response("No content in Gemini response"))
    }
}

#[derive(Clone, Copy, PartialEq)]
enum RenderBehavior {
    Succeed,
    Crash,
    NoOutput,
}

struct FakeRenderer {
    output_dir: PathBuf,
    behavior: RenderBehavior,
    seen_code: Mutex<Vec<String>>,
}

#[async_trait]
impl SceneRenderer for FakeRenderer {
    async fn render(&self, code: &str, scene: &str) -> MediaResult<RenderedArtifact> {
        self.seen_code.lock().unwrap().push(code.to_string());
        match self.behavior {
            RenderBehavior::Succeed => {
                std::fs::create_dir_all(&self.output_dir)?;
                let path = self.output_dir.join(format!("{}.mp4", scene));
                std::fs::write(&path, b"frames")?;
                Ok(RenderedArtifact::new(path))
            }
            RenderBehavior::Crash => Err(MediaError::render_failed(
                "Render engine exited with exit status: 1",
                Some("NameError: name 'X' is not defined".to_string()),
                Some(1),
            )),
            RenderBehavior::NoOutput => Err(MediaError::ArtifactNotFound(self.output_dir.join("runs"))),
        }
    }
}

struct FakeSynthesizer {
    scratch_dir: PathBuf,
    fail: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl SpeechSynthesizer for FakeSynthesizer {
    async fn synthesize(&self, text: &str) -> AiResult<ScratchFile> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let file = ScratchFile::create_in(&self.scratch_dir, "narration_", ".mp3")?;
        std::fs::write(file.path(), text.as_bytes())?;
        if self.fail {
            // Partial download is dropped with the handle
            return Err(AiError::Status {
                service: "ElevenLabs",
                status: 500,
                body: "internal error".to_string(),
            });
        }
        Ok(file)
    }
}

struct FakeMedia {
    probe: ProbedDuration,
    trim: bool,
    fail_mux: bool,
    targets: Mutex<Vec<f64>>,
    muxed_audio: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl MediaTools for FakeMedia {
    async fn probe_duration(&self, _video: &Path) -> ProbedDuration {
        self.probe
    }

    async fn reconcile(&self, audio: &Path, target_secs: f64) -> ReconciledAudio {
        self.targets.lock().unwrap().push(target_secs);
        if !self.trim {
            return ReconciledAudio::Untrimmed;
        }
        let dir = audio.parent().unwrap();
        let trimmed = ScratchFile::create_in(dir, "narration_adjusted_", ".mp3").unwrap();
        std::fs::write(trimmed.path(), b"trimmed").unwrap();
        ReconciledAudio::Trimmed(trimmed)
    }

    async fn mux(&self, video: &Path, audio: &Path) -> MediaResult<()> {
        self.muxed_audio.lock().unwrap().push(audio.to_path_buf());
        assert!(audio.exists(), "audio must exist while muxing");
        if self.fail_mux {
            return Err(MediaError::ffmpeg_failed("FFmpeg exited with non-zero status", None, Some(1)));
        }
        std::fs::write(video, b"muxed")?;
        Ok(())
    }
}

struct Harness {
    _root: TempDir,
    output_dir: PathBuf,
    scratch_dir: PathBuf,
    renderer: Arc<FakeRenderer>,
    synthesizer: Arc<FakeSynthesizer>,
    media: Arc<FakeMedia>,
    pipeline: Pipeline,
}

struct Setup {
    response: Option<&'static str>,
    render: RenderBehavior,
    fail_synthesis: bool,
    probe: ProbedDuration,
    trim: bool,
    fail_mux: bool,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            response: Some(FULL_RESPONSE),
            render: RenderBehavior::Succeed,
            fail_synthesis: false,
            probe: ProbedDuration::Measured(12.5),
            trim: true,
            fail_mux: false,
        }
    }
}

impl Harness {
    fn new(setup: Setup) -> Self {
        let root = TempDir::new().unwrap();
        let output_dir = root.path().join("generated");
        let scratch_dir = root.path().join("scratch");
        std::fs::create_dir_all(&scratch_dir).unwrap();

        let config = Arc::new(PipelineConfig {
            output_dir: output_dir.clone(),
            scratch_dir: scratch_dir.clone(),
            media_root: root.path().join("media"),
            ..PipelineConfig::default()
        });

        let generator = Arc::new(FakeGenerator {
            response: setup.response.map(String::from),
        });
        let renderer = Arc::new(FakeRenderer {
            output_dir: output_dir.clone(),
            behavior: setup.render,
            seen_code: Mutex::new(Vec::new()),
        });
        let synthesizer = Arc::new(FakeSynthesizer {
            scratch_dir: scratch_dir.clone(),
            fail: setup.fail_synthesis,
            calls: AtomicUsize::new(0),
        });
        let media = Arc::new(FakeMedia {
            probe: setup.probe,
            trim: setup.trim,
            fail_mux: setup.fail_mux,
            targets: Mutex::new(Vec::new()),
            muxed_audio: Mutex::new(Vec::new()),
        });

        let pipeline = Pipeline::new(
            config,
            generator,
            synthesizer.clone(),
            renderer.clone(),
            media.clone(),
        );

        Self {
            _root: root,
            output_dir,
            scratch_dir,
            renderer,
            synthesizer,
            media,
            pipeline,
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("Pythagorean theorem", Level::Basic)
    }

    fn scratch_entries(&self) -> Vec<String> {
        std::fs::read_dir(&self.scratch_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect()
    }

    fn output_entries(&self) -> Vec<String> {
        match std::fs::read_dir(&self.output_dir) {
            Ok(entries) => entries
                .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

#[tokio::test]
async fn test_narrated_run_produces_muxed_artifact() {
    let h = Harness::new(Setup::default());

    let report = h.pipeline.run_report(&Harness::request()).await;
    let outcome = report.result.unwrap();

    assert!(outcome.narrated);
    assert_eq!(outcome.caption_track, "WEBVTT...");
    assert_eq!(outcome.final_artifact_path, h.output_dir.join("MathExplanationScene.mp4"));
    assert_eq!(std::fs::read(&outcome.final_artifact_path).unwrap(), b"muxed");
    assert_eq!(h.renderer.seen_code.lock().unwrap().as_slice(), ["X"]);

    assert_eq!(
        report.stages,
        vec![
            PipelineStage::Generating,
            PipelineStage::Parsing,
            PipelineStage::Rendering,
            PipelineStage::SynthesizingAudio,
            PipelineStage::ProbingDuration,
            PipelineStage::Reconciling,
            PipelineStage::Muxing,
            PipelineStage::Done,
        ]
    );
    assert!(report.degradations.is_empty());
    assert_eq!(h.media.targets.lock().unwrap().as_slice(), [12.5]);

    let muxed = h.media.muxed_audio.lock().unwrap();
    assert!(muxed[0]
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("narration_adjusted_"));
    assert!(h.scratch_entries().is_empty(), "scratch audio leaked: {:?}", h.scratch_entries());
}

#[tokio::test]
async fn test_empty_narration_skips_audio_chain() {
    let h = Harness::new(Setup {
        response: Some(SILENT_RESPONSE),
        ..Setup::default()
    });

    let report = h.pipeline.run_report(&Harness::request()).await;
    let outcome = report.result.unwrap();

    assert!(!outcome.narrated);
    assert_eq!(std::fs::read(&outcome.final_artifact_path).unwrap(), b"frames");
    assert_eq!(
        report.stages,
        vec![
            PipelineStage::Generating,
            PipelineStage::Parsing,
            PipelineStage::Rendering,
            PipelineStage::Done,
        ]
    );
    assert_eq!(h.synthesizer.calls.load(Ordering::SeqCst), 0);
    assert!(h.media.targets.lock().unwrap().is_empty());
    assert!(report
        .degradations
        .contains(&Degradation::MissingSections { sections: vec!["narration_script"] }));
}

#[tokio::test]
async fn test_render_failure_aborts_before_audio() {
    let h = Harness::new(Setup {
        render: RenderBehavior::Crash,
        ..Setup::default()
    });

    let report = h.pipeline.run_report(&Harness::request()).await;
    let err = report.result.unwrap_err();

    assert!(matches!(err, PipelineError::RenderFailed(_)));
    assert!(err.to_string().starts_with("Failed to render video"));
    assert_eq!(report.stages.last(), Some(&PipelineStage::Failed));
    assert_eq!(report.stages[report.stages.len() - 2], PipelineStage::Rendering);
    assert_eq!(h.synthesizer.calls.load(Ordering::SeqCst), 0);
    assert!(h.scratch_entries().is_empty());
}

#[tokio::test]
async fn test_missing_render_output_is_artifact_not_found() {
    let h = Harness::new(Setup {
        render: RenderBehavior::NoOutput,
        ..Setup::default()
    });

    let err = h.pipeline.run(&Harness::request()).await.unwrap_err();
    assert!(matches!(err, PipelineError::ArtifactNotFound(_)));
    assert_eq!(err.stage(), Some(PipelineStage::Rendering));
}

#[tokio::test]
async fn test_probe_fallback_is_used_for_trim() {
    let h = Harness::new(Setup {
        probe: ProbedDuration::Fallback(10.0),
        ..Setup::default()
    });

    let report = h.pipeline.run_report(&Harness::request()).await;

    assert!(report.result.is_ok());
    assert_eq!(h.media.targets.lock().unwrap().as_slice(), [10.0]);
    assert!(report.stages.contains(&PipelineStage::Muxing));
    assert_eq!(report.degradations, vec![Degradation::ProbeFallback { duration_secs: 10.0 }]);
}

#[tokio::test]
async fn test_untrimmed_audio_is_muxed_and_cleaned_up() {
    let h = Harness::new(Setup {
        trim: false,
        ..Setup::default()
    });

    let report = h.pipeline.run_report(&Harness::request()).await;

    assert!(report.result.is_ok());
    assert_eq!(report.degradations, vec![Degradation::UntrimmedAudio]);
    let muxed = h.media.muxed_audio.lock().unwrap();
    assert!(muxed[0]
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("narration_"));
    assert!(!muxed[0].exists());
    assert!(h.scratch_entries().is_empty());
}

#[tokio::test]
async fn test_mux_failure_discards_everything() {
    let h = Harness::new(Setup {
        fail_mux: true,
        ..Setup::default()
    });

    let report = h.pipeline.run_report(&Harness::request()).await;
    let err = report.result.unwrap_err();

    assert!(matches!(err, PipelineError::MuxFailed(_)));
    assert_eq!(report.stages.last(), Some(&PipelineStage::Failed));
    assert!(h.scratch_entries().is_empty(), "scratch leaked: {:?}", h.scratch_entries());
    assert!(h.output_entries().is_empty(), "partial artifact exposed: {:?}", h.output_entries());
}

#[tokio::test]
async fn test_synthesis_failure_discards_artifact_and_audio() {
    let h = Harness::new(Setup {
        fail_synthesis: true,
        ..Setup::default()
    });

    let err = h.pipeline.run(&Harness::request()).await.unwrap_err();

    assert!(matches!(err, PipelineError::SynthesisFailed(_)));
    assert!(err.to_string().starts_with("Failed to generate audio"));
    assert!(h.scratch_entries().is_empty());
    assert!(h.output_entries().is_empty());
    assert!(h.media.targets.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_generation_failure_renders_nothing() {
    let h = Harness::new(Setup {
        response: None,
        ..Setup::default()
    });

    let report = h.pipeline.run_report(&Harness::request()).await;

    assert!(matches!(report.result, Err(PipelineError::GenerationFailed(_))));
    assert_eq!(report.stages, vec![PipelineStage::Generating, PipelineStage::Failed]);
    assert!(h.renderer.seen_code.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_run_response_starts_at_parsing() {
    let h = Harness::new(Setup::default());

    let report = h.pipeline.run_response_report(FULL_RESPONSE).await;

    assert_eq!(report.stages.first(), Some(&PipelineStage::Parsing));
    assert_eq!(report.stages.last(), Some(&PipelineStage::Done));
    assert!(h.pipeline.run_response(SILENT_RESPONSE).await.is_ok());
}
