//! Pipeline orchestrator.
//!
//! One run is a strictly sequential chain:
//! generate -> parse -> render -> [synthesize -> probe -> reconcile -> mux] -> done.
//! The bracketed audio chain only runs when the response carries narration.
//!
//! Every intermediate file is a [`ScratchFile`], including the rendered video
//! until the run reaches `Done`. A hard failure at any stage therefore drops
//! them all, so a failed run leaves neither scratch audio nor a partial
//! artifact behind.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, Instrument};

use mathvid_ai::{build_prompt, ElevenLabsClient, ElevenLabsConfig, GeminiClient, GeminiConfig};
use mathvid_ai::{SpeechSynthesizer, TextGenerator};
use mathvid_media::{FfmpegToolkit, ManimRenderer, MediaTools, ProbedDuration, SceneRenderer, ScratchFile};
use mathvid_models::{GenerationRequest, PipelineOutcome, RunId};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::logging::RunLogger;
use crate::metrics;
use crate::parser::parse_response;
use crate::stage::{PipelineStage, StageTracker};

/// A fallback taken by a run instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    /// Response sections that were absent and became empty
    MissingSections { sections: Vec<&'static str> },
    /// The rendered video could not be probed; the fallback duration was used
    ProbeFallback { duration_secs: f64 },
    /// Trimming failed; the untrimmed narration was muxed
    UntrimmedAudio,
}

/// Everything observable about one finished run.
#[derive(Debug)]
pub struct RunReport {
    pub run_id: RunId,
    /// Stages entered, ending in `Done` or `Failed`
    pub stages: Vec<PipelineStage>,
    pub degradations: Vec<Degradation>,
    pub result: PipelineResult<PipelineOutcome>,
}

/// Something that turns a request into a finished video.
#[async_trait]
pub trait VideoPipeline: Send + Sync {
    async fn run(&self, request: &GenerationRequest) -> PipelineResult<PipelineOutcome>;
}

/// The generation pipeline.
pub struct Pipeline {
    config: Arc<PipelineConfig>,
    generator: Arc<dyn TextGenerator>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    renderer: Arc<dyn SceneRenderer>,
    media: Arc<dyn MediaTools>,
}

impl Pipeline {
    pub fn new(
        config: Arc<PipelineConfig>,
        generator: Arc<dyn TextGenerator>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        renderer: Arc<dyn SceneRenderer>,
        media: Arc<dyn MediaTools>,
    ) -> Self {
        Self {
            config,
            generator,
            synthesizer,
            renderer,
            media,
        }
    }

    /// Wire the production clients and tool wrappers.
    pub fn production(
        config: Arc<PipelineConfig>,
        gemini: GeminiConfig,
        mut elevenlabs: ElevenLabsConfig,
    ) -> PipelineResult<Self> {
        elevenlabs.scratch_dir = config.scratch_dir.clone();

        let generator = GeminiClient::new(gemini)
            .map_err(|e| PipelineError::config(format!("Gemini client: {}", e)))?;
        let synthesizer = ElevenLabsClient::new(elevenlabs)
            .map_err(|e| PipelineError::config(format!("ElevenLabs client: {}", e)))?;
        let renderer = ManimRenderer::new(config.render_settings());
        let media = FfmpegToolkit::new(config.toolkit_settings());

        Ok(Self::new(
            config,
            Arc::new(generator),
            Arc::new(synthesizer),
            Arc::new(renderer),
            Arc::new(media),
        ))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline for `request`, starting with text generation.
    pub async fn run_report(&self, request: &GenerationRequest) -> RunReport {
        let run_id = RunId::new();
        let logger = RunLogger::new(&run_id, &request.topic);
        let mut tracker = StageTracker::new(run_id.as_str(), PipelineStage::Generating);
        let mut degradations = Vec::new();

        metrics::record_run_started();
        logger.log_start(&format!("level={}", request.level));

        let result = self
            .generate_and_execute(request, &logger, &mut tracker, &mut degradations)
            .instrument(logger.create_span())
            .await;

        conclude(run_id, &logger, tracker, degradations, result)
    }

    /// Run everything after generation on an already obtained response.
    pub async fn run_response_report(&self, raw: &str) -> RunReport {
        let run_id = RunId::new();
        let logger = RunLogger::new(&run_id, "");
        let mut tracker = StageTracker::new(run_id.as_str(), PipelineStage::Parsing);
        let mut degradations = Vec::new();

        metrics::record_run_started();
        logger.log_start("from raw response");

        let result = self
            .execute(raw, &logger, &mut tracker, &mut degradations)
            .instrument(logger.create_span())
            .await;

        conclude(run_id, &logger, tracker, degradations, result)
    }

    pub async fn run_response(&self, raw: &str) -> PipelineResult<PipelineOutcome> {
        self.run_response_report(raw).await.result
    }

    async fn generate_and_execute(
        &self,
        request: &GenerationRequest,
        logger: &RunLogger,
        tracker: &mut StageTracker,
        degradations: &mut Vec<Degradation>,
    ) -> PipelineResult<PipelineOutcome> {
        logger.log_stage(PipelineStage::Generating);
        let prompt = build_prompt(&request.topic, request.level, &self.config.scene_name);
        let raw = self
            .generator
            .generate(&prompt)
            .await
            .map_err(PipelineError::GenerationFailed)?;

        enter(tracker, logger, PipelineStage::Parsing);
        self.execute(&raw, logger, tracker, degradations).await
    }

    async fn execute(
        &self,
        raw: &str,
        logger: &RunLogger,
        tracker: &mut StageTracker,
        degradations: &mut Vec<Degradation>,
    ) -> PipelineResult<PipelineOutcome> {
        let parsed = parse_response(raw);
        let missing = parsed.missing_sections();
        if !missing.is_empty() {
            logger.log_warning(&format!("Response is missing sections: {}", missing.join(", ")));
            metrics::record_degradation("missing_sections");
            degradations.push(Degradation::MissingSections { sections: missing });
        }

        enter(tracker, logger, PipelineStage::Rendering);
        let rendered = self
            .renderer
            .render(&parsed.scene_code, &self.config.scene_name)
            .await
            .map_err(PipelineError::from_render)?;
        let artifact = ScratchFile::adopt(rendered.path.clone());

        if !parsed.has_narration() {
            enter(tracker, logger, PipelineStage::Done);
            return Ok(PipelineOutcome {
                final_artifact_path: artifact.keep(),
                caption_track: parsed.caption_track,
                narrated: false,
            });
        }

        enter(tracker, logger, PipelineStage::SynthesizingAudio);
        let audio = self
            .synthesizer
            .synthesize(&parsed.narration_script)
            .await
            .map_err(PipelineError::SynthesisFailed)?;

        enter(tracker, logger, PipelineStage::ProbingDuration);
        let probed = self.media.probe_duration(artifact.path()).await;
        if let ProbedDuration::Fallback(secs) = probed {
            logger.log_warning(&format!("Using fallback video duration of {}s", secs));
            metrics::record_degradation("probe_fallback");
            degradations.push(Degradation::ProbeFallback { duration_secs: secs });
        }
        let rendered = rendered.with_duration(probed.seconds());
        debug!(artifact = %rendered.path.display(), duration_secs = ?rendered.duration_seconds, "Video duration");

        enter(tracker, logger, PipelineStage::Reconciling);
        let reconciled = self.media.reconcile(audio.path(), probed.seconds()).await;
        if !reconciled.is_trimmed() {
            logger.log_warning("Muxing untrimmed narration");
            metrics::record_degradation("untrimmed_audio");
            degradations.push(Degradation::UntrimmedAudio);
        }

        enter(tracker, logger, PipelineStage::Muxing);
        self.media
            .mux(artifact.path(), reconciled.select(audio.path()))
            .await
            .map_err(PipelineError::MuxFailed)?;

        // Intermediate audio goes before the run is reported done
        drop(reconciled);
        drop(audio);

        enter(tracker, logger, PipelineStage::Done);
        Ok(PipelineOutcome {
            final_artifact_path: artifact.keep(),
            caption_track: parsed.caption_track,
            narrated: true,
        })
    }
}

#[async_trait]
impl VideoPipeline for Pipeline {
    async fn run(&self, request: &GenerationRequest) -> PipelineResult<PipelineOutcome> {
        self.run_report(request).await.result
    }
}

fn enter(tracker: &mut StageTracker, logger: &RunLogger, stage: PipelineStage) {
    tracker.advance(stage);
    logger.log_stage(stage);
}

fn conclude(
    run_id: RunId,
    logger: &RunLogger,
    mut tracker: StageTracker,
    degradations: Vec<Degradation>,
    result: PipelineResult<PipelineOutcome>,
) -> RunReport {
    match &result {
        Ok(outcome) => {
            metrics::record_run_completed(outcome.narrated);
            logger.log_completion(&outcome.final_artifact_path.display().to_string());
        }
        Err(e) => {
            tracker.fail();
            metrics::record_run_failed(e.kind());
            match e.diagnostics() {
                Some(diag) => logger.log_error(&format!("{}\n{}", e, diag)),
                None => logger.log_error(&e.to_string()),
            }
        }
    }

    RunReport {
        run_id,
        stages: tracker.into_trace(),
        degradations,
        result,
    }
}
