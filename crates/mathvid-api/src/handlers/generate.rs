//! Video generation handler.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use mathvid_models::{GenerationRequest, Level, VideoRecord};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Body of `POST /generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub text: String,
    /// Audience level; `basic` when absent
    #[serde(default)]
    pub level: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub video_url: String,
    pub subtitles: String,
}

impl GenerateRequest {
    /// Validate the body. A missing topic is reported before a bad level.
    fn into_generation_request(self) -> ApiResult<GenerationRequest> {
        let mut request = GenerationRequest::new(self.text, Level::default());
        request
            .validate()
            .map_err(|e| ApiError::bad_request(e.to_string()))?;

        if let Some(raw) = self.level.as_deref() {
            request.level = raw
                .parse::<Level>()
                .map_err(|e| ApiError::bad_request(e.to_string()))?;
        }
        Ok(request)
    }
}

/// Run the pipeline for one topic and record the result in the catalog.
///
/// The run is spawned onto its own task and always reaches `Done` or
/// `Failed`, even when the client disconnects while waiting.
/// A failed run never produces a catalog entry.
pub async fn generate_video(
    State(state): State<AppState>,
    Json(body): Json<GenerateRequest>,
) -> ApiResult<Json<GenerateResponse>> {
    let request = body.into_generation_request()?;

    let run = tokio::spawn(generate_and_record(state, request));
    match run.await {
        Ok(result) => result.map(Json),
        Err(e) => {
            error!("Generation task aborted: {}", e);
            Err(ApiError::internal(format!("Generation task aborted: {}", e)))
        }
    }
}

async fn generate_and_record(
    state: AppState,
    request: GenerationRequest,
) -> ApiResult<GenerateResponse> {
    let outcome = state.pipeline.run(&request).await.map_err(|e| {
        warn!(topic = %request.topic, error = %e, "Generation failed");
        ApiError::from(e)
    })?;

    let record = VideoRecord::from_outcome(&request, &outcome, &state.config.url_prefix);
    let response = GenerateResponse {
        video_url: record.url.clone(),
        subtitles: record.subtitles.clone(),
    };

    state.catalog.prepend(record).await?;
    metrics::record_catalog_record_added();

    info!(
        topic = %request.topic,
        level = %request.level,
        video_url = %response.video_url,
        "Video generated"
    );

    Ok(response)
}
