//! Catalog listing and video streaming handlers.

use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::response::Response;
use axum::Json;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::debug;

use mathvid_models::VideoRecord;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// List catalog records, newest first.
pub async fn list_videos(State(state): State<AppState>) -> ApiResult<Json<Vec<VideoRecord>>> {
    Ok(Json(state.catalog.load().await?))
}

/// Stream one finished video from the output directory.
///
/// Range requests are honoured, so players can seek.
pub async fn stream_video(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    request: Request,
) -> ApiResult<Response> {
    if !is_plain_file_name(&filename) {
        return Err(ApiError::bad_request("Invalid filename"));
    }

    let path = state.video_dir.join(&filename);
    let is_file = tokio::fs::metadata(&path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(ApiError::not_found("Video not found"));
    }

    debug!(path = %path.display(), "Streaming video");
    let response = match ServeFile::new(&path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    Ok(response.map(Body::new))
}

/// A single path component that cannot escape the output directory.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
}
