//! Catalog records listed by the web UI.

use serde::{Deserialize, Serialize};

use crate::{GenerationRequest, Level, PipelineOutcome};

/// Titles longer than this many characters are cut and suffixed with `...`.
pub const MAX_TITLE_CHARS: usize = 50;

/// One generated video, as persisted in the catalog document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub title: String,
    pub url: String,
    pub filename: String,
    pub level: Level,
    pub subtitles: String,
}

impl VideoRecord {
    /// Build the catalog entry for a finished run.
    ///
    /// `url_prefix` is the public route the artifact is served under, e.g. `/videos`.
    pub fn from_outcome(
        request: &GenerationRequest,
        outcome: &PipelineOutcome,
        url_prefix: &str,
    ) -> Self {
        let filename = outcome.file_name().unwrap_or_default().to_string();
        let url = format!("{}/{}", url_prefix.trim_end_matches('/'), filename);

        Self {
            title: catalog_title(&request.topic, request.level),
            url,
            filename,
            level: request.level,
            subtitles: outcome.caption_track.clone(),
        }
    }
}

/// Format `"<topic> (<Level>)"`, cut to [`MAX_TITLE_CHARS`] characters.
pub fn catalog_title(topic: &str, level: Level) -> String {
    let full = format!("{} ({})", topic, level.title());
    if full.chars().count() <= MAX_TITLE_CHARS {
        return full;
    }
    let mut title: String = full.chars().take(MAX_TITLE_CHARS).collect();
    title.push_str("...");
    title
}
