//! Pipeline input and the parsed model response.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Level;

/// One user request: a math topic and the audience level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub topic: String,
    #[serde(default)]
    pub level: Level,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("No text provided")]
    EmptyTopic,
}

impl GenerationRequest {
    pub fn new(topic: impl Into<String>, level: Level) -> Self {
        Self {
            topic: topic.into(),
            level,
        }
    }

    /// Validate the request.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.topic.trim().is_empty() {
            return Err(RequestError::EmptyTopic);
        }
        Ok(())
    }
}

/// The three artifacts split out of one raw model response.
///
/// Any field may be empty when its section was missing from the response.
/// That is a valid state and downstream stages must tolerate it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Scene-description program for the render engine
    pub scene_code: String,
    /// Narration text with `[MM:SS]` timing markers
    pub narration_script: String,
    /// Caption track (WebVTT)
    pub caption_track: String,
}

impl GenerationResult {
    /// Whether the audio sub-chain should run.
    pub fn has_narration(&self) -> bool {
        !self.narration_script.trim().is_empty()
    }

    /// Names of the sections that came back empty.
    pub fn missing_sections(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.scene_code.is_empty() {
            missing.push("scene_code");
        }
        if self.narration_script.is_empty() {
            missing.push("narration_script");
        }
        if self.caption_track.is_empty() {
            missing.push("caption_track");
        }
        missing
    }
}
