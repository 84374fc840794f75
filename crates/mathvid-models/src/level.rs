//! Audience level for a generated explainer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How deep the explanation should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// Fundamental concepts and terminology
    #[default]
    Basic,
    /// Relationships between concepts, some derivation
    Intermediate,
    /// Advanced material and in-depth analysis
    SpecialTopic,
}

impl Level {
    pub const ALL: &'static [Level] = &[Level::Basic, Level::Intermediate, Level::SpecialTopic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Basic => "basic",
            Level::Intermediate => "intermediate",
            Level::SpecialTopic => "special_topic",
        }
    }

    /// Audience description injected into the generation prompt.
    pub fn description(&self) -> &'static str {
        match self {
            Level::Basic => "fundamental concepts, simple explanations, basic terminology",
            Level::Intermediate => {
                "more detailed explanations, some mathematical relationships, intermediate concepts"
            }
            Level::SpecialTopic => "advanced concepts, complex relationships, in-depth analysis",
        }
    }

    /// Label used in catalog titles.
    ///
    /// Each underscore-separated word is capitalised and the underscores are
    /// kept, so `special_topic` becomes `Special_Topic`.
    pub fn title(&self) -> &'static str {
        match self {
            Level::Basic => "Basic",
            Level::Intermediate => "Intermediate",
            Level::SpecialTopic => "Special_Topic",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Level {
    type Err = LevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(Level::Basic),
            "intermediate" => Ok(Level::Intermediate),
            "special_topic" => Ok(Level::SpecialTopic),
            _ => Err(LevelParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown level: {0}")]
pub struct LevelParseError(String);
