//! Shared data models for the MathVid pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Generation requests and audience levels
//! - The three-part generation result parsed from the model response
//! - Rendered artifacts and pipeline outcomes
//! - Catalog records shown in the web UI

pub mod artifact;
pub mod catalog;
pub mod level;
pub mod request;
pub mod run;

// Re-export common types
pub use artifact::{PipelineOutcome, RenderedArtifact};
pub use catalog::{catalog_title, VideoRecord, MAX_TITLE_CHARS};
pub use level::{Level, LevelParseError};
pub use request::{GenerationRequest, GenerationResult, RequestError};
pub use run::RunId;
