//! MathVid generation pipeline.
//!
//! This crate provides:
//! - Parsing of the model's three-section response
//! - The staged orchestrator that renders, narrates, aligns and muxes
//! - Pipeline configuration, run logging and metrics

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod orchestrator;
pub mod parser;
pub mod stage;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use logging::RunLogger;
pub use orchestrator::{Degradation, Pipeline, RunReport, VideoPipeline};
pub use parser::parse_response;
pub use stage::{PipelineStage, StageTracker};
