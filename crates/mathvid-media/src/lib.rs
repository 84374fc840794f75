#![deny(unreachable_patterns)]
//! Render engine and FFmpeg CLI wrappers.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building and a runner with progress parsing
//! - Scene rendering through the animation engine, with run-scoped output discovery
//! - Duration probing and audio trimming with explicit fallback results
//! - Audio/video muxing with atomic in-place replacement
//! - RAII scratch files that are reclaimed on every exit path

pub mod command;
pub mod error;
pub mod fs_utils;
pub mod mux;
pub mod probe;
pub mod progress;
pub mod reconcile;
pub mod render;
pub mod scratch;
pub mod tools;

pub use command::{check_tool, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use fs_utils::{move_file, replace_file};
pub use mux::mux_audio_video;
pub use probe::{probe_duration, probe_duration_or, ProbedDuration, DEFAULT_DURATION_FALLBACK_SECS};
pub use progress::FfmpegProgress;
pub use reconcile::{reconcile_audio, trim_audio, ReconciledAudio};
pub use render::{ManimRenderer, RenderSettings};
pub use scratch::ScratchFile;
pub use tools::{FfmpegToolkit, MediaTools, SceneRenderer, ToolkitSettings};
