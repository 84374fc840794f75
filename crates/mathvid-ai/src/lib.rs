//! Clients for the remote services behind the MathVid pipeline.
//!
//! - Gemini for the scene code, narration and captions
//! - ElevenLabs for narration audio, streamed into scratch files

pub mod elevenlabs;
pub mod error;
pub mod gemini;
pub mod prompt;
pub mod traits;

pub use elevenlabs::{ElevenLabsClient, ElevenLabsConfig};
pub use error::{AiError, AiResult};
pub use gemini::{GeminiClient, GeminiConfig};
pub use prompt::{build_prompt, CAPTIONS_MARKER, NARRATION_MARKER, SCENE_MARKER};
pub use traits::{SpeechSynthesizer, TextGenerator};
