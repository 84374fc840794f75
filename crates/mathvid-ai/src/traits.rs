//! Seams between the pipeline and the remote AI services.

use async_trait::async_trait;
use mathvid_media::ScratchFile;

use crate::elevenlabs::ElevenLabsClient;
use crate::error::AiResult;
use crate::gemini::GeminiClient;

/// Produces the raw three-section response for a prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> AiResult<String>;
}

/// Turns narration text into a scratch audio file owned by the caller.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> AiResult<ScratchFile>;
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> AiResult<String> {
        self.generate_text(prompt).await
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    async fn synthesize(&self, text: &str) -> AiResult<ScratchFile> {
        self.synthesize_to_file(text).await
    }
}
