//! ElevenLabs text-to-speech client.
//!
//! The response body is streamed chunk by chunk into a scratch `.mp3` file,
//! so memory stays flat for long narrations. Any failure drops the scratch
//! handle, which deletes the partial file.

use std::path::PathBuf;
use std::time::Duration;

use futures_util::StreamExt;
use mathvid_media::ScratchFile;
use reqwest::Client;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{AiError, AiResult};

const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";
const DEFAULT_VOICE_ID: &str = "JBFqnCBsd6RMkjVDRZzb";
const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";
const DEFAULT_OUTPUT_FORMAT: &str = "mp3_44100_128";

/// Configuration for the speech client.
#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    pub api_key: String,
    pub base_url: String,
    pub voice_id: String,
    pub model_id: String,
    pub output_format: String,
    /// Directory for synthesized audio scratch files
    pub scratch_dir: PathBuf,
    pub timeout: Duration,
}

impl ElevenLabsConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            voice_id: DEFAULT_VOICE_ID.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            scratch_dir: std::env::temp_dir(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Create config from environment variables.
    ///
    /// `ELEVENLABS_API_KEY` is required.
    pub fn from_env() -> AiResult<Self> {
        let api_key = std::env::var("ELEVENLABS_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AiError::config("ELEVENLABS_API_KEY not set"))?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("ELEVENLABS_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(dir) = std::env::var("AUDIO_SCRATCH_DIR") {
            config.scratch_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    /// Output container extension derived from the format (`mp3_44100_128` -> `mp3`).
    pub fn file_extension(&self) -> &str {
        self.output_format.split('_').next().unwrap_or("mp3")
    }
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

/// ElevenLabs API client.
pub struct ElevenLabsClient {
    http: Client,
    config: ElevenLabsConfig,
}

impl ElevenLabsClient {
    pub fn new(config: ElevenLabsConfig) -> AiResult<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ElevenLabsConfig {
        &self.config
    }

    /// Synthesize `text` with the configured voice into a scratch audio file.
    pub async fn synthesize_to_file(&self, text: &str) -> AiResult<ScratchFile> {
        let url = format!(
            "{}/v1/text-to-speech/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.voice_id
        );

        let scratch = ScratchFile::create_in(
            &self.config.scratch_dir,
            "narration_",
            &format!(".{}", self.config.file_extension()),
        )?;

        debug!(voice = %self.config.voice_id, chars = text.len(), "Requesting speech synthesis");

        let response = self
            .http
            .post(&url)
            .header("xi-api-key", &self.config.api_key)
            .query(&[
                ("output_format", self.config.output_format.as_str()),
                ("optimize_streaming_latency", "0"),
            ])
            .json(&SpeechRequest {
                text,
                model_id: &self.config.model_id,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Status {
                service: "ElevenLabs",
                status,
                body,
            });
        }

        let mut file = tokio::fs::File::create(scratch.path()).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        if written == 0 {
            return Err(AiError::empty_response("ElevenLabs returned no audio"));
        }

        info!(bytes = written, path = %scratch.path().display(), "Narration synthesized");
        Ok(scratch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, scratch: &TempDir) -> ElevenLabsClient {
        let config = ElevenLabsConfig {
            base_url: server.uri(),
            scratch_dir: scratch.path().to_path_buf(),
            ..ElevenLabsConfig::new("xi-test")
        };
        ElevenLabsClient::new(config).unwrap()
    }

    fn scratch_entries(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path()).unwrap().count()
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(ElevenLabsConfig::new("k").file_extension(), "mp3");
        let pcm = ElevenLabsConfig {
            output_format: "pcm_16000".into(),
            ..ElevenLabsConfig::new("k")
        };
        assert_eq!(pcm.file_extension(), "pcm");
    }

    #[tokio::test]
    async fn test_synthesize_streams_audio_to_scratch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/text-to-speech/JBFqnCBsd6RMkjVDRZzb"))
            .and(header("xi-api-key", "xi-test"))
            .and(query_param("output_format", "mp3_44100_128"))
            .and(query_param("optimize_streaming_latency", "0"))
            .and(body_json(serde_json::json!({
                "text": "Hello",
                "model_id": "eleven_multilingual_v2"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFFu8; 4096]))
            .expect(1)
            .mount(&server)
            .await;

        let scratch = TempDir::new().unwrap();
        let client = client_for(&server, &scratch);

        let audio = client.synthesize_to_file("Hello").await.unwrap();
        assert_eq!(std::fs::metadata(audio.path()).unwrap().len(), 4096);
        assert_eq!(audio.path().extension().unwrap(), "mp3");

        drop(audio);
        assert_eq!(scratch_entries(&scratch), 0);
    }

    #[tokio::test]
    async fn test_service_error_leaves_no_scratch_file() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_api_key"))
            .mount(&server)
            .await;

        let scratch = TempDir::new().unwrap();
        let client = client_for(&server, &scratch);

        let err = client.synthesize_to_file("Hello").await.unwrap_err();
        assert!(matches!(err, AiError::Status { status: 401, .. }));
        assert_eq!(scratch_entries(&scratch), 0);
    }

    #[tokio::test]
    async fn test_empty_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let scratch = TempDir::new().unwrap();
        let client = client_for(&server, &scratch);

        assert!(matches!(
            client.synthesize_to_file("Hello").await,
            Err(AiError::EmptyResponse(_))
        ));
        assert_eq!(scratch_entries(&scratch), 0);
    }
}
