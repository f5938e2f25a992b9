//! Speech-to-text for voice entries
//!
//! The hosted backend posts raw audio bytes to a Whisper inference endpoint
//! (Hugging Face by default) and reads `{"text": "..."}` back.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{Config, TranscriptionConfig};
use crate::error::{Error, Result};

use super::error::{Service, UpstreamError};

/// Returned when a recording transcribes to nothing
pub const NO_SPEECH_MESSAGE: &str = "No speech detected in audio";

/// Trait for speech-to-text backends
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Raw transcript; may be empty
    async fn transcribe_raw(&self, audio: &[u8], content_type: &str) -> Result<String>;
}

/// Concrete transcriber enum
#[derive(Clone)]
pub enum Transcriber {
    Whisper(WhisperBackend),
    Mock(MockTranscriber),
}

impl Transcriber {
    /// Build from configuration. `None` when no transcription token is set and
    /// the mock backend was not requested.
    pub fn from_config(config: &Config) -> Option<Self> {
        match (&config.backend, &config.transcription) {
            (crate::config::BackendKind::Mock, _) => Some(Self::Mock(MockTranscriber::default())),
            (_, Some(t)) => Some(Self::Whisper(WhisperBackend::new(t))),
            (_, None) => None,
        }
    }

    /// Transcribe and trim; an empty result is a validation error
    pub async fn transcribe(&self, audio: &[u8], content_type: &str) -> Result<String> {
        let raw = match self {
            Self::Whisper(b) => b.transcribe_raw(audio, content_type).await?,
            Self::Mock(b) => b.transcribe_raw(audio, content_type).await?,
        };
        let transcript = raw.trim();
        if transcript.is_empty() {
            return Err(Error::Validation(NO_SPEECH_MESSAGE.to_string()));
        }
        Ok(transcript.to_string())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Whisper(_) => "whisper",
            Self::Mock(_) => "mock",
        }
    }
}

/// Hosted Whisper inference endpoint
#[derive(Clone)]
pub struct WhisperBackend {
    http_client: Client,
    url: String,
    token: String,
}

impl WhisperBackend {
    pub fn new(config: &TranscriptionConfig) -> Self {
        Self {
            http_client: Client::new(),
            url: config.url.clone(),
            token: config.token.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WhisperResponse {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl SpeechToText for WhisperBackend {
    async fn transcribe_raw(&self, audio: &[u8], content_type: &str) -> Result<String> {
        debug!(bytes = audio.len(), content_type, "Sending audio for transcription");

        let response = self
            .http_client
            .post(&self.url)
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header(reqwest::header::ACCEPT, "application/json")
            .body(audio.to_vec())
            .send()
            .await
            .map_err(|e| UpstreamError::transport(Service::Transcription, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Transcription failed");
            return Err(
                UpstreamError::from_status(Service::Transcription, status.as_u16(), &body).into(),
            );
        }

        let parsed: WhisperResponse = response.json().await.map_err(|e| {
            UpstreamError::invalid_reply(Service::Transcription, format!("unreadable reply: {}", e))
        })?;
        Ok(parsed.text)
    }
}

/// Mock transcriber: returns a fixed transcript, or the audio bytes read as UTF-8
#[derive(Clone, Default)]
pub struct MockTranscriber {
    pub transcript: Option<String>,
    pub failure: Option<UpstreamError>,
}

impl MockTranscriber {
    pub fn with_transcript(transcript: &str) -> Self {
        Self {
            transcript: Some(transcript.to_string()),
            failure: None,
        }
    }
}

#[async_trait]
impl SpeechToText for MockTranscriber {
    async fn transcribe_raw(&self, audio: &[u8], _content_type: &str) -> Result<String> {
        if let Some(ref error) = self.failure {
            return Err(error.clone().into());
        }
        Ok(match self.transcript {
            Some(ref t) => t.clone(),
            None => String::from_utf8_lossy(audio).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockLlmServer;

    #[tokio::test]
    async fn test_mock_reads_audio_as_text() {
        let t = Transcriber::Mock(MockTranscriber::default());
        let transcript = t.transcribe(b"  I had a long day  ", "audio/webm").await.unwrap();
        assert_eq!(transcript, "I had a long day");
    }

    #[tokio::test]
    async fn test_empty_transcript_is_no_speech() {
        let t = Transcriber::Mock(MockTranscriber::with_transcript("   "));
        match t.transcribe(b"...", "audio/webm").await.unwrap_err() {
            Error::Validation(msg) => assert_eq!(msg, NO_SPEECH_MESSAGE),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_from_config() {
        assert!(Transcriber::from_config(&Config::default()).is_none());
        assert_eq!(Transcriber::from_config(&Config::mock()).unwrap().name(), "mock");

        let config = Config {
            transcription: Some(TranscriptionConfig {
                url: "http://localhost:9000/whisper".to_string(),
                token: "hf_test".to_string(),
            }),
            ..Config::default()
        };
        assert_eq!(Transcriber::from_config(&config).unwrap().name(), "whisper");
    }

    #[tokio::test]
    async fn test_whisper_against_mock_server() {
        let server = MockLlmServer::start().await;
        let backend = Transcriber::Whisper(WhisperBackend::new(&TranscriptionConfig {
            url: format!("{}/whisper", server.url()),
            token: "hf_test".to_string(),
        }));
        let transcript = backend.transcribe(b"RIFF....", "audio/wav").await.unwrap();
        assert_eq!(transcript, "I have been feeling worried about work");
    }

    #[tokio::test]
    async fn test_whisper_model_loading_is_unavailable() {
        let server = MockLlmServer::failing(503).await;
        let backend = WhisperBackend::new(&TranscriptionConfig {
            url: format!("{}/whisper", server.url()),
            token: "hf_test".to_string(),
        });
        match backend.transcribe_raw(b"x", "audio/webm").await.unwrap_err() {
            Error::Upstream(e) => {
                assert_eq!(e.status_code(), 503);
                assert_eq!(e.service(), Service::Transcription);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
