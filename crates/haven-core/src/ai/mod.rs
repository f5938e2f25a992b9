//! Hosted AI collaborators
//!
//! # Architecture
//!
//! - `AIBackend` trait: mood analysis and companion chat
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - `Transcriber` enum: speech-to-text for voice entries
//! - `UpstreamError`: the closed set of ways a hosted service can fail
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = Config::from_env();
//! if let Some(ai) = AIClient::from_config(&config) {
//!     let analysis = ai.analyze_entry("Rough day at work", EntryType::Text).await?;
//!     println!("Mood: {}", analysis.mood);
//! }
//! ```

pub mod error;
mod mock;
mod openai_compatible;
pub mod parsing;
pub mod prompts;
pub mod transcription;
pub mod types;

pub use error::{Service, UpstreamError};
pub use mock::MockBackend;
pub use openai_compatible::OpenAICompatibleBackend;
pub use transcription::{
    MockTranscriber, SpeechToText, Transcriber, WhisperBackend, NO_SPEECH_MESSAGE,
};
pub use types::*;

use async_trait::async_trait;

use crate::config::{BackendKind, Config};
use crate::error::Result;
use crate::models::EntryType;

/// Trait defining the interface for all AI backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Classify mood, stress and anxiety for an entry and write a short insight
    async fn analyze_entry(&self, text: &str, source: EntryType) -> Result<MoodAnalysis>;

    /// Produce the companion's next reply for a conversation (oldest turn first)
    async fn chat(&self, history: &[ChatTurn]) -> Result<String>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
#[derive(Clone)]
pub enum AIClient {
    /// OpenRouter or another OpenAI-compatible server
    OpenRouter(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from configuration
    ///
    /// Returns None when the OpenRouter backend is selected but no API key is configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        match config.backend {
            BackendKind::Mock => Some(AIClient::Mock(MockBackend::new())),
            BackendKind::OpenRouter => config
                .llm
                .as_ref()
                .map(|llm| AIClient::OpenRouter(OpenAICompatibleBackend::from_config(llm))),
        }
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        match self {
            AIClient::OpenRouter(b) => AIClient::OpenRouter(b.with_model(model)),
            AIClient::Mock(b) => AIClient::Mock(b.with_model(model)),
        }
    }
}

// Implement AIBackend for AIClient by delegating to the inner backend
#[async_trait]
impl AIBackend for AIClient {
    async fn analyze_entry(&self, text: &str, source: EntryType) -> Result<MoodAnalysis> {
        match self {
            AIClient::OpenRouter(b) => b.analyze_entry(text, source).await,
            AIClient::Mock(b) => b.analyze_entry(text, source).await,
        }
    }

    async fn chat(&self, history: &[ChatTurn]) -> Result<String> {
        match self {
            AIClient::OpenRouter(b) => b.chat(history).await,
            AIClient::Mock(b) => b.chat(history).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::OpenRouter(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::OpenRouter(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::OpenRouter(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}
