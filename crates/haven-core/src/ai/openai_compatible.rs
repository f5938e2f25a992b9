//! OpenAI-compatible chat completions backend
//!
//! Talks to OpenRouter by default, but works with any server implementing
//! `POST {base_url}/chat/completions` (vLLM, LocalAI, llama-server, ...).
//! `base_url` includes the API version, e.g. `https://openrouter.ai/api/v1`.
//!
//! OpenRouter uses the optional `HTTP-Referer` and `X-Title` headers for
//! attribution; they are sent on every request.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::error::Result;
use crate::models::EntryType;

use super::error::{Service, UpstreamError};
use super::parsing::parse_mood_analysis;
use super::prompts::{analysis_prompt, COMPANION_PROMPT};
use super::types::{ChatTurn, MoodAnalysis};
use super::AIBackend;

const ANALYSIS_TEMPERATURE: f32 = 0.7;
const CHAT_TEMPERATURE: f32 = 0.7;
const CHAT_MAX_TOKENS: u32 = 500;

/// OpenAI-compatible backend
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    app_url: String,
    app_title: String,
}

impl OpenAICompatibleBackend {
    /// Create a backend without credentials (local servers)
    pub fn new(base_url: &str, model: &str) -> Self {
        Self::from_config(&LlmConfig::new(base_url, model))
    }

    /// Create with an API key
    pub fn with_api_key(base_url: &str, model: &str, api_key: &str) -> Self {
        let mut config = LlmConfig::new(base_url, model);
        config.api_key = Some(api_key.to_string());
        Self::from_config(&config)
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            http_client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            app_url: config.app_url.clone(),
            app_title: config.app_title.clone(),
        }
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..self.clone()
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .http_client
            .request(method, format!("{}{}", self.base_url, path))
            .header("HTTP-Referer", &self.app_url)
            .header("X-Title", &self.app_title);
        if let Some(ref api_key) = self.api_key {
            builder = builder.bearer_auth(api_key);
        }
        builder
    }

    /// Make a chat completion request and return the first choice's text
    async fn chat_completion(&self, request: &ChatCompletionRequest) -> Result<String> {
        let response = self
            .request(reqwest::Method::POST, "/chat/completions")
            .json(request)
            .send()
            .await
            .map_err(|e| UpstreamError::transport(Service::Llm, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), model = %self.model, "Chat completion failed");
            return Err(UpstreamError::from_status(Service::Llm, status.as_u16(), &body).into());
        }

        let chat_response: ChatCompletionResponse = response.json().await.map_err(|e| {
            UpstreamError::invalid_reply(Service::Llm, format!("unreadable completion: {}", e))
        })?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| UpstreamError::invalid_reply(Service::Llm, "empty completion"))?;

        debug!(model = %self.model, chars = content.len(), "Chat completion received");
        Ok(content)
    }
}

/// Chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<RequestMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct RequestMessage {
    role: &'static str,
    content: String,
}

impl RequestMessage {
    fn system(content: &str) -> Self {
        Self {
            role: "system",
            content: content.to_string(),
        }
    }
}

/// Chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl AIBackend for OpenAICompatibleBackend {
    async fn analyze_entry(&self, text: &str, source: EntryType) -> Result<MoodAnalysis> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                RequestMessage::system(&analysis_prompt(source)),
                RequestMessage {
                    role: "user",
                    content: text.to_string(),
                },
            ],
            temperature: Some(ANALYSIS_TEMPERATURE),
            max_tokens: None,
            stream: false,
        };

        let reply = self.chat_completion(&request).await?;
        parse_mood_analysis(&reply)
    }

    async fn chat(&self, history: &[ChatTurn]) -> Result<String> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(RequestMessage::system(COMPANION_PROMPT));
        messages.extend(history.iter().map(|turn| RequestMessage {
            role: turn.role.as_str(),
            content: turn.content.clone(),
        }));

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: Some(CHAT_TEMPERATURE),
            max_tokens: Some(CHAT_MAX_TOKENS),
            stream: false,
        };

        let reply = self.chat_completion(&request).await?;
        Ok(reply.trim().to_string())
    }

    async fn health_check(&self) -> bool {
        match self.request(reqwest::Method::GET, "/models").send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!(error = %e, host = %self.base_url, "Health check failed");
                false
            }
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
