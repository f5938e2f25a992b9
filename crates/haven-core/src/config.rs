//! Process-wide configuration
//!
//! Everything Haven reads from the environment is read here, once, at startup.
//! Components receive the pieces they need by reference instead of calling
//! `std::env::var` themselves.
//!
//! # Environment variables
//!
//! - `HAVEN_DB_KEY`: SQLCipher passphrase (optional, see `Database::new`)
//! - `ENCRYPTION_KEY`: passphrase for field-level encryption
//! - `AI_BACKEND`: `openrouter` (default) or `mock`
//! - `OPENROUTER_API_KEY`, `OPENROUTER_BASE_URL`, `OPENROUTER_MODEL`
//! - `HAVEN_APP_URL`, `HAVEN_APP_TITLE`: attribution headers sent to OpenRouter
//! - `HUGGINGFACE_API_TOKEN`, `WHISPER_URL`: voice transcription
//! - `HAVEN_API_KEYS`: comma-separated bearer keys accepted by the API
//! - `HAVEN_ALLOWED_ORIGINS`: comma-separated CORS origins

use tracing::warn;

/// Environment variable for database encryption key
pub const DB_KEY_ENV: &str = "HAVEN_DB_KEY";

/// Environment variable for the field-encryption passphrase
pub const ENCRYPTION_KEY_ENV: &str = "ENCRYPTION_KEY";

/// Passphrase used when `ENCRYPTION_KEY` is unset. Fine for local development only.
pub const DEV_ENCRYPTION_KEY: &str = "default-key-change-this-in-production";

pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_OPENROUTER_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_WHISPER_URL: &str =
    "https://api-inference.huggingface.co/models/openai/whisper-large-v3";
pub const DEFAULT_APP_URL: &str = "http://localhost:3000";
pub const DEFAULT_APP_TITLE: &str = "Mental Wellness Mirror";

/// Which LLM backend to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    OpenRouter,
    Mock,
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openrouter" | "openai" | "openai_compatible" => Ok(Self::OpenRouter),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown AI backend: {}", s)),
        }
    }
}

/// Chat-completions endpoint settings
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL up to and including the API version (e.g. `https://openrouter.ai/api/v1`)
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Sent as `HTTP-Referer`
    pub app_url: String,
    /// Sent as `X-Title`
    pub app_title: String,
}

impl LlmConfig {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
            app_url: DEFAULT_APP_URL.to_string(),
            app_title: DEFAULT_APP_TITLE.to_string(),
        }
    }
}

/// Speech-to-text endpoint settings
#[derive(Debug, Clone)]
pub struct TranscriptionConfig {
    pub url: String,
    pub token: String,
}

/// Application configuration, loaded once
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLCipher passphrase; `None` means the caller must opt into an unencrypted database
    pub db_key: Option<String>,
    /// Passphrase for field-level encryption of journal text and chat messages
    pub encryption_key: String,
    pub backend: BackendKind,
    /// `None` when no API key is configured (AI features disabled)
    pub llm: Option<LlmConfig>,
    /// `None` when no Hugging Face token is configured (voice entries disabled)
    pub transcription: Option<TranscriptionConfig>,
    pub api_keys: Vec<String>,
    pub allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_key: None,
            encryption_key: DEV_ENCRYPTION_KEY.to_string(),
            backend: BackendKind::OpenRouter,
            llm: None,
            transcription: None,
            api_keys: vec![],
            allowed_origins: vec![],
        }
    }
}

impl Config {
    /// Build configuration from process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (used by `from_env` and tests)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let encryption_key = match get(ENCRYPTION_KEY_ENV) {
            Some(key) => key,
            None => {
                warn!(
                    "{} not set, using development key for field encryption",
                    ENCRYPTION_KEY_ENV
                );
                DEV_ENCRYPTION_KEY.to_string()
            }
        };

        let backend = match get("AI_BACKEND") {
            Some(value) => value.parse().unwrap_or_else(|e: String| {
                warn!(error = %e, "Falling back to openrouter backend");
                BackendKind::OpenRouter
            }),
            None => BackendKind::OpenRouter,
        };

        let llm = get("OPENROUTER_API_KEY").map(|api_key| {
            let base_url = get("OPENROUTER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENROUTER_BASE_URL.to_string());
            let model =
                get("OPENROUTER_MODEL").unwrap_or_else(|| DEFAULT_OPENROUTER_MODEL.to_string());
            let mut llm = LlmConfig::new(&base_url, &model);
            llm.api_key = Some(api_key);
            if let Some(url) = get("HAVEN_APP_URL") {
                llm.app_url = url;
            }
            if let Some(title) = get("HAVEN_APP_TITLE") {
                llm.app_title = title;
            }
            llm
        });

        let transcription = get("HUGGINGFACE_API_TOKEN").map(|token| TranscriptionConfig {
            url: get("WHISPER_URL").unwrap_or_else(|| DEFAULT_WHISPER_URL.to_string()),
            token,
        });

        Self {
            db_key: get(DB_KEY_ENV),
            encryption_key,
            backend,
            llm,
            transcription,
            api_keys: split_list(get("HAVEN_API_KEYS").as_deref()),
            allowed_origins: split_list(get("HAVEN_ALLOWED_ORIGINS").as_deref()),
        }
    }

    /// Configuration wired to the mock AI backends (tests and demos)
    pub fn mock() -> Self {
        Self {
            backend: BackendKind::Mock,
            ..Self::default()
        }
    }

    /// Whether the field-encryption key is the built-in development key
    pub fn uses_dev_encryption_key(&self) -> bool {
        self.encryption_key == DEV_ENCRYPTION_KEY
    }
}

fn split_list(input: Option<&str>) -> Vec<String> {
    input
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
