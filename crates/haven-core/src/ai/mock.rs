//! Mock backend for testing
//!
//! Deterministic keyword-based analysis and canned companion replies.
//! Useful for unit tests and for running the server without an API key.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ChatRole, EntryType};

use super::error::UpstreamError;
use super::types::{ChatTurn, MoodAnalysis};
use super::AIBackend;

/// Mock AI backend for testing
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    /// When set, every call fails with this error
    pub failure: Option<UpstreamError>,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            failure: None,
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            failure: None,
        }
    }

    /// Create a backend whose calls all fail with `error`
    pub fn failing(error: UpstreamError) -> Self {
        Self {
            healthy: false,
            failure: Some(error),
        }
    }

    /// Create a new instance with a different model (no-op for mock)
    pub fn with_model(&self, _model: &str) -> Self {
        self.clone()
    }

    fn check_failure(&self) -> Result<()> {
        match &self.failure {
            Some(error) => Err(error.clone().into()),
            None => Ok(()),
        }
    }
}

/// Keyword table: (keywords, mood, stress, anxiety, insight)
const MOCK_MOODS: &[(&[&str], &str, u8, u8, &str)] = &[
    (
        &["worried", "anxious", "panic", "nervous"],
        "anxious",
        55,
        78,
        "It sounds like worry is taking up a lot of space right now. Try naming one small thing you can control today.",
    ),
    (
        &["deadline", "overwhelmed", "stress", "pressure"],
        "stressed",
        80,
        50,
        "You are carrying a lot at once. Breaking the load into smaller steps may make it feel lighter.",
    ),
    (
        &["sad", "lonely", "cry", "lost"],
        "sad",
        45,
        40,
        "Thank you for putting this into words. Feeling low is hard, and reaching out to someone you trust could help.",
    ),
    (
        &["happy", "great", "excited", "wonderful"],
        "happy",
        15,
        10,
        "It is lovely to hear things are going well. Take a moment to notice what made today good.",
    ),
    (
        &["calm", "peaceful", "relaxed", "rested"],
        "calm",
        12,
        8,
        "There is a steadiness in what you wrote. Moments like this are worth returning to.",
    ),
];

#[async_trait]
impl AIBackend for MockBackend {
    async fn analyze_entry(&self, text: &str, _source: EntryType) -> Result<MoodAnalysis> {
        self.check_failure()?;

        let lower = text.to_lowercase();
        let (mood, stress, anxiety, insight) = MOCK_MOODS
            .iter()
            .find(|(keywords, ..)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(_, mood, stress, anxiety, insight)| (*mood, *stress, *anxiety, *insight))
            .unwrap_or((
                "reflective",
                30,
                25,
                "Thank you for taking the time to reflect. Writing things down is a good way to understand them.",
            ));

        Ok(MoodAnalysis {
            mood: mood.to_string(),
            insight: insight.to_string(),
            stress_score: stress,
            anxiety_score: anxiety,
        })
    }

    async fn chat(&self, history: &[ChatTurn]) -> Result<String> {
        self.check_failure()?;

        let last_user = history
            .iter()
            .rev()
            .find(|t| t.role == ChatRole::User)
            .map(|t| t.content.trim())
            .unwrap_or_default();

        Ok(if last_user.is_empty() {
            "I'm here whenever you'd like to talk. How are you feeling right now?".to_string()
        } else {
            format!(
                "Thank you for sharing that. When you say \"{}\", what feels most important about it right now?",
                last_user
            )
        })
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::Service;
    use crate::error::Error;

    #[tokio::test]
    async fn test_mock_analysis_keywords() {
        let mock = MockBackend::new();
        let a = mock
            .analyze_entry("Big deadline and so much pressure", EntryType::Text)
            .await
            .unwrap();
        assert_eq!(a.mood, "stressed");
        assert_eq!(a.stress_score, 80);

        let a = mock.analyze_entry("Just a normal day", EntryType::Voice).await.unwrap();
        assert_eq!(a.mood, "reflective");
    }

    #[tokio::test]
    async fn test_mock_chat_echoes_last_user_turn() {
        let mock = MockBackend::new();
        let reply = mock
            .chat(&[ChatTurn::user("first"), ChatTurn::assistant("ok"), ChatTurn::user("second")])
            .await
            .unwrap();
        assert!(reply.contains("second"));
        assert!(!reply.contains("first"));
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let mock = MockBackend::failing(UpstreamError::from_status(Service::Llm, 429, ""));
        assert!(!mock.health_check().await);
        match mock.chat(&[]).await.unwrap_err() {
            Error::Upstream(e) => assert_eq!(e.status_code(), 429),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_mock_health() {
        assert!(MockBackend::new().health_check().await);
        assert!(!MockBackend::unhealthy().health_check().await);
    }
}
