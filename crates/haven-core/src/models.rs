//! Domain models for Haven
//!
//! Wire format is camelCase so the JSON matches what journaling clients send
//! (`entryType`, `stressScore`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User id recorded on entries when the caller does not supply one
pub const DEFAULT_USER_ID: &str = "default-user";

/// How an entry was captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Text,
    Voice,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Voice => "voice",
        }
    }
}

impl std::str::FromStr for EntryType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "voice" => Ok(Self::Voice),
            _ => Err(format!("Unknown entry type: {}", s)),
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted journal entry (decrypted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: i64,
    pub user_id: String,
    pub entry_type: EntryType,
    /// Written text, present for text entries
    pub content: Option<String>,
    /// Speech transcript, present for voice entries
    pub transcript: Option<String>,
    pub mood: String,
    pub insight: String,
    pub stress_score: Option<u8>,
    pub anxiety_score: Option<u8>,
    pub created_at: DateTime<Utc>,
}

impl Entry {
    /// The entry's body text, whichever field holds it
    pub fn body(&self) -> &str {
        match self.entry_type {
            EntryType::Text => self.content.as_deref().unwrap_or_default(),
            EntryType::Voice => self.transcript.as_deref().unwrap_or_default(),
        }
    }
}

/// Input for creating a journal entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    #[serde(default)]
    pub user_id: Option<String>,
    pub entry_type: Option<EntryType>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub insight: Option<String>,
    #[serde(default)]
    pub stress_score: Option<i64>,
    #[serde(default)]
    pub anxiety_score: Option<i64>,
    /// Backdated timestamp; defaults to now
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl NewEntry {
    /// Text entry with the given analysis fields
    pub fn text(content: &str, mood: &str, insight: &str, stress: i64, anxiety: i64) -> Self {
        Self {
            entry_type: Some(EntryType::Text),
            content: Some(content.to_string()),
            mood: Some(mood.to_string()),
            insight: Some(insight.to_string()),
            stress_score: Some(stress),
            anxiety_score: Some(anxiety),
            ..Self::default()
        }
    }

    /// Voice entry with the given analysis fields
    pub fn voice(transcript: &str, mood: &str, insight: &str, stress: i64, anxiety: i64) -> Self {
        Self {
            entry_type: Some(EntryType::Voice),
            transcript: Some(transcript.to_string()),
            mood: Some(mood.to_string()),
            insight: Some(insight.to_string()),
            stress_score: Some(stress),
            anxiety_score: Some(anxiety),
            ..Self::default()
        }
    }

    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// One point on the mood chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    pub entry_id: i64,
    pub created_at: DateTime<Utc>,
    pub mood: String,
    /// 0 (most negative) to 5 (most positive)
    pub valence: u8,
    pub stress_score: Option<u8>,
    pub anxiety_score: Option<u8>,
}

/// Who sent a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::str::FromStr for ChatRole {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            _ => Err(format!("Unknown chat role: {}", s)),
        }
    }
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored chat message (decrypted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// A companion chat session and its full history, oldest message first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub session_id: String,
    pub user_id: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

/// Session listing row (no message bodies)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSessionSummary {
    pub session_id: String,
    pub message_count: i64,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}
