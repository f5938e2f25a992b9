//! Haven Core Library
//!
//! Shared functionality for the Haven wellness journal:
//! - Configuration loaded once from the environment
//! - Database access and migrations, with field-level encryption
//! - Hosted AI collaborators (mood analysis, companion chat, transcription)
//! - Therapy report statistics, recommendations and PDF rendering
//! - Mood categorization and coping strategy suggestions

pub mod ai;
pub mod config;
pub mod coping;
pub mod crypto;
pub mod db;
pub mod error;
pub mod models;
pub mod mood;
pub mod report;

/// Test utilities including a mock OpenAI-compatible server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    AIBackend, AIClient, ChatTurn, MockBackend, MoodAnalysis, OpenAICompatibleBackend, Service,
    Transcriber, UpstreamError,
};
pub use config::{BackendKind, Config};
pub use coping::{CopingStrategy, Priority};
pub use crypto::FieldCipher;
pub use db::{AuditEntry, Database};
pub use error::{Error, Result};
pub use mood::{MoodCategory, MoodDisplay};
pub use report::{ReportStatistics, ReportSummary, ScoreLevel, Trend};
