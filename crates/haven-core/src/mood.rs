//! Mood classification policy
//!
//! The LLM returns a free-text mood word. Two fixed tables turn it into
//! something a client can display:
//!
//! - `MOOD_RULES` maps substrings to a category (emoji + accent colour).
//!   Rules are checked top to bottom and the first match wins, so
//!   "stressed but hopeful" is `Anxious`, not `Hopeful`.
//! - `VALENCE` maps exact mood names to a 0-5 score for the mood chart.

use serde::Serialize;

/// Display category for a mood word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodCategory {
    Happy,
    Sad,
    Angry,
    Anxious,
    Calm,
    Excited,
    Tired,
    Grateful,
    Loving,
    Confused,
    Hopeful,
    Content,
    Neutral,
}

impl MoodCategory {
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Happy | Self::Content => "\u{1F60A}",
            Self::Sad => "\u{1F614}",
            Self::Angry => "\u{1F624}",
            Self::Anxious => "\u{1F630}",
            Self::Calm => "\u{1F60C}",
            Self::Excited => "\u{1F917}",
            Self::Tired => "\u{1F634}",
            Self::Grateful => "\u{1F64F}",
            Self::Loving => "\u{1F970}",
            Self::Confused => "\u{1F914}",
            Self::Hopeful => "\u{1F31F}",
            Self::Neutral => "\u{1F338}",
        }
    }

    /// Accent colour for cards and chart points
    pub fn color(&self) -> &'static str {
        match self {
            Self::Happy => "#fef08a",
            Self::Sad => "#bfdbfe",
            Self::Angry => "#fecaca",
            Self::Anxious => "#e9d5ff",
            Self::Calm => "#b8d4c5",
            Self::Excited => "#fed7aa",
            Self::Grateful => "#fbcfe8",
            Self::Loving => "#fecdd3",
            Self::Hopeful => "#c8e3f5",
            Self::Tired | Self::Confused | Self::Content | Self::Neutral => "#b8d4c5",
        }
    }
}

/// Ordered substring rules. Order is policy: earlier rows take precedence.
pub const MOOD_RULES: &[(&str, MoodCategory)] = &[
    ("happy", MoodCategory::Happy),
    ("joy", MoodCategory::Happy),
    ("sad", MoodCategory::Sad),
    ("down", MoodCategory::Sad),
    ("angry", MoodCategory::Angry),
    ("frustrat", MoodCategory::Angry),
    ("anxious", MoodCategory::Anxious),
    ("worry", MoodCategory::Anxious),
    // "worried" and "worrying" do not contain "worry"
    ("worri", MoodCategory::Anxious),
    ("stress", MoodCategory::Anxious),
    ("calm", MoodCategory::Calm),
    ("peace", MoodCategory::Calm),
    ("excited", MoodCategory::Excited),
    ("energet", MoodCategory::Excited),
    ("tired", MoodCategory::Tired),
    ("exhaust", MoodCategory::Tired),
    ("grateful", MoodCategory::Grateful),
    ("thank", MoodCategory::Grateful),
    ("love", MoodCategory::Loving),
    ("confus", MoodCategory::Confused),
    ("hope", MoodCategory::Hopeful),
    ("content", MoodCategory::Content),
];

/// Chart valence for exact mood names
pub const VALENCE: &[(&str, u8)] = &[
    ("happy", 5),
    ("energized", 5),
    ("hopeful", 4),
    ("content", 4),
    ("calm", 3),
    ("peaceful", 3),
    ("reflective", 2),
    ("worried", 1),
    ("sad", 1),
    ("frustrated", 0),
    ("stressed", 0),
    ("anxious", 0),
];

/// Valence for moods not in the table
pub const DEFAULT_VALENCE: u8 = 2;

/// Categorize a mood word (case-insensitive, first matching rule wins)
pub fn categorize(mood: &str) -> MoodCategory {
    let lower = mood.to_lowercase();
    MOOD_RULES
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map_or(MoodCategory::Neutral, |(_, category)| *category)
}

/// Chart valence (0-5) for a mood word
pub fn valence(mood: &str) -> u8 {
    let lower = mood.trim().to_lowercase();
    VALENCE
        .iter()
        .find(|(name, _)| *name == lower)
        .map_or(DEFAULT_VALENCE, |(_, v)| *v)
}

/// Category with its display attributes, as returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct MoodDisplay {
    pub category: MoodCategory,
    pub emoji: &'static str,
    pub color: &'static str,
}

impl MoodDisplay {
    pub fn for_mood(mood: &str) -> Self {
        let category = categorize(mood);
        Self {
            category,
            emoji: category.emoji(),
            color: category.color(),
        }
    }
}
