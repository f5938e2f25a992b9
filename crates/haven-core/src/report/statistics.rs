//! Summary statistics over a window of journal entries
//!
//! Pure functions over an in-memory snapshot. Input is expected newest-first
//! (the order `Database::recent_entries` returns); nothing here re-sorts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Entry, EntryType};

/// Scores strictly above this count as a high-stress or high-anxiety entry
pub const HIGH_SCORE_THRESHOLD: u8 = 70;

/// How far the recent half must move from the older half to count as a trend
pub const TREND_MARGIN: f64 = 10.0;

/// Share of high-score entries that makes a pattern "frequent"
pub const FREQUENT_EPISODE_RATIO: f64 = 0.6;

pub const CONCERN_HIGH_LEVELS: &str = "Consistently high stress/anxiety levels";
pub const CONCERN_FREQUENT_STRESS: &str = "Frequent episodes of high stress";
pub const CONCERN_FREQUENT_ANXIETY: &str = "Frequent episodes of high anxiety";
pub const CONCERN_WORSENING: &str = "Worsening emotional state over time";

/// Direction of a score between the older and the recent half of the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        }
    }

    /// Compare two half-window means. A missing half means there is nothing
    /// to compare against, which reads as stable.
    fn between(recent: Option<f64>, older: Option<f64>) -> Self {
        match (recent, older) {
            (Some(recent), Some(older)) if recent > older + TREND_MARGIN => Self::Increasing,
            (Some(recent), Some(older)) if recent < older - TREND_MARGIN => Self::Decreasing,
            _ => Self::Stable,
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    /// Oldest entry in the window
    pub start: DateTime<Utc>,
    /// Newest entry in the window
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryTypeCounts {
    pub text: usize,
    pub voice: usize,
}

/// Occurrences of one (lowercased) mood
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodCount {
    pub mood: String,
    pub count: usize,
}

/// Derived report figures. Recomputed for every report, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStatistics {
    pub total_entries: usize,
    pub date_range: DateRange,
    pub entry_type_counts: EntryTypeCounts,
    pub avg_stress: u32,
    pub avg_anxiety: u32,
    pub stress_trend: Trend,
    pub anxiety_trend: Trend,
    /// In order of first appearance in the input
    pub mood_distribution: Vec<MoodCount>,
    pub dominant_mood: String,
    pub high_stress_days: usize,
    pub high_anxiety_days: usize,
    pub concerning_patterns: Vec<String>,
}

impl ReportStatistics {
    /// Compute statistics for a newest-first window of entries.
    ///
    /// Returns `None` for an empty window. Absent scores count as 0.
    pub fn compute(entries: &[Entry]) -> Option<Self> {
        let newest = entries.first()?;
        let oldest = entries.last()?;
        let n = entries.len();

        let mut entry_type_counts = EntryTypeCounts::default();
        let mut stress_sum = 0u64;
        let mut anxiety_sum = 0u64;
        let mut high_stress_days = 0;
        let mut high_anxiety_days = 0;
        let mut mood_distribution: Vec<MoodCount> = Vec::new();

        for entry in entries {
            match entry.entry_type {
                EntryType::Text => entry_type_counts.text += 1,
                EntryType::Voice => entry_type_counts.voice += 1,
            }

            let stress = stress_of(entry);
            let anxiety = anxiety_of(entry);
            stress_sum += u64::from(stress);
            anxiety_sum += u64::from(anxiety);
            if stress > HIGH_SCORE_THRESHOLD {
                high_stress_days += 1;
            }
            if anxiety > HIGH_SCORE_THRESHOLD {
                high_anxiety_days += 1;
            }

            let mood = entry.mood.to_lowercase();
            match mood_distribution.iter_mut().find(|m| m.mood == mood) {
                Some(existing) => existing.count += 1,
                None => mood_distribution.push(MoodCount { mood, count: 1 }),
            }
        }

        // Strict comparison keeps the earliest-inserted mood on ties
        let mut dominant = &mood_distribution[0];
        for candidate in &mood_distribution[1..] {
            if candidate.count > dominant.count {
                dominant = candidate;
            }
        }
        let dominant_mood = dominant.mood.clone();

        let avg_stress = rounded_mean(stress_sum, n);
        let avg_anxiety = rounded_mean(anxiety_sum, n);

        let (recent, older) = entries.split_at(n / 2);
        let stress_trend = Trend::between(half_mean(recent, stress_of), half_mean(older, stress_of));
        let anxiety_trend = Trend::between(
            half_mean(recent, anxiety_of),
            half_mean(older, anxiety_of),
        );

        let frequent = n as f64 * FREQUENT_EPISODE_RATIO;
        let high = u32::from(HIGH_SCORE_THRESHOLD);
        let mut concerning_patterns = Vec::new();
        if avg_stress > high || avg_anxiety > high {
            concerning_patterns.push(CONCERN_HIGH_LEVELS.to_string());
        }
        if high_stress_days as f64 >= frequent {
            concerning_patterns.push(CONCERN_FREQUENT_STRESS.to_string());
        }
        if high_anxiety_days as f64 >= frequent {
            concerning_patterns.push(CONCERN_FREQUENT_ANXIETY.to_string());
        }
        if stress_trend == Trend::Increasing || anxiety_trend == Trend::Increasing {
            concerning_patterns.push(CONCERN_WORSENING.to_string());
        }

        Some(Self {
            total_entries: n,
            date_range: DateRange {
                start: oldest.created_at,
                end: newest.created_at,
            },
            entry_type_counts,
            avg_stress,
            avg_anxiety,
            stress_trend,
            anxiety_trend,
            mood_distribution,
            dominant_mood,
            high_stress_days,
            high_anxiety_days,
            concerning_patterns,
        })
    }

    /// Share of the window for a mood count, rounded to a whole percent
    pub fn percentage(&self, count: usize) -> u32 {
        rounded_mean(count as u64 * 100, self.total_entries)
    }

    pub fn any_trend_increasing(&self) -> bool {
        self.stress_trend == Trend::Increasing || self.anxiety_trend == Trend::Increasing
    }
}

fn stress_of(entry: &Entry) -> u8 {
    entry.stress_score.unwrap_or(0)
}

fn anxiety_of(entry: &Entry) -> u8 {
    entry.anxiety_score.unwrap_or(0)
}

/// `sum / n` rounded half-up, in integer arithmetic
fn rounded_mean(sum: u64, n: usize) -> u32 {
    if n == 0 {
        return 0;
    }
    let n = n as u64;
    ((2 * sum + n) / (2 * n)) as u32
}

fn half_mean(half: &[Entry], score: fn(&Entry) -> u8) -> Option<f64> {
    if half.is_empty() {
        return None;
    }
    let sum: u64 = half.iter().map(|e| u64::from(score(e))).sum();
    Some(sum as f64 / half.len() as f64)
}
