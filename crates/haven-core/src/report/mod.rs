//! Therapy summary report
//!
//! - `statistics` - figures computed from the latest entries
//! - `recommendations` - rule-based suggestions for the clinician
//! - `pdf` - printable A4 rendering
//!
//! Score bands and colours live here because both the PDF and the JSON
//! summary use them.

pub mod pdf;
pub mod recommendations;
pub mod statistics;

use serde::Serialize;

use crate::models::Entry;

pub use pdf::render_pdf;
pub use recommendations::recommendations;
pub use statistics::{DateRange, EntryTypeCounts, MoodCount, ReportStatistics, Trend};

/// Number of entries a report covers
pub const REPORT_WINDOW: usize = 10;

/// Message returned when there is nothing to report on
pub const NO_ENTRIES_MESSAGE: &str = "No entries found. Please create some journal entries first.";

/// Qualitative band for a 0-100 score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreLevel {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl ScoreLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=20 => Self::VeryLow,
            21..=40 => Self::Low,
            41..=60 => Self::Moderate,
            61..=80 => Self::High,
            _ => Self::VeryHigh,
        }
    }

    pub fn interpretation(&self) -> &'static str {
        match self {
            Self::VeryLow => "Very Low - Healthy range",
            Self::Low => "Low - Manageable",
            Self::Moderate => "Moderate - Monitor closely",
            Self::High => "High - Intervention recommended",
            Self::VeryHigh => "Very High - Urgent attention needed",
        }
    }

    /// Hex colour, green through red
    pub fn color(&self) -> &'static str {
        match self {
            Self::VeryLow => "#27ae60",
            Self::Low => "#2ecc71",
            Self::Moderate => "#f39c12",
            Self::High => "#e67e22",
            Self::VeryHigh => "#d63031",
        }
    }
}

pub fn trend_color(trend: Trend) -> &'static str {
    match trend {
        Trend::Decreasing => "#27ae60",
        Trend::Stable => "#3498db",
        Trend::Increasing => "#d63031",
    }
}

/// Score with its band, as shown in the summary
#[derive(Debug, Clone, Serialize)]
pub struct ScoreSummary {
    pub value: u32,
    pub level: ScoreLevel,
    pub interpretation: &'static str,
    pub color: &'static str,
}

impl ScoreSummary {
    pub fn new(value: u32) -> Self {
        let level = ScoreLevel::from_score(value);
        Self {
            value,
            level,
            interpretation: level.interpretation(),
            color: level.color(),
        }
    }
}

/// Statistics plus everything derived from them, ready for JSON or PDF
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub statistics: ReportStatistics,
    pub stress: ScoreSummary,
    pub anxiety: ScoreSummary,
    pub recommendations: Vec<String>,
}

impl ReportSummary {
    /// Summarize a newest-first window. `None` when there are no entries.
    pub fn from_entries(entries: &[Entry]) -> Option<Self> {
        let statistics = ReportStatistics::compute(entries)?;
        Some(Self {
            stress: ScoreSummary::new(statistics.avg_stress),
            anxiety: ScoreSummary::new(statistics.avg_anxiety),
            recommendations: recommendations(&statistics),
            statistics,
        })
    }
}
