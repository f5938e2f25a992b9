//! Clinician-facing recommendations derived from report statistics

use super::statistics::{ReportStatistics, HIGH_SCORE_THRESHOLD};

/// Share of high-stress entries that warrants exploring coping mechanisms.
/// Deliberately lower than the 0.6 used for "frequent episodes".
pub const COPING_EXPLORATION_RATIO: f64 = 0.5;

/// Both averages below this read as healthy regulation
pub const LOW_SCORE_THRESHOLD: u32 = 40;

pub const REC_IMMEDIATE_INTERVENTION: &str = "Consider immediate intervention strategies including stress management techniques and possibly medication evaluation.";
pub const REC_WORSENING_TREND: &str = "The patient shows a worsening trend. Increase session frequency and monitor for crisis indicators.";
pub const REC_EXPLORE_COPING: &str = "Frequent high-stress episodes detected. Explore coping mechanisms and lifestyle factors contributing to stress.";
pub const REC_VERBAL_THERAPY: &str = "Patient prefers voice journaling, which may indicate comfort with verbal expression. Consider verbal therapy approaches.";
pub const REC_CONTINUE_JOURNALING: &str = "Continue encouraging regular journaling as it provides valuable insights into the patient's emotional patterns.";
pub const REC_REVIEW_REPORT: &str =
    "Review this report with the patient to discuss patterns and collaborate on treatment goals.";
pub const REC_POSITIVE_REGULATION: &str = "Patient shows positive emotional regulation. Maintain current treatment approach and reinforce healthy coping strategies.";

/// Build the ordered recommendation list. Never empty.
pub fn recommendations(stats: &ReportStatistics) -> Vec<String> {
    let high = u32::from(HIGH_SCORE_THRESHOLD);
    let mut recs = Vec::new();

    if stats.avg_stress > high || stats.avg_anxiety > high {
        recs.push(REC_IMMEDIATE_INTERVENTION);
    }
    if stats.any_trend_increasing() {
        recs.push(REC_WORSENING_TREND);
    }
    if stats.high_stress_days as f64 >= stats.total_entries as f64 * COPING_EXPLORATION_RATIO {
        recs.push(REC_EXPLORE_COPING);
    }
    if stats.entry_type_counts.voice > stats.entry_type_counts.text {
        recs.push(REC_VERBAL_THERAPY);
    }

    recs.push(REC_CONTINUE_JOURNALING);
    recs.push(REC_REVIEW_REPORT);

    if stats.avg_stress < LOW_SCORE_THRESHOLD && stats.avg_anxiety < LOW_SCORE_THRESHOLD {
        recs.push(REC_POSITIVE_REGULATION);
    }

    recs.into_iter().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::statistics::{DateRange, EntryTypeCounts, MoodCount, Trend};
    use chrono::Utc;

    fn stats(avg_stress: u32, avg_anxiety: u32) -> ReportStatistics {
        let now = Utc::now();
        ReportStatistics {
            total_entries: 10,
            date_range: DateRange {
                start: now,
                end: now,
            },
            entry_type_counts: EntryTypeCounts { text: 9, voice: 1 },
            avg_stress,
            avg_anxiety,
            stress_trend: Trend::Stable,
            anxiety_trend: Trend::Stable,
            mood_distribution: vec![MoodCount {
                mood: "calm".to_string(),
                count: 10,
            }],
            dominant_mood: "calm".to_string(),
            high_stress_days: 0,
            high_anxiety_days: 0,
            concerning_patterns: vec![],
        }
    }

    #[test]
    fn test_low_scores_mostly_text() {
        let recs = recommendations(&stats(30, 25));
        assert_eq!(
            recs,
            vec![
                REC_CONTINUE_JOURNALING,
                REC_REVIEW_REPORT,
                REC_POSITIVE_REGULATION
            ]
        );
        assert!(!recs.contains(&REC_IMMEDIATE_INTERVENTION.to_string()));
        assert!(!recs.contains(&REC_VERBAL_THERAPY.to_string()));
    }

    #[test]
    fn test_all_rules_fire_in_order() {
        let mut s = stats(85, 90);
        s.stress_trend = Trend::Increasing;
        s.high_stress_days = 5;
        s.entry_type_counts = EntryTypeCounts { text: 4, voice: 6 };

        assert_eq!(
            recommendations(&s),
            vec![
                REC_IMMEDIATE_INTERVENTION,
                REC_WORSENING_TREND,
                REC_EXPLORE_COPING,
                REC_VERBAL_THERAPY,
                REC_CONTINUE_JOURNALING,
                REC_REVIEW_REPORT,
            ]
        );
    }

    #[test]
    fn test_coping_threshold_is_half_not_sixty_percent() {
        let mut s = stats(50, 50);
        s.high_stress_days = 5;
        assert!(recommendations(&s).contains(&REC_EXPLORE_COPING.to_string()));

        s.high_stress_days = 4;
        assert!(!recommendations(&s).contains(&REC_EXPLORE_COPING.to_string()));
    }

    #[test]
    fn test_anxiety_trend_alone_counts_as_worsening() {
        let mut s = stats(50, 50);
        s.anxiety_trend = Trend::Increasing;
        assert_eq!(recommendations(&s)[0], REC_WORSENING_TREND);
    }

    #[test]
    fn test_equal_voice_and_text_is_not_a_preference() {
        let mut s = stats(50, 50);
        s.entry_type_counts = EntryTypeCounts { text: 5, voice: 5 };
        assert!(!recommendations(&s).contains(&REC_VERBAL_THERAPY.to_string()));
    }

    #[test]
    fn test_positive_regulation_needs_both_below_forty() {
        assert!(!recommendations(&stats(39, 40)).contains(&REC_POSITIVE_REGULATION.to_string()));
        assert!(recommendations(&stats(39, 39)).contains(&REC_POSITIVE_REGULATION.to_string()));
    }

    #[test]
    fn test_never_empty() {
        assert!(recommendations(&stats(60, 60)).len() >= 2);
    }
}
