//! JSON parsing helpers for LLM replies
//!
//! Models often wrap the JSON payload in prose or code fences, so parsing
//! starts by cutting out the outermost `{ ... }`.

use serde::Deserialize;
use serde_json::Value;

use super::error::{Service, UpstreamError};
use super::types::MoodAnalysis;
use crate::error::Result;

/// Slice from the first `{` to the last `}`
pub fn extract_json_object(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (start < end).then(|| &response[start..=end])
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    mood: Option<String>,
    insight: Option<String>,
    stress_score: Option<Value>,
    anxiety_score: Option<Value>,
}

/// Parse a mood analysis reply.
///
/// Scores may arrive as numbers or numeric strings and are clamped to 0..=100;
/// a missing score reads as 0. A missing mood or insight is an unusable reply.
pub fn parse_mood_analysis(response: &str) -> Result<MoodAnalysis> {
    let json = extract_json_object(response.trim()).ok_or_else(|| {
        UpstreamError::invalid_reply(
            Service::Llm,
            format!("no JSON object in reply: {}", preview(response)),
        )
    })?;

    let raw: RawAnalysis = serde_json::from_str(json).map_err(|e| {
        UpstreamError::invalid_reply(Service::Llm, format!("invalid analysis JSON: {}", e))
    })?;

    let mood = non_blank(raw.mood)
        .ok_or_else(|| UpstreamError::invalid_reply(Service::Llm, "analysis is missing a mood"))?;
    let insight = non_blank(raw.insight).ok_or_else(|| {
        UpstreamError::invalid_reply(Service::Llm, "analysis is missing an insight")
    })?;

    Ok(MoodAnalysis {
        mood,
        insight,
        stress_score: clamp_score(raw.stress_score.as_ref()),
        anxiety_score: clamp_score(raw.anxiety_score.as_ref()),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clamp_score(value: Option<&Value>) -> u8 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number
        .filter(|n| n.is_finite())
        .map_or(0, |n| n.round().clamp(0.0, 100.0) as u8)
}

fn preview(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() > 200 {
        format!("{}...", text.chars().take(200).collect::<String>())
    } else {
        text.to_string()
    }
}
