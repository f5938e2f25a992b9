//! Mood analysis handlers
//!
//! Analysis results are returned to the client, not stored: the client
//! decides whether to save the entry via POST /api/entries.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart, Request, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{get_actor, read_json, AppError, AppState, MAX_AUDIO_SIZE};
use haven_core::ai::{AIBackend, MoodAnalysis};
use haven_core::coping::{self, CopingStrategy};
use haven_core::crypto;
use haven_core::models::EntryType;
use haven_core::mood::MoodDisplay;

/// Multipart field carrying the recording
const AUDIO_FIELD: &str = "audio";

/// Request body for text analysis
#[derive(Debug, Deserialize)]
pub struct AnalyzeTextRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// Analysis plus the presentation hints derived from it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    #[serde(flatten)]
    pub analysis: MoodAnalysis,
    pub mood_display: MoodDisplay,
    pub coping_strategies: Vec<CopingStrategy>,
}

impl AnalysisResponse {
    fn new(analysis: MoodAnalysis) -> Self {
        Self {
            mood_display: MoodDisplay::for_mood(&analysis.mood),
            coping_strategies: coping::suggest(
                analysis.stress_score,
                analysis.anxiety_score,
                &analysis.mood,
            ),
            analysis,
        }
    }
}

/// Voice analysis response: the transcript alongside the analysis
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceAnalysisResponse {
    pub transcript: String,
    #[serde(flatten)]
    pub result: AnalysisResponse,
}

/// POST /api/analyze-text - Analyze a written entry
pub async fn analyze_text(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<AnalysisResponse>, AppError> {
    let actor = get_actor(request.headers());
    let req: AnalyzeTextRequest = read_json(request).await?;

    let text = req
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::bad_request("Text is required"))?;

    let ai = state.ai()?;
    let analysis = ai
        .analyze_entry(text, EntryType::Text)
        .await
        .map_err(AppError::from_core)?;

    info!(mood = %analysis.mood, model = ai.model(), "Text analyzed");

    // Fingerprint only; the text itself never reaches the audit log
    state.db.log_audit(
        &actor,
        "analyze",
        Some("text"),
        None,
        Some(&format!("sha256={}", crypto::hash(text))),
    )?;

    Ok(Json(AnalysisResponse::new(analysis)))
}

/// POST /api/analyze-voice - Transcribe a recording, then analyze the transcript
pub async fn analyze_voice(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<VoiceAnalysisResponse>, AppError> {
    let actor = get_actor(&headers);

    let mut audio = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with("audio/") {
            return Err(AppError::bad_request("Only audio files are allowed"));
        }
        let bytes = field.bytes().await.map_err(multipart_error)?;
        audio = Some((bytes, content_type));
        break;
    }

    let (bytes, content_type) = audio
        .filter(|(bytes, _)| !bytes.is_empty())
        .ok_or_else(|| AppError::bad_request("Audio file is required"))?;
    if bytes.len() > MAX_AUDIO_SIZE {
        return Err(AppError::payload_too_large("Audio file too large (max 25MB)"));
    }

    let transcriber = state.transcriber()?;
    let ai = state.ai()?;

    let transcript = transcriber
        .transcribe(&bytes, &content_type)
        .await
        .map_err(AppError::from_core)?;
    let analysis = ai
        .analyze_entry(&transcript, EntryType::Voice)
        .await
        .map_err(AppError::from_core)?;

    info!(
        bytes = bytes.len(),
        content_type = %content_type,
        mood = %analysis.mood,
        "Voice entry analyzed"
    );

    state.db.log_audit(
        &actor,
        "analyze",
        Some("voice"),
        None,
        Some(&format!(
            "bytes={}, sha256={}",
            bytes.len(),
            crypto::hash(&transcript)
        )),
    )?;

    Ok(Json(VoiceAnalysisResponse {
        transcript,
        result: AnalysisResponse::new(analysis),
    }))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large("Audio file too large (max 25MB)")
    } else {
        AppError::bad_request("Invalid multipart upload")
    }
}
