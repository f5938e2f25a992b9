//! Companion chat handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{get_actor, read_json, AppError, AppState};
use haven_core::ai::{AIBackend, ChatTurn};
use haven_core::models::{ChatSession, ChatSessionSummary};

/// Sessions returned by GET /api/chat/sessions
const SESSION_LIST_LIMIT: i64 = 50;

/// Request body for sending a message
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// The assistant's reply together with the updated session
#[derive(Debug, Serialize)]
pub struct ChatReplyResponse {
    pub message: String,
    pub chat: ChatSession,
}

#[derive(Debug, Serialize)]
pub struct ChatDeletedResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ChatClearedResponse {
    pub message: &'static str,
    pub chat: ChatSession,
}

/// GET /api/chat/session/:session_id - Get or create a session
pub async fn get_chat_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    request: Request,
) -> Result<Json<ChatSession>, AppError> {
    let actor = get_actor(request.headers());

    let session = state.db.get_or_create_chat_session(&session_id)?;

    state.db.log_audit(
        &actor,
        "get",
        Some("chat_session"),
        None,
        Some(&format!("session={}", session_id)),
    )?;

    Ok(Json(session))
}

/// POST /api/chat/session/:session_id/message - Send a message and get a reply
///
/// Nothing is stored unless the companion answers, so a failed call leaves the
/// session as it was.
pub async fn send_chat_message(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    request: Request,
) -> Result<Json<ChatReplyResponse>, AppError> {
    let actor = get_actor(request.headers());
    let req: SendMessageRequest = read_json(request).await?;

    let message = req
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("Message is required"))?;

    let ai = state.ai()?;

    let mut history: Vec<ChatTurn> = state
        .db
        .get_chat_session(&session_id)?
        .map(|s| s.messages.iter().map(ChatTurn::from).collect())
        .unwrap_or_default();
    history.push(ChatTurn::user(&message));

    let reply = ai.chat(&history).await.map_err(AppError::from_core)?;
    let chat = state
        .db
        .append_chat_exchange(&session_id, &message, &reply)?;

    info!(
        session_id = %session_id,
        turns = chat.messages.len(),
        "Chat reply sent"
    );

    state.db.log_audit(
        &actor,
        "chat",
        Some("chat_session"),
        None,
        Some(&format!("session={}", session_id)),
    )?;

    Ok(Json(ChatReplyResponse {
        message: reply,
        chat,
    }))
}

/// GET /api/chat/sessions - Most recently active sessions
pub async fn list_chat_sessions(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<ChatSessionSummary>>, AppError> {
    let actor = get_actor(request.headers());

    let sessions = state.db.list_chat_sessions(SESSION_LIST_LIMIT)?;

    state.db.log_audit(
        &actor,
        "list",
        Some("chat_session"),
        None,
        Some(&format!("count={}", sessions.len())),
    )?;

    Ok(Json(sessions))
}

/// DELETE /api/chat/session/:session_id - Delete a session and its messages
pub async fn delete_chat_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    request: Request,
) -> Result<Json<ChatDeletedResponse>, AppError> {
    let actor = get_actor(request.headers());

    if !state.db.delete_chat_session(&session_id)? {
        return Err(AppError::not_found("Session not found"));
    }

    state.db.log_audit(
        &actor,
        "delete",
        Some("chat_session"),
        None,
        Some(&format!("session={}", session_id)),
    )?;

    Ok(Json(ChatDeletedResponse {
        message: "Session deleted successfully",
    }))
}

/// DELETE /api/chat/session/:session_id/history - Clear messages, keep the session
pub async fn clear_chat_history(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    request: Request,
) -> Result<Json<ChatClearedResponse>, AppError> {
    let actor = get_actor(request.headers());

    let chat = state
        .db
        .clear_chat_history(&session_id)?
        .ok_or_else(|| AppError::not_found("Session not found"))?;

    state.db.log_audit(
        &actor,
        "clear",
        Some("chat_session"),
        None,
        Some(&format!("session={}", session_id)),
    )?;

    Ok(Json(ChatClearedResponse {
        message: "Chat history cleared",
        chat,
    }))
}
