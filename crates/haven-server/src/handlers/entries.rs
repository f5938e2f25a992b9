//! Journal entry handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{get_actor, read_json, AppError, AppState, MAX_PAGE_LIMIT};
use haven_core::models::{Entry, EntryType, NewEntry, TimelinePoint};

/// Query parameters for listing entries
#[derive(Debug, Deserialize)]
pub struct ListEntriesQuery {
    /// "text" or "voice"
    #[serde(rename = "type")]
    pub entry_type: Option<String>,
    #[serde(default = "default_entries_limit")]
    pub limit: i64,
}

fn default_entries_limit() -> i64 {
    50
}

/// Query parameters for the mood timeline
#[derive(Debug, Deserialize)]
pub struct TimelineQuery {
    #[serde(default = "default_timeline_limit")]
    pub limit: i64,
}

fn default_timeline_limit() -> i64 {
    30
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// POST /api/entries - Save an analyzed entry
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<Entry>), AppError> {
    let actor = get_actor(request.headers());
    let new: NewEntry = read_json(request).await?;

    let entry = state.db.create_entry(&new).map_err(AppError::from_core)?;
    info!(entry_id = entry.id, entry_type = %entry.entry_type, "Entry saved");

    state.db.log_audit(
        &actor,
        "create",
        Some("entry"),
        Some(entry.id),
        Some(&format!("type={}, mood={}", entry.entry_type, entry.mood)),
    )?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/entries - List entries newest-first
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListEntriesQuery>,
    request: Request,
) -> Result<Json<Vec<Entry>>, AppError> {
    let actor = get_actor(request.headers());

    let entry_type = params
        .entry_type
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(str::parse::<EntryType>)
        .transpose()
        .map_err(|e| AppError::bad_request(&e))?;
    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);

    let entries = state.db.list_entries(entry_type, limit)?;

    // Audit log - read access
    state.db.log_audit(
        &actor,
        "list",
        Some("entry"),
        None,
        Some(&format!(
            "type={}, count={}",
            entry_type.map_or("all", |t| t.as_str()),
            entries.len()
        )),
    )?;

    Ok(Json(entries))
}

/// GET /api/entries/timeline - Mood chart points, oldest-first
pub async fn mood_timeline(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TimelineQuery>,
    request: Request,
) -> Result<Json<Vec<TimelinePoint>>, AppError> {
    let actor = get_actor(request.headers());
    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);

    let points = state.db.mood_timeline(limit)?;

    state.db.log_audit(
        &actor,
        "list",
        Some("timeline"),
        None,
        Some(&format!("count={}", points.len())),
    )?;

    Ok(Json(points))
}

/// GET /api/entries/:id - Get a single entry
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Entry>, AppError> {
    let actor = get_actor(request.headers());

    let entry = state
        .db
        .get_entry(id)?
        .ok_or_else(|| AppError::not_found("Entry not found"))?;

    state
        .db
        .log_audit(&actor, "get", Some("entry"), Some(id), None)?;

    Ok(Json(entry))
}

/// DELETE /api/entries/:id - Delete an entry
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<MessageResponse>, AppError> {
    let actor = get_actor(request.headers());

    if !state.db.delete_entry(id)? {
        return Err(AppError::not_found("Entry not found"));
    }
    info!(entry_id = id, "Entry deleted");

    state
        .db
        .log_audit(&actor, "delete", Some("entry"), Some(id), None)?;

    Ok(Json(MessageResponse {
        message: "Entry deleted successfully",
    }))
}
