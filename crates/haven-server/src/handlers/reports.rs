//! Therapy report handlers

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use chrono::Utc;
use tracing::info;

use crate::{get_actor, AppError, AppState};
use haven_core::models::Entry;
use haven_core::report::{render_pdf, ReportSummary, NO_ENTRIES_MESSAGE, REPORT_WINDOW};

/// Latest entries and their summary, or 404 when the journal is empty
fn load_report(state: &AppState) -> Result<(Vec<Entry>, ReportSummary), AppError> {
    let entries = state.db.recent_entries(REPORT_WINDOW as i64)?;
    let summary = ReportSummary::from_entries(&entries)
        .ok_or_else(|| AppError::not_found(NO_ENTRIES_MESSAGE))?;
    Ok((entries, summary))
}

/// GET /api/report/generate - Download the therapy report as PDF
pub async fn generate_report(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Response<Body>, AppError> {
    let actor = get_actor(request.headers());
    let (entries, summary) = load_report(&state)?;

    let generated_at = Utc::now();
    let pdf = render_pdf(&entries, &summary, generated_at).map_err(AppError::from_core)?;
    info!(
        entries = entries.len(),
        bytes = pdf.len(),
        "Therapy report generated"
    );

    state.db.log_audit(
        &actor,
        "report",
        Some("therapy_report"),
        None,
        Some(&format!("format=pdf, entries={}", entries.len())),
    )?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"mental-wellness-report-{}.pdf\"",
                generated_at.timestamp_millis()
            ),
        )
        .body(Body::from(pdf))
        .map_err(|e| AppError::internal(&e.to_string()))
}

/// GET /api/report/summary - Report statistics and recommendations as JSON
///
/// `statistics.moodDistribution` is an array of `{mood, count}` in order of
/// first appearance, not a mood-to-count object, so ties resolve the same way
/// on every client.
pub async fn report_summary(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<ReportSummary>, AppError> {
    let actor = get_actor(request.headers());
    let (entries, summary) = load_report(&state)?;

    state.db.log_audit(
        &actor,
        "report",
        Some("therapy_report"),
        None,
        Some(&format!("format=json, entries={}", entries.len())),
    )?;

    Ok(Json(summary))
}
