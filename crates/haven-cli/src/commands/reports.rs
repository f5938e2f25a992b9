//! Therapy report command

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use haven_core::db::Database;
use haven_core::models::Entry;
use haven_core::report::{render_pdf, ReportSummary, NO_ENTRIES_MESSAGE, REPORT_WINDOW};

fn load_report(db: &Database) -> Result<(Vec<Entry>, ReportSummary)> {
    let entries = db.recent_entries(REPORT_WINDOW as i64)?;
    let summary = ReportSummary::from_entries(&entries).context(NO_ENTRIES_MESSAGE)?;
    Ok((entries, summary))
}

/// Print the report summary as pretty JSON
pub fn cmd_report_json(db: &Database) -> Result<()> {
    let (_, summary) = load_report(db)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Write the PDF report; returns the path written
pub fn cmd_report_pdf(db: &Database, output: Option<&Path>) -> Result<PathBuf> {
    let (entries, summary) = load_report(db)?;

    let generated_at = Utc::now();
    let pdf = render_pdf(&entries, &summary, generated_at)?;

    let path = output.map(Path::to_path_buf).unwrap_or_else(|| {
        PathBuf::from(format!(
            "mental-wellness-report-{}.pdf",
            generated_at.timestamp_millis()
        ))
    });
    std::fs::write(&path, &pdf)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    db.log_audit(
        "cli",
        "report",
        Some("therapy_report"),
        None,
        Some(&format!("format=pdf, entries={}", entries.len())),
    )?;

    let stats = &summary.statistics;
    println!("📄 Report written to {}", path.display());
    println!("   Entries analyzed: {}", stats.total_entries);
    println!(
        "   Average stress: {}/100 ({})",
        stats.avg_stress,
        stats.stress_trend.as_str()
    );
    println!(
        "   Average anxiety: {}/100 ({})",
        stats.avg_anxiety,
        stats.anxiety_trend.as_str()
    );
    if !stats.concerning_patterns.is_empty() {
        println!("   ⚠️  {}", stats.concerning_patterns.join("; "));
    }

    Ok(path)
}
