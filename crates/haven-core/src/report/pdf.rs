//! A4 PDF rendering of the therapy summary
//!
//! Page 1: header, period, executive summary, key metrics, trends, mood
//! distribution and areas of concern. Page 2: the five newest entries.
//! Page 3: numbered recommendations and the confidentiality footer.
//! Long sections flow onto extra pages.

use std::io::BufWriter;

use chrono::{DateTime, Utc};
use printpdf::*;

use super::{trend_color, ReportSummary, ScoreSummary};
use crate::error::{Error, Result};
use crate::models::{Entry, EntryType};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 18.0;
const TOP: f32 = PAGE_HEIGHT - MARGIN;

/// Entries shown in the detailed observations
const DETAILED_ENTRIES: usize = 5;
/// Entry text longer than this is cut and suffixed with "..."
const CONTENT_PREVIEW_CHARS: usize = 150;

const HEADER_COLOR: &str = "#2c5f7f";
const BODY_COLOR: &str = "#333333";
const MUTED_COLOR: &str = "#666666";
const FAINT_COLOR: &str = "#999999";
const MOOD_COLOR: &str = "#6b8e7f";
const CONCERN_COLOR: &str = "#d63031";
const RULE_COLOR: &str = "#dddddd";

pub const FOOTER_REVIEW: &str = "This report is generated for therapeutic purposes and should be reviewed by a licensed mental health professional.";
pub const FOOTER_PRIVACY: &str =
    "All information is confidential and protected under patient privacy laws.";

/// Render the report for a newest-first window of entries
pub fn render_pdf(
    entries: &[Entry],
    summary: &ReportSummary,
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>> {
    let stats = &summary.statistics;
    let (doc, page, layer) =
        PdfDocument::new("Mental Wellness Report", Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| Error::Pdf(format!("font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| Error::Pdf(format!("font error: {e}")))?;
    let italic = doc
        .add_builtin_font(BuiltinFont::HelveticaOblique)
        .map_err(|e| Error::Pdf(format!("font error: {e}")))?;

    let mut w = PageWriter {
        doc: &doc,
        layer: doc.get_page(page).get_layer(layer),
        y: TOP,
        font,
        bold,
        italic,
    };

    // Header
    w.centered("Mental Wellness Report", 22.0, HEADER_COLOR, Face::Bold);
    w.gap(2.0);
    w.centered(
        &format!("Generated on {}", generated_at.format("%B %-d, %Y")),
        11.0,
        MUTED_COLOR,
        Face::Regular,
    );
    w.gap(6.0);
    w.centered(
        &format!(
            "Report Period: {} - {}",
            stats.date_range.start.format("%m/%d/%Y"),
            stats.date_range.end.format("%m/%d/%Y")
        ),
        9.0,
        FAINT_COLOR,
        Face::Regular,
    );
    w.gap(2.0);
    w.rule(RULE_COLOR, 0.8);
    w.gap(4.0);

    w.section("Executive Summary");
    w.paragraph(
        &format!(
            "This report analyzes {} journal entries to provide insights into the patient's \
             mental wellness patterns. The analysis includes {} written and {} voice entries.",
            stats.total_entries, stats.entry_type_counts.text, stats.entry_type_counts.voice
        ),
        10.0,
        0.0,
        BODY_COLOR,
        Face::Regular,
    );
    w.gap(5.0);

    w.section("Key Metrics");
    w.metric("Average Stress Level", &summary.stress);
    w.metric("Average Anxiety Level", &summary.anxiety);
    w.line("Dominant Emotional State", 9.0, 0.0, MUTED_COLOR, Face::Regular);
    w.line(&capitalize(&stats.dominant_mood), 15.0, 0.0, MOOD_COLOR, Face::Bold);
    w.gap(5.0);

    w.section("Trends Analysis");
    w.labelled("Stress Trend: ", &stats.stress_trend.as_str().to_uppercase(), trend_color(stats.stress_trend));
    w.labelled("Anxiety Trend: ", &stats.anxiety_trend.as_str().to_uppercase(), trend_color(stats.anxiety_trend));
    w.gap(5.0);

    w.section("Emotional State Distribution");
    for m in &stats.mood_distribution {
        w.line(
            &format!(
                "{}: {} entries ({}%)",
                capitalize(&m.mood),
                m.count,
                stats.percentage(m.count)
            ),
            10.0,
            7.0,
            BODY_COLOR,
            Face::Regular,
        );
    }
    w.gap(5.0);

    if !stats.concerning_patterns.is_empty() {
        w.section("Areas of Concern");
        for (i, pattern) in stats.concerning_patterns.iter().enumerate() {
            w.paragraph(&format!("{}. {}", i + 1, pattern), 10.0, 7.0, CONCERN_COLOR, Face::Regular);
        }
    }

    // Detailed observations
    w.new_page();
    w.section("Detailed Clinical Observations");
    w.line("Recent Journal Entries Analysis:", 10.0, 0.0, BODY_COLOR, Face::Bold);
    w.gap(2.0);

    for (i, entry) in entries.iter().take(DETAILED_ENTRIES).enumerate() {
        w.ensure_space(30.0);
        w.line(
            &format!("Entry {} - {}", i + 1, entry.created_at.format("%m/%d/%Y")),
            9.0,
            0.0,
            HEADER_COLOR,
            Face::Bold,
        );
        w.line(
            &format!(
                "Type: {} | Mood: {} | Stress: {} | Anxiety: {}",
                match entry.entry_type {
                    EntryType::Text => "Written",
                    EntryType::Voice => "Voice",
                },
                entry.mood,
                score_label(entry.stress_score),
                score_label(entry.anxiety_score)
            ),
            8.0,
            0.0,
            MUTED_COLOR,
            Face::Regular,
        );
        w.paragraph(&format!("Insight: {}", entry.insight), 9.0, 5.0, BODY_COLOR, Face::Regular);
        let body = entry.body();
        if !body.is_empty() {
            w.paragraph(
                &format!("Content: \"{}\"", truncate(body, CONTENT_PREVIEW_CHARS)),
                8.0,
                5.0,
                "#777777",
                Face::Italic,
            );
        }
        w.gap(2.0);
        w.rule("#eeeeee", 0.4);
        w.gap(2.0);
    }

    // Recommendations
    w.new_page();
    w.section("Professional Recommendations");
    for (i, rec) in summary.recommendations.iter().enumerate() {
        w.paragraph(&format!("{}. {}", i + 1, rec), 10.0, 7.0, BODY_COLOR, Face::Regular);
        w.gap(2.0);
    }

    w.gap(8.0);
    w.ensure_space(20.0);
    w.rule(RULE_COLOR, 0.8);
    w.gap(2.0);
    for line in wrap_text(FOOTER_REVIEW, 100) {
        w.centered(&line, 8.0, FAINT_COLOR, Face::Regular);
    }
    w.centered(FOOTER_PRIVACY, 8.0, FAINT_COLOR, Face::Regular);

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| Error::Pdf(format!("save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| Error::Pdf(format!("buffer error: {e}")))
}

#[derive(Clone, Copy)]
enum Face {
    Regular,
    Bold,
    Italic,
}

/// Cursor over the current page that starts a new page when it runs out of room
struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    /// Baseline of the next line, in mm from the bottom edge
    y: f32,
    font: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl PageWriter<'_> {
    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = TOP;
    }

    fn ensure_space(&mut self, height: f32) {
        if self.y - height < MARGIN {
            self.new_page();
        }
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn face(&self, face: Face) -> &IndirectFontRef {
        match face {
            Face::Regular => &self.font,
            Face::Bold => &self.bold,
            Face::Italic => &self.italic,
        }
    }

    fn write_at(&mut self, text: &str, size: f32, x: f32, color: &str, face: Face) {
        let line_height = line_height(size);
        self.ensure_space(line_height);
        self.y -= line_height;
        self.layer.set_fill_color(rgb(color));
        let font = self.face(face).clone();
        self.layer.use_text(text, size, Mm(x), Mm(self.y), &font);
    }

    /// Single line, no wrapping
    fn line(&mut self, text: &str, size: f32, indent: f32, color: &str, face: Face) {
        self.write_at(text, size, MARGIN + indent, color, face);
    }

    /// Wrapped to the printable width
    fn paragraph(&mut self, text: &str, size: f32, indent: f32, color: &str, face: Face) {
        let width = PAGE_WIDTH - 2.0 * MARGIN - indent;
        for line in wrap_text(text, chars_per_line(width, size)) {
            self.write_at(&line, size, MARGIN + indent, color, face);
        }
    }

    fn centered(&mut self, text: &str, size: f32, color: &str, face: Face) {
        let x = ((PAGE_WIDTH - estimated_width(text, size)) / 2.0).max(MARGIN);
        self.write_at(text, size, x, color, face);
    }

    fn section(&mut self, title: &str) {
        self.ensure_space(20.0);
        self.line(title, 14.0, 0.0, HEADER_COLOR, Face::Bold);
        self.gap(2.0);
    }

    fn metric(&mut self, label: &str, score: &ScoreSummary) {
        self.ensure_space(18.0);
        self.line(label, 9.0, 0.0, MUTED_COLOR, Face::Regular);
        self.line(&format!("{}/100", score.value), 15.0, 0.0, score.color, Face::Bold);
        self.line(score.interpretation, 8.0, 0.0, FAINT_COLOR, Face::Regular);
        self.gap(2.0);
    }

    /// "Label: VALUE" with the value in its own colour
    fn labelled(&mut self, label: &str, value: &str, value_color: &str) {
        self.write_at(label, 10.0, MARGIN, BODY_COLOR, Face::Regular);
        let x = MARGIN + estimated_width(label, 10.0);
        self.layer.set_fill_color(rgb(value_color));
        let bold = self.bold.clone();
        self.layer.use_text(value, 10.0, Mm(x), Mm(self.y), &bold);
    }

    fn rule(&mut self, color: &str, thickness: f32) {
        self.ensure_space(2.0);
        self.layer.set_outline_color(rgb(color));
        self.layer.set_outline_thickness(thickness);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN), Mm(self.y)), false),
                (Point::new(Mm(PAGE_WIDTH - MARGIN), Mm(self.y)), false),
            ],
            is_closed: false,
        });
    }
}

fn line_height(size: f32) -> f32 {
    // points to mm, plus leading
    size * 0.3528 * 1.45
}

/// Rough Helvetica advance width (half an em per character)
fn estimated_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5 * 0.3528
}

fn chars_per_line(width_mm: f32, size: f32) -> usize {
    ((width_mm / (size * 0.5 * 0.3528)) as usize).max(20)
}

fn score_label(score: Option<u8>) -> String {
    score.map_or_else(|| "n/a".to_string(), |s| s.to_string())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Cut to `max` characters, appending "..." when anything was removed
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{cut}...")
}

fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.chars().count() + word.chars().count() + 1 > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// `#rrggbb` to a printpdf colour; malformed input renders black
fn rgb(hex: &str) -> Color {
    let channel = |range: std::ops::Range<usize>| {
        hex.trim_start_matches('#')
            .get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .map_or(0.0, |v| f32::from(v) / 255.0)
    };
    Color::Rgb(Rgb::new(channel(0..2), channel(2..4), channel(4..6), None))
}
