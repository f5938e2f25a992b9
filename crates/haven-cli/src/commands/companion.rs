//! AI commands: analyze an entry, talk to the companion

use anyhow::{bail, Result};
use haven_core::ai::{AIBackend, AIClient, ChatTurn};
use haven_core::coping;
use haven_core::db::Database;
use haven_core::models::{EntryType, NewEntry};
use haven_core::mood::MoodDisplay;

/// Analyze `text`; with `save`, store it as a text entry. Returns the new entry id.
pub async fn cmd_analyze(
    db: &Database,
    ai: &AIClient,
    text: &str,
    save: bool,
) -> Result<Option<i64>> {
    let text = text.trim();
    if text.is_empty() {
        bail!("Text is required");
    }

    println!("🧠 Analyzing with {}...", ai.model());
    let analysis = ai.analyze_entry(text, EntryType::Text).await?;
    let display = MoodDisplay::for_mood(&analysis.mood);

    println!();
    println!("   Mood: {} {}", display.emoji, analysis.mood);
    println!("   Stress: {}/100", analysis.stress_score);
    println!("   Anxiety: {}/100", analysis.anxiety_score);
    println!();
    println!("   💡 {}", analysis.insight);

    let strategies = coping::suggest(
        analysis.stress_score,
        analysis.anxiety_score,
        &analysis.mood,
    );
    if !strategies.is_empty() {
        println!();
        println!("   Things that might help:");
        for s in &strategies {
            println!("   {} {} - {}", s.icon, s.title, s.description);
        }
    }

    if !save {
        return Ok(None);
    }

    let entry = db.create_entry(&NewEntry::text(
        text,
        &analysis.mood,
        &analysis.insight,
        i64::from(analysis.stress_score),
        i64::from(analysis.anxiety_score),
    ))?;
    db.log_audit(
        "cli",
        "create",
        Some("entry"),
        Some(entry.id),
        Some(&format!("type=text, mood={}", entry.mood)),
    )?;

    println!();
    println!("✓ Saved as entry #{}", entry.id);
    Ok(Some(entry.id))
}

/// Send one message to a chat session and print the reply
pub async fn cmd_chat(db: &Database, ai: &AIClient, session_id: &str, message: &str) -> Result<()> {
    let message = message.trim();
    if message.is_empty() {
        bail!("Message is required");
    }

    let mut history: Vec<ChatTurn> = db
        .get_chat_session(session_id)?
        .map(|s| s.messages.iter().map(ChatTurn::from).collect())
        .unwrap_or_default();
    history.push(ChatTurn::user(message));

    let reply = ai.chat(&history).await?;
    let session = db.append_chat_exchange(session_id, message, &reply)?;

    println!("{}", reply);
    tracing::debug!(
        session_id = %session.session_id,
        messages = session.messages.len(),
        "Chat exchange stored"
    );

    Ok(())
}
