//! Journal entry commands (list, show, delete)

use anyhow::{bail, Result};
use haven_core::db::Database;
use haven_core::models::EntryType;
use haven_core::mood::MoodDisplay;

use super::truncate;

fn score(value: Option<u8>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

pub fn cmd_entries_list(db: &Database, limit: i64, entry_type: Option<&str>) -> Result<()> {
    let entry_type = entry_type
        .map(str::parse::<EntryType>)
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;

    let entries = db.list_entries(entry_type, limit)?;

    if entries.is_empty() {
        println!("No entries yet. Write one with:");
        println!("  haven analyze --text \"How today went\" --save");
        return Ok(());
    }

    println!();
    println!(
        "{:>5}  {:16}  {:5}  {:12}  {:>6}  {:>7}  Entry",
        "ID", "Date", "Type", "Mood", "Stress", "Anxiety"
    );
    println!("{}", "─".repeat(90));

    for entry in entries {
        println!(
            "{:>5}  {:16}  {:5}  {} {:10}  {:>6}  {:>7}  {}",
            entry.id,
            entry.created_at.format("%Y-%m-%d %H:%M"),
            entry.entry_type.as_str(),
            MoodDisplay::for_mood(&entry.mood).emoji,
            truncate(&entry.mood, 10),
            score(entry.stress_score),
            score(entry.anxiety_score),
            truncate(entry.body(), 30),
        );
    }

    Ok(())
}

pub fn cmd_entries_show(db: &Database, id: i64) -> Result<()> {
    let Some(entry) = db.get_entry(id)? else {
        bail!("Entry not found: {}", id);
    };

    let display = MoodDisplay::for_mood(&entry.mood);

    println!();
    println!(
        "📓 Entry #{} ({}, {})",
        entry.id,
        entry.entry_type,
        entry.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!("   ─────────────────────────────");
    println!("   Mood: {} {}", display.emoji, entry.mood);
    println!("   Stress: {}", score(entry.stress_score));
    println!("   Anxiety: {}", score(entry.anxiety_score));
    println!();
    println!("   {}", entry.body());
    println!();
    println!("   💡 {}", entry.insight);

    Ok(())
}

pub fn cmd_entries_delete(db: &Database, id: i64) -> Result<()> {
    if !db.delete_entry(id)? {
        bail!("Entry not found: {}", id);
    }
    db.log_audit("cli", "delete", Some("entry"), Some(id), None)?;

    println!("✓ Deleted entry #{}", id);
    Ok(())
}
