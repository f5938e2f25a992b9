//! Status command implementation

use std::path::Path;

use anyhow::Result;
use haven_core::ai::{AIBackend, AIClient, Transcriber};
use haven_core::config::{Config, DB_KEY_ENV};

use super::open_db;

pub fn cmd_status(db_path: &Path, no_encrypt: bool, config: &Config) -> Result<()> {
    use std::fs;

    println!();
    println!("📊 Haven Status");
    println!("   ─────────────────────────────────────────────────────────────");

    // Database path
    println!("   Database: {}", db_path.display());

    // Check if database file exists and get size
    if db_path.exists() {
        if let Ok(metadata) = fs::metadata(db_path) {
            let size_kb = metadata.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.1} MB", size_kb / 1024.0);
            }
        }
    } else {
        println!("   Size: (database not initialized)");
    }

    // Check encryption status
    let has_key = config.db_key.is_some();
    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else if has_key {
        println!("   🔒 Encryption: ENABLED ({}=***)", DB_KEY_ENV);
    } else {
        println!("   ❌ Encryption: REQUIRED but {} not set", DB_KEY_ENV);
    }
    if config.uses_dev_encryption_key() {
        println!("   ⚠️  Field encryption: development key");
    }

    // Try to open the database and show stats
    if db_path.exists() {
        match open_db(db_path, no_encrypt, config) {
            Ok(db) => {
                if let Ok(count) = db.count_entries() {
                    println!();
                    println!("   Entries: {}", count);
                }
                if let Ok(Some(latest)) = db.recent_entries(1).map(|e| e.into_iter().next()) {
                    println!(
                        "   Latest: {} ({})",
                        latest.created_at.format("%Y-%m-%d %H:%M"),
                        latest.mood
                    );
                }
                if let Ok(sessions) = db.list_chat_sessions(1000) {
                    println!("   Chat sessions: {}", sessions.len());
                }
            }
            Err(e) => {
                println!();
                println!("   ❌ Error opening database: {}", e);
                if !no_encrypt && !has_key {
                    println!("      Set {} or use --no-encrypt", DB_KEY_ENV);
                } else if has_key {
                    println!("      (Check if {} is correct)", DB_KEY_ENV);
                }
            }
        }
    }

    // Backends
    println!();
    match AIClient::from_config(config) {
        Some(ai) => println!("   🤖 AI backend: {} ({})", ai.model(), ai.host()),
        None => println!("   💡 AI backend: not configured (set OPENROUTER_API_KEY)"),
    }
    match Transcriber::from_config(config) {
        Some(t) => println!("   🎙️  Transcription: {}", t.name()),
        None => println!("   💡 Transcription: not configured (set HUGGINGFACE_API_TOKEN)"),
    }

    println!();
    Ok(())
}
