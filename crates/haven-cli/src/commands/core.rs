//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `require_ai` - The configured AI client, or a helpful error
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use haven_core::ai::AIClient;
use haven_core::config::{Config, ENCRYPTION_KEY_ENV};
use haven_core::db::Database;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool, config: &Config) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str, &config.encryption_key)
            .context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str, config).context("Failed to open database")
    }
}

/// The AI client for analyze/chat commands
pub fn require_ai(config: &Config) -> Result<AIClient> {
    AIClient::from_config(config)
        .context("AI backend not configured. Set OPENROUTER_API_KEY (or AI_BACKEND=mock)")
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool, config: &Config) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path, no_encrypt, config)?;
    println!("   Entries: {}", db.count_entries()?);

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }
    if config.uses_dev_encryption_key() {
        println!(
            "   ⚠️  Field encryption uses the development key. Set {} before storing real entries.",
            ENCRYPTION_KEY_ENV
        );
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Write an entry: haven analyze --text \"How today went\" --save");
    println!("  2. Start web UI: haven serve");

    Ok(())
}
