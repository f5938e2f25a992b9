//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Haven - A private mood journal with an AI companion
#[derive(Parser)]
#[command(name = "haven")]
#[command(about = "Self-hosted wellness journal with mood analysis", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "haven.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set HAVEN_DB_KEY environment variable with your passphrase.
    /// Entry text is field-encrypted with ENCRYPTION_KEY either way.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        #[arg(long)]
        no_auth: bool,

        /// Directory with the web client to serve at /
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Show database and backend status
    Status,

    /// Browse and manage journal entries
    Entries {
        #[command(subcommand)]
        action: Option<EntriesAction>,
    },

    /// Generate the therapy summary report from the latest entries
    Report {
        /// Where to write the PDF (defaults to mental-wellness-report-<millis>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the summary as JSON instead of writing a PDF
        #[arg(long, conflicts_with = "output")]
        json: bool,
    },

    /// Analyze a piece of writing with the AI backend
    Analyze {
        /// Text to analyze
        #[arg(short, long)]
        text: String,

        /// Save the analyzed entry to the journal
        #[arg(long)]
        save: bool,
    },

    /// Send a message to the companion
    Chat {
        /// Chat session id
        #[arg(short, long, default_value = "cli")]
        session: String,

        /// Message to send
        message: String,
    },
}

#[derive(Subcommand)]
pub enum EntriesAction {
    /// List recent entries (newest first)
    List {
        /// Maximum entries to show
        #[arg(short, long, default_value = "20")]
        limit: i64,

        /// Only show "text" or "voice" entries
        #[arg(short = 't', long = "type")]
        entry_type: Option<String>,
    },

    /// Show one entry in full
    Show {
        /// Entry ID
        id: i64,
    },

    /// Delete an entry
    Delete {
        /// Entry ID
        id: i64,
    },
}
