//! Haven CLI - Private mood journal
//!
//! Usage:
//!   haven init                      Initialize database
//!   haven analyze --text "..."      Analyze an entry (add --save to keep it)
//!   haven report --output r.pdf     Write the therapy summary report
//!   haven serve --port 3000         Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;
use haven_core::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; the environment may be set some other way
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = Config::from_env();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt, &config),
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                no_auth,
                cli.no_encrypt,
                static_dir.as_deref(),
                &config,
            )
            .await
        }
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt, &config),
        Commands::Entries { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt, &config)?;
            match action {
                None => commands::cmd_entries_list(&db, 20, None),
                Some(EntriesAction::List { limit, entry_type }) => {
                    commands::cmd_entries_list(&db, limit, entry_type.as_deref())
                }
                Some(EntriesAction::Show { id }) => commands::cmd_entries_show(&db, id),
                Some(EntriesAction::Delete { id }) => commands::cmd_entries_delete(&db, id),
            }
        }
        Commands::Report { output, json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt, &config)?;
            if json {
                commands::cmd_report_json(&db)
            } else {
                commands::cmd_report_pdf(&db, output.as_deref()).map(|_| ())
            }
        }
        Commands::Analyze { text, save } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt, &config)?;
            let ai = commands::require_ai(&config)?;
            commands::cmd_analyze(&db, &ai, &text, save)
                .await
                .map(|_| ())
        }
        Commands::Chat { session, message } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt, &config)?;
            let ai = commands::require_ai(&config)?;
            commands::cmd_chat(&db, &ai, &session, &message).await
        }
    }
}
