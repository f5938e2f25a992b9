//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use haven_core::config::{Config, ENCRYPTION_KEY_ENV};
use haven_server::ServerConfig;

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_auth: bool,
    no_encrypt: bool,
    static_dir: Option<&Path>,
    config: &Config,
) -> Result<()> {
    println!("🚀 Starting Haven web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    let mut server_config = ServerConfig::from_config(config);
    server_config.require_auth = !no_auth;

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else if server_config.api_keys.is_empty() {
        println!("   ❌ Authentication required but HAVEN_API_KEYS is empty");
        println!("      Every API request will be rejected. Set keys or use --no-auth locally.");
    } else {
        println!(
            "   🔑 API keys: {} configured (HAVEN_API_KEYS)",
            server_config.api_keys.len()
        );
    }
    if !server_config.allowed_origins.is_empty() {
        println!(
            "   🌐 CORS origins: {}",
            server_config.allowed_origins.join(", ")
        );
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    if config.uses_dev_encryption_key() {
        println!("   ⚠️  {} not set, using the development key", ENCRYPTION_KEY_ENV);
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt, config)?;

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("Static directory path must be valid UTF-8"))
        .transpose()?;
    haven_server::serve(db, host, port, static_dir_str, server_config, config).await?;

    Ok(())
}
