//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `entries` - Journal entry CRUD and the mood timeline
//! - `chats` - Companion chat sessions and their messages
//! - `audit` - Audit log of API access
//!
//! Free-text entry fields (`content`, `transcript`, `insight`) are encrypted
//! with the field cipher before they reach SQL, on top of SQLCipher's
//! whole-file encryption when a database key is configured.

use chrono::{DateTime, SecondsFormat, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::config::{Config, DB_KEY_ENV};
use crate::crypto::FieldCipher;
use crate::error::{Error, Result};

mod audit;
mod chats;
mod entries;

pub use entries::{MISSING_CONTENT_MESSAGE, MISSING_FIELDS_MESSAGE, MISSING_TRANSCRIPT_MESSAGE};

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Field passphrase used by `in_memory()` test databases
const TEST_FIELD_KEY: &str = "haven-test-field-key";

/// Derive an encryption key from a passphrase using Argon2
///
/// Uses a fixed application salt so the same passphrase always produces the same key,
/// regardless of database path. This allows moving/renaming/restoring the database freely.
fn derive_key(passphrase: &str) -> Result<String> {
    use argon2::{password_hash::SaltString, Argon2, PasswordHasher};

    // Fixed application salt - changing this would invalidate all existing encrypted databases
    const APP_SALT: &[u8; 16] = b"haven-salt-v1-db";

    let salt = SaltString::encode_b64(APP_SALT)
        .map_err(|e| Error::Encryption(format!("Failed to create salt: {}", e)))?;

    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| Error::Encryption(format!("Failed to derive key: {}", e)))?;

    // Extract the hash portion for use as SQLCipher key (hex encoded)
    let hash_str = hash
        .hash
        .ok_or_else(|| Error::Encryption("No hash output".to_string()))?;
    Ok(hex::encode(hash_str.as_bytes()))
}

/// Format a timestamp the way it is stored (RFC 3339, millisecond precision, `Z`)
///
/// The fixed width keeps lexicographic order equal to chronological order.
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // SQLite CURRENT_TIMESTAMP format
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|dt| dt.and_utc())
        })
        .unwrap_or_else(|_| Utc::now())
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
    /// Whether SQLCipher was keyed for this pool
    encrypted: bool,
    cipher: FieldCipher,
}

impl Database {
    /// Open the database described by `config`
    ///
    /// Requires `config.db_key` (from `HAVEN_DB_KEY`). The database will be
    /// encrypted using SQLCipher with a key derived from the passphrase via
    /// Argon2. Use `new_unencrypted()` for development/testing without it.
    pub fn new(path: &str, config: &Config) -> Result<Self> {
        match config.db_key.as_deref() {
            Some(key) => Self::new_with_key(path, Some(key), &config.encryption_key),
            None => Err(Error::Encryption(format!(
                "Database encryption required. Set {} environment variable with your passphrase, \
                or use --no-encrypt for unencrypted databases (not recommended for production).",
                DB_KEY_ENV
            ))),
        }
    }

    /// Create a new database without SQLCipher
    ///
    /// Entry text fields are still encrypted with `field_key`.
    pub fn new_unencrypted(path: &str, field_key: &str) -> Result<Self> {
        Self::new_with_key(path, None, field_key)
    }

    /// Create a new database with an explicit SQLCipher passphrase and field key
    pub fn new_with_key(path: &str, passphrase: Option<&str>, field_key: &str) -> Result<Self> {
        let key_pragma = passphrase
            .map(derive_key)
            .transpose()?
            .map(|key| format!("PRAGMA key = 'x\"{}\"';", key));

        // Use with_init so every pooled connection gets the key and foreign keys
        let manager = SqliteConnectionManager::file(path).with_init(move |conn| {
            if let Some(ref pragma) = key_pragma {
                conn.execute_batch(pragma)?;
            }
            // foreign_keys is per-connection; chat_messages relies on ON DELETE CASCADE
            conn.execute_batch("PRAGMA foreign_keys = ON;")
        });

        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
            encrypted: passphrase.is_some(),
            cipher: FieldCipher::from_passphrase(field_key)?,
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create an in-memory database (for testing)
    ///
    /// Note: Uses a temporary file rather than `:memory:` because SQLCipher
    /// has issues with in-memory databases in the connection pool.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "haven_test_{}_{}.db",
            std::process::id(),
            id
        ));
        let path = path.to_string_lossy().into_owned();

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::new_unencrypted(&path, TEST_FIELD_KEY)
    }

    /// Check if the database is encrypted
    pub fn is_encrypted(&self) -> Result<bool> {
        let conn = self.conn()?;
        // SQLCipher sets cipher_version if encryption is active
        let result: rusqlite::Result<String> =
            conn.query_row("PRAGMA cipher_version;", [], |row| row.get(0));
        Ok(result.is_ok() && self.encrypted)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Field cipher used for entry text
    pub fn cipher(&self) -> &FieldCipher {
        &self.cipher
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- Enable foreign keys
            PRAGMA foreign_keys = ON;

            -- WAL mode: readers don't block writers
            -- Note: creates -wal and -shm sidecar files alongside the database
            PRAGMA journal_mode = WAL;

            -- Cache size: ~8MB (2000 pages * 4KB default page size)
            PRAGMA cache_size = 2000;

            -- Synchronous NORMAL: safe for most power-loss scenarios in WAL mode
            PRAGMA synchronous = NORMAL;

            PRAGMA temp_store = MEMORY;

            -- Journal entries
            -- content/transcript/insight hold field-encrypted text (enc:v1:...)
            CREATE TABLE IF NOT EXISTS entries (
                id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL DEFAULT 'default-user',
                entry_type TEXT NOT NULL CHECK (entry_type IN ('text', 'voice')),
                content TEXT,
                transcript TEXT,
                mood TEXT NOT NULL,
                insight TEXT NOT NULL,
                stress_score INTEGER CHECK (stress_score BETWEEN 0 AND 100),
                anxiety_score INTEGER CHECK (anxiety_score BETWEEN 0 AND 100),
                created_at TEXT NOT NULL                   -- RFC 3339, millisecond precision
            );

            CREATE INDEX IF NOT EXISTS idx_entries_created ON entries(created_at DESC, id DESC);
            CREATE INDEX IF NOT EXISTS idx_entries_type ON entries(entry_type);

            -- Companion chat sessions, keyed by client-chosen session id
            CREATE TABLE IF NOT EXISTS chat_sessions (
                session_id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL DEFAULT 'default-user',
                created_at TEXT NOT NULL,
                last_activity TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_chat_sessions_activity ON chat_sessions(last_activity DESC);

            CREATE TABLE IF NOT EXISTS chat_messages (
                id INTEGER PRIMARY KEY,
                session_id TEXT NOT NULL REFERENCES chat_sessions(session_id) ON DELETE CASCADE,
                role TEXT NOT NULL CHECK (role IN ('user', 'assistant')),
                content TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_chat_messages_session ON chat_messages(session_id, id);

            -- Audit log (tracks API access)
            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY,
                timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
                actor TEXT NOT NULL,
                action TEXT NOT NULL,
                entity_type TEXT,
                entity_id INTEGER,
                details TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_audit_log_actor ON audit_log(actor);
            CREATE INDEX IF NOT EXISTS idx_audit_log_timestamp ON audit_log(timestamp);
            CREATE INDEX IF NOT EXISTS idx_audit_log_action ON audit_log(action);
            "#,
        )?;

        info!("Database schema initialized");
        Ok(())
    }
}

/// Audit log entry
#[derive(Debug, Clone, serde::Serialize)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: String,
    pub actor: String,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
    pub details: Option<String>,
}
