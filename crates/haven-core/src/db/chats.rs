//! Companion chat sessions

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::{format_datetime, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{ChatMessage, ChatRole, ChatSession, ChatSessionSummary, DEFAULT_USER_ID};

impl Database {
    /// Get a session, creating an empty one if it does not exist yet
    pub fn get_or_create_chat_session(&self, session_id: &str) -> Result<ChatSession> {
        let conn = self.conn()?;
        let now = format_datetime(&Utc::now());

        let created = conn.execute(
            r#"
            INSERT OR IGNORE INTO chat_sessions (session_id, user_id, created_at, last_activity)
            VALUES (?, ?, ?, ?)
            "#,
            params![session_id, DEFAULT_USER_ID, now, now],
        )?;
        if created > 0 {
            debug!(session_id, "Chat session created");
        }

        self.load_session(&conn, session_id)?
            .ok_or_else(|| Error::NotFound(format!("chat session {}", session_id)))
    }

    /// Get a session with its messages, oldest message first
    pub fn get_chat_session(&self, session_id: &str) -> Result<Option<ChatSession>> {
        let conn = self.conn()?;
        self.load_session(&conn, session_id)
    }

    /// Record one user message and the assistant's reply
    ///
    /// Both messages are written in a single transaction, and the session is
    /// created if needed, so a session never holds a user turn without its reply.
    pub fn append_chat_exchange(
        &self,
        session_id: &str,
        user_message: &str,
        assistant_message: &str,
    ) -> Result<ChatSession> {
        let cipher = self.cipher();
        let mut conn = self.conn()?;
        let now = Utc::now();
        let user_at = format_datetime(&now);
        // The reply is stamped after the message it answers
        let reply_at = format_datetime(&(now + chrono::Duration::milliseconds(1)));

        let tx = conn.transaction()?;
        tx.execute(
            r#"
            INSERT OR IGNORE INTO chat_sessions (session_id, user_id, created_at, last_activity)
            VALUES (?, ?, ?, ?)
            "#,
            params![session_id, DEFAULT_USER_ID, user_at, user_at],
        )?;
        for (role, content, at) in [
            (ChatRole::User, user_message, &user_at),
            (ChatRole::Assistant, assistant_message, &reply_at),
        ] {
            tx.execute(
                "INSERT INTO chat_messages (session_id, role, content, timestamp) VALUES (?, ?, ?, ?)",
                params![session_id, role.as_str(), cipher.encrypt(content)?, at],
            )?;
        }
        tx.execute(
            "UPDATE chat_sessions SET last_activity = ? WHERE session_id = ?",
            params![reply_at, session_id],
        )?;
        tx.commit()?;

        self.load_session(&conn, session_id)?
            .ok_or_else(|| Error::NotFound(format!("chat session {}", session_id)))
    }

    /// Sessions ordered by most recent activity
    pub fn list_chat_sessions(&self, limit: i64) -> Result<Vec<ChatSessionSummary>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT s.session_id, s.created_at, s.last_activity,
                   (SELECT COUNT(*) FROM chat_messages m WHERE m.session_id = s.session_id)
            FROM chat_sessions s
            ORDER BY s.last_activity DESC, s.rowid DESC
            LIMIT ?
            "#,
        )?;

        let sessions = stmt
            .query_map(params![limit], |row| {
                let created_at: String = row.get(1)?;
                let last_activity: String = row.get(2)?;
                Ok(ChatSessionSummary {
                    session_id: row.get(0)?,
                    created_at: parse_datetime(&created_at),
                    last_activity: parse_datetime(&last_activity),
                    message_count: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(sessions)
    }

    /// Delete a session and its messages; returns whether it existed
    pub fn delete_chat_session(&self, session_id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM chat_sessions WHERE session_id = ?",
            params![session_id],
        )?;
        Ok(deleted > 0)
    }

    /// Remove every message from a session but keep the session itself
    pub fn clear_chat_history(&self, session_id: &str) -> Result<Option<ChatSession>> {
        let mut conn = self.conn()?;
        let now = format_datetime(&Utc::now());

        let tx = conn.transaction()?;
        let updated = tx.execute(
            "UPDATE chat_sessions SET last_activity = ? WHERE session_id = ?",
            params![now, session_id],
        )?;
        if updated == 0 {
            return Ok(None);
        }
        tx.execute(
            "DELETE FROM chat_messages WHERE session_id = ?",
            params![session_id],
        )?;
        tx.commit()?;

        self.load_session(&conn, session_id)
    }

    fn load_session(&self, conn: &Connection, session_id: &str) -> Result<Option<ChatSession>> {
        let session = conn
            .query_row(
                "SELECT user_id, created_at, last_activity FROM chat_sessions WHERE session_id = ?",
                params![session_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((user_id, created_at, last_activity)) = session else {
            return Ok(None);
        };

        let cipher = self.cipher();
        let mut stmt = conn.prepare(
            "SELECT role, content, timestamp FROM chat_messages WHERE session_id = ? ORDER BY id",
        )?;
        let messages = stmt
            .query_map(params![session_id], |row| {
                let role: String = row.get(0)?;
                let content: String = row.get(1)?;
                let timestamp: String = row.get(2)?;
                Ok(ChatMessage {
                    role: role.parse().map_err(|e: String| {
                        rusqlite::Error::FromSqlConversionFailure(
                            0,
                            rusqlite::types::Type::Text,
                            e.into(),
                        )
                    })?,
                    content: cipher.decrypt(&content),
                    timestamp: parse_datetime(&timestamp),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Some(ChatSession {
            session_id: session_id.to_string(),
            user_id,
            messages,
            created_at: parse_datetime(&created_at),
            last_activity: parse_datetime(&last_activity),
        }))
    }
}
