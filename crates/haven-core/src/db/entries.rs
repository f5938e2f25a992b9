//! Journal entry operations

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use super::{format_datetime, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Entry, EntryType, NewEntry, TimelinePoint, DEFAULT_USER_ID};
use crate::mood;

pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields";
pub const MISSING_CONTENT_MESSAGE: &str = "Content is required for text entries";
pub const MISSING_TRANSCRIPT_MESSAGE: &str = "Transcript is required for voice entries";

const ENTRY_COLUMNS: &str = "id, user_id, entry_type, content, transcript, mood, insight, \
                             stress_score, anxiety_score, created_at";

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn check_score(name: &str, score: Option<i64>) -> Result<Option<u8>> {
    match score {
        None => Ok(None),
        Some(s) if (0..=100).contains(&s) => Ok(Some(s as u8)),
        Some(s) => Err(Error::Validation(format!(
            "{} must be between 0 and 100 (got {})",
            name, s
        ))),
    }
}

/// A `NewEntry` that passed validation
struct ValidEntry<'a> {
    entry_type: EntryType,
    mood: &'a str,
    insight: &'a str,
    stress_score: Option<u8>,
    anxiety_score: Option<u8>,
}

fn validate(entry: &NewEntry) -> Result<ValidEntry<'_>> {
    let (entry_type, mood, insight) =
        match (entry.entry_type, present(&entry.mood), present(&entry.insight)) {
            (Some(t), Some(m), Some(i)) => (t, m, i),
            _ => return Err(Error::Validation(MISSING_FIELDS_MESSAGE.to_string())),
        };

    match entry_type {
        EntryType::Text if present(&entry.content).is_none() => {
            return Err(Error::Validation(MISSING_CONTENT_MESSAGE.to_string()))
        }
        EntryType::Voice if present(&entry.transcript).is_none() => {
            return Err(Error::Validation(MISSING_TRANSCRIPT_MESSAGE.to_string()))
        }
        _ => {}
    }

    Ok(ValidEntry {
        entry_type,
        mood,
        insight,
        stress_score: check_score("stressScore", entry.stress_score)?,
        anxiety_score: check_score("anxietyScore", entry.anxiety_score)?,
    })
}

impl Database {
    /// Validate, encrypt and store a journal entry
    pub fn create_entry(&self, entry: &NewEntry) -> Result<Entry> {
        let valid = validate(entry)?;
        let cipher = self.cipher();

        // Only the field matching the entry type is kept
        let (content, transcript) = match valid.entry_type {
            EntryType::Text => (entry.content.as_deref(), None),
            EntryType::Voice => (None, entry.transcript.as_deref()),
        };
        let user_id = present(&entry.user_id).unwrap_or(DEFAULT_USER_ID);
        let created_at = entry.created_at.unwrap_or_else(Utc::now);

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO entries (user_id, entry_type, content, transcript, mood, insight,
                                 stress_score, anxiety_score, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                valid.entry_type.as_str(),
                cipher.encrypt_opt(content)?,
                cipher.encrypt_opt(transcript)?,
                valid.mood,
                cipher.encrypt(valid.insight)?,
                valid.stress_score,
                valid.anxiety_score,
                format_datetime(&created_at),
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!(entry_id = id, entry_type = %valid.entry_type, "Entry created");

        self.get_entry(id)?
            .ok_or_else(|| Error::NotFound(format!("entry {}", id)))
    }

    /// List entries newest-first, optionally filtered by type
    pub fn list_entries(&self, entry_type: Option<EntryType>, limit: i64) -> Result<Vec<Entry>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {}
            FROM entries
            WHERE (?1 IS NULL OR entry_type = ?1)
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            "#,
            ENTRY_COLUMNS
        ))?;

        let entries = stmt
            .query_map(params![entry_type.map(|t| t.as_str()), limit], |row| {
                self.entry_from_row(row)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// The most recent `limit` entries, newest-first
    pub fn recent_entries(&self, limit: i64) -> Result<Vec<Entry>> {
        self.list_entries(None, limit)
    }

    /// Get an entry by id
    pub fn get_entry(&self, id: i64) -> Result<Option<Entry>> {
        let conn = self.conn()?;

        let entry = conn
            .query_row(
                &format!("SELECT {} FROM entries WHERE id = ?", ENTRY_COLUMNS),
                params![id],
                |row| self.entry_from_row(row),
            )
            .optional()?;

        Ok(entry)
    }

    /// Delete an entry; returns whether it existed
    pub fn delete_entry(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM entries WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }

    /// Count all entries
    pub fn count_entries(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Points for the mood chart: the latest `limit` entries, oldest-first
    pub fn mood_timeline(&self, limit: i64) -> Result<Vec<TimelinePoint>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, mood, stress_score, anxiety_score, created_at
            FROM entries
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )?;

        let mut points = stmt
            .query_map(params![limit], |row| {
                let mood: String = row.get(1)?;
                let created_at: String = row.get(4)?;
                Ok(TimelinePoint {
                    entry_id: row.get(0)?,
                    created_at: parse_datetime(&created_at),
                    valence: mood::valence(&mood),
                    mood,
                    stress_score: row.get(2)?,
                    anxiety_score: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        points.reverse();
        Ok(points)
    }

    fn entry_from_row(&self, row: &Row<'_>) -> rusqlite::Result<Entry> {
        let cipher = self.cipher();
        let entry_type: String = row.get(2)?;
        let entry_type = entry_type.parse::<EntryType>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, e.into())
        })?;
        let insight: String = row.get(6)?;
        let created_at: String = row.get(9)?;

        Ok(Entry {
            id: row.get(0)?,
            user_id: row.get(1)?,
            entry_type,
            content: cipher.decrypt_opt(row.get(3)?),
            transcript: cipher.decrypt_opt(row.get(4)?),
            mood: row.get(5)?,
            insight: cipher.decrypt(&insight),
            stress_score: row.get(7)?,
            anxiety_score: row.get(8)?,
            created_at: parse_datetime(&created_at),
        })
    }
}
