//! Append-only conversation store.

use std::str::FromStr;

use chrono::{TimeZone, Utc};
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

use crate::conversation::message::{ChatMessage, Sender};
use crate::core::errors::{AppError, AppResult};
use crate::core::ids::SessionId;
use crate::storage::StoreFuture;

/// Conversation store trait.
pub trait ConversationStore: Send + Sync {
    /// Persist a new turn and return it with its assigned id and timestamp.
    ///
    /// The write is committed before the future resolves.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn append(
        &self,
        session_id: SessionId,
        sender: Sender,
        content: String,
    ) -> StoreFuture<'_, AppResult<ChatMessage>>;

    /// Load up to `limit` most recent turns, oldest first.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn recent_turns(
        &self,
        session_id: SessionId,
        limit: usize,
    ) -> StoreFuture<'_, AppResult<Vec<ChatMessage>>>;

    /// Load every turn of a session, oldest first.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn full_history(&self, session_id: SessionId) -> StoreFuture<'_, AppResult<Vec<ChatMessage>>>;
}

type RawRow = (i64, String, String, i64);

/// `SQLite` implementation of the conversation store.
#[derive(Clone)]
pub struct SqliteConversationStore {
    conn: Connection,
}

impl SqliteConversationStore {
    /// Wrap a connection whose schema is already applied.
    #[must_use]
    pub const fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl ConversationStore for SqliteConversationStore {
    fn append(
        &self,
        session_id: SessionId,
        sender: Sender,
        content: String,
    ) -> StoreFuture<'_, AppResult<ChatMessage>> {
        Box::pin(async move {
            let session = session_id.to_string();
            let now = Utc::now().timestamp_millis();
            let stored = content.clone();
            let (id, ts) = self
                .conn
                .call(move |conn| {
                    let tx = conn.transaction()?;
                    let last: Option<i64> = tx
                        .query_row(
                            "SELECT MAX(timestamp) FROM chat_messages WHERE session_id = ?1",
                            rusqlite::params![session],
                            |row| row.get(0),
                        )
                        .optional()?
                        .flatten();
                    // Keep timestamps non-decreasing within a session even if the clock steps back.
                    let ts = last.map_or(now, |last| last.max(now));
                    tx.execute(
                        "INSERT INTO chat_messages (session_id, sender, content, timestamp)
                         VALUES (?1, ?2, ?3, ?4)",
                        rusqlite::params![session, sender.as_str(), stored, ts],
                    )?;
                    let id = tx.last_insert_rowid();
                    tx.commit()?;
                    Ok((id, ts))
                })
                .await?;

            let timestamp = decode_timestamp(ts)?;
            tracing::debug!(session = %session_id, id, sender = %sender, "chat turn stored");
            Ok(ChatMessage {
                id,
                session_id,
                sender,
                content,
                timestamp,
            })
        })
    }

    fn recent_turns(
        &self,
        session_id: SessionId,
        limit: usize,
    ) -> StoreFuture<'_, AppResult<Vec<ChatMessage>>> {
        Box::pin(async move {
            if limit == 0 {
                return Ok(Vec::new());
            }
            let session = session_id.to_string();
            let limit = i64::try_from(limit)
                .map_err(|_| AppError::Validation("limit exceeds i64".to_string()))?;
            let mut rows = self
                .conn
                .call(move |conn| {
                    let mut stmt = conn.prepare(
                        "SELECT id, sender, content, timestamp
                         FROM chat_messages
                         WHERE session_id = ?1
                         ORDER BY id DESC
                         LIMIT ?2",
                    )?;
                    let rows = stmt
                        .query_map(rusqlite::params![session, limit], read_row)?
                        .collect::<Result<Vec<_>, rusqlite::Error>>()?;
                    Ok(rows)
                })
                .await?;

            rows.reverse();
            decode_rows(&session_id, rows)
        })
    }

    fn full_history(&self, session_id: SessionId) -> StoreFuture<'_, AppResult<Vec<ChatMessage>>> {
        Box::pin(async move {
            let session = session_id.to_string();
            let rows = self
                .conn
                .call(move |conn| {
                    let mut stmt = conn.prepare(
                        "SELECT id, sender, content, timestamp
                         FROM chat_messages
                         WHERE session_id = ?1
                         ORDER BY id",
                    )?;
                    let rows = stmt
                        .query_map(rusqlite::params![session], read_row)?
                        .collect::<Result<Vec<_>, rusqlite::Error>>()?;
                    Ok(rows)
                })
                .await?;

            decode_rows(&session_id, rows)
        })
    }
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn decode_rows(session_id: &SessionId, rows: Vec<RawRow>) -> AppResult<Vec<ChatMessage>> {
    rows.into_iter()
        .map(|(id, sender, content, ts)| {
            let sender = Sender::from_str(&sender)
                .map_err(|err| AppError::CorruptRecord(format!("invalid sender: {err}")))?;
            Ok(ChatMessage {
                id,
                session_id: session_id.clone(),
                sender,
                content,
                timestamp: decode_timestamp(ts)?,
            })
        })
        .collect()
}

fn decode_timestamp(ts: i64) -> AppResult<chrono::DateTime<Utc>> {
    Utc.timestamp_millis_opt(ts)
        .single()
        .ok_or_else(|| AppError::CorruptRecord("invalid timestamp".to_string()))
}
