//! Session repository for conversation persistence
//!
//! The chat-completions API is stateless, so multi-turn context is
//! carried locally: every user/assistant turn is stored here and
//! replayed into the next request.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::DbPool;
use crate::{Error, Result};

/// A conversation session
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub channel: String,
    pub channel_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A message in a session
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub session_id: String,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    fn from_str(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

/// Session repository
#[derive(Clone)]
pub struct SessionRepo {
    pool: DbPool,
}

impl SessionRepo {
    /// Create a new session repository
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Find or create a session for a channel conversation
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn find_or_create(&self, channel: &str, channel_id: &str) -> Result<Session> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let existing: Option<Session> = conn
            .query_row(
                "SELECT id, channel, channel_id, created_at, updated_at
                 FROM sessions WHERE channel = ?1 AND channel_id = ?2",
                [channel, channel_id],
                |row| {
                    Ok(Session {
                        id: row.get(0)?,
                        channel: row.get(1)?,
                        channel_id: row.get(2)?,
                        created_at: parse_datetime(&row.get::<_, String>(3)?),
                        updated_at: parse_datetime(&row.get::<_, String>(4)?),
                    })
                },
            )
            .ok();

        if let Some(session) = existing {
            return Ok(session);
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO sessions (id, channel, channel_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            [&id, channel, channel_id, &now],
        )?;

        Ok(Session {
            id,
            channel: channel.to_string(),
            channel_id: channel_id.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
    }

    /// Find a session by its id
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn find(&self, session_id: &str) -> Result<Option<Session>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let session = conn
            .query_row(
                "SELECT id, channel, channel_id, created_at, updated_at
                 FROM sessions WHERE id = ?1",
                [session_id],
                |row| {
                    Ok(Session {
                        id: row.get(0)?,
                        channel: row.get(1)?,
                        channel_id: row.get(2)?,
                        created_at: parse_datetime(&row.get::<_, String>(3)?),
                        updated_at: parse_datetime(&row.get::<_, String>(4)?),
                    })
                },
            )
            .ok();

        Ok(session)
    }

    /// List all sessions, most recently active first
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn list_all(&self) -> Result<Vec<Session>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut stmt = conn.prepare(
            "SELECT id, channel, channel_id, created_at, updated_at
             FROM sessions ORDER BY updated_at DESC",
        )?;

        let sessions = stmt
            .query_map([], |row| {
                Ok(Session {
                    id: row.get(0)?,
                    channel: row.get(1)?,
                    channel_id: row.get(2)?,
                    created_at: parse_datetime(&row.get::<_, String>(3)?),
                    updated_at: parse_datetime(&row.get::<_, String>(4)?),
                })
            })?
            .filter_map(std::result::Result::ok)
            .collect();

        Ok(sessions)
    }

    /// Add a message to a session
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn add_message(
        &self,
        session_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<Message> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let now_str = now.to_rfc3339();

        conn.execute(
            "INSERT INTO messages (id, session_id, role, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![&id, session_id, role.as_str(), content, &now_str],
        )?;

        conn.execute(
            "UPDATE sessions SET updated_at = ?1 WHERE id = ?2",
            [&now_str, session_id],
        )?;

        Ok(Message {
            id,
            session_id: session_id.to_string(),
            role,
            content: content.to_string(),
            created_at: now,
        })
    }

    /// Get the most recent messages for a session, in chronological order
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn get_messages(&self, session_id: &str, limit: usize) -> Result<Vec<Message>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut stmt = conn.prepare(
            "SELECT id, session_id, role, content, created_at
             FROM messages WHERE session_id = ?1
             ORDER BY created_at DESC LIMIT ?2",
        )?;

        #[allow(clippy::cast_possible_wrap)]
        let messages: Vec<Message> = stmt
            .query_map(rusqlite::params![session_id, limit as i64], |row| {
                Ok(Message {
                    id: row.get(0)?,
                    session_id: row.get(1)?,
                    role: MessageRole::from_str(&row.get::<_, String>(2)?)
                        .unwrap_or(MessageRole::User),
                    content: row.get(3)?,
                    created_at: parse_datetime(&row.get::<_, String>(4)?),
                })
            })?
            .filter_map(std::result::Result::ok)
            .collect();

        Ok(messages.into_iter().rev().collect())
    }

    /// Delete all messages in a session
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn clear_messages(&self, session_id: &str) -> Result<()> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        conn.execute("DELETE FROM messages WHERE session_id = ?1", [session_id])?;
        Ok(())
    }

    /// Count messages in a session
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn message_count(&self, session_id: &str) -> Result<usize> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM messages WHERE session_id = ?1",
            [session_id],
            |row| row.get(0),
        )?;

        Ok(usize::try_from(count).unwrap_or(0))
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
