//! Chat-scoped message log: save, windowed reads, quiz sampling, retention.

use super::{Store, CHAT_SCOPE};
use crate::models::{from_db_timestamp, to_db_timestamp, ChatMessage, Message, LEGACY_CHAT_ID};
use chrono::{DateTime, Duration, Utc};
use recap_core::error::RecapError;
use tracing::debug;

/// Minimum length (in characters) of a message usable as a quiz question.
const QUIZ_MIN_CHARS: i64 = 20;

type MessageRow = (i64, i64, i64, Option<String>, String, String);

/// Stored form of `now - age`. Saturates at the earliest representable time.
fn cutoff_before_now(age: Duration) -> String {
    to_db_timestamp(
        Utc::now()
            .checked_sub_signed(age)
            .unwrap_or(DateTime::<Utc>::MIN_UTC),
    )
}

fn row_to_message(row: MessageRow) -> Result<Message, RecapError> {
    let (id, chat_id, user_id, username, message_text, timestamp) = row;
    Ok(Message {
        id,
        chat_id,
        user_id,
        username,
        message_text,
        timestamp: from_db_timestamp(&timestamp)?,
    })
}

impl Store {
    /// Persist one message. `timestamp` defaults to now.
    ///
    /// Returns the id of the new row.
    pub async fn save(
        &self,
        user_id: i64,
        username: Option<&str>,
        text: &str,
        chat_id: i64,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<i64, RecapError> {
        let ts = to_db_timestamp(timestamp.unwrap_or_else(Utc::now));

        let result = sqlx::query(
            "INSERT INTO messages (chat_id, user_id, username, message_text, timestamp) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(chat_id)
        .bind(user_id)
        .bind(username)
        .bind(text)
        .bind(&ts)
        .execute(&self.pool)
        .await
        .map_err(|e| RecapError::Memory(format!("insert message failed: {e}")))?;

        Ok(result.last_insert_rowid())
    }

    /// Messages from the last `hours` in `chat_id` (plus legacy rows),
    /// oldest first.
    pub async fn messages_since(
        &self,
        chat_id: i64,
        hours: u32,
    ) -> Result<Vec<ChatMessage>, RecapError> {
        if hours == 0 {
            return Err(RecapError::Validation(
                "window must be at least one hour".into(),
            ));
        }
        let cutoff = cutoff_before_now(Duration::hours(i64::from(hours)));

        let rows: Vec<MessageRow> = sqlx::query_as(&format!(
            "SELECT id, chat_id, user_id, username, message_text, timestamp \
             FROM messages \
             WHERE timestamp >= ? AND {CHAT_SCOPE} \
             ORDER BY timestamp ASC, id ASC"
        ))
        .bind(&cutoff)
        .bind(chat_id)
        .bind(LEGACY_CHAT_ID)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RecapError::Memory(format!("query messages failed: {e}")))?;

        rows.into_iter()
            .map(|row| row_to_message(row).map(ChatMessage::from))
            .collect()
    }

    /// Total stored messages, optionally scoped to a chat (legacy rows included).
    pub async fn count(&self, chat_id: Option<i64>) -> Result<i64, RecapError> {
        let (count,): (i64,) = match chat_id {
            Some(chat_id) => {
                sqlx::query_as::<_, (i64,)>(&format!(
                    "SELECT COUNT(*) FROM messages WHERE {CHAT_SCOPE}"
                ))
                .bind(chat_id)
                .bind(LEGACY_CHAT_ID)
                .fetch_one(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM messages")
                    .fetch_one(&self.pool)
                    .await
            }
        }
        .map_err(|e| RecapError::Memory(format!("count messages failed: {e}")))?;

        Ok(count)
    }

    /// Messages in scope written during the last `hours`.
    pub async fn count_since(&self, chat_id: i64, hours: u32) -> Result<i64, RecapError> {
        let cutoff = cutoff_before_now(Duration::hours(i64::from(hours)));

        let (count,): (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM messages WHERE timestamp >= ? AND {CHAT_SCOPE}"
        ))
        .bind(&cutoff)
        .bind(chat_id)
        .bind(LEGACY_CHAT_ID)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RecapError::Memory(format!("count messages failed: {e}")))?;

        Ok(count)
    }

    /// Distinct non-empty usernames seen in scope. Order is unspecified.
    pub async fn participants(&self, chat_id: i64) -> Result<Vec<String>, RecapError> {
        let rows: Vec<(String,)> = sqlx::query_as(&format!(
            "SELECT DISTINCT username FROM messages \
             WHERE {CHAT_SCOPE} AND username IS NOT NULL AND username != ''"
        ))
        .bind(chat_id)
        .bind(LEGACY_CHAT_ID)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RecapError::Memory(format!("query participants failed: {e}")))?;

        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// One uniformly chosen message in scope that is long enough and not a command.
    pub async fn random_sample_for_quiz(
        &self,
        chat_id: i64,
    ) -> Result<Option<ChatMessage>, RecapError> {
        let row: Option<MessageRow> = sqlx::query_as(&format!(
            "SELECT id, chat_id, user_id, username, message_text, timestamp \
             FROM messages \
             WHERE {CHAT_SCOPE} \
             AND length(message_text) >= ? \
             AND substr(message_text, 1, 1) != '/' \
             ORDER BY RANDOM() LIMIT 1"
        ))
        .bind(chat_id)
        .bind(LEGACY_CHAT_ID)
        .bind(QUIZ_MIN_CHARS)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RecapError::Memory(format!("quiz sample failed: {e}")))?;

        row.map(|row| row_to_message(row).map(ChatMessage::from))
            .transpose()
    }

    /// Delete every message older than `days`. Returns the number removed.
    ///
    /// Runs in one transaction; an interrupted sweep deletes nothing.
    pub async fn cleanup(&self, days: u32) -> Result<u64, RecapError> {
        let cutoff = cutoff_before_now(Duration::days(i64::from(days)));

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RecapError::Memory(format!("begin cleanup failed: {e}")))?;

        let result = sqlx::query("DELETE FROM messages WHERE timestamp < ?")
            .bind(&cutoff)
            .execute(&mut *tx)
            .await
            .map_err(|e| RecapError::Memory(format!("cleanup failed: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| RecapError::Memory(format!("commit cleanup failed: {e}")))?;

        let deleted = result.rows_affected();
        debug!("cleanup removed {deleted} messages older than {cutoff}");
        Ok(deleted)
    }
}
