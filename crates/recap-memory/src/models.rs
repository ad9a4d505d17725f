//! Persisted records and read models.

use chrono::{DateTime, NaiveDateTime, Utc};
use recap_core::error::RecapError;
use serde::{Deserialize, Serialize};

/// Chat id of rows written before messages were scoped to chats.
///
/// Such rows are visible from every chat. This is a migration artifact, not
/// a shared scope: nothing writes new rows with this id on purpose.
pub const LEGACY_CHAT_ID: i64 = 0;

/// Storage format for timestamps (UTC). Fixed-width microseconds, so stored
/// values sort lexicographically in time order.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Whole-second form used in summary transcripts.
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a timestamp the way it is stored.
pub(crate) fn to_db_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp. Rows from older deployments may lack the fraction.
pub(crate) fn from_db_timestamp(raw: &str) -> Result<DateTime<Utc>, RecapError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| RecapError::Memory(format!("invalid timestamp '{raw}': {e}")))
}

/// One stored content event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub chat_id: i64,
    pub user_id: i64,
    pub username: Option<String>,
    pub message_text: String,
    pub timestamp: DateTime<Utc>,
}

/// Read-only projection of a [`Message`] handed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub chat_id: i64,
    pub user_id: i64,
    pub username: Option<String>,
    pub message_text: String,
    pub timestamp: DateTime<Utc>,
}

impl From<Message> for ChatMessage {
    fn from(msg: Message) -> Self {
        Self {
            chat_id: msg.chat_id,
            user_id: msg.user_id,
            username: msg.username,
            message_text: msg.message_text,
            timestamp: msg.timestamp,
        }
    }
}

impl ChatMessage {
    /// Username, or `User<id>` when none was recorded.
    pub fn display_name(&self) -> String {
        display_name(self.username.as_deref(), self.user_id)
    }

    /// One transcript line: `[YYYY-MM-DD HH:MM:SS] name: text`.
    pub fn format_for_summary(&self) -> String {
        format!(
            "[{}] {}: {}",
            self.timestamp.format(DISPLAY_FORMAT),
            self.display_name(),
            self.message_text
        )
    }
}

/// Display name fallback shared by every read path.
pub fn display_name(username: Option<&str>, user_id: i64) -> String {
    match username {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("User{user_id}"),
    }
}

/// Accumulated profanity for one user in one chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfanityStat {
    pub chat_id: i64,
    pub user_id: i64,
    pub username: String,
    pub profanity_count: i64,
    pub last_updated: DateTime<Utc>,
}

/// Trivia results for one user in one chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizScore {
    pub chat_id: i64,
    pub user_id: i64,
    pub username: String,
    pub correct_answers: i64,
    pub total_games: i64,
    pub last_played: DateTime<Utc>,
}
