//! Per-chat, per-user aggregates: profanity counters and quiz scores.
//!
//! Every write is a single `INSERT ... ON CONFLICT DO UPDATE`, so concurrent
//! increments for the same key never lose updates.

use super::Store;
use crate::models::{from_db_timestamp, to_db_timestamp, ProfanityStat, QuizScore};
use chrono::Utc;
use recap_core::error::RecapError;

impl Store {
    /// Add `count` to the user's profanity counter in this chat.
    ///
    /// A zero count is a no-op and never creates a row.
    pub async fn increment_profanity(
        &self,
        user_id: i64,
        username: &str,
        chat_id: i64,
        count: u32,
    ) -> Result<(), RecapError> {
        if count == 0 {
            return Ok(());
        }
        let now = to_db_timestamp(Utc::now());

        sqlx::query(
            "INSERT INTO profanity_stats (chat_id, user_id, username, profanity_count, last_updated) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(chat_id, user_id) DO UPDATE SET \
                 profanity_count = profanity_count + excluded.profanity_count, \
                 username = excluded.username, \
                 last_updated = excluded.last_updated",
        )
        .bind(chat_id)
        .bind(user_id)
        .bind(username)
        .bind(i64::from(count))
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| RecapError::Memory(format!("profanity upsert failed: {e}")))?;

        Ok(())
    }

    /// Top offenders in a chat, highest count first. Ties keep insertion order.
    pub async fn profanity_leaderboard(
        &self,
        chat_id: i64,
        limit: u32,
    ) -> Result<Vec<ProfanityStat>, RecapError> {
        let rows: Vec<(i64, i64, String, i64, String)> = sqlx::query_as(
            "SELECT chat_id, user_id, username, profanity_count, last_updated \
             FROM profanity_stats WHERE chat_id = ? \
             ORDER BY profanity_count DESC, id ASC LIMIT ?",
        )
        .bind(chat_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RecapError::Memory(format!("profanity leaderboard failed: {e}")))?;

        rows.into_iter()
            .map(|(chat_id, user_id, username, profanity_count, last_updated)| {
                Ok(ProfanityStat {
                    chat_id,
                    user_id,
                    username,
                    profanity_count,
                    last_updated: from_db_timestamp(&last_updated)?,
                })
            })
            .collect()
    }

    /// The user's profanity counter in this chat, 0 when absent.
    pub async fn user_profanity_count(
        &self,
        user_id: i64,
        chat_id: i64,
    ) -> Result<i64, RecapError> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT profanity_count FROM profanity_stats WHERE chat_id = ? AND user_id = ?",
        )
        .bind(chat_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RecapError::Memory(format!("profanity lookup failed: {e}")))?;

        Ok(row.map(|(count,)| count).unwrap_or(0))
    }

    /// Record one finished quiz round for a user.
    pub async fn record_quiz_result(
        &self,
        user_id: i64,
        username: &str,
        chat_id: i64,
        correct: bool,
    ) -> Result<(), RecapError> {
        let now = to_db_timestamp(Utc::now());

        sqlx::query(
            "INSERT INTO quiz_scores (chat_id, user_id, username, correct_answers, total_games, last_played) \
             VALUES (?, ?, ?, ?, 1, ?) \
             ON CONFLICT(chat_id, user_id) DO UPDATE SET \
                 correct_answers = correct_answers + excluded.correct_answers, \
                 total_games = total_games + 1, \
                 username = excluded.username, \
                 last_played = excluded.last_played",
        )
        .bind(chat_id)
        .bind(user_id)
        .bind(username)
        .bind(i64::from(correct))
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| RecapError::Memory(format!("quiz upsert failed: {e}")))?;

        Ok(())
    }

    /// Best quiz players in a chat, most correct answers first.
    pub async fn quiz_leaderboard(
        &self,
        chat_id: i64,
        limit: u32,
    ) -> Result<Vec<QuizScore>, RecapError> {
        let rows: Vec<(i64, i64, String, i64, i64, String)> = sqlx::query_as(
            "SELECT chat_id, user_id, username, correct_answers, total_games, last_played \
             FROM quiz_scores WHERE chat_id = ? \
             ORDER BY correct_answers DESC, id ASC LIMIT ?",
        )
        .bind(chat_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RecapError::Memory(format!("quiz leaderboard failed: {e}")))?;

        rows.into_iter()
            .map(
                |(chat_id, user_id, username, correct_answers, total_games, last_played)| {
                    Ok(QuizScore {
                        chat_id,
                        user_id,
                        username,
                        correct_answers,
                        total_games,
                        last_played: from_db_timestamp(&last_played)?,
                    })
                },
            )
            .collect()
    }
}
