//! Outbound calls: messages, chat actions, command menu.

use super::TelegramChannel;
use recap_core::error::RecapError;
use tracing::{debug, info, warn};

/// Telegram's hard limit on message length.
const MAX_MESSAGE_LEN: usize = 4096;

/// Commands shown in the client's autocomplete menu.
pub(crate) const BOT_COMMANDS: &[(&str, &str)] = &[
    ("start", "Приветствие"),
    ("help", "Список команд"),
    ("summary", "Резюме разговора за N часов"),
    ("stats", "Статистика сообщений"),
    ("top", "Рейтинг матерщинников"),
    ("mystats", "Моя статистика мата"),
    ("quiz", "Викторина: кто это сказал?"),
    ("answer", "Ответ на викторину"),
    ("quiztop", "Рейтинг викторины"),
    ("ball", "Магический шар"),
    ("who", "Кто из чата?"),
    ("rate", "Оценить что-нибудь"),
];

impl TelegramChannel {
    /// Send a text message to a specific chat.
    ///
    /// Long texts are split; a chunk Telegram cannot parse as Markdown is
    /// resent as plain text. Stops at the first chunk Telegram rejects.
    pub(crate) async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), RecapError> {
        for chunk in split_message(text, MAX_MESSAGE_LEN) {
            let url = format!("{}/sendMessage", self.base_url);
            let body = serde_json::json!({
                "chat_id": chat_id,
                "text": chunk,
                "parse_mode": "Markdown",
            });

            let resp = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| RecapError::Channel(format!("telegram send failed: {e}")))?;

            let status = resp.status();
            if status.is_success() {
                continue;
            }
            let error_text = resp.text().await.unwrap_or_default();
            if !error_text.contains("can't parse entities") {
                return Err(RecapError::Channel(format!(
                    "telegram send failed ({status}): {error_text}"
                )));
            }

            debug!("Markdown parse failed, retrying as plain text");
            let plain_body = serde_json::json!({
                "chat_id": chat_id,
                "text": chunk,
            });
            let plain_resp = self
                .client
                .post(&url)
                .json(&plain_body)
                .send()
                .await
                .map_err(|e| RecapError::Channel(format!("telegram send (plain) failed: {e}")))?;

            let plain_status = plain_resp.status();
            if !plain_status.is_success() {
                let plain_err = plain_resp.text().await.unwrap_or_default();
                return Err(RecapError::Channel(format!(
                    "telegram send (plain fallback) failed ({plain_status}): {plain_err}"
                )));
            }
        }

        Ok(())
    }

    /// Register bot commands with Telegram so users see an autocomplete menu.
    /// Best-effort: logs failures but does not propagate errors.
    pub(crate) async fn register_commands(&self) {
        let commands: Vec<serde_json::Value> = BOT_COMMANDS
            .iter()
            .map(|(command, description)| {
                serde_json::json!({ "command": command, "description": description })
            })
            .collect();
        let body = serde_json::json!({ "commands": commands });

        let url = format!("{}/setMyCommands", self.base_url);
        match self.client.post(&url).json(&body).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("registered Telegram bot commands");
            }
            Ok(resp) => {
                let body = resp.text().await.unwrap_or_default();
                warn!("failed to register Telegram bot commands: {body}");
            }
            Err(e) => {
                warn!("failed to register Telegram bot commands: {e}");
            }
        }
    }

    /// Send a chat action (e.g. "typing") to a chat.
    pub(crate) async fn send_chat_action(
        &self,
        chat_id: i64,
        action: &str,
    ) -> Result<(), RecapError> {
        let url = format!("{}/sendChatAction", self.base_url);
        let body = serde_json::json!({
            "chat_id": chat_id,
            "action": action,
        });

        self.client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RecapError::Channel(format!("telegram sendChatAction failed: {e}")))?;

        Ok(())
    }
}

/// Split a long message into chunks that respect Telegram's limit.
///
/// `max_len` counts bytes; chunks break after a newline when possible and
/// never inside a UTF-8 character.
pub(crate) fn split_message(text: &str, max_len: usize) -> Vec<&str> {
    if text.len() <= max_len {
        return vec![text];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + max_len).min(text.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        let break_at = if end < text.len() {
            text[start..end]
                .rfind('\n')
                .map(|i| start + i + 1)
                .unwrap_or(end)
        } else {
            end
        };
        chunks.push(&text[start..break_at]);
        start = break_at;
    }

    chunks
}
