//! Long-polling update loop and Channel trait implementation.

use super::types::{TgFile, TgMessage, TgResponse, TgUpdate};
use super::TelegramChannel;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use recap_core::{
    error::RecapError,
    message::{Attachment, AttachmentType, IncomingMessage, OutgoingMessage},
    traits::Channel,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// What an update carries, before any download.
#[derive(Debug, PartialEq)]
pub(crate) enum Content {
    Text(String),
    /// Voice message or video note, identified by Telegram file id.
    Speech {
        file_id: String,
        kind: AttachmentType,
    },
    Photo {
        caption: Option<String>,
    },
}

/// Classify a message. Other kinds (stickers, documents, ...) yield `None`.
pub(crate) fn classify(msg: &TgMessage) -> Option<Content> {
    if let Some(text) = &msg.text {
        return Some(Content::Text(text.clone()));
    }
    if let Some(voice) = &msg.voice {
        return Some(Content::Speech {
            file_id: voice.file_id.clone(),
            kind: AttachmentType::Audio,
        });
    }
    if let Some(note) = &msg.video_note {
        return Some(Content::Speech {
            file_id: note.file_id.clone(),
            kind: AttachmentType::Video,
        });
    }
    if msg.photo.as_ref().is_some_and(|p| !p.is_empty()) {
        return Some(Content::Photo {
            caption: msg.caption.clone(),
        });
    }
    None
}

/// Build the channel-neutral event. `None` when the sender is unknown.
pub(crate) fn build_incoming(
    msg: TgMessage,
    text: String,
    attachments: Vec<Attachment>,
) -> Option<IncomingMessage> {
    let user = msg.from?;
    let is_group = matches!(msg.chat.chat_type.as_str(), "group" | "supergroup");
    let timestamp = DateTime::<Utc>::from_timestamp(msg.date, 0)
        .filter(|_| msg.date > 0)
        .unwrap_or_else(Utc::now);

    Some(IncomingMessage {
        id: Uuid::new_v4(),
        channel: "telegram".to_string(),
        chat_id: msg.chat.id,
        user_id: user.id,
        username: user.username.filter(|u| !u.is_empty()),
        text,
        timestamp,
        attachments,
        forwarded_from: msg.forward_origin.as_ref().map(|o| o.display_name()),
        is_group,
    })
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingMessage>, RecapError> {
        self.register_commands().await;

        let (tx, rx) = mpsc::channel(64);
        let client = self.client.clone();
        let base_url = self.base_url.clone();
        let bot_token = self.config.bot_token.clone();
        let last_update_id = self.last_update_id.clone();

        info!("Telegram channel starting long polling...");

        tokio::spawn(async move {
            let mut backoff_secs: u64 = 1;

            loop {
                let last = last_update_id.lock().await;
                let offset = last.map(|id| id + 1);
                drop(last);

                let mut url = format!("{base_url}/getUpdates?timeout=30");
                if let Some(off) = offset {
                    url.push_str(&format!("&offset={off}"));
                }

                let resp = match client
                    .get(&url)
                    .timeout(std::time::Duration::from_secs(35))
                    .send()
                    .await
                {
                    Ok(r) => r,
                    Err(e) => {
                        error!("telegram poll error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                let body: TgResponse<Vec<TgUpdate>> = match resp.json().await {
                    Ok(b) => b,
                    Err(e) => {
                        error!("telegram parse error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                if !body.ok {
                    error!(
                        "telegram API error (retry in {backoff_secs}s): {}",
                        body.description.unwrap_or_default()
                    );
                    tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                    backoff_secs = (backoff_secs * 2).min(60);
                    continue;
                }

                // Successful poll: reset backoff.
                backoff_secs = 1;

                let updates = body.result.unwrap_or_default();

                if let Some(last_update) = updates.last() {
                    *last_update_id.lock().await = Some(last_update.update_id);
                }

                for update in updates {
                    let Some(msg) = update.message else {
                        continue;
                    };
                    let Some(content) = classify(&msg) else {
                        continue;
                    };

                    let (text, attachments) = match content {
                        Content::Text(text) => (text, Vec::new()),
                        Content::Speech { file_id, kind } => {
                            match download_telegram_file(&client, &base_url, &bot_token, &file_id)
                                .await
                            {
                                Ok(bytes) => {
                                    let ext = if kind == AttachmentType::Video { "mp4" } else { "ogg" };
                                    debug!("downloaded {kind:?} ({} bytes)", bytes.len());
                                    let attachment = Attachment {
                                        file_type: kind,
                                        data: Some(bytes),
                                        filename: Some(format!("{}.{ext}", Uuid::new_v4())),
                                    };
                                    (String::new(), vec![attachment])
                                }
                                Err(e) => {
                                    warn!("{kind:?} download failed: {e}");
                                    continue;
                                }
                            }
                        }
                        Content::Photo { caption } => {
                            let attachment = Attachment {
                                file_type: AttachmentType::Image,
                                data: None,
                                filename: None,
                            };
                            (caption.unwrap_or_default(), vec![attachment])
                        }
                    };

                    let Some(incoming) = build_incoming(msg, text, attachments) else {
                        continue;
                    };

                    if tx.send(incoming).await.is_err() {
                        info!("telegram channel receiver dropped, stopping poll");
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn send(&self, message: OutgoingMessage) -> Result<(), RecapError> {
        self.send_message(message.chat_id, &message.text).await
    }

    async fn send_typing(&self, chat_id: i64) -> Result<(), RecapError> {
        self.send_chat_action(chat_id, "typing").await
    }

    async fn stop(&self) -> Result<(), RecapError> {
        info!("Telegram channel stopped");
        Ok(())
    }
}

/// Download a file from Telegram servers by file_id.
async fn download_telegram_file(
    client: &reqwest::Client,
    base_url: &str,
    bot_token: &str,
    file_id: &str,
) -> Result<Vec<u8>, RecapError> {
    // Step 1: getFile to obtain file_path.
    let url = format!("{base_url}/getFile?file_id={file_id}");
    let resp: TgResponse<TgFile> = client
        .get(&url)
        .send()
        .await
        .map_err(|e| RecapError::Channel(format!("telegram getFile failed: {e}")))?
        .json()
        .await
        .map_err(|e| RecapError::Channel(format!("telegram getFile parse failed: {e}")))?;

    let file_path = resp
        .result
        .and_then(|f| f.file_path)
        .ok_or_else(|| RecapError::Channel("telegram getFile returned no file_path".into()))?;

    // Step 2: Download the actual file bytes.
    let download_url = format!("https://api.telegram.org/file/bot{bot_token}/{file_path}");
    let bytes = client
        .get(&download_url)
        .send()
        .await
        .map_err(|e| RecapError::Channel(format!("telegram file download failed: {e}")))?
        .bytes()
        .await
        .map_err(|e| RecapError::Channel(format!("telegram file read failed: {e}")))?;

    Ok(bytes.to_vec())
}
