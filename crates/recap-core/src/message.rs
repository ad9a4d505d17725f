use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An incoming event from a chat channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub id: Uuid,
    /// Channel name (e.g. "telegram").
    pub channel: String,
    /// Platform chat identifier. Group chats are negative on Telegram.
    pub chat_id: i64,
    /// Platform user identifier of the sender.
    pub user_id: i64,
    /// Platform handle of the sender, without the leading `@`.
    pub username: Option<String>,
    /// Message text or caption. Empty for bare voice/video events.
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub attachments: Vec<Attachment>,
    /// Display name of the original author when the message was forwarded.
    #[serde(default)]
    pub forwarded_from: Option<String>,
    /// Whether this message comes from a group chat.
    #[serde(default)]
    pub is_group: bool,
}

impl IncomingMessage {
    /// Whether the message text is a bot command.
    pub fn is_command(&self) -> bool {
        self.text.starts_with('/')
    }
}

/// An outgoing message to send back through a channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    /// Platform chat to deliver to.
    pub chat_id: i64,
}

impl OutgoingMessage {
    pub fn new(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            chat_id,
        }
    }
}

/// A file attachment on a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub file_type: AttachmentType,
    pub data: Option<Vec<u8>>,
    pub filename: Option<String>,
}

/// Supported attachment types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachmentType {
    Image,
    /// Voice message (OGG/Opus).
    Audio,
    /// Round video note (MP4).
    Video,
    Other,
}

impl AttachmentType {
    /// Whether the attachment carries speech that can be transcribed.
    pub fn is_speech(&self) -> bool {
        matches!(self, Self::Audio | Self::Video)
    }
}
