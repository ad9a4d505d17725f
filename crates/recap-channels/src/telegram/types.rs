//! Telegram Bot API deserialization types.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct TgResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgUpdate {
    pub update_id: i64,
    pub message: Option<TgMessage>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub(crate) struct TgMessage {
    pub message_id: i64,
    pub from: Option<TgUser>,
    pub chat: TgChat,
    /// Unix seconds.
    #[serde(default)]
    pub date: i64,
    pub text: Option<String>,
    pub voice: Option<TgVoice>,
    pub video_note: Option<TgVideoNote>,
    pub photo: Option<Vec<TgPhotoSize>>,
    pub caption: Option<String>,
    pub forward_origin: Option<TgMessageOrigin>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub(crate) struct TgVoice {
    pub file_id: String,
    pub duration: i64,
    pub mime_type: Option<String>,
    pub file_size: Option<i64>,
}

/// Round video message.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub(crate) struct TgVideoNote {
    pub file_id: String,
    pub duration: i64,
    pub length: Option<i64>,
    pub file_size: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgFile {
    pub file_path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub(crate) struct TgPhotoSize {
    pub file_id: String,
    pub width: i64,
    pub height: i64,
    pub file_size: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub(crate) struct TgUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl TgUser {
    /// `First Last`, or just `First`.
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {last}", self.first_name),
            _ => self.first_name.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgChat {
    pub id: i64,
    /// Chat type: "private", "group", "supergroup", or "channel".
    #[serde(default, rename = "type")]
    pub chat_type: String,
    pub title: Option<String>,
}

/// Where a forwarded message originally came from.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum TgMessageOrigin {
    User { sender_user: TgUser },
    HiddenUser { sender_user_name: String },
    Chat { sender_chat: TgChat },
    Channel { chat: TgChat },
}

impl TgMessageOrigin {
    /// Human-readable name of the original author.
    pub fn display_name(&self) -> String {
        match self {
            Self::User { sender_user } => sender_user.full_name(),
            Self::HiddenUser { sender_user_name } => sender_user_name.clone(),
            Self::Chat { sender_chat: chat } | Self::Channel { chat } => chat
                .title
                .clone()
                .unwrap_or_else(|| chat.id.to_string()),
        }
    }
}
