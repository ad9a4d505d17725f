//! Inbound content pipeline: turn an event into stored text and stats.

use crate::replies::PHOTO_PLACEHOLDER;
use recap_core::{
    error::RecapError,
    message::{AttachmentType, IncomingMessage},
    profanity::count_profanity,
    traits::Transcriber,
};
use recap_memory::Store;
use tracing::{debug, warn};

/// Text to store for an event, or `None` when there is nothing to keep.
///
/// Speech is transcribed; photos fall back to a placeholder; commands and
/// blank text are dropped.
pub(super) async fn extract_text(
    incoming: &IncomingMessage,
    transcriber: Option<&dyn Transcriber>,
) -> Option<String> {
    let speech = incoming
        .attachments
        .iter()
        .find(|a| a.file_type.is_speech());
    if let Some(attachment) = speech {
        let Some(transcriber) = transcriber else {
            debug!("skipping {:?} (transcription disabled)", attachment.file_type);
            return None;
        };
        let data = attachment.data.as_deref()?;
        return transcriber.transcribe(data, attachment.file_type).await;
    }

    let has_photo = incoming
        .attachments
        .iter()
        .any(|a| a.file_type == AttachmentType::Image);
    let text = incoming.text.trim();
    if has_photo && text.is_empty() {
        return Some(PHOTO_PLACEHOLDER.to_string());
    }

    if text.is_empty() || incoming.is_command() {
        return None;
    }
    Some(incoming.text.clone())
}

/// Prefix forwarded content with its original author.
pub(super) fn with_forward_prefix(text: &str, forwarded_from: Option<&str>) -> String {
    match forwarded_from {
        Some(name) if !name.is_empty() => format!("[Переслано от {name}] {text}"),
        _ => text.to_string(),
    }
}

/// Store one group event under `author` and count its profanity.
///
/// Returns the new message id, or `None` when nothing was stored.
pub(super) async fn ingest(
    store: &Store,
    transcriber: Option<&dyn Transcriber>,
    incoming: &IncomingMessage,
    author: &str,
) -> Result<Option<i64>, RecapError> {
    let Some(body) = extract_text(incoming, transcriber).await else {
        if incoming.attachments.iter().any(|a| a.file_type.is_speech()) {
            warn!(
                "no transcript for message from {} in chat {}",
                incoming.user_id, incoming.chat_id
            );
        }
        return Ok(None);
    };

    let text = with_forward_prefix(&body, incoming.forwarded_from.as_deref());
    let id = store
        .save(
            incoming.user_id,
            Some(author),
            &text,
            incoming.chat_id,
            Some(incoming.timestamp),
        )
        .await?;

    let hits = count_profanity(&body);
    store
        .increment_profanity(incoming.user_id, author, incoming.chat_id, hits)
        .await?;

    debug!(
        "saved message {id} from {} ({author}) in chat {}",
        incoming.user_id, incoming.chat_id
    );
    Ok(Some(id))
}
