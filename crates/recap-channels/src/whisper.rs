//! Whisper-compatible speech-to-text for voice messages and video notes.

use async_trait::async_trait;
use recap_core::{
    config::TranscriptionConfig, error::RecapError, message::AttachmentType, traits::Transcriber,
};
use serde::Deserialize;
use tracing::{info, warn};

/// Whisper API response.
#[derive(Deserialize)]
struct WhisperResponse {
    text: String,
}

/// Transcriber backed by an OpenAI-compatible `/audio/transcriptions` endpoint.
pub struct WhisperTranscriber {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    language: String,
}

impl WhisperTranscriber {
    pub fn new(config: &TranscriptionConfig, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_key,
            model: config.model.clone(),
            language: config.language.clone(),
        }
    }

    async fn request(&self, data: &[u8], kind: AttachmentType) -> Result<String, RecapError> {
        let (file_name, mime) = upload_format(kind);
        let part = reqwest::multipart::Part::bytes(data.to_vec())
            .file_name(file_name)
            .mime_str(mime)
            .map_err(|e| RecapError::Channel(format!("whisper mime error: {e}")))?;

        let mut form = reqwest::multipart::Form::new()
            .text("model", self.model.clone())
            .part("file", part);
        if !self.language.is_empty() {
            form = form.text("language", self.language.clone());
        }

        let url = format!(
            "{}/audio/transcriptions",
            self.base_url.trim_end_matches('/')
        );
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| RecapError::Channel(format!("whisper request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(RecapError::Channel(format!(
                "whisper API error {status}: {body}"
            )));
        }

        let result: WhisperResponse = resp
            .json()
            .await
            .map_err(|e| RecapError::Channel(format!("whisper response parse failed: {e}")))?;

        Ok(result.text)
    }
}

/// Upload file name and MIME type for a speech attachment.
fn upload_format(kind: AttachmentType) -> (&'static str, &'static str) {
    match kind {
        AttachmentType::Video => ("video_note.mp4", "video/mp4"),
        _ => ("voice.ogg", "audio/ogg"),
    }
}

/// Trimmed transcript, `None` when nothing was recognized.
fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    fn name(&self) -> &str {
        "whisper"
    }

    async fn transcribe(&self, data: &[u8], kind: AttachmentType) -> Option<String> {
        if data.is_empty() {
            return None;
        }
        match self.request(data, kind).await {
            Ok(text) => {
                let text = non_empty(text);
                if text.is_some() {
                    info!("transcribed {kind:?} ({} bytes)", data.len());
                } else {
                    warn!("whisper returned an empty transcript for {kind:?}");
                }
                text
            }
            Err(e) => {
                warn!("{kind:?} transcription failed: {e}");
                None
            }
        }
    }
}
