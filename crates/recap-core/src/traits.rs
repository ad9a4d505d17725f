use crate::{
    error::RecapError,
    message::{AttachmentType, IncomingMessage, OutgoingMessage},
};
use async_trait::async_trait;

/// Text-generation provider — consumes one prompt, returns one completion.
///
/// Every AI backend (OpenAI, Anthropic, Yandex GPT, etc.) implements this
/// trait to provide a uniform interface.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Whether this provider requires an API key to function.
    fn requires_api_key(&self) -> bool;

    /// Send a single prompt and get the generated text back.
    async fn complete(&self, prompt: &str) -> Result<String, RecapError>;

    /// Check if the provider is available and ready.
    async fn is_available(&self) -> bool;
}

/// Speech-to-text backend.
///
/// Failures are reported as `None` so callers can skip the event silently.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// Transcribe raw audio or video bytes.
    async fn transcribe(&self, data: &[u8], kind: AttachmentType) -> Option<String>;
}

/// Messaging Channel trait.
///
/// Every messaging platform implements this trait to receive and send
/// messages.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Start listening for incoming messages.
    /// Returns a receiver that yields incoming messages.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<IncomingMessage>, RecapError>;

    /// Send a response back through this channel.
    async fn send(&self, message: OutgoingMessage) -> Result<(), RecapError>;

    /// Send a typing indicator to show the bot is processing.
    async fn send_typing(&self, _chat_id: i64) -> Result<(), RecapError> {
        Ok(())
    }

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), RecapError>;
}
