//! # recap-channels
//!
//! Telegram integration and speech-to-text for Recap.

pub mod telegram;
pub mod whisper;

pub use telegram::TelegramChannel;
pub use whisper::WhisperTranscriber;
