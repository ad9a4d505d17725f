//! # recap-providers
//!
//! Text-generation provider implementations for Recap.

pub mod anthropic;
pub mod openai;
pub mod retry;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;
pub use retry::{RetryPolicy, RetryingProvider};
