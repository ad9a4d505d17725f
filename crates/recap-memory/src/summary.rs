//! Summary-window contract: validate a window, export it, hand it to a provider.

use crate::models::ChatMessage;
use crate::store::Store;
use recap_core::{config::SummaryConfig, error::RecapError, traits::Provider};
use tracing::{info, warn};

/// A validated trailing window, `1..=max_hours` hours wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryWindow {
    hours: u32,
}

impl SummaryWindow {
    /// Reject windows outside `1..=max_hours`. Never clamps.
    pub fn new(hours: u32, max_hours: u32) -> Result<Self, RecapError> {
        if hours == 0 || hours > max_hours {
            return Err(RecapError::Validation(format!(
                "summary window must be within 1..={max_hours} hours, got {hours}"
            )));
        }
        Ok(Self { hours })
    }

    /// The requested window, or the configured default when none was given.
    pub fn from_config(requested: Option<u32>, config: &SummaryConfig) -> Result<Self, RecapError> {
        Self::new(requested.unwrap_or(config.default_hours), config.max_hours)
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }
}

/// Result of a summary request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// The window held fewer messages than the configured minimum.
    /// The provider was not called.
    NotEnoughData { count: usize },
    /// Provider output, passed through unmodified.
    Generated { text: String, message_count: usize },
    /// The provider failed. Carries the error text for the reply.
    Failed { error: String },
}

/// One line per message, oldest first.
pub fn format_transcript(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(ChatMessage::format_for_summary)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Instruction (with `{hours}` substituted) followed by the transcript.
pub fn build_prompt(template: &str, hours: u32, transcript: &str) -> String {
    format!(
        "{}\n\n{transcript}",
        template.replace("{hours}", &hours.to_string())
    )
}

/// Turns a window of stored messages into a provider call.
#[derive(Debug, Clone)]
pub struct Summarizer {
    min_messages: usize,
    prompt: String,
}

impl Summarizer {
    pub fn new(min_messages: usize, prompt: impl Into<String>) -> Self {
        Self {
            min_messages,
            prompt: prompt.into(),
        }
    }

    pub fn from_config(config: &SummaryConfig) -> Self {
        Self::new(config.min_messages, config.prompt.clone())
    }

    /// Summarize `window` of `chat_id`.
    ///
    /// Storage failures propagate. Provider failures become
    /// [`SummaryOutcome::Failed`].
    pub async fn summarize(
        &self,
        store: &Store,
        provider: &dyn Provider,
        chat_id: i64,
        window: SummaryWindow,
    ) -> Result<SummaryOutcome, RecapError> {
        let messages = store.messages_since(chat_id, window.hours()).await?;
        let count = messages.len();

        if count < self.min_messages {
            info!(
                "summary for chat {chat_id} skipped: {count} messages in {}h (need {})",
                window.hours(),
                self.min_messages
            );
            return Ok(SummaryOutcome::NotEnoughData { count });
        }

        let prompt = build_prompt(&self.prompt, window.hours(), &format_transcript(&messages));

        match provider.complete(&prompt).await {
            Ok(text) => {
                info!(
                    "summary for chat {chat_id}: {count} messages via {}",
                    provider.name()
                );
                Ok(SummaryOutcome::Generated {
                    text,
                    message_count: count,
                })
            }
            Err(e) => {
                warn!("summary for chat {chat_id} failed: {e}");
                Ok(SummaryOutcome::Failed {
                    error: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct MockProvider {
        calls: AtomicUsize,
        last_prompt: Mutex<Option<String>>,
        reply: Result<String, String>,
    }

    impl MockProvider {
        fn replying(text: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
                reply: Ok(text.to_string()),
            }
        }

        fn failing(error: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
                reply: Err(error.to_string()),
            }
        }
    }

    #[async_trait]
    impl Provider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        fn requires_api_key(&self) -> bool {
            false
        }

        async fn complete(&self, prompt: &str) -> Result<String, RecapError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            self.reply.clone().map_err(RecapError::Provider)
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    async fn test_store() -> Store {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:").unwrap();
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await
            .unwrap();
        Store::run_migrations(&pool).await.unwrap();
        Store::from_pool(pool)
    }

    async fn fill(store: &Store, chat_id: i64, n: i64) {
        for i in 0..n {
            store
                .save(
                    i % 3,
                    Some(&format!("user{}", i % 3)),
                    &format!("message {i}"),
                    chat_id,
                    Some(Utc::now() - Duration::minutes(n - i)),
                )
                .await
                .unwrap();
        }
    }

    #[test]
    fn test_window_bounds() {
        assert!(SummaryWindow::new(1, 168).is_ok());
        assert!(SummaryWindow::new(168, 168).is_ok());
        assert!(matches!(
            SummaryWindow::new(0, 168),
            Err(RecapError::Validation(_))
        ));
        assert!(matches!(
            SummaryWindow::new(200, 168),
            Err(RecapError::Validation(_))
        ));
    }

    #[test]
    fn test_window_from_config_default() {
        let config = SummaryConfig::default();
        assert_eq!(SummaryWindow::from_config(None, &config).unwrap().hours(), 24);
        assert_eq!(
            SummaryWindow::from_config(Some(48), &config).unwrap().hours(),
            48
        );
        assert!(SummaryWindow::from_config(Some(169), &config).is_err());
    }

    #[test]
    fn test_format_transcript() {
        let msg = |user_id, username: Option<&str>, text: &str, minute| ChatMessage {
            chat_id: 42,
            user_id,
            username: username.map(String::from),
            message_text: text.into(),
            timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 12, minute, 0).unwrap(),
        };
        let transcript = format_transcript(&[
            msg(1, Some("ann"), "hi", 0),
            msg(2, None, "hello", 5),
        ]);
        assert_eq!(
            transcript,
            "[2025-01-01 12:00:00] ann: hi\n[2025-01-01 12:05:00] User2: hello"
        );
    }

    #[test]
    fn test_build_prompt_substitutes_hours() {
        let prompt = build_prompt("Last {hours} hours:", 12, "[ts] a: b");
        assert_eq!(prompt, "Last 12 hours:\n\n[ts] a: b");
    }

    #[tokio::test]
    async fn test_not_enough_data_skips_provider() {
        let store = test_store().await;
        fill(&store, 42, 20).await;
        let provider = MockProvider::replying("unused");
        let summarizer = Summarizer::new(30, "{hours}");

        let window = SummaryWindow::new(24, 168).unwrap();
        let outcome = summarizer
            .summarize(&store, &provider, 42, window)
            .await
            .unwrap();

        assert_eq!(outcome, SummaryOutcome::NotEnoughData { count: 20 });
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generated_passes_text_through() {
        let store = test_store().await;
        fill(&store, 42, 35).await;
        fill(&store, 43, 5).await;
        let provider = MockProvider::replying("  **raw** output\n");
        let summarizer = Summarizer::new(30, "Resume of {hours}h:");

        let window = SummaryWindow::new(24, 168).unwrap();
        let outcome = summarizer
            .summarize(&store, &provider, 42, window)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            SummaryOutcome::Generated {
                text: "  **raw** output\n".into(),
                message_count: 35,
            }
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        let prompt = provider.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.starts_with("Resume of 24h:\n\n["));
        assert_eq!(prompt.lines().filter(|l| l.starts_with('[')).count(), 35);
        let first = prompt.find("message 0").unwrap();
        let last = prompt.find("message 34").unwrap();
        assert!(first < last);
    }

    #[tokio::test]
    async fn test_provider_failure_becomes_outcome() {
        let store = test_store().await;
        fill(&store, 42, 30).await;
        let provider = MockProvider::failing("rate limited");
        let summarizer = Summarizer::new(30, "{hours}");

        let window = SummaryWindow::new(24, 168).unwrap();
        let outcome = summarizer
            .summarize(&store, &provider, 42, window)
            .await
            .unwrap();

        match outcome {
            SummaryOutcome::Failed { error } => assert!(error.contains("rate limited")),
            other => panic!("expected failure outcome, got {other:?}"),
        }
    }
}
