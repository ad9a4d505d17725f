//! Gateway — the main event loop connecting the channel, memory, and providers.
//!
//! Includes: auth enforcement, command dispatch, message ingestion,
//! the retention task, and graceful shutdown.

mod auth;
mod pipeline;
mod retention;

#[cfg(test)]
mod tests;

pub use auth::Access;

use crate::commands::{self, Command, CommandContext, QuizBook};
use crate::replies;
use recap_core::{
    config::{Config, GamesConfig, RetentionConfig, SummaryConfig},
    error::RecapError,
    message::{IncomingMessage, OutgoingMessage},
    traits::{Channel, Provider, Transcriber},
};
use recap_memory::{Store, Summarizer};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

/// The central gateway that routes chat events to storage and commands.
pub struct Gateway {
    provider: Arc<dyn Provider>,
    channel: Arc<dyn Channel>,
    transcriber: Option<Arc<dyn Transcriber>>,
    store: Store,
    access: Access,
    deny_message: String,
    summarizer: Summarizer,
    summary_config: SummaryConfig,
    games_config: GamesConfig,
    retention_config: RetentionConfig,
    quizzes: QuizBook,
}

impl Gateway {
    pub fn new(
        provider: Arc<dyn Provider>,
        channel: Arc<dyn Channel>,
        transcriber: Option<Arc<dyn Transcriber>>,
        store: Store,
        config: &Config,
    ) -> Result<Self, RecapError> {
        Ok(Self {
            provider,
            channel,
            transcriber,
            store,
            access: Access::from_config(&config.auth)?,
            deny_message: config.auth.deny_message.clone(),
            summarizer: Summarizer::from_config(&config.summary),
            summary_config: config.summary.clone(),
            games_config: config.games.clone(),
            retention_config: config.retention.clone(),
            quizzes: QuizBook::new(),
        })
    }

    /// Run the main event loop until Ctrl-C or the channel closes.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        info!(
            "Recap gateway running | provider: {} | channel: {} | transcription: {}",
            self.provider.name(),
            self.channel.name(),
            self.transcriber
                .as_ref()
                .map(|t| t.name().to_string())
                .unwrap_or_else(|| "disabled".to_string()),
        );

        let mut rx = self
            .channel
            .start()
            .await
            .map_err(|e| anyhow::anyhow!("failed to start channel {}: {e}", self.channel.name()))?;
        info!("Channel started: {}", self.channel.name());

        let cancel = CancellationToken::new();
        let interval_secs = self.retention_config.interval_hours.max(1).saturating_mul(3600);
        let retention_handle = tokio::spawn(retention::retention_loop(
            self.store.clone(),
            self.retention_config.cleanup_days,
            Duration::from_secs(interval_secs),
            cancel.clone(),
        ));

        let handlers = TaskTracker::new();
        loop {
            tokio::select! {
                next = rx.recv() => match next {
                    Some(incoming) => {
                        let gw = self.clone();
                        handlers.spawn(async move {
                            gw.handle_message(incoming).await;
                        });
                    }
                    None => {
                        warn!("channel {} closed its stream", self.channel.name());
                        break;
                    }
                },
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        self.shutdown(cancel, retention_handle, handlers).await;
        Ok(())
    }

    /// Graceful shutdown: stop the retention task, the channel, and wait for
    /// in-flight handlers before closing the store.
    async fn shutdown(
        &self,
        cancel: CancellationToken,
        retention_handle: JoinHandle<()>,
        handlers: TaskTracker,
    ) {
        info!("Shutting down...");

        cancel.cancel();
        if let Err(e) = retention_handle.await {
            warn!("retention task ended abnormally: {e}");
        }

        if let Err(e) = self.channel.stop().await {
            warn!("failed to stop channel {}: {e}", self.channel.name());
        }

        handlers.close();
        if !handlers.is_empty() {
            info!("waiting for {} in-flight handlers", handlers.len());
        }
        handlers.wait().await;
        self.store.close().await;

        info!("Shutdown complete.");
    }

    /// Route one event: auth, commands, private hint, then ingestion.
    async fn handle_message(&self, incoming: IncomingMessage) {
        if let Some(reason) = self.access.check(&incoming) {
            warn!("denied: {reason}");
            if incoming.is_command() && !self.deny_message.is_empty() {
                self.send_text(incoming.chat_id, &self.deny_message).await;
            }
            return;
        }

        let author = self
            .access
            .display_name(incoming.user_id, incoming.username.as_deref());

        if incoming.is_command() {
            match Command::parse(&incoming.text) {
                Some(cmd) => self.run_command(cmd, &incoming, &author).await,
                None => debug!("ignoring unknown command: {}", incoming.text),
            }
            return;
        }

        if !incoming.is_group {
            self.send_text(incoming.chat_id, &replies::private_hint())
                .await;
            return;
        }

        if let Err(e) = pipeline::ingest(
            &self.store,
            self.transcriber.as_deref(),
            &incoming,
            &author,
        )
        .await
        {
            error!(
                "failed to store message from {} in chat {}: {e}",
                incoming.user_id, incoming.chat_id
            );
        }
    }

    async fn run_command(&self, cmd: Command, incoming: &IncomingMessage, author: &str) {
        info!(
            "command {cmd:?} from {} ({author}) in chat {}",
            incoming.user_id, incoming.chat_id
        );
        if cmd == Command::Summary && incoming.is_group {
            if let Err(e) = self.channel.send_typing(incoming.chat_id).await {
                debug!("typing indicator failed: {e}");
            }
        }

        let ctx = CommandContext {
            store: &self.store,
            provider: self.provider.as_ref(),
            summarizer: &self.summarizer,
            summary_config: &self.summary_config,
            games_config: &self.games_config,
            quizzes: &self.quizzes,
            chat_id: incoming.chat_id,
            user_id: incoming.user_id,
            author,
            is_group: incoming.is_group,
            text: &incoming.text,
        };
        let reply = commands::handle(cmd, &ctx).await;
        self.send_text(incoming.chat_id, &reply).await;
    }

    /// Send a plain text message to a chat.
    async fn send_text(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.channel.send(OutgoingMessage::new(chat_id, text)).await {
            error!("failed to send reply to chat {chat_id}: {e}");
        }
    }
}
