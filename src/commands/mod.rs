//! Built-in bot commands.

mod fun;
mod games;
mod stats;
mod summary;


pub use games::QuizBook;

use crate::replies;
use recap_core::{
    config::{GamesConfig, SummaryConfig},
    traits::Provider,
};
use recap_memory::{Store, Summarizer};

/// Grouped context for command execution.
pub struct CommandContext<'a> {
    pub store: &'a Store,
    pub provider: &'a dyn Provider,
    pub summarizer: &'a Summarizer,
    pub summary_config: &'a SummaryConfig,
    pub games_config: &'a GamesConfig,
    pub quizzes: &'a QuizBook,
    pub chat_id: i64,
    pub user_id: i64,
    /// Resolved display name of the sender.
    pub author: &'a str,
    pub is_group: bool,
    pub text: &'a str,
}

/// Known bot commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Summary,
    Stats,
    Top,
    MyStats,
    Quiz,
    Answer,
    QuizTop,
    Ball,
    Who,
    Rate,
}

impl Command {
    /// Parse a command from message text. Returns `None` for unknown `/` prefixes.
    pub fn parse(text: &str) -> Option<Self> {
        let first = text.split_whitespace().next()?;
        // Strip @botname suffix (e.g. "/summary@recap_bot" → "/summary").
        let cmd = first.split('@').next().unwrap_or(first);
        match cmd {
            "/start" => Some(Self::Start),
            "/help" => Some(Self::Help),
            "/summary" => Some(Self::Summary),
            "/stats" => Some(Self::Stats),
            "/top" => Some(Self::Top),
            "/mystats" => Some(Self::MyStats),
            "/quiz" => Some(Self::Quiz),
            "/answer" => Some(Self::Answer),
            "/quiztop" => Some(Self::QuizTop),
            "/ball" => Some(Self::Ball),
            "/who" => Some(Self::Who),
            "/rate" => Some(Self::Rate),
            _ => None,
        }
    }

    /// Commands that read or write chat data only make sense in groups.
    pub fn group_only(&self) -> bool {
        matches!(
            self,
            Self::Summary
                | Self::Stats
                | Self::Top
                | Self::MyStats
                | Self::Quiz
                | Self::Answer
                | Self::QuizTop
                | Self::Who
        )
    }
}

/// Everything after the command word, trimmed.
pub(crate) fn command_args(text: &str) -> &str {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(pos) => text[pos..].trim(),
        None => "",
    }
}

/// Handle a command and return the response text.
pub async fn handle(cmd: Command, ctx: &CommandContext<'_>) -> String {
    if cmd.group_only() && !ctx.is_group {
        return replies::error_group_only();
    }
    let args = command_args(ctx.text);
    match cmd {
        Command::Start => replies::welcome(),
        Command::Help => replies::help(),
        Command::Summary => summary::handle_summary(ctx, args).await,
        Command::Stats => stats::handle_stats(ctx.store, ctx.chat_id).await,
        Command::Top => {
            stats::handle_top(ctx.store, ctx.chat_id, ctx.games_config.leaderboard_size).await
        }
        Command::MyStats => {
            stats::handle_mystats(ctx.store, ctx.chat_id, ctx.user_id, ctx.author).await
        }
        Command::Quiz => games::handle_quiz(ctx.store, ctx.quizzes, ctx.chat_id).await,
        Command::Answer => games::handle_answer(ctx, args).await,
        Command::QuizTop => {
            games::handle_quiztop(ctx.store, ctx.chat_id, ctx.games_config.leaderboard_size).await
        }
        Command::Ball => fun::handle_ball(),
        Command::Who => fun::handle_who(ctx.store, ctx.chat_id, args).await,
        Command::Rate => fun::handle_rate(args),
    }
}
