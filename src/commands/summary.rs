//! /summary [hours]

use super::CommandContext;
use crate::replies;
use recap_core::config::SummaryConfig;
use recap_memory::{SummaryOutcome, SummaryWindow};
use tracing::error;

/// Validate the `/summary` argument. `Err` carries the reply text.
pub(super) fn parse_window(args: &str, config: &SummaryConfig) -> Result<SummaryWindow, String> {
    let hours = if args.is_empty() {
        i64::from(config.default_hours)
    } else {
        let first = args.split_whitespace().next().unwrap_or(args);
        first
            .parse::<i64>()
            .map_err(|_| replies::error_invalid_format())?
    };

    if hours <= 0 {
        return Err(replies::error_invalid_hours());
    }
    if hours > i64::from(config.max_hours) {
        return Err(replies::error_max_hours_exceeded(config.max_hours));
    }
    let hours = u32::try_from(hours).map_err(|_| replies::error_invalid_format())?;
    SummaryWindow::new(hours, config.max_hours).map_err(|_| replies::error_invalid_hours())
}

pub(super) async fn handle_summary(ctx: &CommandContext<'_>, args: &str) -> String {
    let window = match parse_window(args, ctx.summary_config) {
        Ok(w) => w,
        Err(reply) => return reply,
    };

    let outcome = ctx
        .summarizer
        .summarize(ctx.store, ctx.provider, ctx.chat_id, window)
        .await;

    match outcome {
        Ok(SummaryOutcome::NotEnoughData { count: 0 }) => replies::no_messages(window.hours()),
        Ok(SummaryOutcome::NotEnoughData { count }) => replies::error_not_enough_messages(count),
        Ok(SummaryOutcome::Generated { text, .. }) => {
            format!("{}{text}", replies::summary_header(window.hours()))
        }
        Ok(SummaryOutcome::Failed { error }) => replies::error_summary_generation(&error),
        Err(e) => {
            error!("summary for chat {} failed: {e}", ctx.chat_id);
            replies::error_summary_generation(&e.to_string())
        }
    }
}
