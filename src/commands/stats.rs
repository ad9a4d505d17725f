//! Statistics commands: /stats, /top, /mystats.

use crate::replies;
use recap_core::profanity::toxicity_title;
use recap_memory::Store;

pub(super) async fn handle_stats(store: &Store, chat_id: i64) -> String {
    let counts = async {
        let day = store.count_since(chat_id, 24).await?;
        let week = store.count_since(chat_id, 24 * 7).await?;
        let total = store.count(Some(chat_id)).await?;
        Ok::<_, recap_core::error::RecapError>((day, week, total))
    };
    match counts.await {
        Ok((day, week, total)) => replies::stats(day, week, total),
        Err(e) => replies::error_stats_retrieval(&e.to_string()),
    }
}

pub(super) async fn handle_top(store: &Store, chat_id: i64, limit: u32) -> String {
    match store.profanity_leaderboard(chat_id, limit).await {
        Ok(rows) => {
            let rows: Vec<(String, i64, &str)> = rows
                .into_iter()
                .map(|s| {
                    let title = toxicity_title(s.profanity_count);
                    (s.username, s.profanity_count, title)
                })
                .collect();
            replies::profanity_top(&rows)
        }
        Err(e) => replies::error_stats_retrieval(&e.to_string()),
    }
}

pub(super) async fn handle_mystats(
    store: &Store,
    chat_id: i64,
    user_id: i64,
    author: &str,
) -> String {
    match store.user_profanity_count(user_id, chat_id).await {
        Ok(count) => replies::my_profanity(author, count, toxicity_title(count)),
        Err(e) => replies::error_stats_retrieval(&e.to_string()),
    }
}
