//! Fun commands: /ball, /who, /rate.

use crate::replies::{self, MAGIC_BALL_ANSWERS, RATING_GOOD, RATING_LOW, RATING_MID, RATING_TOP};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use recap_memory::Store;
use tracing::warn;

pub(super) fn magic_ball<R: Rng>(rng: &mut R) -> &'static str {
    MAGIC_BALL_ANSWERS.choose(rng).copied().unwrap_or("🤷")
}

pub(super) fn pick_random_person<'a, R: Rng>(
    participants: &'a [String],
    rng: &mut R,
) -> Option<&'a str> {
    participants.choose(rng).map(String::as_str)
}

/// 64-bit FNV-1a. Stable across runs and platforms, unlike `DefaultHasher`.
fn fnv1a(text: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    text.bytes()
        .fold(OFFSET, |hash, b| (hash ^ u64::from(b)).wrapping_mul(PRIME))
}

/// Score 1..=10 and a comment. The same text always gets the same rating.
pub(super) fn rate_text(text: &str) -> (u8, &'static str) {
    let mut rng = StdRng::seed_from_u64(fnv1a(text));
    let score: u8 = rng.random_range(1..=10);
    let tier = match score {
        1..=3 => RATING_LOW,
        4..=6 => RATING_MID,
        7..=8 => RATING_GOOD,
        _ => RATING_TOP,
    };
    let comment = tier.choose(&mut rng).copied().unwrap_or_default();
    (score, comment)
}

pub(super) fn handle_ball() -> String {
    replies::magic_ball(magic_ball(&mut rand::rng()))
}

pub(super) async fn handle_who(store: &Store, chat_id: i64, question: &str) -> String {
    let participants = match store.participants(chat_id).await {
        Ok(p) => p,
        Err(e) => {
            warn!("participants for chat {chat_id} failed: {e}");
            return replies::error_stats_retrieval(&e.to_string());
        }
    };
    let mut rng = rand::rng();
    match pick_random_person(&participants, &mut rng) {
        Some(name) => replies::who(question, name),
        None => replies::nobody_here(),
    }
}

pub(super) fn handle_rate(text: &str) -> String {
    if text.is_empty() {
        return replies::rate_usage();
    }
    let (score, comment) = rate_text(text);
    replies::rating(text, score, comment)
}
