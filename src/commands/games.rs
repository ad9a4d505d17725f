//! "Who said it?" quiz: /quiz, /answer, /quiztop.

use super::CommandContext;
use crate::replies;
use rand::seq::SliceRandom;
use rand::Rng;
use recap_memory::{ChatMessage, Store};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{info, warn};

const OPTION_COUNT: usize = 4;
const QUIZ_DATE_FORMAT: &str = "%d.%m.%Y %H:%M";

/// An unanswered quiz question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuiz {
    pub options: Vec<String>,
    /// Index into `options`.
    pub correct: usize,
}

impl PendingQuiz {
    pub fn answer(&self) -> &str {
        &self.options[self.correct]
    }
}

/// One pending quiz per chat. A new `/quiz` replaces the previous one.
#[derive(Default)]
pub struct QuizBook {
    pending: Mutex<HashMap<i64, PendingQuiz>>,
}

impl QuizBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) async fn insert(&self, chat_id: i64, quiz: PendingQuiz) {
        self.pending.lock().await.insert(chat_id, quiz);
    }

    #[cfg(test)]
    pub(super) async fn peek(&self, chat_id: i64) -> Option<PendingQuiz> {
        self.pending.lock().await.get(&chat_id).cloned()
    }

    /// Resolve the pending quiz with a 1-based `choice`, under one lock.
    ///
    /// Only the first valid answer gets the quiz; an out-of-range choice
    /// leaves it open.
    pub(super) async fn resolve(&self, chat_id: i64, choice: usize) -> Resolution {
        let mut pending = self.pending.lock().await;
        let Some(quiz) = pending.get(&chat_id) else {
            return Resolution::NoActive;
        };
        if !(1..=quiz.options.len()).contains(&choice) {
            return Resolution::OutOfRange(quiz.options.len());
        }
        match pending.remove(&chat_id) {
            Some(quiz) => Resolution::Answered {
                is_correct: choice - 1 == quiz.correct,
                quiz,
            },
            None => Resolution::NoActive,
        }
    }
}

/// Outcome of one `/answer` against the pending quiz.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum Resolution {
    NoActive,
    /// Carries the option count.
    OutOfRange(usize),
    Answered { quiz: PendingQuiz, is_correct: bool },
}

/// Build four shuffled options around the sample's author.
///
/// Other participants fill the wrong answers; when the chat is too small,
/// made-up `User<nnnn>` names pad the list.
pub(super) fn create_quiz<R: Rng>(
    sample: &ChatMessage,
    participants: &[String],
    rng: &mut R,
) -> PendingQuiz {
    let correct = sample.display_name();

    let mut wrong: Vec<String> = participants
        .iter()
        .filter(|p| **p != correct)
        .cloned()
        .collect();
    while wrong.len() < OPTION_COUNT - 1 {
        let filler = format!("User{}", rng.random_range(1000..=9999));
        if filler != correct && !wrong.contains(&filler) {
            wrong.push(filler);
        }
    }
    wrong.shuffle(rng);
    wrong.truncate(OPTION_COUNT - 1);

    let mut options = wrong;
    options.push(correct.clone());
    options.shuffle(rng);
    let correct = options.iter().position(|o| *o == correct).unwrap_or(0);

    PendingQuiz { options, correct }
}

pub(super) async fn handle_quiz(store: &Store, quizzes: &QuizBook, chat_id: i64) -> String {
    let sample = match store.random_sample_for_quiz(chat_id).await {
        Ok(Some(sample)) => sample,
        Ok(None) => return replies::quiz_no_messages(),
        Err(e) => {
            warn!("quiz sample for chat {chat_id} failed: {e}");
            return replies::error_stats_retrieval(&e.to_string());
        }
    };
    let participants = match store.participants(chat_id).await {
        Ok(p) => p,
        Err(e) => {
            warn!("participants for chat {chat_id} failed: {e}");
            return replies::error_stats_retrieval(&e.to_string());
        }
    };

    let quiz = create_quiz(&sample, &participants, &mut rand::rng());
    let date = sample.timestamp.format(QUIZ_DATE_FORMAT).to_string();
    let reply = replies::quiz_question(&sample.message_text, &date, &quiz.options);
    quizzes.insert(chat_id, quiz).await;
    reply
}

pub(super) async fn handle_answer(ctx: &CommandContext<'_>, args: &str) -> String {
    let choice = args
        .split_whitespace()
        .next()
        .and_then(|a| a.parse::<usize>().ok())
        .unwrap_or(0);

    let (quiz, is_correct) = match ctx.quizzes.resolve(ctx.chat_id, choice).await {
        Resolution::NoActive => return replies::quiz_no_active(),
        Resolution::OutOfRange(n) => return replies::quiz_bad_answer(n),
        Resolution::Answered { quiz, is_correct } => (quiz, is_correct),
    };

    if let Err(e) = ctx
        .store
        .record_quiz_result(ctx.user_id, ctx.author, ctx.chat_id, is_correct)
        .await
    {
        warn!("recording quiz result in chat {} failed: {e}", ctx.chat_id);
    }
    info!(
        "quiz in chat {} answered by {} ({})",
        ctx.chat_id,
        ctx.user_id,
        if is_correct { "correct" } else { "wrong" }
    );

    if is_correct {
        replies::quiz_correct(ctx.author, quiz.answer())
    } else {
        replies::quiz_wrong(ctx.author, quiz.answer())
    }
}

pub(super) async fn handle_quiztop(store: &Store, chat_id: i64, limit: u32) -> String {
    match store.quiz_leaderboard(chat_id, limit).await {
        Ok(rows) => {
            let rows: Vec<(String, i64, i64)> = rows
                .into_iter()
                .map(|s| (s.username, s.correct_answers, s.total_games))
                .collect();
            replies::quiz_top(&rows)
        }
        Err(e) => replies::error_stats_retrieval(&e.to_string()),
    }
}

