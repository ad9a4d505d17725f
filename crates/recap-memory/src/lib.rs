//! # recap-memory
//!
//! Chat-scoped message store, statistics aggregates, and the summary-window
//! contract (SQLite-backed).

pub mod models;
pub mod store;
pub mod summary;

pub use models::{ChatMessage, Message, ProfanityStat, QuizScore, LEGACY_CHAT_ID};
pub use store::Store;
pub use summary::{SummaryOutcome, SummaryWindow, Summarizer};
