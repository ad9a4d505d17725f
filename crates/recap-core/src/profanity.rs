//! Profanity detection for chat messages.
//!
//! Each pattern is a word-start root; a message's score is the total number
//! of non-overlapping matches across all patterns on the lower-cased text.

use regex::Regex;
use std::sync::LazyLock;

/// Word-start roots of Russian swearing and rude words.
const PATTERNS: &[&str] = &[
    r"\bхуй",
    r"\bхуе",
    r"\bхуя",
    r"\bхули",
    r"\bхуев",
    r"\bпизд",
    r"\bпизж",
    r"\bебал",
    r"\bебан",
    r"\bебат",
    r"\bеби",
    r"\bъеб",
    r"\bзаеб",
    r"\bдоеб",
    r"\bпроеб",
    r"\bнаеб",
    r"\bуеб",
    r"\bвъеб",
    r"\bвыеб",
    r"\bсъеб",
    r"\bотъеб",
    r"\bразъеб",
    r"\bбля",
    r"\bблят",
    r"\bблядь",
    r"\bблядск",
    r"\bблядин",
    r"\bсука",
    r"\bсуки",
    r"\bсучк",
    r"\bсучар",
    r"\bдебил",
    r"\bдебильн",
    r"\bдолбоеб",
    r"\bдолбоящ",
    r"\bмудак",
    r"\bмудил",
    r"\bмудозвон",
    r"\bпидор",
    r"\bпидар",
    r"\bпидр",
    r"\bгандон",
    r"\bговн",
    r"\bсрать",
    r"\bсрал",
    r"\bсру",
    r"\bсрет",
    r"\bдерьм",
    r"\bдрочи",
    r"\bдроч",
    r"\bманд",
    r"\bчмо\b",
    r"\bчмош",
    r"\bдаун",
    r"\bдауни",
    r"\bретард",
    r"\bретардн",
    r"\bдаунята",
    r"\bебись",
    r"\bахуе",
    r"\bохуе",
    r"\bнахуй",
    r"\bнахер",
    r"\bпошел",
    r"\bпошл",
    r"\bидиот",
    r"\bтупиц",
    r"\bтупой",
    r"\bуебан",
    r"\bуебк",
    r"\bуебищ",
    r"\bзалуп",
    r"\bмразь",
    r"\bмрази",
    r"\bпараш",
    r"\bдаунизм",
];

static COMPILED: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    PATTERNS
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
});

/// Count profanity occurrences in a message.
pub fn count_profanity(text: &str) -> u32 {
    if text.is_empty() {
        return 0;
    }
    let lower = text.to_lowercase();
    COMPILED
        .iter()
        .map(|re| re.find_iter(&lower).count() as u32)
        .sum()
}

/// Title shown next to a user's accumulated profanity count.
pub fn toxicity_title(count: i64) -> &'static str {
    match count {
        i64::MIN..=0 => "😇 Ангел",
        1..=5 => "😊 Воспитанный",
        6..=20 => "😏 Бывает",
        21..=50 => "🤬 Токсик",
        51..=100 => "☠️ Матершинник",
        101..=200 => "💀 Пиздец просто",
        _ => "🔥 Легенда мата",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_compile() {
        assert_eq!(COMPILED.len(), PATTERNS.len());
    }

    #[test]
    fn test_clean_text_scores_zero() {
        assert_eq!(count_profanity(""), 0);
        assert_eq!(count_profanity("Привет, как дела? Идём в кино."), 0);
        assert_eq!(count_profanity("hello world"), 0);
    }

    #[test]
    fn test_counts_word_starts_only() {
        assert_eq!(count_profanity("ну ты и дебил"), 1);
        // Root in the middle of a word is not a match.
        assert_eq!(count_profanity("скупердяй"), 0);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(count_profanity("СУКА"), 1);
    }

    #[test]
    fn test_overlapping_roots_each_count() {
        // "дебильный" starts with both "дебил" and "дебильн".
        assert_eq!(count_profanity("дебильный"), 2);
    }

    #[test]
    fn test_whole_word_pattern() {
        assert_eq!(count_profanity("чмо"), 1);
        // "чмошник" hits "чмош" but not the whole-word "чмо".
        assert_eq!(count_profanity("чмошник"), 1);
    }

    #[test]
    fn test_repeated_words_accumulate() {
        assert_eq!(count_profanity("идиот, просто идиот"), 2);
    }

    #[test]
    fn test_toxicity_tiers() {
        assert_eq!(toxicity_title(0), "😇 Ангел");
        assert_eq!(toxicity_title(5), "😊 Воспитанный");
        assert_eq!(toxicity_title(6), "😏 Бывает");
        assert_eq!(toxicity_title(20), "😏 Бывает");
        assert_eq!(toxicity_title(50), "🤬 Токсик");
        assert_eq!(toxicity_title(100), "☠️ Матершинник");
        assert_eq!(toxicity_title(200), "💀 Пиздец просто");
        assert_eq!(toxicity_title(201), "🔥 Легенда мата");
    }
}
