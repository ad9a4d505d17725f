// --- Default value functions ---

pub(super) fn default_name() -> String {
    "Recap".to_string()
}
pub(super) fn default_data_dir() -> String {
    "~/.recap".to_string()
}
pub(super) fn default_log_level() -> String {
    "info".to_string()
}
pub(super) fn default_provider() -> String {
    "openai".to_string()
}
pub(super) fn default_true() -> bool {
    true
}
pub(super) fn default_deny_message() -> String {
    "❌ Этот чат не в списке разрешённых.".to_string()
}
pub(super) fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}
pub(super) fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
pub(super) fn default_anthropic_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}
pub(super) fn default_yandex_base_url() -> String {
    "https://llm.api.cloud.yandex.net/v1".to_string()
}
pub(super) fn default_max_tokens() -> u32 {
    2000
}
pub(super) fn default_temperature() -> f32 {
    0.7
}
pub(super) fn default_whisper_model() -> String {
    "whisper-1".to_string()
}
pub(super) fn default_whisper_language() -> String {
    "ru".to_string()
}
pub(super) fn default_db_path() -> String {
    "~/.recap/messages.db".to_string()
}
pub(super) fn default_summary_hours() -> u32 {
    24
}
pub(super) fn default_max_summary_hours() -> u32 {
    168
}
pub(super) fn default_min_messages() -> usize {
    30
}
pub(super) fn default_summary_prompt() -> String {
    "Ты - ассистент для анализа групповых разговоров в Telegram.\n\
     Твоя задача - создать краткое, но содержательное резюме разговора.\n\n\
     Пожалуйста, создай структурированное резюме на русском языке, которое включает:\n\n\
     1. **Основные темы**: Какие темы обсуждались?\n\
     2. **Ключевые моменты**: Самые важные высказывания или решения\n\
     3. **Активные участники**: Кто больше всего участвовал в обсуждении\n\
     4. **Итоги**: Краткие выводы по итогам разговора\n\n\
     Будь кратким и по делу. Резюме должно быть информативным, но не слишком длинным.\n\n\
     Разговор за последние {hours} часов:"
        .to_string()
}
pub(super) fn default_cleanup_days() -> u32 {
    30
}
pub(super) fn default_cleanup_interval_hours() -> u64 {
    24
}
pub(super) fn default_leaderboard_size() -> u32 {
    10
}
