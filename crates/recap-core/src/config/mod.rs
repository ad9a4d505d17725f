mod defaults;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::RecapError;
use defaults::*;

/// Top-level Recap configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub transcription: TranscriptionConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
    #[serde(default)]
    pub games: GamesConfig,
}

/// General bot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Access control: which chats and users the bot serves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Whether access control is enforced (default: true).
    /// When true and every list is empty, ALL messages are rejected.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Chat ids allowed to use the bot. Compared by absolute value.
    #[serde(default)]
    pub allowed_chats: Vec<i64>,
    /// User ids allowed everywhere, including private chats.
    #[serde(default)]
    pub allowed_users: Vec<i64>,
    /// Fixed display names keyed by user id (as a string, TOML keys are strings).
    /// Known users are implicitly allowed.
    #[serde(default)]
    pub known_users: HashMap<String, String>,
    /// Message sent to unauthorized chats.
    #[serde(default = "default_deny_message")]
    pub deny_message: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_chats: Vec::new(),
            allowed_users: Vec::new(),
            known_users: HashMap::new(),
            deny_message: default_deny_message(),
        }
    }
}

impl AuthConfig {
    /// Known users keyed by numeric id.
    pub fn known_user_ids(&self) -> Result<HashMap<i64, String>, RecapError> {
        self.known_users
            .iter()
            .map(|(id, name)| {
                id.trim()
                    .parse::<i64>()
                    .map(|id| (id, name.clone()))
                    .map_err(|e| {
                        RecapError::Config(format!("invalid known_users id '{id}': {e}"))
                    })
            })
            .collect()
    }
}

/// Text-generation provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// One of "openai", "anthropic", "yagpt".
    #[serde(default = "default_provider")]
    pub default: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    pub openai: Option<OpenAiConfig>,
    pub anthropic: Option<AnthropicConfig>,
    pub yandex: Option<YandexConfig>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            default: default_provider(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            openai: None,
            anthropic: None,
            yandex: None,
        }
    }
}

/// OpenAI-compatible provider config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_openai_model(),
            base_url: default_openai_base_url(),
        }
    }
}

/// Anthropic API provider config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_anthropic_model")]
    pub model: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_anthropic_model(),
        }
    }
}

/// Yandex GPT through its OpenAI-compatible endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexConfig {
    #[serde(default)]
    pub api_key: String,
    /// Model URI, e.g. `gpt://<folder>/yandexgpt/latest`.
    #[serde(default)]
    pub model: String,
    /// Cloud folder id, sent as the project header.
    #[serde(default)]
    pub project: String,
    #[serde(default = "default_yandex_base_url")]
    pub base_url: String,
}

impl Default for YandexConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: String::new(),
            project: String::new(),
            base_url: default_yandex_base_url(),
        }
    }
}

/// Channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChannelConfig {
    pub telegram: Option<TelegramConfig>,
}

/// Telegram bot config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub bot_token: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bot_token: String::new(),
        }
    }
}

/// Speech-to-text for voice messages and video notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Falls back to the OpenAI provider key when empty.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_whisper_model")]
    pub model: String,
    #[serde(default = "default_whisper_language")]
    pub language: String,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: String::new(),
            base_url: default_openai_base_url(),
            model: default_whisper_model(),
            language: default_whisper_language(),
        }
    }
}

/// Memory config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Summary window policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Window used by `/summary` without an argument.
    #[serde(default = "default_summary_hours")]
    pub default_hours: u32,
    /// Largest window a user may request.
    #[serde(default = "default_max_summary_hours")]
    pub max_hours: u32,
    /// Smallest corpus worth sending to the provider.
    #[serde(default = "default_min_messages")]
    pub min_messages: usize,
    /// Instruction placed before the transcript. `{hours}` is substituted.
    #[serde(default = "default_summary_prompt")]
    pub prompt: String,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            default_hours: default_summary_hours(),
            max_hours: default_max_summary_hours(),
            min_messages: default_min_messages(),
            prompt: default_summary_prompt(),
        }
    }
}

/// Message retention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Messages older than this many days are swept.
    #[serde(default = "default_cleanup_days")]
    pub cleanup_days: u32,
    /// Hours between sweeps.
    #[serde(default = "default_cleanup_interval_hours")]
    pub interval_hours: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            cleanup_days: default_cleanup_days(),
            interval_hours: default_cleanup_interval_hours(),
        }
    }
}

/// Games and leaderboards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamesConfig {
    #[serde(default = "default_leaderboard_size")]
    pub leaderboard_size: u32,
}

impl Default for GamesConfig {
    fn default() -> Self {
        Self {
            leaderboard_size: default_leaderboard_size(),
        }
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Parse a comma-separated list of chat ids. Whitespace around items is ignored.
pub fn parse_chat_ids(raw: &str) -> Result<Vec<i64>, RecapError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|e| RecapError::Config(format!("invalid chat id list '{raw}': {e}")))
        })
        .collect()
}

/// Parse a JSON object of `{"<user_id>": "<display name>"}`.
pub fn parse_known_users(raw: &str) -> Result<HashMap<String, String>, RecapError> {
    let map: HashMap<String, String> = serde_json::from_str(raw)
        .map_err(|e| RecapError::Config(format!("invalid known users JSON: {e}")))?;
    for id in map.keys() {
        id.trim()
            .parse::<i64>()
            .map_err(|e| RecapError::Config(format!("invalid known_users id '{id}': {e}")))?;
    }
    Ok(map)
}

impl Config {
    /// Apply environment overrides using the given lookup.
    ///
    /// Secrets are usually kept out of `config.toml`; any variable that is
    /// set and non-empty wins over the file.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), RecapError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get("RECAP_BOT_TOKEN") {
            self.channel
                .telegram
                .get_or_insert_with(TelegramConfig::default)
                .bot_token = token;
        }
        if let Some(key) = get("OPENAI_API_KEY") {
            self.provider
                .openai
                .get_or_insert_with(OpenAiConfig::default)
                .api_key = key;
        }
        if let Some(key) = get("ANTHROPIC_API_KEY") {
            self.provider
                .anthropic
                .get_or_insert_with(AnthropicConfig::default)
                .api_key = key;
        }
        if let Some(key) = get("YANDEX_API_KEY") {
            self.provider
                .yandex
                .get_or_insert_with(YandexConfig::default)
                .api_key = key;
        }
        if let Some(provider) = get("RECAP_PROVIDER") {
            self.provider.default = provider;
        }
        if let Some(path) = get("RECAP_DB_PATH") {
            self.memory.db_path = path;
        }
        if let Some(raw) = get("RECAP_ALLOWED_CHAT_IDS") {
            self.auth.allowed_chats = parse_chat_ids(&raw)?;
        }
        if let Some(raw) = get("RECAP_KNOWN_USERS") {
            self.auth.known_users = parse_known_users(&raw)?;
        }
        Ok(())
    }

    /// Check that the configuration can run the bot.
    pub fn validate(&self) -> Result<(), RecapError> {
        let token = self
            .channel
            .telegram
            .as_ref()
            .filter(|tg| tg.enabled)
            .map(|tg| tg.bot_token.as_str())
            .unwrap_or_default();
        if token.is_empty() {
            return Err(RecapError::Config(
                "telegram bot_token is not set (config.toml or RECAP_BOT_TOKEN)".into(),
            ));
        }

        let key = match self.provider.default.as_str() {
            "openai" => self.provider.openai.as_ref().map(|c| c.api_key.as_str()),
            "anthropic" => self.provider.anthropic.as_ref().map(|c| c.api_key.as_str()),
            "yagpt" => self.provider.yandex.as_ref().map(|c| c.api_key.as_str()),
            other => {
                return Err(RecapError::Config(format!(
                    "invalid provider '{other}': must be 'openai', 'anthropic' or 'yagpt'"
                )))
            }
        };
        if key.unwrap_or_default().is_empty() {
            return Err(RecapError::Config(format!(
                "API key is not set for provider '{}'",
                self.provider.default
            )));
        }

        if self.summary.default_hours == 0 || self.summary.default_hours > self.summary.max_hours
        {
            return Err(RecapError::Config(format!(
                "summary.default_hours must be within 1..={}",
                self.summary.max_hours
            )));
        }

        self.auth.known_user_ids()?;
        Ok(())
    }
}

/// Load configuration from a TOML file, then apply environment overrides.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, RecapError> {
    let path = Path::new(path);
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RecapError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| RecapError::Config(format!("failed to parse config: {}", e)))?
    } else {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        Config::default()
    };

    config.apply_env(|key| std::env::var(key).ok())?;
    Ok(config)
}
