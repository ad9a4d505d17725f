use super::*;
use std::collections::HashMap;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

fn runnable_config() -> Config {
    let mut cfg = Config::default();
    cfg.channel.telegram = Some(TelegramConfig {
        enabled: true,
        bot_token: "123:abc".into(),
    });
    cfg.provider.openai = Some(OpenAiConfig {
        api_key: "sk-test".into(),
        ..Default::default()
    });
    cfg
}

#[test]
fn test_summary_defaults() {
    let cfg = SummaryConfig::default();
    assert_eq!(cfg.default_hours, 24);
    assert_eq!(cfg.max_hours, 168);
    assert_eq!(cfg.min_messages, 30);
    assert!(cfg.prompt.contains("{hours}"));
}

#[test]
fn test_retention_and_games_defaults() {
    let cfg = Config::default();
    assert_eq!(cfg.retention.cleanup_days, 30);
    assert_eq!(cfg.retention.interval_hours, 24);
    assert_eq!(cfg.games.leaderboard_size, 10);
    assert!(cfg.auth.enabled);
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let toml_str = r#"
        [summary]
        max_hours = 72

        [auth]
        allowed_chats = [1001234567]

        [auth.known_users]
        "123" = "Alice"
    "#;
    let cfg: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(cfg.summary.max_hours, 72);
    assert_eq!(cfg.summary.default_hours, 24);
    assert_eq!(cfg.auth.allowed_chats, vec![1001234567]);
    assert_eq!(cfg.memory.db_path, "~/.recap/messages.db");
    let known = cfg.auth.known_user_ids().unwrap();
    assert_eq!(known.get(&123).map(String::as_str), Some("Alice"));
}

#[test]
fn test_parse_chat_ids_valid() {
    assert_eq!(parse_chat_ids("123,456,789").unwrap(), vec![123, 456, 789]);
}

#[test]
fn test_parse_chat_ids_empty() {
    assert!(parse_chat_ids("").unwrap().is_empty());
}

#[test]
fn test_parse_chat_ids_with_spaces() {
    assert_eq!(
        parse_chat_ids(" 111 , 222 , 333 ").unwrap(),
        vec![111, 222, 333]
    );
}

#[test]
fn test_parse_chat_ids_invalid() {
    let err = parse_chat_ids("123,abc,456").unwrap_err();
    assert!(matches!(err, RecapError::Config(_)));
}

#[test]
fn test_parse_known_users_valid() {
    let users = parse_known_users(r#"{"123": "Alice", "456": "Bob"}"#).unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users.get("456").map(String::as_str), Some("Bob"));
}

#[test]
fn test_parse_known_users_empty() {
    assert!(parse_known_users("{}").unwrap().is_empty());
}

#[test]
fn test_parse_known_users_invalid_json() {
    let err = parse_known_users("invalid json").unwrap_err();
    assert!(err.to_string().contains("known users"));
}

#[test]
fn test_parse_known_users_non_numeric_id() {
    assert!(parse_known_users(r#"{"alice": "Alice"}"#).is_err());
}

#[test]
fn test_env_overrides_secrets() {
    let mut cfg = Config::default();
    cfg.apply_env(env(&[
        ("RECAP_BOT_TOKEN", "42:token"),
        ("OPENAI_API_KEY", "sk-env"),
        ("RECAP_ALLOWED_CHAT_IDS", "1, 2"),
        ("RECAP_KNOWN_USERS", r#"{"7": "bob"}"#),
        ("RECAP_DB_PATH", "/tmp/recap.db"),
    ]))
    .unwrap();

    assert_eq!(cfg.channel.telegram.unwrap().bot_token, "42:token");
    assert_eq!(cfg.provider.openai.unwrap().api_key, "sk-env");
    assert_eq!(cfg.auth.allowed_chats, vec![1, 2]);
    assert_eq!(cfg.auth.known_users.get("7").map(String::as_str), Some("bob"));
    assert_eq!(cfg.memory.db_path, "/tmp/recap.db");
}

#[test]
fn test_env_blank_values_ignored() {
    let mut cfg = Config::default();
    cfg.memory.db_path = "/data/keep.db".into();
    cfg.apply_env(env(&[("RECAP_DB_PATH", "   ")])).unwrap();
    assert_eq!(cfg.memory.db_path, "/data/keep.db");
}

#[test]
fn test_env_malformed_chat_ids_rejected() {
    let mut cfg = Config::default();
    let result = cfg.apply_env(env(&[("RECAP_ALLOWED_CHAT_IDS", "1,x")]));
    assert!(result.is_err());
}

#[test]
fn test_validate_ok() {
    assert!(runnable_config().validate().is_ok());
}

#[test]
fn test_validate_missing_token() {
    let mut cfg = runnable_config();
    cfg.channel.telegram = None;
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("bot_token"));
}

#[test]
fn test_validate_missing_provider_key() {
    let mut cfg = runnable_config();
    cfg.provider.default = "anthropic".into();
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("anthropic"));
}

#[test]
fn test_validate_unknown_provider() {
    let mut cfg = runnable_config();
    cfg.provider.default = "mystery".into();
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("mystery"));
}

#[test]
fn test_validate_default_hours_above_max() {
    let mut cfg = runnable_config();
    cfg.summary.default_hours = 200;
    assert!(cfg.validate().is_err());
}

#[test]
fn test_load_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let cfg = load(path.to_str().unwrap()).unwrap();
    assert_eq!(cfg.summary.max_hours, 168);
}

#[test]
fn test_load_rejects_malformed_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[summary\nmax_hours = ").unwrap();
    let err = load(path.to_str().unwrap()).unwrap_err();
    assert!(matches!(err, RecapError::Config(_)));
}

#[test]
fn test_shellexpand_passthrough() {
    assert_eq!(shellexpand("/abs/path.db"), "/abs/path.db");
}
