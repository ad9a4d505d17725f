//! Access control and display-name resolution.

use recap_core::{config::AuthConfig, error::RecapError, message::IncomingMessage};
use recap_memory::models::display_name;
use std::collections::{HashMap, HashSet};

/// Who may talk to the bot, resolved from [`AuthConfig`] once at startup.
#[derive(Debug, Clone, Default)]
pub struct Access {
    enabled: bool,
    /// Stored as absolute values; group ids are negative on Telegram.
    allowed_chats: HashSet<i64>,
    allowed_users: HashSet<i64>,
    known_users: HashMap<i64, String>,
}

impl Access {
    pub fn from_config(config: &AuthConfig) -> Result<Self, RecapError> {
        Ok(Self {
            enabled: config.enabled,
            allowed_chats: config.allowed_chats.iter().map(|id| id.abs()).collect(),
            allowed_users: config.allowed_users.iter().copied().collect(),
            known_users: config.known_user_ids()?,
        })
    }

    /// `None` when allowed, otherwise the reason for the denial.
    ///
    /// A known user is admitted only in their own private chat, whose id
    /// equals the user id. Allowed users pass in any chat.
    pub fn check(&self, incoming: &IncomingMessage) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let chat = incoming.chat_id.abs();
        if self.allowed_chats.contains(&chat)
            || self.known_users.contains_key(&chat)
            || self.allowed_users.contains(&incoming.user_id)
        {
            return None;
        }
        Some(format!(
            "chat {} / user {} not in allowed lists",
            incoming.chat_id, incoming.user_id
        ))
    }

    /// Configured name, then platform username, then `User<id>`.
    pub fn display_name(&self, user_id: i64, username: Option<&str>) -> String {
        match self.known_users.get(&user_id) {
            Some(name) if !name.is_empty() => name.clone(),
            _ => display_name(username, user_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn incoming(chat_id: i64, user_id: i64) -> IncomingMessage {
        IncomingMessage {
            id: Uuid::new_v4(),
            channel: "telegram".into(),
            chat_id,
            user_id,
            username: None,
            text: "hi".into(),
            timestamp: Utc::now(),
            attachments: Vec::new(),
            forwarded_from: None,
            is_group: true,
        }
    }

    fn access() -> Access {
        let mut config = AuthConfig {
            allowed_chats: vec![1001234567],
            allowed_users: vec![55],
            ..Default::default()
        };
        config.known_users.insert("77".into(), "Алиса".into());
        Access::from_config(&config).unwrap()
    }

    #[test]
    fn test_allowed_chat_compared_by_absolute_value() {
        let access = access();
        assert!(access.check(&incoming(-1001234567, 1)).is_none());
        assert!(access.check(&incoming(1001234567, 1)).is_none());
    }

    #[test]
    fn test_allowed_user_passes_anywhere() {
        let access = access();
        assert!(access.check(&incoming(-999, 55)).is_none());
        assert!(access.check(&incoming(55, 55)).is_none());
    }

    #[test]
    fn test_known_user_only_in_own_private_chat() {
        let access = access();
        assert!(access.check(&incoming(77, 77)).is_none());
        assert!(access.check(&incoming(-999, 77)).is_some());
        assert!(access.check(&incoming(-1001234567, 77)).is_none());
    }

    #[test]
    fn test_stranger_denied() {
        let reason = access().check(&incoming(-999, 1)).unwrap();
        assert!(reason.contains("-999"));
    }

    #[test]
    fn test_empty_lists_deny_everything() {
        let access = Access::from_config(&AuthConfig::default()).unwrap();
        assert!(access.check(&incoming(-1, 1)).is_some());
    }

    #[test]
    fn test_disabled_allows_everything() {
        let config = AuthConfig {
            enabled: false,
            ..Default::default()
        };
        let access = Access::from_config(&config).unwrap();
        assert!(access.check(&incoming(-1, 1)).is_none());
    }

    #[test]
    fn test_invalid_known_user_id_rejected() {
        let mut config = AuthConfig::default();
        config.known_users.insert("bob".into(), "Bob".into());
        assert!(Access::from_config(&config).is_err());
    }

    #[test]
    fn test_display_name_precedence() {
        let access = access();
        assert_eq!(access.display_name(77, Some("alice_tg")), "Алиса");
        assert_eq!(access.display_name(5, Some("bob_tg")), "bob_tg");
        assert_eq!(access.display_name(5, None), "User5");
    }
}
