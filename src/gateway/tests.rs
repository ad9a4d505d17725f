use super::*;
use async_trait::async_trait;
use chrono::Utc;
use recap_core::config::MemoryConfig;
use recap_core::message::{Attachment, AttachmentType};
use std::sync::Mutex;
use tokio::sync::mpsc;
use uuid::Uuid;

const GROUP: i64 = -1001234567;

#[derive(Default)]
struct RecordingChannel {
    sent: Mutex<Vec<OutgoingMessage>>,
    typing: Mutex<Vec<i64>>,
}

impl RecordingChannel {
    fn sent_texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.text.clone())
            .collect()
    }
}

#[async_trait]
impl Channel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingMessage>, RecapError> {
        let (_tx, rx) = mpsc::channel(1);
        Ok(rx)
    }

    async fn send(&self, message: OutgoingMessage) -> Result<(), RecapError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }

    async fn send_typing(&self, chat_id: i64) -> Result<(), RecapError> {
        self.typing.lock().unwrap().push(chat_id);
        Ok(())
    }

    async fn stop(&self) -> Result<(), RecapError> {
        Ok(())
    }
}

struct EchoProvider;

#[async_trait]
impl Provider for EchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    fn requires_api_key(&self) -> bool {
        false
    }

    async fn complete(&self, _prompt: &str) -> Result<String, RecapError> {
        Ok("summary".into())
    }

    async fn is_available(&self) -> bool {
        true
    }
}

async fn gateway() -> (Gateway, Arc<RecordingChannel>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::new(&MemoryConfig {
        db_path: dir.path().join("test.db").to_string_lossy().into_owned(),
    })
    .await
    .unwrap();

    let mut config = Config::default();
    config.auth.allowed_chats = vec![GROUP];
    config.auth.known_users.insert("42".into(), "Алиса".into());

    let channel = Arc::new(RecordingChannel::default());
    let gw = Gateway::new(
        Arc::new(EchoProvider),
        channel.clone(),
        None,
        store,
        &config,
    )
    .unwrap();
    (gw, channel, dir)
}

fn incoming(chat_id: i64, user_id: i64, text: &str) -> IncomingMessage {
    IncomingMessage {
        id: Uuid::new_v4(),
        channel: "telegram".into(),
        chat_id,
        user_id,
        username: Some("tg_handle".into()),
        text: text.into(),
        timestamp: Utc::now(),
        attachments: Vec::new(),
        forwarded_from: None,
        is_group: chat_id < 0,
    }
}

#[tokio::test]
async fn test_group_text_is_stored_under_resolved_name() {
    let (gw, channel, _dir) = gateway().await;
    gw.handle_message(incoming(GROUP, 42, "всем привет")).await;
    gw.handle_message(incoming(GROUP, 7, "и тебе")).await;

    let saved = gw.store.messages_since(GROUP, 1).await.unwrap();
    let names: Vec<_> = saved.iter().map(|m| m.display_name()).collect();
    assert_eq!(names, vec!["Алиса", "tg_handle"]);
    assert!(channel.sent_texts().is_empty());
}

#[tokio::test]
async fn test_denied_chat_answers_commands_only() {
    let (gw, channel, _dir) = gateway().await;
    gw.handle_message(incoming(-555, 7, "hello")).await;
    assert!(channel.sent_texts().is_empty());

    gw.handle_message(incoming(-555, 7, "/summary")).await;
    assert_eq!(channel.sent_texts(), vec![gw.deny_message.clone()]);
    assert_eq!(gw.store.count(None).await.unwrap(), 0);
}

#[tokio::test]
async fn test_private_chat_gets_hint_and_nothing_is_stored() {
    let (gw, channel, _dir) = gateway().await;
    gw.handle_message(incoming(42, 42, "hi bot")).await;
    assert_eq!(channel.sent_texts(), vec![replies::private_hint()]);
    assert_eq!(gw.store.count(None).await.unwrap(), 0);
}

#[tokio::test]
async fn test_commands_reply_and_are_not_stored() {
    let (gw, channel, _dir) = gateway().await;
    gw.handle_message(incoming(GROUP, 7, "/stats@recap_bot")).await;
    gw.handle_message(incoming(GROUP, 7, "/nonsense")).await;

    assert_eq!(channel.sent_texts(), vec![replies::stats(0, 0, 0)]);
    assert_eq!(gw.store.count(None).await.unwrap(), 0);
}

#[tokio::test]
async fn test_summary_sends_typing_first() {
    let (gw, channel, _dir) = gateway().await;
    gw.handle_message(incoming(GROUP, 7, "/summary")).await;

    assert_eq!(*channel.typing.lock().unwrap(), vec![GROUP]);
    assert_eq!(channel.sent_texts(), vec![replies::no_messages(24)]);
}

/// Replays a fixed batch of events, then closes its stream.
struct ScriptedChannel {
    events: Mutex<Vec<IncomingMessage>>,
}

#[async_trait]
impl Channel for ScriptedChannel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingMessage>, RecapError> {
        let events = std::mem::take(&mut *self.events.lock().unwrap());
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            tx.send(event).await.unwrap();
        }
        Ok(rx)
    }

    async fn send(&self, _message: OutgoingMessage) -> Result<(), RecapError> {
        Ok(())
    }

    async fn send_typing(&self, _chat_id: i64) -> Result<(), RecapError> {
        Ok(())
    }

    async fn stop(&self) -> Result<(), RecapError> {
        Ok(())
    }
}

struct SlowTranscriber;

#[async_trait]
impl Transcriber for SlowTranscriber {
    fn name(&self) -> &str {
        "slow"
    }

    async fn transcribe(&self, _data: &[u8], _kind: AttachmentType) -> Option<String> {
        tokio::time::sleep(Duration::from_millis(300)).await;
        Some("расшифровка".into())
    }
}

#[tokio::test]
async fn test_shutdown_waits_for_in_flight_handlers() {
    let dir = tempfile::tempdir().unwrap();
    let memory = MemoryConfig {
        db_path: dir.path().join("test.db").to_string_lossy().into_owned(),
    };
    let store = Store::new(&memory).await.unwrap();

    let mut voice = incoming(GROUP, 7, "");
    voice.attachments.push(Attachment {
        file_type: AttachmentType::Audio,
        data: Some(vec![1, 2, 3]),
        filename: Some("voice.ogg".into()),
    });
    let channel = Arc::new(ScriptedChannel {
        events: Mutex::new(vec![voice, incoming(GROUP, 8, "обычный текст")]),
    });

    let mut config = Config::default();
    config.auth.allowed_chats = vec![GROUP];
    let gw = Gateway::new(
        Arc::new(EchoProvider),
        channel,
        Some(Arc::new(SlowTranscriber)),
        store,
        &config,
    )
    .unwrap();

    // The stream ends right away, so shutdown starts while the voice
    // message is still being transcribed.
    Arc::new(gw).run().await.unwrap();

    let reopened = Store::new(&memory).await.unwrap();
    let texts: Vec<String> = reopened
        .messages_since(GROUP, 1)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.message_text)
        .collect();
    assert_eq!(texts.len(), 2);
    assert!(texts.contains(&"расшифровка".to_string()));
}
