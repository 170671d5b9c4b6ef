use crate::conversation::{ derive_pair, split_participants };
use crate::error::ChatError;
use crate::history::MessageStore;
use crate::models::chat::Message;
use chrono::Utc;
use log::debug;
use std::sync::Arc;

/// Source of server-assigned send times, in unix seconds.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(|| Utc::now().timestamp())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendConfirmation {
    pub chat: String,
    pub key: String,
    pub timestamp: i64,
}

impl SendConfirmation {
    pub fn message(&self) -> String {
        format!("Success: Sent message {}", self.chat)
    }
}

#[derive(Clone)]
pub struct SendService {
    store: Arc<dyn MessageStore>,
    clock: Clock,
}

impl SendService {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self::with_clock(store, system_clock())
    }

    pub fn with_clock(store: Arc<dyn MessageStore>, clock: Clock) -> Self {
        Self { store, clock }
    }

    pub async fn send(
        &self,
        chat: &str,
        sender: &str,
        text: &str
    ) -> Result<SendConfirmation, ChatError> {
        let (first, second) = split_participants(chat).ok_or_else(|| ChatError::InvalidChatId {
            chat: chat.to_string(),
        })?;
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if sender != first && sender != second {
            return Err(ChatError::SenderNotInChat {
                sender: sender.to_string(),
                chat: chat.to_string(),
            });
        }

        let key = derive_pair(first, second).map_err(|_| ChatError::InvalidChatId {
            chat: chat.to_string(),
        })?;
        let message = Message {
            text: text.to_string(),
            sender: sender.to_string(),
            timestamp: (self.clock)(),
        };
        let payload = message.to_payload()?;
        self.store.append(&key, message.timestamp, &payload).await?;
        debug!("Message from {} saved to {} at {}", sender, key, message.timestamp);

        Ok(SendConfirmation {
            chat: chat.to_string(),
            key,
            timestamp: message.timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryMessageStore;

    fn service_at(timestamp: i64) -> (Arc<MemoryMessageStore>, SendService) {
        let store = Arc::new(MemoryMessageStore::new());
        let service = SendService::with_clock(store.clone(), Arc::new(move || timestamp));
        (store, service)
    }

    #[tokio::test]
    async fn test_send_appends_under_normalized_key() {
        let (store, service) = service_at(1_000);
        let confirmation = service.send("alice:bob", "alice", "hi").await.unwrap();
        assert_eq!(confirmation.key, "alice:bob");
        assert_eq!(confirmation.timestamp, 1_000);
        assert_eq!(confirmation.message(), "Success: Sent message alice:bob");

        let stored = store.fetch_all("alice:bob").await.unwrap();
        let message = Message::from_payload(&stored[&1_000]).unwrap();
        assert_eq!(message.text, "hi");
        assert_eq!(message.sender, "alice");
    }

    #[tokio::test]
    async fn test_cross_case_cross_order_share_conversation() {
        let (store, service) = service_at(7);
        let confirmation = service.send("Bob:Alice", "Alice", "hey").await.unwrap();
        assert_eq!(confirmation.key, "alice:bob");
        assert_eq!(confirmation.chat, "Bob:Alice");
        assert_eq!(store.fetch_all("alice:bob").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sender_must_be_participant() {
        let (store, service) = service_at(1);
        let err = service.send("alice:bob", "carol", "hi").await.unwrap_err();
        assert!(matches!(err, ChatError::SenderNotInChat { ref sender, .. } if sender == "carol"));
        assert!(store.fetch_all("alice:bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sender_match_is_case_sensitive() {
        let (_, service) = service_at(1);
        let err = service.send("Alice:bob", "alice", "hi").await.unwrap_err();
        assert!(matches!(err, ChatError::SenderNotInChat { .. }));
    }

    #[tokio::test]
    async fn test_validation_order() {
        let (_, service) = service_at(1);
        // a malformed chat wins over an empty text and a stranger
        let err = service.send("alice", "carol", "").await.unwrap_err();
        assert!(matches!(err, ChatError::InvalidChatId { .. }));
        // an empty text wins over a stranger
        let err = service.send("alice:bob", "carol", "").await.unwrap_err();
        assert!(matches!(err, ChatError::EmptyMessage));
    }

    #[tokio::test]
    async fn test_malformed_chat_ids() {
        let (_, service) = service_at(1);
        for chat in ["", "alice:", ":bob", "a:b:c"] {
            let err = service.send(chat, "a", "hi").await.unwrap_err();
            assert_eq!(err.code(), 1, "chat {:?}", chat);
        }
    }
}
