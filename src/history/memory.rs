use async_trait::async_trait;
use crate::history::{ MessageStore, StoreError };
use log::warn;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local store with the same overwrite-by-timestamp semantics as the
/// redis hash layout.
#[derive(Default)]
pub struct MemoryMessageStore {
    conversations: RwLock<HashMap<String, HashMap<i64, Vec<u8>>>>,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn append(&self, key: &str, timestamp: i64, payload: &[u8]) -> Result<(), StoreError> {
        let mut conversations = self.conversations.write().await;
        let previous = conversations
            .entry(key.to_string())
            .or_default()
            .insert(timestamp, payload.to_vec());
        if previous.is_some() {
            warn!("Message at {} in {} replaced an earlier message", timestamp, key);
        }
        Ok(())
    }

    async fn fetch_all(&self, key: &str) -> Result<HashMap<i64, Vec<u8>>, StoreError> {
        let conversations = self.conversations.read().await;
        Ok(conversations.get(key).cloned().unwrap_or_default())
    }
}
