use async_trait::async_trait;
use crate::history::{ MessageStore, StoreError };
use log::{ debug, info, warn };
use redis::{ AsyncCommands, Client };
use std::collections::HashMap;

/// Conversations stored as Redis hashes, one field per message timestamp.
pub struct RedisMessageStore {
    client: Client,
    key_prefix: String,
}

impl RedisMessageStore {
    /// Opens the client and checks the server answers `PING`.
    pub async fn connect(url: &str, key_prefix: String) -> Result<Self, StoreError> {
        let store = Self {
            client: Client::open(url)?,
            key_prefix,
        };
        let mut conn = store.get_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        info!("Connected to redis message store ({})", pong);
        Ok(store)
    }

    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection, redis::RedisError> {
        self.client.get_multiplexed_async_connection().await
    }

    fn hash_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl MessageStore for RedisMessageStore {
    async fn append(&self, key: &str, timestamp: i64, payload: &[u8]) -> Result<(), StoreError> {
        let mut conn = self.get_connection().await?;
        let hash_key = self.hash_key(key);

        let added: i64 = conn.hset(&hash_key, timestamp, payload).await?;
        if added == 0 {
            warn!("Message at {} in {} replaced an earlier message", timestamp, hash_key);
        }
        Ok(())
    }

    async fn fetch_all(&self, key: &str) -> Result<HashMap<i64, Vec<u8>>, StoreError> {
        let mut conn = self.get_connection().await?;
        let hash_key = self.hash_key(key);
        debug!("Retrieving messages from redis with key {}", hash_key);

        let raw: HashMap<String, Vec<u8>> = conn.hgetall(&hash_key).await?;
        parse_fields(&hash_key, raw)
    }
}

/// Turns raw hash fields into timestamps; any non-decimal field is rejected.
fn parse_fields(
    hash_key: &str,
    raw: HashMap<String, Vec<u8>>
) -> Result<HashMap<i64, Vec<u8>>, StoreError> {
    let mut messages = HashMap::with_capacity(raw.len());
    for (field, payload) in raw {
        let timestamp = field.parse::<i64>().map_err(|_| StoreError::InvalidField {
            key: hash_key.to_string(),
            field: field.clone(),
        })?;
        messages.insert(timestamp, payload);
    }
    Ok(messages)
}
