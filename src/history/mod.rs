mod memory;
mod redis;

pub use self::memory::MemoryMessageStore;
pub use self::redis::RedisMessageStore;

use async_trait::async_trait;
use log::info;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use crate::cli::Args;
use crate::models::chat::Message;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("payload codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("conversation '{key}' holds non-timestamp field '{field}'")]
    InvalidField {
        key: String,
        field: String,
    },
}

/// Append-and-fetch storage for conversations.
///
/// Each conversation is a hash keyed by message timestamp. Writing the same
/// `(key, timestamp)` twice keeps only the last payload.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn append(&self, key: &str, timestamp: i64, payload: &[u8]) -> Result<(), StoreError>;

    /// Every stored payload for `key`, empty if the key was never written.
    async fn fetch_all(&self, key: &str) -> Result<HashMap<i64, Vec<u8>>, StoreError>;
}

impl Message {
    pub fn to_payload(&self) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_payload(payload: &[u8]) -> Result<Self, StoreError> {
        Ok(serde_json::from_slice(payload)?)
    }
}

pub async fn create_message_store(
    args: &Args
) -> Result<Arc<dyn MessageStore>, Box<dyn std::error::Error + Send + Sync>> {
    match args.store_type.to_lowercase().as_str() {
        "redis" => {
            let store = RedisMessageStore::connect(
                &args.store_host,
                args.store_redis_prefix.clone()
            ).await?;
            Ok(Arc::new(store))
        }
        "memory" => Ok(Arc::new(MemoryMessageStore::new())),
        _ =>
            Err(
                Box::new(
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("Unsupported message store type: {}", args.store_type)
                    )
                )
            ),
    }
}

pub async fn initialize_message_store(
    args: &Args
) -> Result<Arc<dyn MessageStore>, Box<dyn std::error::Error + Send + Sync>> {
    if args.store_type.eq_ignore_ascii_case("memory") {
        info!("Chat history will be kept in memory and lost on restart");
    } else {
        info!("Chat history will be stored in: {} at {}", args.store_type, args.store_host);
    }
    create_message_store(args).await
}
