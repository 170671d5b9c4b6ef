use crate::conversation;
use crate::error::ChatError;
use crate::history::MessageStore;
use crate::models::chat::Message;
use log::debug;
use std::sync::Arc;

pub const DEFAULT_LIMIT: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullPage {
    pub messages: Vec<Message>,
    pub has_more: bool,
    pub next_cursor: i64,
}

/// Slice of the sorted history selected by a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: usize,
    /// Exclusive.
    pub end: usize,
    pub has_more: bool,
}

/// Resolves `cursor`/`limit` against `total` sorted items.
///
/// The window is `[cursor, cursor + limit - 1]`, computed from the raw cursor
/// and clamped to the available indices afterwards. One extra item past the
/// window is probed so that overflow can be reported as `has_more`. A window
/// that clamps to nothing is an `InvalidRange`; callers handle the empty
/// conversation before this.
pub fn resolve_window(total: usize, cursor: i64, limit: i64) -> Result<Window, ChatError> {
    let last = total as i64 - 1;
    let start = cursor.max(0);
    let end = cursor.saturating_add(limit.saturating_sub(1)).min(last);
    if end < start {
        return Err(ChatError::InvalidRange { start, end });
    }

    let probe_end = cursor.saturating_add(limit).min(last);
    let probed = probe_end - start + 1;
    Ok(Window {
        start: start as usize,
        end: (end + 1) as usize,
        has_more: probed > limit,
    })
}

#[derive(Clone)]
pub struct PullService {
    store: Arc<dyn MessageStore>,
}

impl PullService {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    pub async fn pull(
        &self,
        chat: &str,
        cursor: i64,
        limit: i64,
        reverse: bool
    ) -> Result<PullPage, ChatError> {
        if chat.is_empty() {
            return Err(ChatError::MissingChatId);
        }
        let limit = if limit <= 0 { DEFAULT_LIMIT } else { limit };
        let next_cursor = cursor.saturating_add(limit);

        let key = conversation::derive(chat).map_err(|_| ChatError::InvalidChatId {
            chat: chat.to_string(),
        })?;
        let mut stored = self.store.fetch_all(&key).await?;
        debug!("Fetched {} messages for {}", stored.len(), key);

        if stored.is_empty() {
            return Ok(PullPage {
                messages: Vec::new(),
                has_more: false,
                next_cursor,
            });
        }

        // Fields are timestamps, so there are no ties to break.
        let mut timestamps: Vec<i64> = stored.keys().copied().collect();
        timestamps.sort_unstable();
        if reverse {
            timestamps.reverse();
        }

        let window = resolve_window(timestamps.len(), cursor, limit)?;
        let mut messages = Vec::with_capacity(window.end - window.start);
        for timestamp in &timestamps[window.start..window.end] {
            if let Some(payload) = stored.remove(timestamp) {
                messages.push(Message::from_payload(&payload)?);
            }
        }

        Ok(PullPage {
            messages,
            has_more: window.has_more,
            next_cursor,
        })
    }
}
