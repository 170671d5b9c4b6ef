use crate::history::StoreError;
use thiserror::Error;

/// Everything that can end a send or pull request.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("'{chat}' is an invalid chat id, chat id should be in the format of sender:receiver")]
    InvalidChatId { chat: String },

    #[error("message should not be empty")]
    EmptyMessage,

    #[error("'{sender}' is an invalid sender, sender is not in chat '{chat}'")]
    SenderNotInChat {
        sender: String,
        chat: String,
    },

    #[error("chat id is required")]
    MissingChatId,

    #[error("invalid range: start index {start}, end index {end}")]
    InvalidRange { start: i64, end: i64 },

    #[error("store failure: {0}")]
    StoreFailure(#[from] StoreError),
}

impl ChatError {
    /// Response code carried by RPC replies; `0` is reserved for success.
    pub fn code(&self) -> i32 {
        match self {
            ChatError::InvalidChatId { .. } => 1,
            ChatError::EmptyMessage => 2,
            ChatError::SenderNotInChat { .. } => 3,
            ChatError::MissingChatId => 4,
            ChatError::InvalidRange { .. } => 5,
            ChatError::StoreFailure(_) => 6,
        }
    }

    /// True when the request itself was at fault rather than the store.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ChatError::StoreFailure(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct_and_non_zero() {
        let errors = [
            ChatError::InvalidChatId { chat: "x".into() },
            ChatError::EmptyMessage,
            ChatError::SenderNotInChat { sender: "c".into(), chat: "a:b".into() },
            ChatError::MissingChatId,
            ChatError::InvalidRange { start: 3, end: 2 },
            ChatError::StoreFailure(StoreError::InvalidField {
                key: "a:b".into(),
                field: "x".into(),
            }),
        ];
        let mut codes: Vec<i32> = errors.iter().map(ChatError::code).collect();
        assert!(codes.iter().all(|c| *c != 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_store_failure_is_not_client_error() {
        let err: ChatError = StoreError::InvalidField { key: "k".into(), field: "f".into() }.into();
        assert!(!err.is_client_error());
        assert!(ChatError::EmptyMessage.is_client_error());
    }

    #[test]
    fn test_messages_carry_context() {
        let err = ChatError::SenderNotInChat { sender: "carol".into(), chat: "alice:bob".into() };
        assert_eq!(err.to_string(), "'carol' is an invalid sender, sender is not in chat 'alice:bob'");
    }
}
