use thiserror::Error;

/// Separator between the two participants of a chat descriptor.
pub const SEPARATOR: char = ':';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("invalid chat '{chat}', should be in the format of user1:user2")]
    InvalidParticipant { chat: String },
}

/// Splits a raw `sender:receiver` descriptor into its two parts.
///
/// Returns `None` unless there is exactly one separator and both sides are
/// non-empty. Case is preserved.
pub fn split_participants(chat: &str) -> Option<(&str, &str)> {
    let mut parts = chat.split(SEPARATOR);
    let first = parts.next()?;
    let second = parts.next()?;
    if parts.next().is_some() || first.is_empty() || second.is_empty() {
        return None;
    }
    Some((first, second))
}

/// Derives the canonical conversation key for a chat descriptor.
///
/// Both participants are lower-cased and ordered, so `Bob:Alice` and
/// `alice:bob` address the same conversation.
pub fn derive(chat: &str) -> Result<String, KeyError> {
    let lowered = chat.to_lowercase();
    let (first, second) = split_participants(&lowered).ok_or_else(|| {
        KeyError::InvalidParticipant { chat: chat.to_string() }
    })?;
    Ok(join_ordered(first, second))
}

/// Same normalization as [`derive`] for two separately supplied participants.
pub fn derive_pair(a: &str, b: &str) -> Result<String, KeyError> {
    derive(&format!("{}{}{}", a, SEPARATOR, b))
}

fn join_ordered(a: &str, b: &str) -> String {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    format!("{}{}{}", low, SEPARATOR, high)
}
