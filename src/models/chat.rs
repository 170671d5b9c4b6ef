use serde::{ Serialize, Deserialize };

/// A message as it is persisted in a conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub sender: String,
    pub timestamp: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SendRequest {
    pub chat: String,
    pub sender: String,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResponse {
    pub code: i32,
    pub message: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PullRequest {
    pub chat: String,
    pub cursor: i64,
    pub limit: i32,
    pub reverse: bool,
}

/// A message as returned to pulling clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub chat: String,
    pub text: String,
    pub sender: String,
    pub send_time: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullResponse {
    pub messages: Vec<ChatMessage>,
    pub code: i32,
    pub message: String,
    pub has_more: bool,
    pub next_cursor: i64,
}
