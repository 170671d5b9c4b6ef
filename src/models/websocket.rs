use serde::{ Serialize, Deserialize };
use crate::models::chat::{ PullResponse, SendResponse };

#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "send")] Send {
        chat: String,
        sender: String,
        text: String,
    },
    #[serde(rename = "pull")] Pull {
        chat: String,
        #[serde(default)]
        cursor: i64,
        #[serde(default)]
        limit: i32,
        #[serde(default)]
        reverse: bool,
    },
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "send_result")] SendResult(SendResponse),
    #[serde(rename = "pull_result")] PullResult(PullResponse),
    #[serde(rename = "error")] Error {
        message: String,
    },
}
