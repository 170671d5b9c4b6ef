pub mod pull;
pub mod send;

pub use self::pull::{ PullPage, PullService, DEFAULT_LIMIT };
pub use self::send::{ Clock, SendConfirmation, SendService };

use crate::error::ChatError;
use crate::history::MessageStore;
use crate::models::chat::{ ChatMessage, PullRequest, PullResponse, SendRequest, SendResponse };
use log::{ error, info, warn };
use std::sync::Arc;

/// RPC-facing entry point: runs the services and folds their errors into
/// `{code, message}` replies.
#[derive(Clone)]
pub struct Relay {
    sender: SendService,
    puller: PullService,
}

impl Relay {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self {
            sender: SendService::new(store.clone()),
            puller: PullService::new(store),
        }
    }

    pub fn with_clock(store: Arc<dyn MessageStore>, clock: Clock) -> Self {
        Self {
            sender: SendService::with_clock(store.clone(), clock),
            puller: PullService::new(store),
        }
    }

    pub async fn send(&self, req: SendRequest) -> SendResponse {
        match self.sender.send(&req.chat, &req.sender, &req.text).await {
            Ok(confirmation) => {
                info!("Message from {} sent to {}", req.sender, confirmation.key);
                SendResponse {
                    code: 0,
                    message: confirmation.message(),
                }
            }
            Err(e) => {
                log_failure("send", &req.chat, &e);
                SendResponse {
                    code: e.code(),
                    message: e.to_string(),
                }
            }
        }
    }

    pub async fn pull(&self, req: PullRequest) -> PullResponse {
        let result = self.puller.pull(
            &req.chat,
            req.cursor,
            i64::from(req.limit),
            req.reverse
        ).await;
        match result {
            Ok(page) => {
                let messages = page.messages
                    .into_iter()
                    .map(|msg| ChatMessage {
                        chat: req.chat.clone(),
                        text: msg.text,
                        sender: msg.sender,
                        send_time: msg.timestamp,
                    })
                    .collect();
                PullResponse {
                    messages,
                    code: 0,
                    message: "success".to_string(),
                    has_more: page.has_more,
                    next_cursor: page.next_cursor,
                }
            }
            Err(e) => {
                log_failure("pull", &req.chat, &e);
                PullResponse {
                    code: e.code(),
                    message: e.to_string(),
                    ..PullResponse::default()
                }
            }
        }
    }
}

fn log_failure(operation: &str, chat: &str, e: &ChatError) {
    if e.is_client_error() {
        warn!("Rejected {} for chat '{}': {}", operation, chat, e);
    } else {
        error!("{} failed for chat '{}': {}", operation, chat, e);
    }
}
