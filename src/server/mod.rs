pub mod api;
pub mod tls;
pub mod websocket;

use crate::cli::Args;
use crate::models::chat::{ PullRequest, PullResponse, SendRequest, SendResponse };
use crate::service::Relay;
use log::warn;
use std::error::Error;
use std::time::Duration;
use tokio::time::timeout;

/// Reply code for requests that outlive the configured request timeout.
pub const TIMEOUT_CODE: i32 = 7;

pub struct Server {
    addr: String,
    relay: Relay,
    args: Args,
}

impl Server {
    pub fn new(addr: String, relay: Relay, args: Args) -> Self {
        Self { addr, relay, args }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        if let Some(http_port) = self.args.http_port {
            api::start_http_server(http_port, self.relay.clone(), self.args.clone()).await?;
        }

        websocket::start_ws_server(&self.addr, self.relay.clone(), self.args.clone()).await
    }
}

pub(crate) fn request_timeout(args: &Args) -> Duration {
    Duration::from_secs(args.request_timeout_secs.max(1))
}

/// Runs a send with a deadline; dropping the future cancels any store I/O in flight.
pub async fn send_with_timeout(relay: &Relay, req: SendRequest, limit: Duration) -> SendResponse {
    let chat = req.chat.clone();
    match timeout(limit, relay.send(req)).await {
        Ok(resp) => resp,
        Err(_) => {
            warn!("Send for chat '{}' timed out after {:?}", chat, limit);
            SendResponse {
                code: TIMEOUT_CODE,
                message: "request timed out".to_string(),
            }
        }
    }
}

pub async fn pull_with_timeout(relay: &Relay, req: PullRequest, limit: Duration) -> PullResponse {
    let chat = req.chat.clone();
    match timeout(limit, relay.pull(req)).await {
        Ok(resp) => resp,
        Err(_) => {
            warn!("Pull for chat '{}' timed out after {:?}", chat, limit);
            PullResponse {
                code: TIMEOUT_CODE,
                message: "request timed out".to_string(),
                ..PullResponse::default()
            }
        }
    }
}
