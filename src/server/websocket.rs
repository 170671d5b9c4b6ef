use crate::cli::Args;
use crate::models::chat::{ PullRequest, SendRequest };
use crate::models::websocket::{ ClientMessage, ServerMessage };
use crate::server::{ pull_with_timeout, request_timeout, send_with_timeout, tls };
use crate::service::Relay;

use std::error::Error;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::io::{ AsyncRead, AsyncWrite };

use tokio_tungstenite::{ accept_async, WebSocketStream };
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_rustls::TlsAcceptor;

use lazy_static::lazy_static;
use governor::{ RateLimiter, Quota, state::{ InMemoryState, NotKeyed }, clock::DefaultClock };

use log::{ debug, info, warn, error };
use futures::{ SinkExt, StreamExt };
use uuid::Uuid;

const MAX_MESSAGE_SIZE: usize = 1 * 1024 * 1024;
const CONNECTIONS_PER_SECOND: u32 = 10;

lazy_static! {
    static ref CONNECTION_LIMITER: RateLimiter<NotKeyed, InMemoryState, DefaultClock> =
        RateLimiter::direct(
            Quota::per_second(NonZeroU32::new(CONNECTIONS_PER_SECOND).unwrap_or(NonZeroU32::MIN))
        );
}

pub async fn start_ws_server(
    addr: &str,
    relay: Relay,
    args: Args
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let listener = TcpListener::bind(addr).await?;

    let tls_acceptor = match args.tls_paths() {
        Some((cert_path, key_path)) => {
            info!(
                "TLS enabled. Loading certificate from '{}' and key from '{}'",
                cert_path,
                key_path
            );
            Some(TlsAcceptor::from(tls::load_tls_config(cert_path, key_path)?))
        }
        None if args.enable_tls => {
            error!("Both --tls-cert-path and --tls-key-path must be provided to enable TLS.");
            return Err("TLS enabled without cert/key".into());
        }
        None => None,
    };
    let protocol = if tls_acceptor.is_some() { "WSS" } else { "WS" };
    info!("{} server listening on: {}", protocol, addr);

    let timeout = request_timeout(&args);

    loop {
        let (stream, peer) = listener.accept().await?;

        if CONNECTION_LIMITER.check().is_err() {
            warn!("Global connection rate limit exceeded for {}. Dropping connection.", peer);
            continue;
        }

        info!("Incoming connection from: {}", peer);
        let relay = relay.clone();
        let tls_acceptor = tls_acceptor.clone();

        tokio::spawn(async move {
            let process_result = if let Some(acceptor) = tls_acceptor {
                match acceptor.accept(stream).await {
                    Ok(tls_stream) => process_connection(peer, tls_stream, relay, timeout).await,
                    Err(e) => {
                        error!("TLS handshake error for {}: {}", peer, e);
                        Err(Box::new(e) as Box<dyn Error + Send + Sync>)
                    }
                }
            } else {
                process_connection(peer, stream, relay, timeout).await
            };

            if let Err(e) = process_result {
                error!("Failed to process connection for {}: {}", peer, e);
            }
        });
    }
}

async fn process_connection<S>(
    peer: SocketAddr,
    stream: S,
    relay: Relay,
    timeout: Duration
) -> Result<(), Box<dyn Error + Send + Sync>>
    where S: AsyncRead + AsyncWrite + Unpin + Send + 'static
{
    match accept_async(stream).await {
        Ok(ws) => {
            handle_connection(peer, ws, relay, timeout).await;
            Ok(())
        }
        Err(e) => {
            error!("Handshake failed for {}: {}", peer, e);
            Err(Box::new(e) as _)
        }
    }
}

/// Runs one client request against the relay.
pub async fn dispatch(relay: &Relay, msg: ClientMessage, timeout: Duration) -> ServerMessage {
    match msg {
        ClientMessage::Send { chat, sender, text } => {
            let req = SendRequest { chat, sender, text };
            ServerMessage::SendResult(send_with_timeout(relay, req, timeout).await)
        }
        ClientMessage::Pull { chat, cursor, limit, reverse } => {
            let req = PullRequest { chat, cursor, limit, reverse };
            ServerMessage::PullResult(pull_with_timeout(relay, req, timeout).await)
        }
    }
}

fn encode(msg: &ServerMessage) -> Message {
    match serde_json::to_string(msg) {
        Ok(json) => Message::Text(json),
        Err(e) => {
            error!("Failed to encode server message: {}", e);
            Message::Text(r#"{"type":"error","message":"internal encoding error"}"#.to_string())
        }
    }
}

pub async fn handle_connection<S>(
    peer: SocketAddr,
    websocket: WebSocketStream<S>,
    relay: Relay,
    timeout: Duration
)
    where S: AsyncRead + AsyncWrite + Unpin
{
    let (mut tx, mut rx) = websocket.split();
    let connection_id = Uuid::new_v4();
    info!("New WebSocket connection {} from {}", connection_id, peer);

    while let Some(msg) = rx.next().await {
        let message = match msg {
            Ok(message) => message,
            Err(e) => {
                match e {
                    | tokio_tungstenite::tungstenite::Error::ConnectionClosed
                    | tokio_tungstenite::tungstenite::Error::Protocol(_)
                    | tokio_tungstenite::tungstenite::Error::Utf8 => {
                        info!("WebSocket connection closed or protocol error for {}: {}", peer, e);
                    }
                    tokio_tungstenite::tungstenite::Error::Io(ref io_err) if
                        io_err.kind() == std::io::ErrorKind::ConnectionReset
                    => {
                        info!("WebSocket connection reset by peer {}", peer);
                    }
                    _ => {
                        error!("Error receiving message from {}: {}", peer, e);
                    }
                }
                break;
            }
        };

        if message.len() > MAX_MESSAGE_SIZE {
            warn!(
                "Message from {} exceeds size limit ({} > {})",
                peer,
                message.len(),
                MAX_MESSAGE_SIZE
            );
            let reply = ServerMessage::Error { message: "Message too large".to_string() };
            if tx.send(encode(&reply)).await.is_err() {
                error!("Failed to send size limit error to {}", peer);
            }
            break;
        }

        let reply = match message {
            Message::Text(text) => {
                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(request) => {
                        debug!("{} -> {:?}", peer, request);
                        dispatch(&relay, request, timeout).await
                    }
                    Err(e) => {
                        warn!("Failed to parse message from {}: {}", peer, e);
                        ServerMessage::Error { message: format!("Failed to parse message: {}", e) }
                    }
                }
            }
            Message::Ping(ping_data) => {
                if tx.send(Message::Pong(ping_data)).await.is_err() {
                    error!("Failed to send pong to {}", peer);
                    break;
                }
                continue;
            }
            Message::Close(_) => {
                info!("Received close frame from {}", peer);
                break;
            }
            Message::Binary(_) => {
                warn!("Ignoring binary message from {}", peer);
                continue;
            }
            Message::Pong(_) | Message::Frame(_) => {
                continue;
            }
        };

        if let Err(e) = tx.send(encode(&reply)).await {
            error!("Error sending reply to {}: {}", peer, e);
            break;
        }
    }
    info!("WebSocket connection {} closed for {}", connection_id, peer);
}
