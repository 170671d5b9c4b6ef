pub mod cli;
pub mod conversation;
pub mod error;
pub mod history;
pub mod models;
pub mod server;
pub mod service;

use cli::Args;
use history::initialize_message_store;
use log::info;
use server::Server;
use service::Relay;
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Relay Configuration ---");
    info!("Server Address: {}", args.server_addr);
    match args.http_port {
        Some(port) => info!("HTTP API Port: {}", port),
        None => info!("HTTP API: disabled"),
    }
    info!("Message Store Type: {}", args.store_type);
    info!("Message Store Host: {}", args.store_host);
    if !args.store_redis_prefix.is_empty() {
        info!("Redis Key Prefix: {}", args.store_redis_prefix);
    }
    info!("Request Timeout: {}s", args.request_timeout_secs);
    info!("TLS Enabled: {}", args.enable_tls);
    info!("---------------------------");

    let store = initialize_message_store(&args).await?;
    let relay = Relay::new(store);
    let server = Server::new(args.server_addr.clone(), relay, args);
    server.run().await?;

    Ok(())
}
