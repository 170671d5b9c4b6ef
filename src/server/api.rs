use crate::cli::Args;
use crate::models::chat::{ PullRequest, SendRequest };
use crate::server::{ pull_with_timeout, request_timeout, send_with_timeout, tls, TIMEOUT_CODE };
use crate::service::Relay;
use std::error::Error;
use std::net::SocketAddr;
use std::time::Duration;
use axum::{
    routing::{ get, post },
    Router,
    Json,
    extract::State,
    response::IntoResponse,
    http::StatusCode,
};
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, error };

#[derive(Clone)]
struct AppState {
    relay: Relay,
    timeout: Duration,
}

pub fn router(relay: Relay, timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ping", get(ping_handler))
        .route("/api/send", post(send_handler))
        .route("/api/pull", post(pull_handler))
        .layer(cors)
        .with_state(AppState { relay, timeout })
}

pub async fn start_http_server(
    http_port: u16,
    relay: Relay,
    args: Args
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = format!("0.0.0.0:{}", http_port).parse::<SocketAddr>()?;
    check_tls_args(&args)?;
    let app = router(relay, request_timeout(&args));

    if let Some((cert_path, key_path)) = args.tls_paths() {
        info!("Starting HTTPS API server on: https://{}", addr);
        let config = tls::load_tls_config(cert_path, key_path)?;
        let tls_config = axum_server::tls_rustls::RustlsConfig::from_config(config);

        tokio::spawn(async move {
            let result = axum_server::bind_rustls(addr, tls_config)
                .serve(app.into_make_service())
                .await;

            if let Err(e) = result {
                error!("HTTPS server error: {}", e);
            }
        });
    } else {
        info!("Starting HTTP API server on: http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app.into_make_service()).await {
                error!("HTTP server error: {}", e);
            }
        });
    }

    Ok(())
}

/// Refuses `--enable-tls` without both PEM paths instead of serving plain HTTP.
fn check_tls_args(args: &Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    if args.enable_tls && args.tls_paths().is_none() {
        error!("Both --tls-cert-path and --tls-key-path must be provided to enable TLS.");
        return Err("TLS enabled without cert/key".into());
    }
    Ok(())
}

/// Maps a reply code onto the HTTP status returned alongside it.
pub fn status_for_code(code: i32) -> StatusCode {
    match code {
        0 => StatusCode::OK,
        1..=5 => StatusCode::BAD_REQUEST,
        TIMEOUT_CODE => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn ping_handler() -> &'static str {
    "pong"
}

async fn send_handler(
    State(state): State<AppState>,
    Json(req): Json<SendRequest>
) -> impl IntoResponse {
    let resp = send_with_timeout(&state.relay, req, state.timeout).await;
    (status_for_code(resp.code), Json(resp))
}

async fn pull_handler(
    State(state): State<AppState>,
    Json(req): Json<PullRequest>
) -> impl IntoResponse {
    let resp = pull_with_timeout(&state.relay, req, state.timeout).await;
    (status_for_code(resp.code), Json(resp))
}
