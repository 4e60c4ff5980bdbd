//! Documentation of an SMS raffle platform.
//!
//!
//!
//! # General Infrastructure
//! - A local SMS gateway forwards inbound texts to our webhook endpoint
//! - One entry per phone number, the first accepted text wins the slot
//! - Participants optionally join an external channel, membership is checked
//!   through a bot and stored next to the entry
//! - The draw picks winners at random from whoever has not won yet, preferring
//!   channel members when there are enough of them
//! - Admin frontend talks to this server over plain JSON
//!
//!
//!
//! # Notes
//!
//! ## SQLite
//! The whole dataset is one table of phone numbers, so a single SQLite file is
//! enough. We get uniqueness on the phone column for free from the index,
//! which is what makes repeated texts from the same number a no-op instead of
//! a second entry.
//!
//! Winner marking runs inside one transaction with the pool query. Two draws
//! racing each other would otherwise both read the same unwon rows and hand
//! out overlapping winners.
//!
//! ## Draw policy
//! Entries outside the configured evening window are logged but still
//! accepted. The window stays advisory until an event actually needs it to be
//! hard, flipping it then is a one-line change in the gate.
//!
//!
//!
//! # Setup
//!
//! Run the server.
//! ```sh
//! RUST_LOG=info cargo run -p raffle
//! ```
//!
//! Send an entry.
//! ```sh
//! curl -X POST localhost:3000/api/sms-webhook \
//!   -H 'Content-Type: application/json' \
//!   -d '{"from": "09121111111", "message": "9"}'
//! ```
//!
//! Draw five winners.
//! ```sh
//! curl -X POST localhost:3000/api/raffle/draw \
//!   -H 'Content-Type: application/json' -d '{"count": 5}'
//! ```
//!
//! Seed mock entries through the gateway simulation.
//! ```sh
//! curl -X POST localhost:3000/api/sms/sync
//! ```
use std::time::Duration;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod channel;
pub mod config;
pub mod database;
pub mod error;
pub mod gateway;
pub mod ingest;
pub mod raffle;
pub mod routes;
pub mod session;
pub mod state;

use routes::{
    channel_status_handler, draw_handler, login_handler, participants_handler, reset_handler,
    sms_sync_handler, sms_webhook_handler,
};
use state::State;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = State::new().await;

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let app = Router::new()
        .route("/api/sms-webhook", post(sms_webhook_handler))
        .route("/api/sms/sync", post(sms_sync_handler))
        .route("/api/eitaa/status", get(channel_status_handler))
        .route("/api/participants", get(participants_handler))
        .route("/api/raffle/draw", post(draw_handler))
        .route("/api/raffle/reset", post(reset_handler))
        .route("/api/login", post(login_handler))
        .layer(cors)
        .with_state(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
