//! Settlers game server.

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod protocol;
mod server;
mod session;

use config::ServerConfig;
use server::ServerState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    info!(addr = %config.addr, rules = ?config.rules, "Starting settlers server...");

    let state = Arc::new(ServerState::new(config));
    let game_id = state.open_default_game()?;
    info!(%game_id, "Default game ready");
    server::run_server(state).await
}
