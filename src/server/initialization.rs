// src/server/initialization.rs

//! Performs the server's startup sequence: building the shared state and
//! binding the TCP listener.

use super::context::ServerContext;
use crate::config::Config;
use crate::core::state::ServerState;
use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::info;

pub async fn setup(config: Config) -> Result<ServerContext> {
    let listen_addr = format!("{}:{}", config.host, config.port);

    let listener = TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("Failed to bind to address {listen_addr}"))?;
    info!("Citrine listening on {}", listen_addr);

    let state = ServerState::new(config);
    let (shutdown_tx, _) = broadcast::channel(1);

    Ok(ServerContext {
        state,
        listener,
        shutdown_tx,
    })
}
