//! featureboard server binary
//!
//! Main entry point for the featureboard TCP server

use featureboard::{FeatureBoardServer, MemoryStore, Result, ServerConfig};
use std::env;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (INFO level by default, override with RUST_LOG)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Bind address from the first argument, defaults otherwise
    let mut config = ServerConfig::default();
    if let Some(addr) = env::args().nth(1) {
        config.bind_addr = addr;
    }

    // The store lives for the process lifetime and starts with the launch
    // data set; it is owned by the server, not a global.
    let store = MemoryStore::with_seed_data();
    let server = Arc::new(FeatureBoardServer::new(config, store));

    // Setup graceful shutdown on SIGINT (Ctrl+C)
    let server_clone = Arc::clone(&server);
    tokio::spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to listen for Ctrl+C: {}", e);
            return;
        }

        info!("received Ctrl+C, initiating graceful shutdown");
        if let Err(e) = server_clone.shutdown() {
            error!("failed to initiate shutdown: {}", e);
        }
    });

    // Run the server
    server.run().await?;

    Ok(())
}
