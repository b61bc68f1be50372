//! featureboard TCP server
//!
//! Accept loop and per-connection request handling: each line is decoded
//! into a command, dispatched against the shared store, and answered with
//! a single response line. Uses tokio async I/O with one task per client.

use crate::{
    error::{FeatureBoardError, Result},
    protocol::{parse_command, Command, Response},
    store::{MemoryStore, Store},
};
use std::sync::Arc;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    sync::{broadcast, Semaphore},
};
use tracing::{error, info, warn};

/// featureboard server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            max_connections: 1000,
        }
    }
}

/// featureboard TCP server
pub struct FeatureBoardServer {
    config: ServerConfig,
    store: Arc<MemoryStore>,
    connections: Arc<Semaphore>,
    shutdown_tx: broadcast::Sender<()>,
}

impl FeatureBoardServer {
    /// Create a new server instance owning the given store
    pub fn new(config: ServerConfig, store: MemoryStore) -> Self {
        let connections = Arc::new(Semaphore::new(config.max_connections));
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            store: Arc::new(store),
            connections,
            shutdown_tx,
        }
    }

    /// Start the server
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        info!("featureboard server listening on {}", self.config.bind_addr);

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                // Accept new connections
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            let permit = match Arc::clone(&self.connections).try_acquire_owned() {
                                Ok(permit) => permit,
                                Err(_) => {
                                    warn!("connection limit reached, dropping {}", addr);
                                    continue;
                                }
                            };

                            info!("new client connected: {}", addr);
                            let store = Arc::clone(&self.store);
                            let shutdown_rx = self.shutdown_tx.subscribe();

                            // Spawn a task to handle the client
                            tokio::spawn(async move {
                                if let Err(e) = Self::handle_client(stream, store, shutdown_rx).await {
                                    error!("error handling client {}: {}", addr, e);
                                }
                                info!("client disconnected: {}", addr);
                                drop(permit);
                            });
                        }
                        Err(e) => {
                            error!("failed to accept connection: {}", e);
                        }
                    }
                }

                // Handle shutdown signal
                _ = shutdown_rx.recv() => {
                    info!("shutdown signal received, stopping server");
                    break;
                }
            }
        }

        info!("server stopped");
        Ok(())
    }

    /// Handle a single client connection
    async fn handle_client(
        mut stream: TcpStream,
        store: Arc<MemoryStore>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<()> {
        let (reader, mut writer) = stream.split();
        let mut buf_reader = BufReader::new(reader);
        let mut line = String::new();

        loop {
            line.clear();

            tokio::select! {
                // Read command from client
                result = buf_reader.read_line(&mut line) => {
                    match result {
                        Ok(0) => {
                            // Client disconnected
                            break;
                        }
                        Ok(_) => {
                            let response = Self::process_command(&line, &store).await;
                            let response_bytes = match response.to_bytes() {
                                Ok(bytes) => bytes,
                                Err(e) => {
                                    error!("failed to encode response: {}", e);
                                    break;
                                }
                            };

                            if let Err(e) = writer.write_all(&response_bytes).await {
                                error!("failed to write response: {}", e);
                                break;
                            }

                            if let Err(e) = writer.flush().await {
                                error!("failed to flush response: {}", e);
                                break;
                            }
                        }
                        Err(e) => {
                            error!("failed to read from client: {}", e);
                            break;
                        }
                    }
                }

                // Handle shutdown signal
                _ = shutdown_rx.recv() => {
                    info!("shutdown signal received, closing client connection");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Process a command line from a client
    async fn process_command(line: &str, store: &Arc<MemoryStore>) -> Response {
        let command_bytes = line.trim().as_bytes();
        if command_bytes.is_empty() {
            return Response::Error("Empty command".to_string());
        }

        // Normalize the terminator for the parser
        let mut full_command = command_bytes.to_vec();
        if !full_command.ends_with(b"\r\n") && !full_command.ends_with(b"\n") {
            full_command.extend_from_slice(b"\r\n");
        }

        match parse_command(&full_command) {
            Ok(command) => Self::execute_command(command, store).await,
            Err(e) => Response::Error(format!("Parse error: {}", e)),
        }
    }

    /// Execute a parsed command against the store
    async fn execute_command(command: Command, store: &Arc<MemoryStore>) -> Response {
        match command {
            Command::List => match store.list_summaries().await {
                Ok(summaries) => Response::List(summaries),
                Err(e) => Self::error_response("LIST", e),
            },
            Command::Top => match store.top_feature().await {
                Ok(summary) => Response::Summary(summary),
                Err(e) => Self::error_response("TOP", e),
            },
            Command::Get { id } => match store.get_feature(id).await {
                Ok(feature) => Response::Feature(feature),
                Err(e) => Self::error_response("GET", e),
            },
            Command::Add(request) => {
                match store
                    .add_feature(request.title, request.description, request.details)
                    .await
                {
                    Ok(feature) => Response::Feature(feature),
                    Err(e) => Self::error_response("ADD", e),
                }
            }
            Command::Vote { id } => match store.vote_feature(id).await {
                Ok(feature) => Response::Feature(feature),
                Err(e) => Self::error_response("VOTE", e),
            },
            Command::Complete { id } => match store.complete_feature(id).await {
                Ok(feature) => Response::Feature(feature),
                Err(e) => Self::error_response("COMPLETE", e),
            },
            Command::Delete { id } => match store.delete_feature(id).await {
                Ok(()) => Response::Ok,
                Err(e) => Self::error_response("DELETE", e),
            },
        }
    }

    /// Map a store failure onto its wire category
    fn error_response(operation: &str, err: FeatureBoardError) -> Response {
        match err {
            FeatureBoardError::NotFound(msg) => Response::NotFound(msg),
            FeatureBoardError::InvalidArgument(msg) => Response::Invalid(msg),
            e => Response::Error(format!("{} failed: {}", operation, e)),
        }
    }

    /// Trigger graceful shutdown
    pub fn shutdown(&self) -> Result<()> {
        self.shutdown_tx.send(()).map_err(|_| {
            FeatureBoardError::Server("Failed to send shutdown signal".to_string())
        })?;
        Ok(())
    }
}
