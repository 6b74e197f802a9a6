//! `SweepduelServer` builder and server loop.
//!
//! This is the entry point for running a Sweepduel server. It ties
//! together all the layers: transport → protocol → room → session.

use std::sync::Arc;

use sweepduel_protocol::{Codec, JsonCodec};
use sweepduel_room::{RoomConfig, RoomRegistry};
use sweepduel_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::{ServerConfig, SweepduelError};

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) registry: Arc<Mutex<RoomRegistry>>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Sweepduel server.
///
/// # Example
///
/// ```rust,no_run
/// use sweepduel::prelude::*;
///
/// # async fn start() -> Result<(), SweepduelError> {
/// let server = SweepduelServer::builder()
///     .bind("0.0.0.0:8765")
///     .room_config(RoomConfig::default())
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SweepduelServerBuilder {
    config: ServerConfig,
}

impl SweepduelServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind = addr.to_string();
        self
    }

    /// Sets the configuration every room is created with.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.config.room = config;
        self
    }

    /// Validates the configuration and binds the listener.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<SweepduelServer, SweepduelError> {
        self.config.room.validate()?;
        let transport = WebSocketTransport::bind(&self.config.bind).await?;

        let state = Arc::new(ServerState {
            registry: Arc::new(Mutex::new(RoomRegistry::new(self.config.room))),
            codec: JsonCodec,
        });

        Ok(SweepduelServer { transport, state })
    }
}

/// A bound Sweepduel server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct SweepduelServer<C: Codec = JsonCodec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl SweepduelServer {
    /// Creates a new builder.
    pub fn builder() -> SweepduelServerBuilder {
        SweepduelServerBuilder::new()
    }
}

impl<C: Codec + Clone> SweepduelServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// The registry holding every live room.
    pub fn registry(&self) -> Arc<Mutex<RoomRegistry>> {
        Arc::clone(&self.state.registry)
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each
    /// one. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), SweepduelError> {
        tracing::info!(addr = ?self.local_addr().ok(), "sweepduel server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
