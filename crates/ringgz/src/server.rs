//! `RinggzServer` builder and server loop.
//!
//! This is the entry point for running a Ringgz server. It ties together
//! all the layers: transport → protocol → lobby / game.

use std::collections::HashMap;
use std::sync::Arc;

use ringgz_game::{GameManager, PlayerSender};
use ringgz_lobby::Lobby;
use ringgz_protocol::PlayerName;
use ringgz_transport::{TcpLineTransport, Transport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::{RinggzError, ServerConfig};

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks.
///
/// Locks are always taken in field order (`lobby`, then `outboxes`, then
/// `games`) and never held across socket I/O.
pub(crate) struct ServerState {
    pub(crate) lobby: Mutex<Lobby>,

    /// Outbox of every joined player, keyed by name.
    pub(crate) outboxes: Mutex<HashMap<PlayerName, PlayerSender>>,

    pub(crate) games: Mutex<GameManager>,
}

impl ServerState {
    pub(crate) fn new(config: &ServerConfig) -> Self {
        Self {
            lobby: Mutex::new(Lobby::new(config.lobby_config())),
            outboxes: Mutex::new(HashMap::new()),
            games: Mutex::new(GameManager::new(config.game_config())),
        }
    }
}

/// Builder for configuring and starting a Ringgz server.
///
/// # Example
///
/// ```rust,no_run
/// # async fn start() -> Result<(), ringgz::RinggzError> {
/// use ringgz::RinggzServer;
///
/// let server = RinggzServer::builder()
///     .bind("0.0.0.0:4000")
///     .starting_base(12)
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct ServerBuilder {
    config: ServerConfig,
}

impl ServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Replaces all settings.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Uses `field` as the starting base of every game.
    pub fn starting_base(mut self, field: usize) -> Self {
        self.config.starting_base = Some(field);
        self
    }

    /// Sets how many queued players form a random match.
    pub fn match_size(mut self, players: usize) -> Self {
        self.config.match_size = players;
        self.config.random_match_size = false;
        self
    }

    /// Sets the longest accepted inbound line.
    pub fn max_line_length(mut self, bytes: usize) -> Self {
        self.config.max_line_length = bytes;
        self
    }

    /// Validates the settings and binds the listener.
    pub async fn build(self) -> Result<RinggzServer, RinggzError> {
        self.config.validate()?;

        let transport =
            TcpLineTransport::bind(&self.config.bind_addr, self.config.max_line_length)
                .await?;

        let state = Arc::new(ServerState::new(&self.config));

        Ok(RinggzServer { transport, state })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Ringgz server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct RinggzServer {
    transport: TcpLineTransport,
    state: Arc<ServerState>,
}

impl RinggzServer {
    /// Creates a new builder.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Spawns a handler task for each accepted connection. Runs until the
    /// process is terminated.
    pub async fn run(mut self) -> Result<(), RinggzError> {
        tracing::info!("Ringgz server running");

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
