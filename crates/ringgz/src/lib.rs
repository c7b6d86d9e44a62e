//! # Ringgz
//!
//! A multiplayer server for Ringgz, a board game for two to four players
//! on a 5×5 grid of ring stacks.
//!
//! Clients connect over TCP and speak a line protocol (`keyword~arg~arg`).
//! They join a lobby, get matched at random or challenge each other, and
//! then take turns placing rings until nobody can move. This crate ties
//! the layers together:
//!
//! ```text
//! ringgz-transport → ringgz-protocol → ringgz-lobby / ringgz-game → ringgz-board
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ringgz::prelude::*;
//!
//! # async fn start() -> Result<(), RinggzError> {
//! let config = ServerConfig::default();
//! ringgz::init_tracing(&config.log_filter);
//!
//! let server = RinggzServer::builder().config(config).build().await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use error::{ConfigError, RinggzError};
pub use server::{RinggzServer, ServerBuilder};

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` (for example
/// `"info"` or `"ringgz=debug"`) is used. Calling it twice is harmless.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub mod prelude {
    pub use crate::{ConfigError, RinggzError, RinggzServer, ServerBuilder, ServerConfig};
    pub use ringgz_protocol::{ClientCommand, ErrorCode, PlayerName, ServerCommand, Wire};
}
