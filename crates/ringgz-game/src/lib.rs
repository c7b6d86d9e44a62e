//! Game sessions for Ringgz.
//!
//! Each game runs as an isolated Tokio task (actor model) that owns a
//! [`GameSession`]: the participants, their colors, the board, and whose
//! turn it is.
//!
//! # Key types
//!
//! - [`GameSession`]: synchronous turn, forfeit, and scoring rules
//! - [`GameManager`]: starts games, tracks player → game
//! - [`GameHandle`]: send moves, chat, and disconnects to a running game
//! - [`Outbound`]: what a player's connection receives
//! - [`GameConfig`]: starting base and channel sizing

mod actor;
mod config;
mod error;
mod manager;
mod session;

pub use actor::{GameHandle, GameInfo, Outbound, PlayerSender};
pub use config::GameConfig;
pub use error::GameError;
pub use manager::GameManager;
pub use session::{GameId, GameSession, GameStatus, Notice};
