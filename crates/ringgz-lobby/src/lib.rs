//! Lobby management for the Ringgz server.
//!
//! This crate owns everything that happens between `join` and the start of
//! a game:
//!
//! 1. **Registration**: unique, wire-safe player names
//! 2. **Random matchmaking**: a join queue that forms a game once it holds
//!    the configured match size ([`MatchSize`])
//! 3. **Challenges**: named invitations that become a game when every
//!    invitee accepts ([`Challenge`])
//!
//! Operations return a [`LobbyOutcome`]: the commands to deliver and, when
//! a game formed, its participants. Delivering them is the gateway's job.
//!
//! # How it fits in the stack
//!
//! ```text
//! Gateway (above)  ← calls the lobby, delivers notices, starts games
//!     ↕
//! Lobby (this crate)  ← player states, queue, challenges
//!     ↕
//! Protocol (below)  ← PlayerName, ServerCommand, Recipient
//! ```

mod error;
mod manager;
mod state;

pub use error::LobbyError;
pub use manager::{Lobby, LobbyOutcome, Notice};
pub use state::{
    Challenge, LobbyConfig, MAX_PLAYERS, MIN_PLAYERS, MatchSize, PlayerState,
};
