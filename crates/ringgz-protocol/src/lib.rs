//! Wire protocol for the Ringgz server.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Commands** ([`ClientCommand`], [`ServerCommand`]): one closed enum
//!   per direction, so every dispatch site is checked for exhaustiveness.
//! - **Codec** ([`Wire`] trait): how a command becomes a `~`-delimited
//!   line and back.
//! - **Types** ([`PlayerName`], [`ErrorCode`], [`Recipient`]): shared
//!   vocabulary for the layers above.
//! - **Errors** ([`ProtocolError`]): why a line could not be decoded.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (lines of text) and the
//! lobby/game layers. It doesn't know about connections or games; it only
//! knows how to turn lines into commands and commands into lines.
//!
//! ```text
//! Transport (lines) → Protocol (commands) → Lobby / Game (rules)
//! ```

mod codec;
mod command;
mod error;
mod types;

pub use codec::{DELIMITER, Wire};
pub use command::{ClientCommand, ServerCommand};
pub use error::ProtocolError;
pub use types::{ErrorCode, PlayerName, Recipient};
