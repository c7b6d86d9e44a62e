//! Unified error type for the Ringgz server.

use ringgz_game::GameError;
use ringgz_lobby::LobbyError;
use ringgz_protocol::{ErrorCode, ProtocolError, ServerCommand};
use ringgz_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum RinggzError {
    /// A transport-level error (bind, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A line that could not be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A refused lobby request.
    #[error(transparent)]
    Lobby(#[from] LobbyError),

    /// A refused game request.
    #[error(transparent)]
    Game(#[from] GameError),

    /// Bad server configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The connection's current state does not accept the command.
    #[error("{reason}")]
    Refused { code: ErrorCode, reason: String },
}

impl RinggzError {
    pub(crate) fn refused(code: ErrorCode, reason: impl Into<String>) -> Self {
        Self::Refused {
            code,
            reason: reason.into(),
        }
    }

    /// The `error` command that reports this failure to the requester.
    pub fn to_command(&self) -> ServerCommand {
        match self {
            Self::Protocol(e) => ServerCommand::error(e.code(), e.to_string()),
            Self::Lobby(e) => ServerCommand::error(e.code(), e.to_string()),
            Self::Game(e) => e.to_command(),
            Self::Transport(e @ TransportError::InvalidUtf8) => {
                ServerCommand::error(ErrorCode::UnknownCommand, e.to_string())
            }
            Self::Refused { code, reason } => ServerCommand::error(*code, reason),
            Self::Transport(_) | Self::Config(_) => {
                ServerCommand::canonical_error(ErrorCode::Default)
            }
        }
    }
}

/// Errors raised while loading or checking a [`ServerConfig`](crate::ServerConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config file: {0}")]
    Read(#[from] std::io::Error),

    /// The configuration file is not valid JSON for a `ServerConfig`.
    #[error("cannot parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    /// A setting is out of range.
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}
