//! Error types for game sessions.

use ringgz_board::BoardError;
use ringgz_protocol::{ErrorCode, PlayerName, ServerCommand};

use crate::GameId;

/// Errors a game operation can return to the requesting player.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// The board rejected the placement.
    #[error(transparent)]
    InvalidMove(#[from] BoardError),

    /// Someone else holds the turn.
    #[error("not your turn, {0}")]
    NotYourTurn(PlayerName),

    /// The mover tried to place a color it does not own.
    #[error("{player} does not own color {color}")]
    ColorNotOwned { player: PlayerName, color: u8 },

    /// The game already ended.
    #[error("game {0} is over")]
    GameOver(GameId),

    /// The player does not take part in this game.
    #[error("player {0} is not in this game")]
    NotInGame(PlayerName),

    /// A game needs two to four distinct players.
    #[error("a game needs 2 to 4 distinct players, got {0}")]
    InvalidPlayers(usize),

    /// The game's actor is gone.
    #[error("game {0} is unavailable")]
    Unavailable(GameId),
}

impl GameError {
    /// The protocol error code reported to the client.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidMove(_) | Self::NotYourTurn(_) | Self::ColorNotOwned { .. } => {
                ErrorCode::InvalidMove
            }
            Self::GameOver(_) => ErrorCode::GameOver,
            Self::InvalidPlayers(_) => ErrorCode::InvalidPlayers,
            Self::NotInGame(_) | Self::Unavailable(_) => ErrorCode::Default,
        }
    }

    /// The `error` command sent back to the requester.
    ///
    /// Board violations and finished games use the canonical description;
    /// everything else describes itself.
    pub fn to_command(&self) -> ServerCommand {
        match self {
            Self::InvalidMove(_) | Self::GameOver(_) => {
                ServerCommand::canonical_error(self.code())
            }
            Self::NotYourTurn(_) => ServerCommand::error(self.code(), "not your turn"),
            other => ServerCommand::error(other.code(), other.to_string()),
        }
    }
}
