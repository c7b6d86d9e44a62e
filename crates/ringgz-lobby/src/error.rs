//! Error types for the lobby.

use ringgz_protocol::{ErrorCode, PlayerName};

/// Errors a lobby operation can return to the requesting player.
///
/// None of these change lobby state; the request is simply refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LobbyError {
    /// The name is empty or contains the delimiter or a line break.
    #[error("invalid name {0:?}")]
    InvalidName(PlayerName),

    /// Another connected player already uses this name.
    #[error("name {0} is already taken")]
    NameTaken(PlayerName),

    /// The desired number of opponents is outside 0 to 3.
    #[error("cannot play against {0} opponents")]
    InvalidPlayerCount(i32),

    /// A challenge names a player the lobby does not know.
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerName),

    /// The player is queued, in a challenge, or in a game.
    #[error("player {0} is busy")]
    PlayerBusy(PlayerName),

    /// The challenge names nobody, too many players, duplicates, or the
    /// requester itself.
    #[error("invalid challenge: {0}")]
    InvalidChallenge(&'static str),

    /// The player has no pending invitation from this challenger.
    #[error("no pending challenge from {0}")]
    NoSuchChallenge(PlayerName),

    /// The player never joined (or already left).
    #[error("player {0} is not in the lobby")]
    NotInLobby(PlayerName),
}

impl LobbyError {
    /// The protocol error code reported to the client.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidName(_) | Self::NameTaken(_) | Self::UnknownPlayer(_) => {
                ErrorCode::InvalidName
            }
            Self::InvalidPlayerCount(_)
            | Self::PlayerBusy(_)
            | Self::InvalidChallenge(_)
            | Self::NoSuchChallenge(_) => ErrorCode::InvalidPlayers,
            Self::NotInLobby(_) => ErrorCode::Default,
        }
    }
}
