//! Shared protocol vocabulary: player names, error codes, recipients.

use std::fmt;

use crate::DELIMITER;

// ---------------------------------------------------------------------------
// PlayerName
// ---------------------------------------------------------------------------

/// A player's identity: the name they joined with.
///
/// Names are unique among connected players and live for the lifetime of
/// one connection. The codec does not police the contents (a decoded name
/// can never contain the delimiter anyway); the lobby checks
/// [`is_valid`](Self::is_valid) when a player joins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerName(String);

impl PlayerName {
    /// Wraps a string as a player name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` if the name is non-empty and free of the delimiter and of
    /// line breaks, i.e. safe to put on the wire.
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
            && !self
                .0
                .chars()
                .any(|c| c == DELIMITER || c == '\n' || c == '\r')
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for PlayerName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// The fixed error enumeration carried by `error` commands.
///
/// Each code has a canonical description. Senders may substitute their own
/// description but must keep the code accurate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidMove,
    InvalidName,
    InvalidPlayers,
    PlayerLeft,
    UnknownCommand,
    GameOver,
    Default,
}

impl ErrorCode {
    /// Every code, in numeric order.
    pub const ALL: [ErrorCode; 7] = [
        Self::InvalidMove,
        Self::InvalidName,
        Self::InvalidPlayers,
        Self::PlayerLeft,
        Self::UnknownCommand,
        Self::GameOver,
        Self::Default,
    ];

    /// The numeric value sent on the wire.
    pub fn code(self) -> u8 {
        match self {
            Self::InvalidMove => 1,
            Self::InvalidName => 2,
            Self::InvalidPlayers => 3,
            Self::PlayerLeft => 4,
            Self::UnknownCommand => 5,
            Self::GameOver => 6,
            Self::Default => 7,
        }
    }

    /// The canonical description for this code.
    pub fn description(self) -> &'static str {
        match self {
            Self::InvalidMove => "Ongeldige zet",
            Self::InvalidName => "Ongeldige naam",
            Self::InvalidPlayers => "Ongeldig aantal spelers",
            Self::PlayerLeft => "Speler is weggegaan",
            Self::UnknownCommand => "Onbekend commando",
            Self::GameOver => "Je kan geen zet meer doen",
            Self::Default => "Error",
        }
    }

    /// Looks up a code by its numeric value.
    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|c| i64::from(c.code()) == code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

// ---------------------------------------------------------------------------
// Recipient: who should receive a command?
// ---------------------------------------------------------------------------

/// Specifies who should receive a server command.
///
/// Lobby and game operations return `(Recipient, ServerCommand)` pairs;
/// the gateway resolves the recipient against the players it knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// Every participant of the game (or every member of the lobby).
    All,

    /// One specific player.
    Player(PlayerName),

    /// Everyone except the given player.
    AllExcept(PlayerName),
}

impl Recipient {
    /// `true` if `player` is covered by this recipient.
    pub fn includes(&self, player: &PlayerName) -> bool {
        match self {
            Self::All => true,
            Self::Player(p) => p == player,
            Self::AllExcept(p) => p != player,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_name_validity() {
        assert!(PlayerName::from("Alice").is_valid());
        assert!(PlayerName::from("Jan Jansen").is_valid());
        assert!(!PlayerName::from("").is_valid());
        assert!(!PlayerName::from("a~b").is_valid());
        assert!(!PlayerName::from("a\nb").is_valid());
    }

    #[test]
    fn test_player_name_display() {
        assert_eq!(PlayerName::from("Bob").to_string(), "Bob");
    }

    #[test]
    fn test_error_code_table() {
        let codes: Vec<u8> = ErrorCode::ALL.iter().map(|c| c.code()).collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(ErrorCode::InvalidMove.description(), "Ongeldige zet");
        assert_eq!(ErrorCode::Default.to_string(), "Error");
    }

    #[test]
    fn test_error_code_from_code() {
        assert_eq!(ErrorCode::from_code(4), Some(ErrorCode::PlayerLeft));
        assert_eq!(ErrorCode::from_code(0), None);
        assert_eq!(ErrorCode::from_code(8), None);
    }

    #[test]
    fn test_recipient_includes() {
        let alice = PlayerName::from("Alice");
        let bob = PlayerName::from("Bob");
        assert!(Recipient::All.includes(&alice));
        assert!(Recipient::Player(alice.clone()).includes(&alice));
        assert!(!Recipient::Player(alice.clone()).includes(&bob));
        assert!(!Recipient::AllExcept(alice.clone()).includes(&alice));
        assert!(Recipient::AllExcept(alice).includes(&bob));
    }
}
