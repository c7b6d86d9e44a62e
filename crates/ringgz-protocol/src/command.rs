//! The command vocabulary, one closed enum per direction.
//!
//! | direction | keywords |
//! |---|---|
//! | client → server | `join`, `doMove`, `error`, `sendMessage`, `getPlayers`, `challenge`, `challengeAccept`, `challengeReject` |
//! | server → client | `accept`, `startGame`, `nextMove`, `setMove`, `gameOver`, `error`, `broadcast`, `players`, `challengedBy`, `challengeRejected` |
//!
//! Integers that come from clients are kept as `i32` so that range
//! checks (and their error codes) belong to the layer that owns the rule,
//! not to the codec.

use crate::codec::{Fields, LineBuilder, int};
use crate::{DELIMITER, ErrorCode, PlayerName, ProtocolError, Wire};

mod keyword {
    pub const JOIN: &str = "join";
    pub const DO_MOVE: &str = "doMove";
    pub const ERROR: &str = "error";
    pub const SEND_MESSAGE: &str = "sendMessage";
    pub const GET_PLAYERS: &str = "getPlayers";
    pub const CHALLENGE: &str = "challenge";
    pub const CHALLENGE_ACCEPT: &str = "challengeAccept";
    pub const CHALLENGE_REJECT: &str = "challengeReject";

    pub const ACCEPT: &str = "accept";
    pub const START_GAME: &str = "startGame";
    pub const NEXT_MOVE: &str = "nextMove";
    pub const SET_MOVE: &str = "setMove";
    pub const GAME_OVER: &str = "gameOver";
    pub const BROADCAST: &str = "broadcast";
    pub const PLAYERS: &str = "players";
    pub const CHALLENGED_BY: &str = "challengedBy";
    pub const CHALLENGE_REJECTED: &str = "challengeRejected";
}

// ---------------------------------------------------------------------------
// ClientCommand
// ---------------------------------------------------------------------------

/// Commands a client sends to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// Register under `name`. `opponents` is the desired number of
    /// opponents (0..=3); 0 asks for a random match.
    Join { name: PlayerName, opponents: i32 },

    /// Place a ring of `color` and `format` on `field`.
    DoMove { field: i32, color: i32, format: i32 },

    /// The client reports an error to the server.
    Error {
        code: ErrorCode,
        description: String,
    },

    /// A chat message for everyone in the same game (or lobby).
    SendMessage { message: String },

    /// Ask for the names of the players in the lobby.
    GetPlayers,

    /// Invite one to three players to a game.
    Challenge { opponents: Vec<PlayerName> },

    /// Accept the pending invitation from `challenger`.
    ChallengeAccept { challenger: PlayerName },

    /// Reject the pending invitation from `challenger`.
    ChallengeReject { challenger: PlayerName },
}

impl Wire for ClientCommand {
    fn encode(&self) -> String {
        let line = match self {
            Self::Join { name, opponents } => {
                LineBuilder::new(keyword::JOIN).arg(name).arg(opponents)
            }
            Self::DoMove {
                field,
                color,
                format,
            } => LineBuilder::new(keyword::DO_MOVE)
                .arg(field)
                .arg(color)
                .arg(format),
            Self::Error { code, description } => {
                LineBuilder::new(keyword::ERROR)
                    .arg(code.code())
                    .arg(description)
            }
            Self::SendMessage { message } => {
                LineBuilder::new(keyword::SEND_MESSAGE).arg(message)
            }
            Self::GetPlayers => LineBuilder::new(keyword::GET_PLAYERS),
            Self::Challenge { opponents } => {
                LineBuilder::new(keyword::CHALLENGE).args(opponents)
            }
            Self::ChallengeAccept { challenger } => {
                LineBuilder::new(keyword::CHALLENGE_ACCEPT).arg(challenger)
            }
            Self::ChallengeReject { challenger } => {
                LineBuilder::new(keyword::CHALLENGE_REJECT).arg(challenger)
            }
        };
        line.finish()
    }

    fn decode(line: &str) -> Result<Self, ProtocolError> {
        let fields = Fields::split(line)?;
        let args = &fields.args;
        match fields.keyword {
            keyword::JOIN => {
                fields.exactly(keyword::JOIN, 2, "2")?;
                Ok(Self::Join {
                    name: args[0].into(),
                    opponents: int(keyword::JOIN, args[1])?,
                })
            }
            keyword::DO_MOVE => {
                fields.exactly(keyword::DO_MOVE, 3, "3")?;
                Ok(Self::DoMove {
                    field: int(keyword::DO_MOVE, args[0])?,
                    color: int(keyword::DO_MOVE, args[1])?,
                    format: int(keyword::DO_MOVE, args[2])?,
                })
            }
            keyword::ERROR => {
                let (code, description) = decode_error(&fields)?;
                Ok(Self::Error { code, description })
            }
            keyword::SEND_MESSAGE => {
                fields.exactly(keyword::SEND_MESSAGE, 1, "1")?;
                Ok(Self::SendMessage {
                    message: args[0].to_string(),
                })
            }
            keyword::GET_PLAYERS => {
                fields.exactly(keyword::GET_PLAYERS, 0, "0")?;
                Ok(Self::GetPlayers)
            }
            keyword::CHALLENGE => {
                fields.arity(keyword::CHALLENGE, 1, 3, "1 to 3")?;
                Ok(Self::Challenge {
                    opponents: names(args),
                })
            }
            keyword::CHALLENGE_ACCEPT => {
                fields.exactly(keyword::CHALLENGE_ACCEPT, 1, "1")?;
                Ok(Self::ChallengeAccept {
                    challenger: args[0].into(),
                })
            }
            keyword::CHALLENGE_REJECT => {
                fields.exactly(keyword::CHALLENGE_REJECT, 1, "1")?;
                Ok(Self::ChallengeReject {
                    challenger: args[0].into(),
                })
            }
            other => Err(ProtocolError::UnknownKeyword(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ServerCommand
// ---------------------------------------------------------------------------

/// Commands the server sends to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerCommand {
    /// The client's `join` was accepted; it is now in the lobby.
    Accept,

    /// A game starts. `players` is the turn order; colors follow from
    /// the player count.
    StartGame {
        starting_base: u8,
        players: Vec<PlayerName>,
    },

    /// It is `player`'s turn.
    NextMove { player: PlayerName },

    /// A move was accepted and applied.
    SetMove { field: u8, color: u8, format: u8 },

    /// The game ended. Standings are ranked, highest points first.
    GameOver { standings: Vec<(PlayerName, u32)> },

    /// Something went wrong with the recipient's last request, or, for
    /// [`ErrorCode::PlayerLeft`], someone left the game.
    Error {
        code: ErrorCode,
        description: String,
    },

    /// A chat message from `sender`.
    Broadcast {
        sender: PlayerName,
        message: String,
    },

    /// The players currently in the lobby.
    Players { names: Vec<PlayerName> },

    /// The recipient was invited by `challenger`.
    ChallengedBy { challenger: PlayerName },

    /// The recipient's challenge was rejected (or cancelled) by `player`.
    ChallengeRejected { player: PlayerName },
}

impl ServerCommand {
    /// Builds an `error` command with a custom description.
    ///
    /// The delimiter and line breaks are replaced by spaces; an empty
    /// result falls back to the code's canonical description.
    pub fn error(code: ErrorCode, description: impl AsRef<str>) -> Self {
        let cleaned: String = description
            .as_ref()
            .chars()
            .map(|c| match c {
                DELIMITER | '\n' | '\r' => ' ',
                c => c,
            })
            .collect();
        let cleaned = cleaned.trim();
        Self::Error {
            code,
            description: if cleaned.is_empty() {
                code.description().to_string()
            } else {
                cleaned.to_string()
            },
        }
    }

    /// Builds an `error` command with the canonical description.
    pub fn canonical_error(code: ErrorCode) -> Self {
        Self::Error {
            code,
            description: code.description().to_string(),
        }
    }
}

impl Wire for ServerCommand {
    fn encode(&self) -> String {
        let line = match self {
            Self::Accept => LineBuilder::new(keyword::ACCEPT),
            Self::StartGame {
                starting_base,
                players,
            } => LineBuilder::new(keyword::START_GAME)
                .arg(starting_base)
                .args(players),
            Self::NextMove { player } => {
                LineBuilder::new(keyword::NEXT_MOVE).arg(player)
            }
            Self::SetMove {
                field,
                color,
                format,
            } => LineBuilder::new(keyword::SET_MOVE)
                .arg(field)
                .arg(color)
                .arg(format),
            Self::GameOver { standings } => standings.iter().fold(
                LineBuilder::new(keyword::GAME_OVER),
                |line, (name, points)| line.arg(name).arg(points),
            ),
            Self::Error { code, description } => {
                LineBuilder::new(keyword::ERROR)
                    .arg(code.code())
                    .arg(description)
            }
            Self::Broadcast { sender, message } => {
                LineBuilder::new(keyword::BROADCAST).arg(sender).arg(message)
            }
            Self::Players { names } => {
                LineBuilder::new(keyword::PLAYERS).args(names)
            }
            Self::ChallengedBy { challenger } => {
                LineBuilder::new(keyword::CHALLENGED_BY).arg(challenger)
            }
            Self::ChallengeRejected { player } => {
                LineBuilder::new(keyword::CHALLENGE_REJECTED).arg(player)
            }
        };
        line.finish()
    }

    fn decode(line: &str) -> Result<Self, ProtocolError> {
        let fields = Fields::split(line)?;
        let args = &fields.args;
        match fields.keyword {
            keyword::ACCEPT => {
                fields.exactly(keyword::ACCEPT, 0, "0")?;
                Ok(Self::Accept)
            }
            keyword::START_GAME => {
                fields.arity(keyword::START_GAME, 3, 5, "3 to 5")?;
                Ok(Self::StartGame {
                    starting_base: int(keyword::START_GAME, args[0])?,
                    players: names(&args[1..]),
                })
            }
            keyword::NEXT_MOVE => {
                fields.exactly(keyword::NEXT_MOVE, 1, "1")?;
                Ok(Self::NextMove {
                    player: args[0].into(),
                })
            }
            keyword::SET_MOVE => {
                fields.exactly(keyword::SET_MOVE, 3, "3")?;
                Ok(Self::SetMove {
                    field: int(keyword::SET_MOVE, args[0])?,
                    color: int(keyword::SET_MOVE, args[1])?,
                    format: int(keyword::SET_MOVE, args[2])?,
                })
            }
            keyword::GAME_OVER => {
                if args.len() % 2 != 0 {
                    return Err(ProtocolError::Arity {
                        keyword: keyword::GAME_OVER,
                        expected: "name/points pairs",
                        got: args.len(),
                    });
                }
                fields.arity(keyword::GAME_OVER, 0, 8, "0 to 8")?;
                let standings = args
                    .chunks(2)
                    .map(|pair| {
                        Ok((
                            PlayerName::from(pair[0]),
                            int(keyword::GAME_OVER, pair[1])?,
                        ))
                    })
                    .collect::<Result<_, ProtocolError>>()?;
                Ok(Self::GameOver { standings })
            }
            keyword::ERROR => {
                let (code, description) = decode_error(&fields)?;
                Ok(Self::Error { code, description })
            }
            keyword::BROADCAST => {
                fields.exactly(keyword::BROADCAST, 2, "2")?;
                Ok(Self::Broadcast {
                    sender: args[0].into(),
                    message: args[1].to_string(),
                })
            }
            keyword::PLAYERS => Ok(Self::Players { names: names(args) }),
            keyword::CHALLENGED_BY => {
                fields.exactly(keyword::CHALLENGED_BY, 1, "1")?;
                Ok(Self::ChallengedBy {
                    challenger: args[0].into(),
                })
            }
            keyword::CHALLENGE_REJECTED => {
                fields.exactly(keyword::CHALLENGE_REJECTED, 1, "1")?;
                Ok(Self::ChallengeRejected {
                    player: args[0].into(),
                })
            }
            other => Err(ProtocolError::UnknownKeyword(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn names(args: &[&str]) -> Vec<PlayerName> {
    args.iter().map(|a| PlayerName::from(*a)).collect()
}

fn decode_error(
    fields: &Fields<'_>,
) -> Result<(ErrorCode, String), ProtocolError> {
    fields.exactly(keyword::ERROR, 2, "2")?;
    let raw: i64 = int(keyword::ERROR, fields.args[0])?;
    let code =
        ErrorCode::from_code(raw).ok_or(ProtocolError::UnknownErrorCode(raw))?;
    Ok((code, fields.args[1].to_string()))
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The exact line shapes matter: clients written against the protocol
    //! parse these strings character for character.

    use super::*;

    fn name(s: &str) -> PlayerName {
        PlayerName::from(s)
    }

    // =====================================================================
    // ClientCommand
    // =====================================================================

    #[test]
    fn test_client_join_decodes() {
        assert_eq!(
            ClientCommand::decode("join~Alice~0\n").unwrap(),
            ClientCommand::Join {
                name: name("Alice"),
                opponents: 0,
            }
        );
    }

    #[test]
    fn test_client_do_move_line_shape() {
        let cmd = ClientCommand::DoMove {
            field: 12,
            color: 2,
            format: 3,
        };
        assert_eq!(cmd.encode(), "doMove~12~2~3");
    }

    #[test]
    fn test_client_do_move_keeps_out_of_range_integers() {
        // Range checks belong to the board; the codec only checks typing.
        assert_eq!(
            ClientCommand::decode("doMove~-1~9~42").unwrap(),
            ClientCommand::DoMove {
                field: -1,
                color: 9,
                format: 42,
            }
        );
    }

    #[test]
    fn test_client_do_move_non_numeric_is_malformed() {
        let err = ClientCommand::decode("doMove~a~0~0").unwrap_err();
        assert!(matches!(err, ProtocolError::NotAnInteger { .. }));
        assert_eq!(err.code(), ErrorCode::UnknownCommand);
    }

    #[test]
    fn test_client_do_move_wrong_arity() {
        let err = ClientCommand::decode("doMove~1~2").unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Arity {
                keyword: "doMove",
                got: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_client_challenge_accepts_one_to_three_names() {
        assert_eq!(
            ClientCommand::decode("challenge~Bob~Carol").unwrap(),
            ClientCommand::Challenge {
                opponents: vec![name("Bob"), name("Carol")],
            }
        );
        assert!(ClientCommand::decode("challenge").is_err());
        assert!(ClientCommand::decode("challenge~a~b~c~d").is_err());
    }

    #[test]
    fn test_client_get_players_takes_no_arguments() {
        assert_eq!(
            ClientCommand::decode("getPlayers").unwrap(),
            ClientCommand::GetPlayers
        );
        assert!(ClientCommand::decode("getPlayers~x").is_err());
    }

    #[test]
    fn test_client_error_with_unknown_code_is_malformed() {
        assert_eq!(
            ClientCommand::decode("error~9~oops").unwrap_err(),
            ProtocolError::UnknownErrorCode(9)
        );
    }

    #[test]
    fn test_client_unknown_keyword() {
        assert_eq!(
            ClientCommand::decode("dance~now").unwrap_err(),
            ProtocolError::UnknownKeyword("dance".into())
        );
    }

    #[test]
    fn test_client_rejects_server_only_keyword() {
        assert!(matches!(
            ClientCommand::decode("setMove~1~2~3"),
            Err(ProtocolError::UnknownKeyword(_))
        ));
    }

    #[test]
    fn test_client_commands_round_trip() {
        let commands = vec![
            ClientCommand::Join {
                name: name("Alice"),
                opponents: 3,
            },
            ClientCommand::DoMove {
                field: 24,
                color: 3,
                format: 4,
            },
            ClientCommand::Error {
                code: ErrorCode::Default,
                description: "Error".into(),
            },
            ClientCommand::SendMessage {
                message: "good game, well played".into(),
            },
            ClientCommand::GetPlayers,
            ClientCommand::Challenge {
                opponents: vec![name("Bob"), name("Carol"), name("Dave")],
            },
            ClientCommand::ChallengeAccept {
                challenger: name("Alice"),
            },
            ClientCommand::ChallengeReject {
                challenger: name("Alice"),
            },
        ];
        for cmd in commands {
            let line = cmd.encode();
            assert_eq!(ClientCommand::decode(&line).unwrap(), cmd, "{line}");
        }
    }

    // =====================================================================
    // ServerCommand
    // =====================================================================

    #[test]
    fn test_server_start_game_line_shape() {
        let cmd = ServerCommand::StartGame {
            starting_base: 12,
            players: vec![name("Alice"), name("Bob")],
        };
        assert_eq!(cmd.encode(), "startGame~12~Alice~Bob");
    }

    #[test]
    fn test_server_start_game_needs_two_to_four_players() {
        assert!(ServerCommand::decode("startGame~12~Alice").is_err());
        assert!(ServerCommand::decode("startGame~12~a~b~c~d~e").is_err());
    }

    #[test]
    fn test_server_game_over_line_shape() {
        let cmd = ServerCommand::GameOver {
            standings: vec![(name("Alice"), 4), (name("Bob"), 2)],
        };
        assert_eq!(cmd.encode(), "gameOver~Alice~4~Bob~2");
    }

    #[test]
    fn test_server_game_over_rejects_odd_arguments() {
        assert!(matches!(
            ServerCommand::decode("gameOver~Alice~4~Bob"),
            Err(ProtocolError::Arity { .. })
        ));
    }

    #[test]
    fn test_server_players_may_be_empty() {
        assert_eq!(
            ServerCommand::decode("players").unwrap(),
            ServerCommand::Players { names: vec![] }
        );
    }

    #[test]
    fn test_server_error_sanitizes_description() {
        let cmd = ServerCommand::error(ErrorCode::InvalidName, "bad~name\n");
        assert_eq!(cmd.encode(), "error~2~bad name");
    }

    #[test]
    fn test_server_error_empty_description_uses_canonical() {
        let cmd = ServerCommand::error(ErrorCode::InvalidMove, "~");
        assert_eq!(cmd.encode(), "error~1~Ongeldige zet");
        assert_eq!(cmd, ServerCommand::canonical_error(ErrorCode::InvalidMove));
    }

    #[test]
    fn test_server_commands_round_trip() {
        let commands = vec![
            ServerCommand::Accept,
            ServerCommand::StartGame {
                starting_base: 6,
                players: vec![name("A"), name("B"), name("C"), name("D")],
            },
            ServerCommand::NextMove {
                player: name("Alice"),
            },
            ServerCommand::SetMove {
                field: 0,
                color: 1,
                format: 4,
            },
            ServerCommand::GameOver { standings: vec![] },
            ServerCommand::GameOver {
                standings: vec![(name("Alice"), 7), (name("Bob"), 0)],
            },
            ServerCommand::canonical_error(ErrorCode::PlayerLeft),
            ServerCommand::Broadcast {
                sender: name("Bob"),
                message: "hi".into(),
            },
            ServerCommand::Players {
                names: vec![name("Alice"), name("Bob")],
            },
            ServerCommand::ChallengedBy {
                challenger: name("Alice"),
            },
            ServerCommand::ChallengeRejected { player: name("Bob") },
        ];
        for cmd in commands {
            let line = cmd.encode();
            assert_eq!(ServerCommand::decode(&line).unwrap(), cmd, "{line}");
        }
    }
}
