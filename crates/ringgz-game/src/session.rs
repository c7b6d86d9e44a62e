//! One game's rules outside the board: who plays which colors, whose turn
//! it is, who forfeited, and when it all ends.
//!
//! `GameSession` is synchronous. Every operation returns the commands it
//! causes as `(Recipient, ServerCommand)` pairs; the game actor delivers
//! them.

use std::fmt;

use ringgz_board::{Board, Color, GameResult, Placement, score};
use ringgz_protocol::{ErrorCode, PlayerName, Recipient, ServerCommand};

use crate::GameError;

/// A command for one or more participants.
pub type Notice = (Recipient, ServerCommand);

/// Unique identifier of a game on this server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "game-{}", self.0)
    }
}

/// Whether a game still accepts moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Finished,
}

#[derive(Debug, Clone)]
struct Participant {
    name: PlayerName,
    colors: Vec<Color>,
    forfeited: bool,
}

/// The state of one running game.
///
/// # Turn order
///
/// Participants move in the order they were given. After every accepted
/// move the turn passes to the next participant that has not forfeited,
/// wrapping around after the last. A participant that disconnects is
/// forfeited and skipped for the rest of the game.
#[derive(Debug, Clone)]
pub struct GameSession {
    id: GameId,
    participants: Vec<Participant>,
    board: Board,
    turn: usize,
    status: GameStatus,
}

impl GameSession {
    /// Sets up a game. Colors follow from the player count.
    ///
    /// # Errors
    /// [`GameError::InvalidPlayers`] unless there are two to four distinct
    /// players.
    pub fn new(
        id: GameId,
        players: Vec<PlayerName>,
        board: Board,
    ) -> Result<Self, GameError> {
        let count = players.len();
        let distinct = players
            .iter()
            .enumerate()
            .all(|(i, p)| !players[..i].contains(p));
        let assignment = Color::assignment(count)
            .filter(|_| distinct)
            .ok_or(GameError::InvalidPlayers(count))?;

        let participants = players
            .into_iter()
            .zip(assignment)
            .map(|(name, colors)| Participant {
                name,
                colors,
                forfeited: false,
            })
            .collect();

        Ok(Self {
            id,
            participants,
            board,
            turn: 0,
            status: GameStatus::InProgress,
        })
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status == GameStatus::Finished
    }

    /// Every participant in turn order, forfeited ones included.
    pub fn players(&self) -> Vec<PlayerName> {
        self.participants.iter().map(|p| p.name.clone()).collect()
    }

    /// The player whose turn it is, while the game runs.
    pub fn current_player(&self) -> Option<&PlayerName> {
        match self.status {
            GameStatus::InProgress => {
                self.participants.get(self.turn).map(|p| &p.name)
            }
            GameStatus::Finished => None,
        }
    }

    /// The colors assigned to `player`.
    pub fn colors_of(&self, player: &PlayerName) -> Option<&[Color]> {
        self.participant(player).map(|i| &self.participants[i].colors[..])
    }

    /// `true` if `player` forfeited by disconnecting.
    pub fn has_forfeited(&self, player: &PlayerName) -> bool {
        self.participant(player)
            .is_some_and(|i| self.participants[i].forfeited)
    }

    /// Announces the game: `startGame` followed by `nextMove` for the
    /// first participant.
    pub fn start(&self) -> Vec<Notice> {
        tracing::info!(
            game_id = %self.id,
            starting_base = self.board.starting_base(),
            players = self.participants.len(),
            "game started"
        );
        vec![
            (
                Recipient::All,
                ServerCommand::StartGame {
                    starting_base: self.board.starting_base() as u8,
                    players: self.players(),
                },
            ),
            self.next_move(),
        ]
    }

    /// Plays a move for `player`.
    ///
    /// On success everyone receives `setMove`, then either `gameOver` (no
    /// legal placement left) or `nextMove` for the next participant.
    ///
    /// # Errors
    /// - [`GameError::GameOver`] once the game ended
    /// - [`GameError::NotInGame`] for non-participants
    /// - [`GameError::NotYourTurn`] unless `player` holds the turn
    /// - [`GameError::InvalidMove`] for out-of-range values or a broken
    ///   placement rule
    /// - [`GameError::ColorNotOwned`] if the color belongs to someone else
    ///
    /// A rejected move changes nothing; the turn stays put.
    pub fn submit_move(
        &mut self,
        player: &PlayerName,
        field: i32,
        color: i32,
        format: i32,
    ) -> Result<Vec<Notice>, GameError> {
        if self.is_finished() {
            return Err(GameError::GameOver(self.id));
        }
        let index = self
            .participant(player)
            .filter(|&i| !self.participants[i].forfeited)
            .ok_or_else(|| GameError::NotInGame(player.clone()))?;
        if index != self.turn {
            return Err(GameError::NotYourTurn(player.clone()));
        }

        let placement = Placement::new(field, color, format)?;
        if !self.participants[index].colors.contains(&placement.color) {
            return Err(GameError::ColorNotOwned {
                player: player.clone(),
                color: placement.color.value(),
            });
        }
        self.board.apply_move(&placement)?;
        tracing::debug!(
            game_id = %self.id,
            %player,
            field = placement.field,
            color = %placement.color,
            format = %placement.format,
            "move applied"
        );

        let mut notices = vec![(
            Recipient::All,
            ServerCommand::SetMove {
                field: placement.field_value(),
                color: placement.color.value(),
                format: placement.format.value(),
            },
        )];
        if self.board.is_game_over() {
            notices.extend(self.end());
        } else {
            self.advance();
            notices.push(self.next_move());
        }
        Ok(notices)
    }

    /// Relays a chat message to every participant.
    ///
    /// # Errors
    /// [`GameError::NotInGame`] for non-participants.
    pub fn send_chat(
        &self,
        player: &PlayerName,
        message: String,
    ) -> Result<Vec<Notice>, GameError> {
        if self.participant(player).is_none() {
            return Err(GameError::NotInGame(player.clone()));
        }
        Ok(vec![(
            Recipient::All,
            ServerCommand::Broadcast {
                sender: player.clone(),
                message,
            },
        )])
    }

    /// Forfeits a participant whose connection dropped.
    ///
    /// The others are told with `error~4~<name> left the game`. With fewer
    /// than two participants left the game ends; otherwise, if the leaver
    /// held the turn, the next participant is announced. Does nothing for
    /// non-participants, repeated calls, or a finished game.
    pub fn handle_disconnect(&mut self, player: &PlayerName) -> Vec<Notice> {
        if self.is_finished() {
            return Vec::new();
        }
        let Some(index) = self.participant(player) else {
            return Vec::new();
        };
        if self.participants[index].forfeited {
            return Vec::new();
        }

        self.participants[index].forfeited = true;
        tracing::info!(
            game_id = %self.id,
            %player,
            remaining = self.remaining(),
            "player forfeited"
        );

        let mut notices = vec![(
            Recipient::AllExcept(player.clone()),
            ServerCommand::error(
                ErrorCode::PlayerLeft,
                format!("{player} left the game"),
            ),
        )];
        if self.remaining() < 2 {
            notices.extend(self.end());
        } else if index == self.turn {
            self.advance();
            notices.push(self.next_move());
        }
        notices
    }

    /// Ends the game and announces the ranked result with `gameOver`.
    ///
    /// Calling it again on a finished game emits nothing.
    pub fn end(&mut self) -> Vec<Notice> {
        if self.is_finished() {
            return Vec::new();
        }
        self.status = GameStatus::Finished;
        let result = self.result();
        tracing::info!(
            game_id = %self.id,
            rings = self.board.ring_count(),
            total = result.total(),
            "game over"
        );
        vec![(
            Recipient::All,
            ServerCommand::GameOver {
                standings: result.standings,
            },
        )]
    }

    /// The standings as they would be if the game ended now.
    pub fn result(&self) -> GameResult<PlayerName> {
        let ownership: Vec<(PlayerName, Vec<Color>)> = self
            .participants
            .iter()
            .map(|p| (p.name.clone(), p.colors.clone()))
            .collect();
        score(&self.board, &ownership)
    }

    fn participant(&self, player: &PlayerName) -> Option<usize> {
        self.participants.iter().position(|p| &p.name == player)
    }

    fn remaining(&self) -> usize {
        self.participants.iter().filter(|p| !p.forfeited).count()
    }

    /// Moves the turn to the next participant still playing.
    fn advance(&mut self) {
        let count = self.participants.len();
        for step in 1..=count {
            let candidate = (self.turn + step) % count;
            if !self.participants[candidate].forfeited {
                self.turn = candidate;
                return;
            }
        }
    }

    fn next_move(&self) -> Notice {
        (
            Recipient::All,
            ServerCommand::NextMove {
                player: self.participants[self.turn].name.clone(),
            },
        )
    }
}
