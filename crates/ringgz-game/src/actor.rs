//! Game actor: an isolated Tokio task that owns one [`GameSession`].
//!
//! Each game runs in its own task, fed through an mpsc channel. The
//! channel is the game's critical section: moves, chat, and disconnects
//! are applied one at a time in the order they arrive, while different
//! games run in parallel. Outbound commands go to per-player unbounded
//! channels, so the actor never waits on a slow connection.

use std::collections::HashMap;

use ringgz_protocol::{PlayerName, ServerCommand};
use tokio::sync::{mpsc, oneshot};

use crate::{GameError, GameId, GameSession, Notice};

/// What a player's connection handler receives from the rest of the server.
#[derive(Debug, Clone)]
pub enum Outbound {
    /// A command to write to the socket.
    Command(ServerCommand),

    /// The player was placed in a game. Arrives before that game's
    /// `startGame`.
    GameAssigned(GameHandle),

    /// The game ended and the player is back in the lobby. Arrives after
    /// that game's `gameOver`.
    GameEnded(GameId),
}

/// Channel sender for delivering outbound messages to a player.
pub type PlayerSender = mpsc::UnboundedSender<Outbound>;

/// Commands sent to a game actor through its channel.
///
/// The `oneshot::Sender` in some variants is a reply channel: a rejected
/// request comes back to the caller only, never to the other players.
pub(crate) enum GameCommand {
    Move {
        player: PlayerName,
        field: i32,
        color: i32,
        format: i32,
        reply: oneshot::Sender<Result<(), GameError>>,
    },

    Chat {
        player: PlayerName,
        message: String,
        reply: oneshot::Sender<Result<(), GameError>>,
    },

    Disconnect {
        player: PlayerName,
    },

    GetInfo {
        reply: oneshot::Sender<GameInfo>,
    },
}

/// A snapshot of a game's public state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameInfo {
    pub game_id: GameId,
    /// Turn order, forfeited players included.
    pub players: Vec<PlayerName>,
    /// Whose turn it is; `None` once finished.
    pub current_player: Option<PlayerName>,
    pub finished: bool,
    /// Rings placed so far.
    pub rings: usize,
}

/// Handle to a running game actor.
///
/// Cheap to clone. The actor stops once every handle is dropped.
#[derive(Debug, Clone)]
pub struct GameHandle {
    game_id: GameId,
    sender: mpsc::Sender<GameCommand>,
}

impl GameHandle {
    /// Returns the game's unique ID.
    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    /// Submits a move and waits for the verdict.
    ///
    /// On success the resulting `setMove`/`nextMove`/`gameOver` commands
    /// have already been queued to every participant.
    pub async fn submit_move(
        &self,
        player: PlayerName,
        field: i32,
        color: i32,
        format: i32,
    ) -> Result<(), GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(GameCommand::Move {
            player,
            field,
            color,
            format,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| GameError::Unavailable(self.game_id))?
    }

    /// Relays a chat message to every participant.
    pub async fn send_chat(
        &self,
        player: PlayerName,
        message: String,
    ) -> Result<(), GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(GameCommand::Chat {
            player,
            message,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| GameError::Unavailable(self.game_id))?
    }

    /// Reports that a participant's connection dropped (fire-and-forget).
    pub async fn disconnect(&self, player: PlayerName) -> Result<(), GameError> {
        self.send(GameCommand::Disconnect { player }).await
    }

    /// Requests a snapshot of the game.
    pub async fn info(&self) -> Result<GameInfo, GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(GameCommand::GetInfo { reply: reply_tx }).await?;
        reply_rx
            .await
            .map_err(|_| GameError::Unavailable(self.game_id))
    }

    async fn send(&self, command: GameCommand) -> Result<(), GameError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| GameError::Unavailable(self.game_id))
    }
}

/// The internal game actor state. Runs inside a Tokio task.
struct GameActor {
    session: GameSession,
    /// Outboxes of participants still connected.
    outboxes: HashMap<PlayerName, PlayerSender>,
    /// Participants already gone when the game formed.
    absent: Vec<PlayerName>,
    receiver: mpsc::Receiver<GameCommand>,
    ended: bool,
}

impl GameActor {
    /// Runs the actor loop until every handle is gone.
    ///
    /// The loop keeps serving after the game ends so that late requests
    /// get a proper `GameOver` answer instead of a closed channel.
    async fn run(mut self) {
        let game_id = self.session.id();
        tracing::info!(%game_id, "game actor started");

        let notices = self.session.start();
        self.dispatch(notices);
        for player in std::mem::take(&mut self.absent) {
            tracing::warn!(%game_id, %player, "player gone before game start");
            let notices = self.session.handle_disconnect(&player);
            self.dispatch(notices);
        }
        self.announce_end();

        while let Some(command) = self.receiver.recv().await {
            match command {
                GameCommand::Move {
                    player,
                    field,
                    color,
                    format,
                    reply,
                } => {
                    let result = self
                        .session
                        .submit_move(&player, field, color, format)
                        .map(|notices| self.dispatch(notices));
                    if let Err(e) = &result {
                        tracing::debug!(%game_id, %player, error = %e, "move rejected");
                    }
                    let _ = reply.send(result);
                }
                GameCommand::Chat {
                    player,
                    message,
                    reply,
                } => {
                    let result = self
                        .session
                        .send_chat(&player, message)
                        .map(|notices| self.dispatch(notices));
                    let _ = reply.send(result);
                }
                GameCommand::Disconnect { player } => {
                    self.outboxes.remove(&player);
                    let notices = self.session.handle_disconnect(&player);
                    self.dispatch(notices);
                }
                GameCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
            }

            self.announce_end();
        }

        tracing::info!(%game_id, "game actor stopped");
    }

    /// Tells every connected participant, once, that the game is over.
    fn announce_end(&mut self) {
        if self.ended || !self.session.is_finished() {
            return;
        }
        self.ended = true;
        for outbox in self.outboxes.values() {
            let _ = outbox.send(Outbound::GameEnded(self.session.id()));
        }
    }

    /// Delivers notices to the participants they address.
    fn dispatch(&self, notices: Vec<Notice>) {
        for (recipient, command) in notices {
            for (player, outbox) in &self.outboxes {
                if recipient.includes(player) {
                    // A closed outbox means the player is disconnecting;
                    // its Disconnect command is on the way.
                    let _ = outbox.send(Outbound::Command(command.clone()));
                }
            }
        }
    }

    fn info(&self) -> GameInfo {
        GameInfo {
            game_id: self.session.id(),
            players: self.session.players(),
            current_player: self.session.current_player().cloned(),
            finished: self.session.is_finished(),
            rings: self.session.board().ring_count(),
        }
    }
}

/// Spawns a game actor and returns a handle to it.
///
/// Every participant with an outbox receives [`Outbound::GameAssigned`]
/// before the actor starts, so the handle always precedes `startGame`.
/// Participants without an outbox are forfeited straight away.
pub(crate) fn spawn_game(
    session: GameSession,
    mut outboxes: HashMap<PlayerName, PlayerSender>,
    channel_size: usize,
) -> GameHandle {
    let (tx, rx) = mpsc::channel(channel_size);
    let handle = GameHandle {
        game_id: session.id(),
        sender: tx,
    };

    outboxes.retain(|_, outbox| {
        outbox.send(Outbound::GameAssigned(handle.clone())).is_ok()
    });
    let absent: Vec<PlayerName> = session
        .players()
        .into_iter()
        .filter(|p| !outboxes.contains_key(p))
        .collect();

    let actor = GameActor {
        session,
        outboxes,
        absent,
        receiver: rx,
        ended: false,
    };
    tokio::spawn(actor.run());
    handle
}

