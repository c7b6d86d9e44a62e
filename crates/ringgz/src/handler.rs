//! Per-connection handler: the player's state machine and command routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Receive `join` → the player is registered in the lobby and its
//!      outbox becomes reachable by name
//!   2. Loop: write whatever the outbox holds, otherwise read the next
//!      line and dispatch it by connection state
//!   3. On close: leave the lobby and forfeit the running game, if any
//!
//! Step 3 also runs when the handler unwinds: dropping a `Player` that
//! still holds a name spawns the same cleanup.

use std::collections::HashMap;
use std::sync::Arc;

use ringgz_game::{GameHandle, GameId, Outbound, PlayerSender};
use ringgz_lobby::{Lobby, LobbyOutcome, Notice};
use ringgz_protocol::{ClientCommand, ErrorCode, PlayerName, Recipient, ServerCommand, Wire};
use ringgz_transport::{Connection, ConnectionId, LineConnection};
use tokio::sync::mpsc;

use crate::RinggzError;
use crate::server::ServerState;

/// Where a connection stands.
///
/// ```text
/// Connected ──join──▶ InLobby ──GameAssigned──▶ InGame
///                        ▲                         │
///                        └───────GameEnded─────────┘
/// ```
enum Status {
    Connected,
    InLobby { name: PlayerName },
    InGame { name: PlayerName, game: GameHandle },
}

impl Status {
    fn name(&self) -> Option<&PlayerName> {
        match self {
            Self::Connected => None,
            Self::InLobby { name } | Self::InGame { name, .. } => Some(name),
        }
    }
}

/// One client's side of the server.
///
/// Dropping a player that still holds a name releases it in a background
/// task.
struct Player {
    conn_id: ConnectionId,
    state: Arc<ServerState>,
    status: Status,

    /// Sender half of this player's own outbox. Replies are queued here
    /// as well.
    outbox: PlayerSender,
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: LineConnection,
    state: Arc<ServerState>,
) -> Result<(), RinggzError> {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut player = Player {
        conn_id,
        state,
        status: Status::Connected,
        outbox: tx,
    };

    let result = loop {
        tokio::select! {
            biased;

            Some(outbound) = rx.recv() => {
                if let Some(command) = player.on_outbound(outbound).await {
                    if let Err(e) = conn.send(&command.encode()).await {
                        break Err(RinggzError::Transport(e));
                    }
                }
            }

            line = conn.recv() => {
                match line {
                    Ok(Some(line)) => player.on_line(&line).await,
                    Ok(None) => {
                        tracing::info!(%conn_id, "connection closed cleanly");
                        break Ok(());
                    }
                    Err(e) if e.is_recoverable() => {
                        tracing::debug!(%conn_id, error = %e, "unreadable line");
                        player.reply(RinggzError::from(e).to_command());
                    }
                    Err(e) => break Err(RinggzError::Transport(e)),
                }
            }
        }
    };

    player.leave().await;
    result
}

impl Player {
    // -----------------------------------------------------------------
    // Outbound
    // -----------------------------------------------------------------

    /// Applies an outbox message. Returns the command to write, if any.
    async fn on_outbound(&mut self, outbound: Outbound) -> Option<ServerCommand> {
        match outbound {
            Outbound::Command(command) => Some(command),
            Outbound::GameAssigned(game) => {
                self.status = match std::mem::replace(&mut self.status, Status::Connected) {
                    Status::InLobby { name } => {
                        tracing::info!(player = %name, game_id = %game.game_id(), "player entered game");
                        Status::InGame { name, game }
                    }
                    other => {
                        tracing::warn!(conn_id = %self.conn_id, "game assigned outside the lobby");
                        other
                    }
                };
                None
            }
            Outbound::GameEnded(game_id) => {
                self.end_game(game_id).await;
                None
            }
        }
    }

    async fn end_game(&mut self, game_id: GameId) {
        let name = match std::mem::replace(&mut self.status, Status::Connected) {
            Status::InGame { name, game } if game.game_id() == game_id => name,
            other => {
                self.status = other;
                return;
            }
        };

        {
            let mut lobby = self.state.lobby.lock().await;
            if let Err(e) = lobby.finish_game(&name) {
                tracing::debug!(player = %name, error = %e, "finish game failed");
            }
            self.state.games.lock().await.release_player(&name);
        }
        tracing::info!(player = %name, %game_id, "player back in lobby");
        self.status = Status::InLobby { name };
    }

    // -----------------------------------------------------------------
    // Inbound
    // -----------------------------------------------------------------

    /// Decodes and dispatches one inbound line. Failures are answered to
    /// this player only.
    async fn on_line(&mut self, line: &str) {
        let result = match ClientCommand::decode(line) {
            Ok(command) => self.dispatch(command).await,
            Err(e) => {
                tracing::debug!(conn_id = %self.conn_id, error = %e, "malformed line");
                Err(e.into())
            }
        };
        if let Err(e) = result {
            self.reply(e.to_command());
        }
    }

    async fn dispatch(&mut self, command: ClientCommand) -> Result<(), RinggzError> {
        if let ClientCommand::Error { code, description } = &command {
            tracing::warn!(
                conn_id = %self.conn_id,
                player = ?self.status.name(),
                code = code.code(),
                %description,
                "client reported an error"
            );
            return Ok(());
        }

        match &self.status {
            Status::Connected => self.dispatch_connected(command).await,
            Status::InLobby { name } => {
                let name = name.clone();
                self.dispatch_lobby(name, command).await
            }
            Status::InGame { name, game } => {
                let (name, game) = (name.clone(), game.clone());
                self.dispatch_game(name, game, command).await
            }
        }
    }

    async fn dispatch_connected(&mut self, command: ClientCommand) -> Result<(), RinggzError> {
        match command {
            ClientCommand::Join { name, opponents } => self.join(name, opponents).await,
            ClientCommand::DoMove { .. } => Err(not_in_game()),
            _ => Err(RinggzError::refused(ErrorCode::Default, "join first")),
        }
    }

    async fn dispatch_lobby(
        &mut self,
        name: PlayerName,
        command: ClientCommand,
    ) -> Result<(), RinggzError> {
        let state = Arc::clone(&self.state);
        let mut lobby = state.lobby.lock().await;

        match command {
            ClientCommand::Join {
                name: requested,
                opponents,
            } => {
                if requested != name {
                    return Err(RinggzError::refused(
                        ErrorCode::InvalidName,
                        format!("already joined as {name}"),
                    ));
                }
                let outcome = lobby.rejoin(&name, opponents)?;
                self.settle(&mut lobby, outcome).await;
            }
            ClientCommand::GetPlayers => {
                self.reply(ServerCommand::Players {
                    names: lobby.list_players(),
                });
            }
            ClientCommand::Challenge { opponents } => {
                let outcome = lobby.request_challenge(&name, &opponents)?;
                self.settle(&mut lobby, outcome).await;
            }
            ClientCommand::ChallengeAccept { challenger } => {
                let outcome = lobby.respond_challenge(&name, &challenger, true)?;
                self.settle(&mut lobby, outcome).await;
            }
            ClientCommand::ChallengeReject { challenger } => {
                let outcome = lobby.respond_challenge(&name, &challenger, false)?;
                self.settle(&mut lobby, outcome).await;
            }
            ClientCommand::SendMessage { message } => {
                let notices = lobby
                    .list_players()
                    .into_iter()
                    .map(|member| {
                        (
                            Recipient::Player(member),
                            ServerCommand::Broadcast {
                                sender: name.clone(),
                                message: message.clone(),
                            },
                        )
                    })
                    .collect();
                deliver(&*state.outboxes.lock().await, notices);
            }
            ClientCommand::DoMove { .. } => return Err(not_in_game()),
            ClientCommand::Error { .. } => {}
        }
        Ok(())
    }

    async fn dispatch_game(
        &mut self,
        name: PlayerName,
        game: GameHandle,
        command: ClientCommand,
    ) -> Result<(), RinggzError> {
        match command {
            ClientCommand::DoMove {
                field,
                color,
                format,
            } => {
                tracing::debug!(player = %name, field, color, format, "move submitted");
                game.submit_move(name, field, color, format).await?;
            }
            ClientCommand::SendMessage { message } => {
                game.send_chat(name, message).await?;
            }
            ClientCommand::GetPlayers => {
                let names = self.state.lobby.lock().await.list_players();
                self.reply(ServerCommand::Players { names });
            }
            _ => {
                return Err(RinggzError::refused(
                    ErrorCode::Default,
                    "not allowed during a game",
                ));
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Lobby
    // -----------------------------------------------------------------

    async fn join(&mut self, name: PlayerName, opponents: i32) -> Result<(), RinggzError> {
        let state = Arc::clone(&self.state);
        let mut lobby = state.lobby.lock().await;

        let outcome = lobby.join(name.clone(), opponents)?;
        state
            .outboxes
            .lock()
            .await
            .insert(name.clone(), self.outbox.clone());
        tracing::info!(conn_id = %self.conn_id, player = %name, "player joined");
        self.status = Status::InLobby { name };

        self.settle(&mut lobby, outcome).await;
        Ok(())
    }

    /// Delivers a lobby outcome and starts the game it formed, if any.
    ///
    /// Runs under the caller's lobby lock, so the players of a new game
    /// are still registered when it starts.
    async fn settle(&self, lobby: &mut Lobby, outcome: LobbyOutcome) {
        let outboxes = self.state.outboxes.lock().await;
        deliver(&outboxes, outcome.notices);

        let Some(players) = outcome.game else {
            return;
        };
        let created = self
            .state
            .games
            .lock()
            .await
            .create_game(players.clone(), &outboxes);

        if let Err(e) = created {
            tracing::error!(players = ?players, error = %e, "could not start game");
            for player in &players {
                let _ = lobby.finish_game(player);
            }
            let notices = players
                .into_iter()
                .map(|player| (Recipient::Player(player), e.to_command()))
                .collect();
            deliver(&outboxes, notices);
        }
    }

    // -----------------------------------------------------------------
    // Teardown
    // -----------------------------------------------------------------

    /// Removes the player from the lobby, the outbox directory, and its
    /// game.
    async fn leave(&mut self) {
        let status = std::mem::replace(&mut self.status, Status::Connected);
        if let Some(name) = status.name().cloned() {
            release(Arc::clone(&self.state), self.conn_id, name).await;
        }
    }

    fn reply(&self, command: ServerCommand) {
        // The receiver lives as long as this handler.
        let _ = self.outbox.send(Outbound::Command(command));
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        let Some(name) = self.status.name().cloned() else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(conn_id = %self.conn_id, player = %name, "no runtime to release player");
            return;
        };
        tracing::warn!(conn_id = %self.conn_id, player = %name, "handler stopped early, releasing player");
        runtime.spawn(release(Arc::clone(&self.state), self.conn_id, name));
    }
}

async fn release(state: Arc<ServerState>, conn_id: ConnectionId, name: PlayerName) {
    let game = {
        let mut lobby = state.lobby.lock().await;
        let outcome = lobby.disconnect(&name);
        let mut outboxes = state.outboxes.lock().await;
        outboxes.remove(&name);
        deliver(&outboxes, outcome.notices);

        let mut games = state.games.lock().await;
        let game = games.game_of(&name);
        games.release_player(&name);
        game
    };

    if let Some(game) = game {
        if let Err(e) = game.disconnect(name.clone()).await {
            tracing::debug!(player = %name, error = %e, "game already gone");
        }
    }
    tracing::info!(%conn_id, player = %name, "player left");
}

fn not_in_game() -> RinggzError {
    RinggzError::refused(ErrorCode::GameOver, "not in a game")
}

/// Sends each notice to the registered players it addresses.
fn deliver(outboxes: &HashMap<PlayerName, PlayerSender>, notices: Vec<Notice>) {
    for (recipient, command) in notices {
        for (player, outbox) in outboxes {
            if recipient.includes(player) {
                let _ = outbox.send(Outbound::Command(command.clone()));
            }
        }
    }
}
