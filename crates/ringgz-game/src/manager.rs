//! Game manager: starts games and tracks which player is in which game.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use ringgz_protocol::PlayerName;

use crate::actor::spawn_game;
use crate::{GameConfig, GameError, GameHandle, GameId, GameSession, PlayerSender};

/// Counter for generating unique game IDs.
static NEXT_GAME_ID: AtomicU64 = AtomicU64::new(1);

/// Owns a handle to every running game.
///
/// A player is in at most one game at a time. A game's handle is dropped
/// once its last participant has been released, which lets the actor stop
/// after the connection handlers drop theirs.
pub struct GameManager {
    games: HashMap<GameId, GameHandle>,

    /// Maps each player to the game it is in.
    player_games: HashMap<PlayerName, GameId>,

    config: GameConfig,
}

impl GameManager {
    /// Creates a manager with no games.
    pub fn new(config: GameConfig) -> Self {
        Self {
            games: HashMap::new(),
            player_games: HashMap::new(),
            config,
        }
    }

    /// Starts a game for `players`, in turn order.
    ///
    /// Each participant's outbox (looked up in `outboxes`) first receives
    /// the game handle, then the actor announces the game.
    ///
    /// # Errors
    /// - [`GameError::InvalidPlayers`] for a bad player list, or if a
    ///   player is already in a game
    /// - [`GameError::InvalidMove`] if the configured starting base is not
    ///   an inner field
    pub fn create_game(
        &mut self,
        players: Vec<PlayerName>,
        outboxes: &HashMap<PlayerName, PlayerSender>,
    ) -> Result<GameHandle, GameError> {
        if players.iter().any(|p| self.player_games.contains_key(p)) {
            return Err(GameError::InvalidPlayers(players.len()));
        }

        let game_id = GameId(NEXT_GAME_ID.fetch_add(1, Ordering::Relaxed));
        let board = self.config.board()?;
        let session = GameSession::new(game_id, players.clone(), board)?;

        let participant_outboxes = players
            .iter()
            .filter_map(|p| outboxes.get(p).map(|tx| (p.clone(), tx.clone())))
            .collect();
        let handle = spawn_game(session, participant_outboxes, self.config.channel_size);

        for player in players {
            self.player_games.insert(player, game_id);
        }
        self.games.insert(game_id, handle.clone());
        tracing::info!(%game_id, "game created");
        Ok(handle)
    }

    /// The game `player` is in, if any.
    pub fn game_of(&self, player: &PlayerName) -> Option<GameHandle> {
        self.player_games
            .get(player)
            .and_then(|id| self.games.get(id))
            .cloned()
    }

    /// Forgets `player`'s game membership.
    ///
    /// When no participant of that game remains, the game's handle is
    /// dropped.
    pub fn release_player(&mut self, player: &PlayerName) {
        let Some(game_id) = self.player_games.remove(player) else {
            return;
        };
        if !self.player_games.values().any(|id| *id == game_id) {
            self.games.remove(&game_id);
            tracing::info!(%game_id, "game released");
        }
    }

    /// Returns the number of tracked games.
    pub fn game_count(&self) -> usize {
        self.games.len()
    }
}

impl Default for GameManager {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}
