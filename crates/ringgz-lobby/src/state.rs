//! Lobby vocabulary: configuration, per-player state, and challenges.

use std::collections::HashSet;

use rand::Rng;
use ringgz_protocol::PlayerName;

/// Fewest players in one game.
pub const MIN_PLAYERS: usize = 2;

/// Most players in one game.
pub const MAX_PLAYERS: usize = 4;

// ---------------------------------------------------------------------------
// LobbyConfig
// ---------------------------------------------------------------------------

/// How many queued players make up a random match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSize {
    /// Always this many players, clamped to 2..=4.
    Fixed(usize),

    /// A fresh size from 2..=4 each time the queue starts filling.
    Random,
}

impl MatchSize {
    /// Picks the size for the next match.
    pub fn draw<R: Rng + ?Sized>(self, rng: &mut R) -> usize {
        match self {
            Self::Fixed(n) => n.clamp(MIN_PLAYERS, MAX_PLAYERS),
            Self::Random => rng.random_range(MIN_PLAYERS..=MAX_PLAYERS),
        }
    }
}

/// Lobby settings.
#[derive(Debug, Clone)]
pub struct LobbyConfig {
    /// Size of games formed from the random join queue.
    ///
    /// Default: two players.
    pub match_size: MatchSize,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            match_size: MatchSize::Fixed(MIN_PLAYERS),
        }
    }
}

// ---------------------------------------------------------------------------
// PlayerState
// ---------------------------------------------------------------------------

/// Where a joined player currently stands.
///
/// ```text
/// Idle ──join(0)──────→ Queued ──queue full──→ InGame
/// Idle ──challenge────→ Challenging / Challenged ──all accept──→ InGame
/// Challenging / Challenged ──reject or disconnect──→ Idle
/// InGame ──finish_game──→ Idle
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerState {
    /// In the lobby, free to challenge or be challenged.
    Idle,

    /// Waiting in the random join queue.
    Queued,

    /// Waiting for the invitees of its own challenge.
    Challenging,

    /// Invited by the given player, answer pending or given.
    Challenged(PlayerName),

    /// Playing a game.
    InGame,
}

// ---------------------------------------------------------------------------
// Challenge
// ---------------------------------------------------------------------------

/// A pending invitation from one player to one or more others.
#[derive(Debug, Clone)]
pub struct Challenge {
    pub requester: PlayerName,

    /// Invitees in the order the requester named them.
    pub invitees: Vec<PlayerName>,

    accepted: HashSet<PlayerName>,
}

impl Challenge {
    pub(crate) fn new(requester: PlayerName, invitees: Vec<PlayerName>) -> Self {
        Self {
            requester,
            invitees,
            accepted: HashSet::new(),
        }
    }

    /// `true` if `player` was invited.
    pub fn invites(&self, player: &PlayerName) -> bool {
        self.invitees.contains(player)
    }

    /// `true` if `player` is the requester or an invitee.
    pub fn involves(&self, player: &PlayerName) -> bool {
        &self.requester == player || self.invites(player)
    }

    /// Records an acceptance. Returns `true` once every invitee accepted.
    pub(crate) fn accept(&mut self, player: PlayerName) -> bool {
        self.accepted.insert(player);
        self.accepted.len() == self.invitees.len()
    }

    /// Requester first, then invitees: the turn order of the game.
    pub fn participants(&self) -> Vec<PlayerName> {
        std::iter::once(self.requester.clone())
            .chain(self.invitees.iter().cloned())
            .collect()
    }
}
