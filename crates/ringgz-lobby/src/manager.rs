//! The lobby: every joined player, the random join queue, and pending
//! challenges.
//!
//! # Concurrency note
//!
//! `Lobby` is plain synchronous state. The server wraps the one instance
//! in a mutex; every operation here is short and never awaits, so the
//! lock is held only for the bookkeeping itself.

use std::collections::{HashMap, VecDeque};

use ringgz_protocol::{PlayerName, Recipient, ServerCommand};

use crate::{Challenge, LobbyConfig, LobbyError, MAX_PLAYERS, MIN_PLAYERS, PlayerState};

/// A command for one recipient, produced by a lobby operation.
pub type Notice = (Recipient, ServerCommand);

/// What a lobby operation asks the caller to do next.
#[derive(Debug, Default, PartialEq)]
pub struct LobbyOutcome {
    /// Commands to deliver, in order.
    pub notices: Vec<Notice>,

    /// Participants of a game that just formed, in turn order.
    pub game: Option<Vec<PlayerName>>,
}

impl LobbyOutcome {
    fn notify(&mut self, player: &PlayerName, command: ServerCommand) {
        self.notices
            .push((Recipient::Player(player.clone()), command));
    }
}

/// Tracks the players that joined and forms games out of them.
///
/// Two routes lead into a game:
///
/// - `join` with zero desired opponents queues the player; once the queue
///   holds the current match size, the front of the queue forms a game.
/// - `request_challenge` invites named idle players; when all of them
///   accept, requester and invitees form a game.
pub struct Lobby {
    players: HashMap<PlayerName, PlayerState>,

    /// Names in the order they joined. Drives `list_players`.
    join_order: Vec<PlayerName>,

    queue: VecDeque<PlayerName>,

    /// Match size drawn when the queue last started filling.
    queue_target: usize,

    /// Pending challenges, keyed by requester.
    challenges: HashMap<PlayerName, Challenge>,

    config: LobbyConfig,
}

impl Lobby {
    /// Creates an empty lobby.
    pub fn new(config: LobbyConfig) -> Self {
        Self {
            players: HashMap::new(),
            join_order: Vec::new(),
            queue: VecDeque::new(),
            queue_target: MIN_PLAYERS,
            challenges: HashMap::new(),
            config,
        }
    }

    /// Registers a new player.
    ///
    /// Replies `accept`. With `desired_opponents == 0` the player is queued
    /// for a random match, which may form a game right away; with 1 to 3
    /// the player idles until a challenge comes along.
    ///
    /// # Errors
    /// - [`LobbyError::InvalidName`]: empty, or contains `~` or a line break
    /// - [`LobbyError::NameTaken`]: another player uses the name
    /// - [`LobbyError::InvalidPlayerCount`]: `desired_opponents` outside 0..=3
    pub fn join(
        &mut self,
        name: PlayerName,
        desired_opponents: i32,
    ) -> Result<LobbyOutcome, LobbyError> {
        if !name.is_valid() {
            return Err(LobbyError::InvalidName(name));
        }
        if self.players.contains_key(&name) {
            return Err(LobbyError::NameTaken(name));
        }
        check_desired(desired_opponents)?;

        self.players.insert(name.clone(), PlayerState::Idle);
        self.join_order.push(name.clone());
        tracing::info!(player = %name, desired_opponents, "player joined lobby");

        Ok(self.enter(name, desired_opponents))
    }

    /// Lets an idle, already registered player state a new preference,
    /// typically after a finished game.
    ///
    /// # Errors
    /// [`LobbyError::NotInLobby`] for unknown players,
    /// [`LobbyError::PlayerBusy`] unless idle, and
    /// [`LobbyError::InvalidPlayerCount`].
    pub fn rejoin(
        &mut self,
        name: &PlayerName,
        desired_opponents: i32,
    ) -> Result<LobbyOutcome, LobbyError> {
        check_desired(desired_opponents)?;
        match self.players.get(name) {
            None => return Err(LobbyError::NotInLobby(name.clone())),
            Some(PlayerState::Idle) => {}
            Some(_) => return Err(LobbyError::PlayerBusy(name.clone())),
        }
        tracing::debug!(player = %name, desired_opponents, "player rejoined lobby");
        Ok(self.enter(name.clone(), desired_opponents))
    }

    fn enter(&mut self, name: PlayerName, desired_opponents: i32) -> LobbyOutcome {
        let mut outcome = LobbyOutcome::default();
        outcome.notify(&name, ServerCommand::Accept);
        if desired_opponents == 0 {
            outcome.game = self.enqueue(name);
        }
        outcome
    }

    fn enqueue(&mut self, name: PlayerName) -> Option<Vec<PlayerName>> {
        if self.queue.is_empty() {
            self.queue_target = self.config.match_size.draw(&mut rand::rng());
        }
        self.set_state(&name, PlayerState::Queued);
        self.queue.push_back(name);
        tracing::debug!(
            queued = self.queue.len(),
            target = self.queue_target,
            "random queue grew"
        );

        if self.queue.len() < self.queue_target {
            return None;
        }
        let players: Vec<PlayerName> =
            self.queue.drain(..self.queue_target).collect();
        for player in &players {
            self.set_state(player, PlayerState::InGame);
        }
        tracing::info!(players = ?names(&players), "random match formed");
        Some(players)
    }

    /// Invites one to three idle players to a game.
    ///
    /// Every invitee receives `challengedBy~<from>`.
    ///
    /// # Errors
    /// - [`LobbyError::NotInLobby`] / [`LobbyError::PlayerBusy`]: the
    ///   requester is unknown or not idle
    /// - [`LobbyError::InvalidChallenge`]: no invitees, more than three,
    ///   duplicates, or the requester itself
    /// - [`LobbyError::UnknownPlayer`] / [`LobbyError::PlayerBusy`]: an
    ///   invitee is unknown or not idle
    pub fn request_challenge(
        &mut self,
        from: &PlayerName,
        invitees: &[PlayerName],
    ) -> Result<LobbyOutcome, LobbyError> {
        match self.players.get(from) {
            None => return Err(LobbyError::NotInLobby(from.clone())),
            Some(PlayerState::Idle) => {}
            Some(_) => return Err(LobbyError::PlayerBusy(from.clone())),
        }
        if invitees.is_empty() || invitees.len() > MAX_PLAYERS - 1 {
            return Err(LobbyError::InvalidChallenge(
                "challenge one to three players",
            ));
        }
        for (i, invitee) in invitees.iter().enumerate() {
            if invitee == from {
                return Err(LobbyError::InvalidChallenge("cannot challenge yourself"));
            }
            if invitees[..i].contains(invitee) {
                return Err(LobbyError::InvalidChallenge("player named twice"));
            }
            match self.players.get(invitee) {
                None => return Err(LobbyError::UnknownPlayer(invitee.clone())),
                Some(PlayerState::Idle) => {}
                Some(_) => return Err(LobbyError::PlayerBusy(invitee.clone())),
            }
        }

        let mut outcome = LobbyOutcome::default();
        self.set_state(from, PlayerState::Challenging);
        for invitee in invitees {
            self.set_state(invitee, PlayerState::Challenged(from.clone()));
            outcome.notify(
                invitee,
                ServerCommand::ChallengedBy {
                    challenger: from.clone(),
                },
            );
        }
        self.challenges.insert(
            from.clone(),
            Challenge::new(from.clone(), invitees.to_vec()),
        );
        tracing::info!(
            requester = %from,
            invitees = ?names(invitees),
            "challenge issued"
        );
        Ok(outcome)
    }

    /// Answers `from`'s challenge on behalf of invitee `name`.
    ///
    /// The last acceptance forms the game. A rejection cancels the whole
    /// challenge: the requester and the other invitees receive
    /// `challengeRejected~<name>` and everyone involved returns to idle.
    ///
    /// # Errors
    /// [`LobbyError::NoSuchChallenge`] unless `from` has a pending
    /// challenge that invites `name`.
    pub fn respond_challenge(
        &mut self,
        name: &PlayerName,
        from: &PlayerName,
        accept: bool,
    ) -> Result<LobbyOutcome, LobbyError> {
        let pending = self
            .challenges
            .get_mut(from)
            .filter(|challenge| challenge.invites(name))
            .ok_or_else(|| LobbyError::NoSuchChallenge(from.clone()))?;

        if accept && !pending.accept(name.clone()) {
            tracing::debug!(player = %name, requester = %from, "challenge accepted");
            return Ok(LobbyOutcome::default());
        }

        let Some(challenge) = self.challenges.remove(from) else {
            return Err(LobbyError::NoSuchChallenge(from.clone()));
        };
        if !accept {
            return Ok(self.cancel(challenge, name));
        }

        let players = challenge.participants();
        for player in &players {
            self.set_state(player, PlayerState::InGame);
        }
        tracing::info!(players = ?names(&players), "challenge accepted by all");
        Ok(LobbyOutcome {
            notices: Vec::new(),
            game: Some(players),
        })
    }

    /// Removes a player that lost its connection.
    ///
    /// The player leaves the random queue, and a pending challenge it takes
    /// part in is cancelled with `challengeRejected~<name>` to the others.
    /// Unknown names are ignored.
    pub fn disconnect(&mut self, name: &PlayerName) -> LobbyOutcome {
        let Some(state) = self.players.remove(name) else {
            return LobbyOutcome::default();
        };
        self.join_order.retain(|player| player != name);
        self.queue.retain(|player| player != name);
        tracing::info!(player = %name, "player left lobby");

        let requester = match state {
            PlayerState::Challenging => Some(name.clone()),
            PlayerState::Challenged(by) => Some(by),
            _ => None,
        };
        match requester.and_then(|r| self.challenges.remove(&r)) {
            Some(challenge) => self.cancel(challenge, name),
            None => LobbyOutcome::default(),
        }
    }

    fn cancel(&mut self, challenge: Challenge, by: &PlayerName) -> LobbyOutcome {
        let mut outcome = LobbyOutcome::default();
        for player in challenge.participants() {
            self.set_state(&player, PlayerState::Idle);
            if &player != by {
                outcome.notify(
                    &player,
                    ServerCommand::ChallengeRejected { player: by.clone() },
                );
            }
        }
        tracing::info!(
            requester = %challenge.requester,
            by = %by,
            "challenge cancelled"
        );
        outcome
    }

    /// Moves a player whose game ended back to idle.
    ///
    /// # Errors
    /// [`LobbyError::NotInLobby`] if the player is unknown.
    pub fn finish_game(&mut self, name: &PlayerName) -> Result<(), LobbyError> {
        let state = self
            .players
            .get_mut(name)
            .ok_or_else(|| LobbyError::NotInLobby(name.clone()))?;
        if *state == PlayerState::InGame {
            *state = PlayerState::Idle;
        }
        Ok(())
    }

    /// Players not currently in a game, in join order.
    pub fn list_players(&self) -> Vec<PlayerName> {
        self.join_order
            .iter()
            .filter(|p| self.players.get(*p) != Some(&PlayerState::InGame))
            .cloned()
            .collect()
    }

    /// The state of a player, if registered.
    pub fn state(&self, name: &PlayerName) -> Option<&PlayerState> {
        self.players.get(name)
    }

    /// The pending challenge issued by `requester`, if any.
    pub fn challenge(&self, requester: &PlayerName) -> Option<&Challenge> {
        self.challenges.get(requester)
    }

    /// Number of registered players, in any state.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Returns `true` if nobody is registered.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    fn set_state(&mut self, name: &PlayerName, state: PlayerState) {
        if let Some(slot) = self.players.get_mut(name) {
            *slot = state;
        }
    }
}

fn check_desired(desired_opponents: i32) -> Result<(), LobbyError> {
    if (0..MAX_PLAYERS as i32).contains(&desired_opponents) {
        Ok(())
    } else {
        Err(LobbyError::InvalidPlayerCount(desired_opponents))
    }
}

fn names(players: &[PlayerName]) -> Vec<&str> {
    players.iter().map(PlayerName::as_str).collect()
}

// =========================================================================
// Tests
// =========================================================================
