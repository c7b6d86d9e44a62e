//! Server configuration, loadable from a JSON file.

use std::path::Path;

use ringgz_game::GameConfig;
use ringgz_lobby::{LobbyConfig, MAX_PLAYERS, MIN_PLAYERS, MatchSize};
use ringgz_transport::DEFAULT_MAX_LINE_LENGTH;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Everything a server needs to start.
///
/// Every field has a default, so a config file only lists what it
/// changes:
///
/// ```json
/// { "bind_addr": "0.0.0.0:4000", "random_match_size": true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the TCP listener binds to.
    pub bind_addr: String,

    /// Longest accepted inbound line, in bytes. A longer line closes the
    /// connection.
    pub max_line_length: usize,

    /// Fixed starting base for every game; random per game when unset.
    pub starting_base: Option<usize>,

    /// Players per game formed from the random join queue.
    pub match_size: usize,

    /// Draw the match size from 2 to 4 per game instead of using
    /// `match_size`.
    pub random_match_size: bool,

    /// Capacity of each game's command channel.
    pub game_channel_size: usize,

    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:4000".to_string(),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            starting_base: None,
            match_size: MIN_PLAYERS,
            random_match_size: false,
            game_channel_size: GameConfig::default().channel_size,
            log_filter: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Reads and validates a JSON config file.
    ///
    /// # Errors
    /// [`ConfigError::Read`], [`ConfigError::Parse`], or
    /// [`ConfigError::Invalid`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parses and validates a JSON config document.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every setting is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_line_length == 0 {
            return Err(invalid("max_line_length", "must be positive"));
        }
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.match_size) {
            return Err(invalid(
                "match_size",
                format!("must be {MIN_PLAYERS} to {MAX_PLAYERS}"),
            ));
        }
        if self.game_channel_size == 0 {
            return Err(invalid("game_channel_size", "must be positive"));
        }
        self.game_config()
            .validate()
            .map_err(|e| invalid("starting_base", e.to_string()))
    }

    /// The lobby settings derived from this config.
    pub fn lobby_config(&self) -> LobbyConfig {
        LobbyConfig {
            match_size: if self.random_match_size {
                MatchSize::Random
            } else {
                MatchSize::Fixed(self.match_size)
            },
        }
    }

    /// The game settings derived from this config.
    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            starting_base: self.starting_base,
            channel_size: self.game_channel_size,
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}
