//! Game settings.

use ringgz_board::{Board, BoardError};
use serde::{Deserialize, Serialize};

/// Settings shared by every game the server starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Fixed starting base field for every game. `None` draws one of the
    /// nine inner fields at random per game.
    pub starting_base: Option<usize>,

    /// Capacity of each game actor's command channel.
    pub channel_size: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_base: None,
            channel_size: 64,
        }
    }
}

impl GameConfig {
    /// Checks the configured starting base, if any.
    ///
    /// # Errors
    /// [`BoardError::InvalidStartingBase`] for a field outside the inner
    /// 3×3 block.
    pub fn validate(&self) -> Result<(), BoardError> {
        self.board().map(|_| ())
    }

    /// A fresh board for a new game.
    ///
    /// # Errors
    /// Same as [`validate`](Self::validate).
    pub fn board(&self) -> Result<Board, BoardError> {
        match self.starting_base {
            Some(field) => Board::new(field),
            None => Ok(Board::with_random_base(&mut rand::rng())),
        }
    }
}

#[cfg(test)]
mod tests {
    use ringgz_board::STARTING_BASE_FIELDS;

    use super::*;

    #[test]
    fn test_default_draws_random_base() {
        let config = GameConfig::default();
        let board = config.board().unwrap();
        assert!(STARTING_BASE_FIELDS.contains(&board.starting_base()));
    }

    #[test]
    fn test_fixed_base_is_used() {
        let config = GameConfig {
            starting_base: Some(17),
            ..GameConfig::default()
        };
        assert_eq!(config.board().unwrap().starting_base(), 17);
    }

    #[test]
    fn test_validate_rejects_outer_field() {
        let config = GameConfig {
            starting_base: Some(0),
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(BoardError::InvalidStartingBase(0)));
    }
}
