//! Game configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::board::{BOARD_SIZE, WIN_LENGTH};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("board_size must be > 0")]
    ZeroBoardSize,

    #[error("win_length must be > 0")]
    ZeroWinLength,

    #[error("win_length {win_length} exceeds board_size {board_size}")]
    WinLengthTooLong { win_length: usize, board_size: usize },
}

/// Board geometry shared by every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Board dimension N (the board is N×N)
    pub board_size: usize,
    /// Run length needed to win
    pub win_length: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: BOARD_SIZE,
            win_length: WIN_LENGTH,
        }
    }
}

impl GameConfig {
    /// Parse configuration from a JSON string. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_size == 0 {
            return Err(ConfigError::ZeroBoardSize);
        }
        if self.win_length == 0 {
            return Err(ConfigError::ZeroWinLength);
        }
        if self.win_length > self.board_size {
            return Err(ConfigError::WinLengthTooLong {
                win_length: self.win_length,
                board_size: self.board_size,
            });
        }
        Ok(())
    }
}
