//! Game configuration.
//!
//! Board dimensions and the win target are fixed for the lifetime of a
//! game. [`GameConfig::validate`] is the single gate that guarantees the
//! engine's preconditions: at least two cells, so a reset can always
//! place its two starting tiles.

use thiserror::Error;

/// Default board side length.
pub const DEFAULT_SIDE: usize = 4;

/// Default tile value that wins the game.
pub const DEFAULT_WIN: u32 = 2048;

/// Largest accepted board side.
pub const MAX_SIDE: usize = 16;

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{axis} must be between 1 and {max}, got {value}", max = MAX_SIDE)]
    SideOutOfRange { axis: &'static str, value: usize },

    #[error("a {height}x{width} board has fewer than two cells")]
    TooFewCells { height: usize, width: usize },

    #[error("win target must be a power of two of at least 4, got {0}")]
    WinValue(u32),
}

/// Parameters for a [`GameState`](crate::state::GameState).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    /// Number of rows.
    pub height: usize,
    /// Number of columns.
    pub width: usize,
    /// A tile at or above this value wins.
    pub win_value: u32,
    /// Seed for the spawn RNG. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            height: DEFAULT_SIDE,
            width: DEFAULT_SIDE,
            win_value: DEFAULT_WIN,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Build and validate a configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] the values violate.
    pub fn new(height: usize, width: usize, win_value: u32) -> Result<Self, ConfigError> {
        let config = Self {
            height,
            width,
            win_value,
            seed: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Use a fixed RNG seed for reproducible spawns.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check every field.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::SideOutOfRange`] if a side is 0 or above [`MAX_SIDE`]
    /// - [`ConfigError::TooFewCells`] for a 1×1 board
    /// - [`ConfigError::WinValue`] if the target is not a power of two ≥ 4
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (axis, value) in [("height", self.height), ("width", self.width)] {
            if value == 0 || value > MAX_SIDE {
                return Err(ConfigError::SideOutOfRange { axis, value });
            }
        }
        if self.height * self.width < 2 {
            return Err(ConfigError::TooFewCells {
                height: self.height,
                width: self.width,
            });
        }
        if self.win_value < 4 || !self.win_value.is_power_of_two() {
            return Err(ConfigError::WinValue(self.win_value));
        }
        Ok(())
    }
}
