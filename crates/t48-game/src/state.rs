//! The game aggregate: board, score, high score, win target, RNG.
//!
//! [`GameState`] is the Board Engine's public face. It owns the only
//! mutable game data in the process and applies the pure transforms from
//! [`board`](crate::board) to it:
//!
//! - [`reset`](GameState::reset) — fold score into high score, clear, spawn two
//! - [`move_tiles`](GameState::move_tiles) — shift, add merge gain, spawn one
//! - [`spawn`](GameState::spawn) — 2 (90%) or 4 (10%) in a random empty cell
//!
//! Score only grows inside a game, and only by merges. High score only
//! changes at reset time.

use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::board::{Board, Direction};
use crate::config::GameConfig;

/// Draws above this value (out of `0..100`) spawn a 4.
const FOUR_THRESHOLD: u32 = 89;

/// Tile value for a uniform draw in `0..100`.
#[inline]
#[must_use]
pub const fn tile_for_draw(draw: u32) -> u32 {
    if draw > FOUR_THRESHOLD { 4 } else { 2 }
}

/// A tile placed by [`GameState::spawn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spawned {
    pub row: usize,
    pub col: usize,
    pub value: u32,
}

/// Board, scores, and the spawn RNG for one process.
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    score: u64,
    high_score: u64,
    win_value: u32,
    rng: StdRng,
}

impl GameState {
    /// Create a game on an empty board. The first [`reset`](Self::reset)
    /// deals the starting tiles; the turn machine does that in `Init`.
    ///
    /// The config is assumed valid (see [`GameConfig::validate`]).
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self::from_board(Board::new(config.height, config.width), 0, config)
    }

    /// Wrap an existing board without dealing tiles.
    ///
    /// Useful for resuming a position or setting one up by hand.
    #[must_use]
    pub fn from_board(board: Board, score: u64, config: &GameConfig) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            board,
            score,
            high_score: 0,
            win_value: config.win_value,
            rng,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    #[inline]
    #[must_use]
    pub const fn high_score(&self) -> u64 {
        self.high_score
    }

    #[inline]
    #[must_use]
    pub const fn win_value(&self) -> u32 {
        self.win_value
    }

    /// The largest tile on the board.
    #[must_use]
    pub fn max_tile(&self) -> u32 {
        self.board.max_tile()
    }

    // ── Operations ────────────────────────────────────────────────────

    /// Start a new game on the same board size.
    ///
    /// The outgoing score is folded into the high score first.
    pub fn reset(&mut self) {
        if self.score > self.high_score {
            self.high_score = self.score;
        }
        info!(
            "new game: {}x{} board, high score {}",
            self.board.height(),
            self.board.width(),
            self.high_score
        );

        self.score = 0;
        self.board.clear();
        self.spawn();
        self.spawn();
    }

    /// Place a 2 or a 4 in a uniformly chosen empty cell.
    ///
    /// Must only be called while the board has an empty cell. On a full
    /// board this asserts in debug builds and returns `None` otherwise,
    /// leaving the board untouched.
    pub fn spawn(&mut self) -> Option<Spawned> {
        let empty = self.board.empty_cells();
        debug_assert!(!empty.is_empty(), "spawn on a full board");

        let value = tile_for_draw(self.rng.gen_range(0..100));
        let &(row, col) = empty.choose(&mut self.rng)?;
        self.board.set(row, col, value);

        trace!("spawned {value} at ({row}, {col})");
        Some(Spawned { row, col, value })
    }

    /// Whether shifting in `dir` would change the board.
    #[must_use]
    pub fn is_move_possible(&self, dir: Direction) -> bool {
        self.board.can_move(dir)
    }

    /// Shift the tiles in `dir`.
    ///
    /// Returns `false` and changes nothing when the move is impossible.
    /// Otherwise replaces the board, adds the merge gain to the score,
    /// spawns one tile, and returns `true`.
    pub fn move_tiles(&mut self, dir: Direction) -> bool {
        if !self.is_move_possible(dir) {
            trace!("move {dir} rejected");
            return false;
        }

        let (board, gained) = self.board.shifted(dir);
        self.board = board;
        self.score += gained;
        debug!("move {dir}: +{gained}, score {}", self.score);

        self.spawn();
        true
    }

    /// True if any tile has reached the win target.
    #[must_use]
    pub fn is_win(&self) -> bool {
        self.board.max_tile() >= self.win_value
    }

    /// True if no direction can change the board.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.board.is_stuck()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
