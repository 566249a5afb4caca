//! # t48-game — Game core for t48
//!
//! Everything that makes 2048 a game, with no knowledge of terminals:
//!
//! - **[`board`]** — `Board` grid value type, `Direction`, and the pure
//!   move/merge/legality transforms built from one canonical left move
//! - **[`state`]** — `GameState`: board, score, high score, spawning
//! - **[`turn`]** — the turn state machine and its input/render seams
//! - **[`config`]** — board size and win target, validated

pub mod board;
pub mod config;
pub mod state;
pub mod turn;
