// SPDX-License-Identifier: MIT
//
// t48 — 2048 in the terminal.
//
// This is the main binary that wires together the two crates:
//
//   t48-game → board engine, game state, turn state machine
//   t48-term → raw mode, key reading, frame output
//
// The turn controller owns the game and drives it against two
// collaborators defined here: `KeyInput` (keys → actions) and
// `BoardView` (game → frame → terminal). Each turn flows through:
//
//   stdin → parser → keymap → Action → State::next → GameState
//   GameState → build_frame → draw_frame → one write() → terminal
//
// Logging goes to a file or nowhere. Anything written to stderr while the
// alternate screen is up would land in the middle of the board.

mod keymap;
mod view;

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Env, Target};
use log::info;

use t48_game::config::{DEFAULT_SIDE, DEFAULT_WIN, GameConfig};
use t48_game::state::GameState;
use t48_game::turn::TurnController;
use t48_term::terminal::Terminal;

use crate::keymap::KeyInput;
use crate::view::BoardView;

// ─── Command Line ───────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "t48", version, about = "Slide tiles, merge equal pairs, reach 2048")]
struct Cli {
    /// Board width in cells (1-16)
    #[arg(long, value_name = "N", default_value_t = DEFAULT_SIDE)]
    width: usize,

    /// Board height in cells (1-16)
    #[arg(long, value_name = "N", default_value_t = DEFAULT_SIDE)]
    height: usize,

    /// Tile value that wins the game (a power of two, at least 4)
    #[arg(long, value_name = "VALUE", default_value_t = DEFAULT_WIN)]
    win: u32,

    /// Seed for tile spawns, for a reproducible game
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Write logs to this file (filter with RUST_LOG, default "info")
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// The validated game configuration.
    fn config(&self) -> Result<GameConfig> {
        let config = GameConfig::new(self.height, self.width, self.win)?;
        Ok(match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        })
    }
}

// ─── Setup ──────────────────────────────────────────────────────────────────

/// Send logs to `path`, truncating it.
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.config()?;
    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }
    info!(
        "starting {}x{} game, win at {}, seed {:?}",
        config.height, config.width, config.win_value, config.seed
    );

    let mut terminal = Terminal::new().context("failed to initialize terminal")?;
    terminal.enter().context("failed to enter raw mode")?;

    let mut controller = TurnController::new(GameState::new(&config));
    let result = controller.run(&mut KeyInput::stdin(), &mut BoardView::stdout(terminal.size()));

    // Restore the screen before any error is printed.
    let restored = terminal.leave();
    finish(result, restored)?;

    let game = controller.game();
    info!("exit: score {}, high score {}", game.score(), game.high_score());
    Ok(())
}

/// Combine the outcome of the game with that of restoring the terminal.
/// A game error wins: it is the cause, a failed restore is the aftermath.
fn finish(played: io::Result<()>, restored: io::Result<()>) -> Result<()> {
    played.context("game aborted")?;
    restored.context("failed to restore terminal")
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("t48: {e:#}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
