// SPDX-License-Identifier: MIT
//
// Board view — turns a `GameState` into a frame and puts it on screen.
//
// Layout, top to bottom:
//
//   SCORE: 1204
//   HIGH SCORE: 3310          ← only once a previous game scored
//   +------+------+------+------+
//   |  2   |      | 16   |      |
//   +------+------+------+------+
//   ...
//   +------+------+------+------+
//   (W)Up (S)Down (A)Left (D)Right    ← or the win / game-over banner
//   (R)Restart (Q)Exit
//
// Every cell is a 7-column slot: a `|` bar and the value centered in five
// columns plus one trailing space. Tiles are colored by value. Once the game
// is won or lost the tiles are dimmed so the banner stands out.
//
// The frame is centered on the terminal when it fits, otherwise drawn from
// the top-left corner.

use std::io::{self, Write};

use t48_game::state::GameState;
use t48_game::turn::{Renderer, Status};
use t48_term::frame::{Frame, Line};
use t48_term::output::{self, OutputBuffer};
use t48_term::style::{Attr, Color, Style};
use t48_term::terminal::{self, Size};

const CONTROLS: &str = "(W)Up (S)Down (A)Left (D)Right";
const EXIT_HINT: &str = "(R)Restart (Q)Exit";
const WIN_BANNER: &str = " YOU WIN!";
const GAME_OVER_BANNER: &str = "    Game Over";

/// Columns one cell takes, excluding its left bar.
const CELL_WIDTH: usize = 6;

// ─── Palette ────────────────────────────────────────────────────────────────

/// Tile backgrounds from the xterm 256 palette, indexed by log2(value) - 1:
/// 2, 4, 8, … 2048. Larger tiles use `BIG_TILE_BG`.
const TILE_BG: [u8; 11] = [255, 223, 215, 209, 203, 196, 229, 228, 227, 226, 220];
const BIG_TILE_BG: u8 = 237;

/// Dark text on the two palest tiles, white on the rest.
const DARK_FG: u8 = 236;
const LIGHT_FG: u8 = 231;

const WIN_STYLE: Style = Style::fg(Color::Ansi256(2)).with(Attr::BOLD);
const GAME_OVER_STYLE: Style = Style::fg(Color::Ansi256(1)).with(Attr::BOLD);
const HINT_STYLE: Style = Style::PLAIN.with(Attr::DIM);

/// Style for a tile. Empty cells are plain.
#[must_use]
pub fn tile_style(value: u32) -> Style {
    if value == 0 {
        return Style::PLAIN;
    }
    let exp = value.trailing_zeros() as usize;
    let bg = TILE_BG.get(exp.saturating_sub(1)).copied().unwrap_or(BIG_TILE_BG);
    let fg = if exp <= 2 { DARK_FG } else { LIGHT_FG };
    Style::fg(Color::Ansi256(fg))
        .on(Color::Ansi256(bg))
        .with(Attr::BOLD)
}

// ─── Frame Building ─────────────────────────────────────────────────────────

/// Build the frame for `game` in a visible state.
#[must_use]
pub fn build_frame(game: &GameState, status: Status) -> Frame {
    let board = game.board();
    let mut frame = Frame::new();

    frame.push(Line::plain(format!("SCORE: {}", game.score())));
    if game.high_score() != 0 {
        frame.push(Line::plain(format!("HIGH SCORE: {}", game.high_score())));
    }

    let separator = format!("{}+", "+------".repeat(board.width()));
    let finished = status != Status::Playing;

    for row in board.rows() {
        frame.push(Line::plain(separator.as_str()));

        let mut line = Line::new();
        for &value in row {
            line.push("|", Style::PLAIN);
            if value == 0 {
                line.push(" ".repeat(CELL_WIDTH), Style::PLAIN);
            } else {
                let mut style = tile_style(value);
                if finished {
                    style = style.with(Attr::DIM);
                }
                line.push(format!("{value: ^5} "), style);
            }
        }
        line.push("|", Style::PLAIN);
        frame.push(line);
    }
    frame.push(Line::plain(separator));

    if game.is_win() {
        frame.push(Line::styled(WIN_BANNER, WIN_STYLE));
    } else if game.is_game_over() {
        frame.push(Line::styled(GAME_OVER_BANNER, GAME_OVER_STYLE));
    } else {
        frame.push(Line::styled(CONTROLS, HINT_STYLE));
    }
    frame.push(Line::styled(EXIT_HINT, HINT_STYLE));

    frame
}

/// Top-left corner that centers a `width × height` block in `size`.
fn centered(size: Size, width: usize, height: usize) -> (u16, u16) {
    if !size.fits(width, height) {
        return (0, 0);
    }
    let x = (usize::from(size.cols) - width) / 2;
    let y = (usize::from(size.rows) - height) / 2;
    (
        u16::try_from(x).unwrap_or(0),
        u16::try_from(y).unwrap_or(0),
    )
}

// ─── BoardView ──────────────────────────────────────────────────────────────

/// Draws the game to a writer, one full frame per render.
pub struct BoardView<W: Write> {
    out: W,
    buf: OutputBuffer,
    size: Size,
    /// Re-query the terminal size before every frame.
    track_size: bool,
}

impl BoardView<io::Stdout> {
    /// Draw to stdout, following terminal resizes.
    #[must_use]
    pub fn stdout(size: Size) -> Self {
        let mut view = Self::new(io::stdout(), size);
        view.track_size = true;
        view
    }
}

impl<W: Write> BoardView<W> {
    /// Draw to `out` as if it were a terminal of a fixed `size`.
    #[must_use]
    pub fn new(out: W, size: Size) -> Self {
        Self {
            out,
            buf: OutputBuffer::new(),
            size,
            track_size: false,
        }
    }

    #[cfg(test)]
    fn output(&self) -> &W {
        &self.out
    }
}

impl<W: Write> Renderer for BoardView<W> {
    fn render(&mut self, game: &GameState, status: Status) -> io::Result<()> {
        if self.track_size {
            if let Some(size) = terminal::get_size() {
                self.size = size;
            }
        }

        let frame = build_frame(game, status);
        let (x, y) = centered(self.size, frame.width(), frame.height());

        self.buf.clear();
        output::draw_frame(&mut self.buf, &frame, x, y)?;
        self.buf.flush_to(&mut self.out)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
