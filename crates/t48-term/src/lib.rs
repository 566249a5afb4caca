// SPDX-License-Identifier: MIT
//
// t48-term — Terminal backend for t48.
//
// Everything the game needs from a terminal and nothing more: raw mode and
// the alternate screen, a blocking key reader with ESC disambiguation, and
// a frame model that is encoded to ANSI and written in one syscall.
//
// No TUI framework sits underneath. Escape sequences are written by hand
// (`ansi`), termios is driven through `libc` (`terminal`), and a redraw is
// a single buffered write wrapped in synchronized output (`output`).

pub mod ansi;
pub mod frame;
pub mod input;
pub mod output;
pub mod reader;
pub mod style;
pub mod terminal;
