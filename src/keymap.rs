// SPDX-License-Identifier: MIT
//
// Key → action mapping.
//
// Letters are case-insensitive: W/A/S/D move, R restarts, Q quits. The
// arrow keys move too. Raw mode turns off the terminal's own SIGINT, so
// Ctrl-C is mapped to Exit here; otherwise it would just be ignored.
//
// Everything else maps to `None`. `KeyInput` skips those and keeps
// blocking, so the turn loop only ever sees a real action.

use std::io;

use log::trace;
use t48_game::turn::{Action, ActionSource};
use t48_term::input::{KeyCode, KeyEvent, Modifiers};
use t48_term::reader::{ByteSource, KeyReader, Stdin};

/// The action a key triggers, if any.
#[must_use]
pub fn action_for(key: &KeyEvent) -> Option<Action> {
    if key.is_ctrl('c') {
        return Some(Action::Exit);
    }

    match key.code {
        KeyCode::Up => Some(Action::Up),
        KeyCode::Down => Some(Action::Down),
        KeyCode::Left => Some(Action::Left),
        KeyCode::Right => Some(Action::Right),
        // Alt/Ctrl + letter are not game keys. Shift is (that's just caps).
        // ESC then a letter inside the escape timeout arrives as Alt+letter
        // and is dropped here, so a fast `Esc w` is not a move.
        KeyCode::Char(_) if key.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT) => None,
        KeyCode::Char(ch) => match ch.to_ascii_lowercase() {
            'w' => Some(Action::Up),
            'a' => Some(Action::Left),
            's' => Some(Action::Down),
            'd' => Some(Action::Right),
            'r' => Some(Action::Restart),
            'q' => Some(Action::Exit),
            _ => None,
        },
        _ => None,
    }
}

// ─── KeyInput ───────────────────────────────────────────────────────────────

/// Player actions read from the keyboard.
pub struct KeyInput<S: ByteSource> {
    keys: KeyReader<S>,
}

impl KeyInput<Stdin> {
    /// Read from the process's standard input.
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(KeyReader::stdin())
    }
}

impl<S: ByteSource> KeyInput<S> {
    #[must_use]
    pub const fn new(keys: KeyReader<S>) -> Self {
        Self { keys }
    }
}

impl<S: ByteSource> ActionSource for KeyInput<S> {
    /// Block until a mapped key arrives. End of input counts as Exit.
    fn next_action(&mut self) -> io::Result<Action> {
        loop {
            let Some(key) = self.keys.next_key()? else {
                trace!("input closed");
                return Ok(Action::Exit);
            };
            match action_for(&key) {
                Some(action) => return Ok(action),
                None => trace!("ignored {key:?}"),
            }
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
