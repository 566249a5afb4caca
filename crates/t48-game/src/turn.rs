//! The turn state machine.
//!
//! The game is always in exactly one [`State`]:
//!
//! | State      | Renders | Reads input | On action                              |
//! |------------|---------|-------------|----------------------------------------|
//! | `Init`     | no      | no          | reset the game, go to `Game`           |
//! | `Game`     | yes     | yes         | move; maybe `Win` / `Gameover`         |
//! | `Win`      | yes     | yes         | only `Restart` / `Exit` do anything    |
//! | `Gameover` | yes     | yes         | only `Restart` / `Exit` do anything    |
//! | `Exit`     | no      | no          | terminal                               |
//!
//! [`State::next`] is the whole transition table as one pure function over
//! the game. [`TurnController`] drives it against two collaborators: an
//! [`ActionSource`] that blocks for the next player action, and a
//! [`Renderer`] that draws each visible state before the read.

use std::fmt;
use std::io;

use log::debug;

use crate::board::Direction;
use crate::state::GameState;

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// A discrete player action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Up,
    Left,
    Down,
    Right,
    Restart,
    Exit,
}

impl Action {
    /// The direction this action shifts in, if it is a move.
    #[must_use]
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Self::Up => Some(Direction::Up),
            Self::Left => Some(Direction::Left),
            Self::Down => Some(Direction::Down),
            Self::Right => Some(Direction::Right),
            Self::Restart | Self::Exit => None,
        }
    }
}

impl From<Direction> for Action {
    fn from(dir: Direction) -> Self {
        match dir {
            Direction::Up => Self::Up,
            Direction::Left => Self::Left,
            Direction::Down => Self::Down,
            Direction::Right => Self::Right,
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// What the player sees while a visible state is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Moves are accepted.
    Playing,
    /// The win target was reached. Only restart or exit.
    Won,
    /// No move is possible. Only restart or exit.
    GameOver,
}

/// A state of the turn machine.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Deal a fresh game.
    #[default]
    Init,
    /// Accepting moves.
    Game,
    /// Won; waiting for restart or exit.
    Win,
    /// Lost; waiting for restart or exit.
    Gameover,
    /// Done. The loop stops here.
    Exit,
}

impl State {
    /// The render status for this state, or `None` for states that are
    /// never drawn (`Init`, `Exit`). A state with a status also reads an
    /// action.
    #[must_use]
    pub const fn status(self) -> Option<Status> {
        match self {
            Self::Game => Some(Status::Playing),
            Self::Win => Some(Status::Won),
            Self::Gameover => Some(Status::GameOver),
            Self::Init | Self::Exit => None,
        }
    }

    /// True for the terminal state.
    #[inline]
    #[must_use]
    pub const fn is_exit(self) -> bool {
        matches!(self, Self::Exit)
    }

    /// Apply one transition.
    ///
    /// `action` is the action read during this visit. `Init` ignores it
    /// (it never reads one); a visible state given `None` stays put.
    #[must_use]
    pub fn next(self, game: &mut GameState, action: Option<Action>) -> Self {
        match self {
            Self::Init => {
                game.reset();
                Self::Game
            }
            Self::Game => match action {
                Some(Action::Restart) => Self::Init,
                Some(Action::Exit) => Self::Exit,
                Some(action) => {
                    let moved = action.direction().is_some_and(|dir| game.move_tiles(dir));
                    if !moved {
                        Self::Game
                    } else if game.is_win() {
                        Self::Win
                    } else if game.is_game_over() {
                        Self::Gameover
                    } else {
                        Self::Game
                    }
                }
                None => Self::Game,
            },
            Self::Win | Self::Gameover => match action {
                Some(Action::Restart) => Self::Init,
                Some(Action::Exit) => Self::Exit,
                _ => self,
            },
            Self::Exit => Self::Exit,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Init => "init",
            Self::Game => "game",
            Self::Win => "win",
            Self::Gameover => "gameover",
            Self::Exit => "exit",
        })
    }
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Supplies player actions.
pub trait ActionSource {
    /// Block until the next recognized action.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the underlying input.
    fn next_action(&mut self) -> io::Result<Action>;
}

/// Draws the game.
pub trait Renderer {
    /// Draw `game` for a visible state.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the underlying output.
    fn render(&mut self, game: &GameState, status: Status) -> io::Result<()>;
}

// ---------------------------------------------------------------------------
// TurnController
// ---------------------------------------------------------------------------

/// Owns the game and runs the state machine.
pub struct TurnController {
    game: GameState,
    state: State,
}

impl TurnController {
    /// Start in `Init` with the given game.
    #[must_use]
    pub const fn new(game: GameState) -> Self {
        Self {
            game,
            state: State::Init,
        }
    }

    #[inline]
    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    #[inline]
    #[must_use]
    pub const fn game(&self) -> &GameState {
        &self.game
    }

    /// Give the game back, e.g. to report the final score.
    #[must_use]
    pub fn into_game(self) -> GameState {
        self.game
    }

    /// Visit the current state once: render and read if it is visible,
    /// then transition. Returns the new state.
    ///
    /// # Errors
    ///
    /// Propagates collaborator I/O errors. The state is left unchanged.
    pub fn step(
        &mut self,
        input: &mut impl ActionSource,
        renderer: &mut impl Renderer,
    ) -> io::Result<State> {
        let action = match self.state.status() {
            Some(status) => {
                renderer.render(&self.game, status)?;
                Some(input.next_action()?)
            }
            None => None,
        };

        let next = self.state.next(&mut self.game, action);
        if next != self.state {
            debug!("{} -> {next} ({action:?})", self.state);
        }
        self.state = next;
        Ok(next)
    }

    /// Run until the machine reaches `Exit`.
    ///
    /// # Errors
    ///
    /// Stops at the first collaborator I/O error.
    pub fn run(
        &mut self,
        input: &mut impl ActionSource,
        renderer: &mut impl Renderer,
    ) -> io::Result<()> {
        while !self.state.is_exit() {
            self.step(input, renderer)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::board::Board;
    use crate::config::GameConfig;
    use pretty_assertions::assert_eq;

    /// Replays a fixed list of actions, then reports end of input.
    struct Script(VecDeque<Action>);

    impl Script {
        fn new(actions: &[Action]) -> Self {
            Self(actions.iter().copied().collect())
        }
    }

    impl ActionSource for Script {
        fn next_action(&mut self) -> io::Result<Action> {
            self.0
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
        }
    }

    /// Records every render call.
    #[derive(Default)]
    struct Recorder {
        frames: Vec<(Status, u64, u64)>,
    }

    impl Renderer for Recorder {
        fn render(&mut self, game: &GameState, status: Status) -> io::Result<()> {
            self.frames.push((status, game.score(), game.high_score()));
            Ok(())
        }
    }

    fn config() -> GameConfig {
        GameConfig::default().with_seed(2024)
    }

    fn game_with(rows: &[[u32; 4]]) -> GameState {
        GameState::from_board(Board::from_rows(rows), 0, &config())
    }

    const LOCKED: [[u32; 4]; 4] = [[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]];

    // ── State::next ───────────────────────────────────────────────────

    #[test]
    fn init_resets_and_plays() {
        let mut g = game_with(&LOCKED);
        assert_eq!(State::Init.next(&mut g, None), State::Game);
        assert_eq!(g.board().count_tiles(), 2);
    }

    #[test]
    fn game_restart_and_exit() {
        let mut g = GameState::new(&config());
        assert_eq!(State::Game.next(&mut g, Some(Action::Restart)), State::Init);
        assert_eq!(State::Game.next(&mut g, Some(Action::Exit)), State::Exit);
    }

    #[test]
    fn game_rejected_move_stays() {
        let mut g = game_with(&[[2, 4, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let before = g.board().clone();
        assert_eq!(State::Game.next(&mut g, Some(Action::Left)), State::Game);
        assert_eq!(g.board(), &before);
    }

    #[test]
    fn game_accepted_move_stays_when_nothing_ends() {
        let mut g = game_with(&[[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        assert_eq!(State::Game.next(&mut g, Some(Action::Left)), State::Game);
        assert_eq!(g.score(), 4);
    }

    #[test]
    fn game_winning_move() {
        let mut g = game_with(&[[1024, 1024, 0, 0], [0; 4], [0; 4], [0; 4]]);
        assert_eq!(State::Game.next(&mut g, Some(Action::Right)), State::Win);
        assert!(g.is_win());
    }

    #[test]
    fn game_losing_move() {
        // Merging the 2s on the bottom row fills the gap so that, after the
        // forced spawn lands in the only empty cell, nothing can move.
        // Bottom row after Left: [4, 8, 16, _]; the spawn (2 or 4) goes to
        // the last cell, and every column alternates values.
        let mut g = game_with(&[
            [32, 64, 128, 256],
            [64, 128, 256, 32],
            [32, 64, 128, 512],
            [2, 2, 8, 16],
        ]);
        let next = State::Game.next(&mut g, Some(Action::Left));
        assert_eq!(&g.board().row(3)[..3], &[4, 8, 16]);
        assert_eq!(next, State::Gameover);
    }

    #[test]
    fn win_takes_precedence_over_game_over() {
        let config = GameConfig::new(2, 2, 8).unwrap().with_seed(1);
        // [4,4],[2,16] -Left-> [8,_],[2,16]; any spawn in the gap leaves a
        // locked board, but the 8 wins first.
        let mut g = GameState::from_board(Board::from_rows(&[[4, 4], [2, 16]]), 0, &config);
        assert_eq!(State::Game.next(&mut g, Some(Action::Left)), State::Win);
    }

    #[test]
    fn terminal_display_states_ignore_moves() {
        let mut g = game_with(&[[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let before = g.board().clone();
        for state in [State::Win, State::Gameover] {
            for action in [Action::Up, Action::Down, Action::Left, Action::Right] {
                assert_eq!(state.next(&mut g, Some(action)), state);
            }
            assert_eq!(state.next(&mut g, Some(Action::Restart)), State::Init);
            assert_eq!(state.next(&mut g, Some(Action::Exit)), State::Exit);
        }
        assert_eq!(g.board(), &before);
    }

    #[test]
    fn exit_is_terminal() {
        let mut g = GameState::new(&config());
        assert_eq!(State::Exit.next(&mut g, Some(Action::Restart)), State::Exit);
        assert!(State::Exit.is_exit());
    }

    #[test]
    fn statuses() {
        assert_eq!(State::Init.status(), None);
        assert_eq!(State::Game.status(), Some(Status::Playing));
        assert_eq!(State::Win.status(), Some(Status::Won));
        assert_eq!(State::Gameover.status(), Some(Status::GameOver));
        assert_eq!(State::Exit.status(), None);
    }

    #[test]
    fn action_directions() {
        for dir in Direction::ALL {
            assert_eq!(Action::from(dir).direction(), Some(dir));
        }
        assert_eq!(Action::Restart.direction(), None);
        assert_eq!(Action::Exit.direction(), None);
    }

    // ── TurnController ────────────────────────────────────────────────

    #[test]
    fn exit_immediately_renders_once() {
        let mut tc = TurnController::new(GameState::new(&config()));
        let mut input = Script::new(&[Action::Exit]);
        let mut out = Recorder::default();
        tc.run(&mut input, &mut out).unwrap();

        assert_eq!(tc.state(), State::Exit);
        assert_eq!(out.frames, vec![(Status::Playing, 0, 0)]);
    }

    #[test]
    fn renders_every_visible_visit() {
        let mut tc = TurnController::new(GameState::new(&config()));
        let mut input = Script::new(&[Action::Up, Action::Left, Action::Restart, Action::Exit]);
        let mut out = Recorder::default();
        tc.run(&mut input, &mut out).unwrap();

        // Init is not drawn: four reads, four renders.
        assert_eq!(out.frames.len(), 4);
        assert!(out.frames.iter().all(|f| f.0 == Status::Playing));
    }

    #[test]
    fn step_walks_init_then_game() {
        let mut tc = TurnController::new(GameState::new(&config()));
        let mut input = Script::new(&[]);
        let mut out = Recorder::default();
        assert_eq!(tc.game().board().count_tiles(), 0);

        // Init deals the only starting tiles.
        assert_eq!(tc.step(&mut input, &mut out).unwrap(), State::Game);
        assert_eq!(tc.game().board().count_tiles(), 2);
        assert!(out.frames.is_empty());
    }

    #[test]
    fn restart_folds_score_into_high_score() {
        let game = game_with(&[[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let mut tc = TurnController::new(game);
        // Skip Init so the hand-built board is played.
        tc.state = State::Game;

        let mut input = Script::new(&[Action::Left, Action::Restart, Action::Exit]);
        let mut out = Recorder::default();
        tc.run(&mut input, &mut out).unwrap();

        assert_eq!(
            out.frames,
            vec![
                (Status::Playing, 0, 0),
                (Status::Playing, 4, 0),
                (Status::Playing, 0, 4),
            ]
        );
        assert_eq!(tc.game().high_score(), 4);
    }

    #[test]
    fn win_screen_waits_for_restart() {
        let game = game_with(&[[1024, 1024, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let mut tc = TurnController::new(game);
        tc.state = State::Game;

        let mut input = Script::new(&[
            Action::Left,
            Action::Down,
            Action::Up,
            Action::Restart,
            Action::Exit,
        ]);
        let mut out = Recorder::default();
        tc.run(&mut input, &mut out).unwrap();

        let statuses: Vec<Status> = out.frames.iter().map(|f| f.0).collect();
        assert_eq!(
            statuses,
            vec![
                Status::Playing,
                Status::Won,
                Status::Won,
                Status::Won,
                Status::Playing,
            ]
        );
        assert_eq!(tc.into_game().high_score(), 2048);
    }

    #[test]
    fn input_error_stops_the_loop() {
        let mut tc = TurnController::new(GameState::new(&config()));
        let mut input = Script::new(&[Action::Left]);
        let mut out = Recorder::default();

        let err = tc.run(&mut input, &mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(tc.state(), State::Game);
    }
}
