//! The grid value type and the pure move transforms.
//!
//! A [`Board`] is a fixed-size, row-major grid of tile values. `0` is an
//! empty cell; everything else is a power of two.
//!
//! Only one move is written out by hand: [`move_row_left`]. Every other
//! direction is the left move seen through a mirror or a transpose:
//!
//! | Direction | Transform                                   |
//! |-----------|---------------------------------------------|
//! | Left      | `move_left(b)`                              |
//! | Right     | `flip(move_left(flip(b)))`                  |
//! | Up        | `transpose(move_left(transpose(b)))`        |
//! | Down      | `transpose(move_right(transpose(b)))`       |
//!
//! The legality checks compose the same way over [`row_is_left_movable`].
//! All transforms are pure: they return a new board together with the
//! score gained by the merges they performed.

use std::fmt;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// One of the four directions tiles can be shifted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Every direction, in the order game-over checks try them.
    pub const ALL: [Self; 4] = [Self::Up, Self::Left, Self::Down, Self::Right];

    /// Lowercase name, for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Row operations
// ---------------------------------------------------------------------------

/// Slide every non-zero value to the front, keeping their order, and pad
/// the tail with zeros back to the original length.
#[must_use]
pub fn tighten(row: &[u32]) -> Vec<u32> {
    let mut out: Vec<u32> = row.iter().copied().filter(|&v| v != 0).collect();
    out.resize(row.len(), 0);
    out
}

/// Largest tile a board holds. Two of these do not merge, since their sum
/// does not fit a `u32`.
pub const MAX_TILE: u32 = 1 << 31;

/// Whether two neighbouring cells merge when slid together.
const fn can_merge(lead: u32, next: u32) -> bool {
    lead != 0 && lead == next && lead < MAX_TILE
}

/// Merge equal neighbours of an already tightened row, left to right.
///
/// A merged pair becomes `2v` followed by a placeholder zero. The cell
/// consumed by a merge is skipped, so nothing merges twice and a merge
/// result never meets the next original cell.
fn merge(row: &[u32]) -> (Vec<u32>, u64) {
    let mut out = Vec::with_capacity(row.len());
    let mut gained = 0u64;
    let mut i = 0;

    while i < row.len() {
        let value = row[i];
        if row.get(i + 1).is_some_and(|&next| can_merge(value, next)) {
            let merged = value * 2;
            out.push(merged);
            out.push(0);
            gained += u64::from(merged);
            i += 2;
        } else {
            out.push(value);
            i += 1;
        }
    }

    (out, gained)
}

/// Shift a single row to the left: tighten, merge, tighten again.
///
/// Returns the new row and the score gained (the sum of every tile
/// created by a merge).
///
/// ```
/// use t48_game::board::move_row_left;
///
/// assert_eq!(move_row_left(&[2, 0, 2, 2]), (vec![4, 2, 0, 0], 4));
/// assert_eq!(move_row_left(&[4, 4, 4, 4]), (vec![8, 8, 0, 0], 16));
/// ```
#[must_use]
pub fn move_row_left(row: &[u32]) -> (Vec<u32>, u64) {
    let (merged, gained) = merge(&tighten(row));
    let out = tighten(&merged);
    debug_assert_eq!(out.len(), row.len());
    (out, gained)
}

/// Whether shifting this row to the left would change it.
///
/// True when some adjacent pair has an empty cell in front of a tile, or
/// two equal tiles side by side.
#[must_use]
pub fn row_is_left_movable(row: &[u32]) -> bool {
    row.windows(2).any(|pair| match (pair[0], pair[1]) {
        (0, next) => next != 0,
        (lead, next) => can_merge(lead, next),
    })
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// A `height × width` grid of tile values, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    height: usize,
    width: usize,
    cells: Vec<u32>,
}

impl Board {
    /// An all-empty board.
    #[must_use]
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            cells: vec![0; height * width],
        }
    }

    /// Build a board from explicit rows.
    #[must_use]
    pub fn from_rows<const W: usize>(rows: &[[u32; W]]) -> Self {
        Self {
            height: rows.len(),
            width: W,
            cells: rows.iter().flatten().copied().collect(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Value at `(row, col)`.
    #[inline]
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.cells[row * self.width + col]
    }

    /// Overwrite the value at `(row, col)`.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: u32) {
        self.cells[row * self.width + col] = value;
    }

    /// One row as a slice.
    #[must_use]
    pub fn row(&self, row: usize) -> &[u32] {
        let start = row * self.width;
        &self.cells[start..start + self.width]
    }

    /// Iterate over the rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        // chunks_exact panics on a zero chunk size.
        self.cells.chunks_exact(self.width.max(1))
    }

    /// Reset every cell to empty.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Coordinates of every empty cell, row-major.
    #[must_use]
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v == 0)
            .map(|(i, _)| (i / self.width, i % self.width))
            .collect()
    }

    /// Number of non-empty cells.
    #[must_use]
    pub fn count_tiles(&self) -> usize {
        self.cells.iter().filter(|&&v| v != 0).count()
    }

    /// True when no cell is empty.
    #[must_use]
    pub fn is_full(&self) -> bool {
        !self.cells.contains(&0)
    }

    /// The largest tile on the board (0 when empty).
    #[must_use]
    pub fn max_tile(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Sum of every tile value.
    #[must_use]
    pub fn sum(&self) -> u64 {
        self.cells.iter().map(|&v| u64::from(v)).sum()
    }

    // ── Geometry ──────────────────────────────────────────────────────

    /// Mirror left-to-right (reverse every row).
    #[must_use]
    pub fn flip_horizontal(&self) -> Self {
        let mut cells = Vec::with_capacity(self.cells.len());
        for row in self.rows() {
            cells.extend(row.iter().rev());
        }
        Self {
            height: self.height,
            width: self.width,
            cells,
        }
    }

    /// Swap rows and columns. A `h × w` board becomes `w × h`.
    #[must_use]
    pub fn transpose(&self) -> Self {
        let mut cells = Vec::with_capacity(self.cells.len());
        for col in 0..self.width {
            for row in 0..self.height {
                cells.push(self.get(row, col));
            }
        }
        Self {
            height: self.width,
            width: self.height,
            cells,
        }
    }

    // ── Moves ─────────────────────────────────────────────────────────

    /// Shift every row to the left.
    #[must_use]
    pub fn move_left(&self) -> (Self, u64) {
        let mut cells = Vec::with_capacity(self.cells.len());
        let mut gained = 0;
        for row in self.rows() {
            let (moved, g) = move_row_left(row);
            cells.extend(moved);
            gained += g;
        }
        let board = Self {
            height: self.height,
            width: self.width,
            cells,
        };
        (board, gained)
    }

    #[must_use]
    pub fn move_right(&self) -> (Self, u64) {
        let (moved, gained) = self.flip_horizontal().move_left();
        (moved.flip_horizontal(), gained)
    }

    #[must_use]
    pub fn move_up(&self) -> (Self, u64) {
        let (moved, gained) = self.transpose().move_left();
        (moved.transpose(), gained)
    }

    #[must_use]
    pub fn move_down(&self) -> (Self, u64) {
        let (moved, gained) = self.transpose().move_right();
        (moved.transpose(), gained)
    }

    /// The board after shifting in `dir`, and the score that earned.
    #[must_use]
    pub fn shifted(&self, dir: Direction) -> (Self, u64) {
        match dir {
            Direction::Left => self.move_left(),
            Direction::Right => self.move_right(),
            Direction::Up => self.move_up(),
            Direction::Down => self.move_down(),
        }
    }

    // ── Legality ──────────────────────────────────────────────────────

    fn can_move_left(&self) -> bool {
        self.rows().any(row_is_left_movable)
    }

    fn can_move_right(&self) -> bool {
        self.flip_horizontal().can_move_left()
    }

    /// Whether shifting in `dir` would change at least one cell.
    #[must_use]
    pub fn can_move(&self, dir: Direction) -> bool {
        match dir {
            Direction::Left => self.can_move_left(),
            Direction::Right => self.can_move_right(),
            Direction::Up => self.transpose().can_move_left(),
            Direction::Down => self.transpose().can_move_right(),
        }
    }

    /// True when no direction can change the board.
    #[must_use]
    pub fn is_stuck(&self) -> bool {
        !Direction::ALL.iter().any(|&dir| self.can_move(dir))
    }
}

/// Compact text form for logs: one line per row, `.` for empty cells.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.rows().enumerate() {
            if r > 0 {
                f.write_str(" / ")?;
            }
            for (c, &v) in row.iter().enumerate() {
                if c > 0 {
                    f.write_str(" ")?;
                }
                if v == 0 {
                    f.write_str(".")?;
                } else {
                    write!(f, "{v}")?;
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// A handful of boards with gaps, pairs, runs and full rows, square
    /// and not, used for the composition properties.
    fn sample_boards() -> Vec<Board> {
        vec![
            Board::new(4, 4),
            Board::from_rows(&[[2, 2, 0, 0], [0, 4, 0, 4], [8, 8, 8, 0], [2, 4, 8, 16]]),
            Board::from_rows(&[[2, 0, 2, 2], [4, 4, 4, 4], [0, 0, 0, 2], [2, 0, 0, 2]]),
            Board::from_rows(&[[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]),
            Board::from_rows(&[[0, 2, 2], [4, 0, 4], [2, 2, 2], [0, 0, 8], [16, 16, 0]]),
            Board::from_rows(&[[2, 2, 4, 8, 8], [0, 0, 0, 0, 2]]),
        ]
    }

    // ── tighten ───────────────────────────────────────────────────────

    #[test]
    fn tighten_moves_tiles_to_front() {
        assert_eq!(tighten(&[0, 2, 0, 4]), vec![2, 4, 0, 0]);
    }

    #[test]
    fn tighten_keeps_length() {
        assert_eq!(tighten(&[0, 0, 0]).len(), 3);
        assert_eq!(tighten(&[]), Vec::<u32>::new());
    }

    #[test]
    fn tighten_is_idempotent() {
        let rows: [&[u32]; 6] = [
            &[0, 2, 0, 4],
            &[2, 2, 2, 2],
            &[0, 0, 0, 0],
            &[8, 0, 0, 0, 0, 8],
            &[0, 16],
            &[4],
        ];
        for row in rows {
            let once = tighten(row);
            assert_eq!(tighten(&once), once, "row {row:?}");
        }
    }

    // ── move_row_left ─────────────────────────────────────────────────

    #[test]
    fn row_pair_merges() {
        assert_eq!(move_row_left(&[2, 2, 0, 0]), (vec![4, 0, 0, 0], 4));
    }

    #[test]
    fn row_leftmost_pair_merges_first() {
        assert_eq!(move_row_left(&[2, 0, 2, 2]), (vec![4, 2, 0, 0], 4));
    }

    #[test]
    fn row_four_of_a_kind_is_two_merges() {
        assert_eq!(move_row_left(&[4, 4, 4, 4]), (vec![8, 8, 0, 0], 16));
    }

    #[test]
    fn row_merge_result_does_not_chain() {
        // 2+2 makes 4, which must not then swallow the original 4.
        assert_eq!(move_row_left(&[2, 2, 4, 0]), (vec![4, 4, 0, 0], 4));
    }

    #[test]
    fn row_three_equal_merges_front_pair() {
        assert_eq!(move_row_left(&[0, 8, 8, 8]), (vec![16, 8, 0, 0], 16));
    }

    #[test]
    fn row_distant_pair_merges_once() {
        assert_eq!(move_row_left(&[2, 0, 0, 2]), (vec![4, 0, 0, 0], 4));
    }

    #[test]
    fn row_without_pairs_only_compacts() {
        assert_eq!(move_row_left(&[0, 2, 0, 4]), (vec![2, 4, 0, 0], 0));
        assert_eq!(move_row_left(&[2, 4, 8, 16]), (vec![2, 4, 8, 16], 0));
    }

    #[test]
    fn row_merge_conserves_value() {
        let rows: [&[u32]; 5] = [
            &[2, 2, 0, 0],
            &[2, 0, 2, 2],
            &[4, 4, 4, 4],
            &[8, 8, 16, 16, 0, 2],
            &[0, 0, 2, 0],
        ];
        for row in rows {
            let before: u32 = row.iter().sum();
            let (after, _) = move_row_left(row);
            assert_eq!(after.iter().sum::<u32>(), before, "row {row:?}");
        }
    }

    #[test]
    fn row_gain_is_sum_of_new_tiles() {
        // [8,8,16,16,0,2] -> [16,32,2,0,0,0]: new tiles 16 and 32.
        let (after, gained) = move_row_left(&[8, 8, 16, 16, 0, 2]);
        assert_eq!(after, vec![16, 32, 2, 0, 0, 0]);
        assert_eq!(gained, 48);
    }

    #[test]
    fn largest_tiles_do_not_merge() {
        assert_eq!(move_row_left(&[MAX_TILE, MAX_TILE]), (vec![MAX_TILE, MAX_TILE], 0));
        assert!(!row_is_left_movable(&[MAX_TILE, MAX_TILE]));

        let half = MAX_TILE / 2;
        assert_eq!(move_row_left(&[0, half, half]), (vec![MAX_TILE, 0, 0], u64::from(MAX_TILE)));
    }

    // ── row_is_left_movable ───────────────────────────────────────────

    #[test]
    fn movable_with_gap_before_tile() {
        assert!(row_is_left_movable(&[0, 2, 0, 0]));
        assert!(row_is_left_movable(&[2, 0, 0, 4]));
    }

    #[test]
    fn movable_with_equal_pair() {
        assert!(row_is_left_movable(&[2, 4, 4, 8]));
    }

    #[test]
    fn not_movable_when_packed_and_distinct() {
        assert!(!row_is_left_movable(&[2, 4, 8, 0]));
        assert!(!row_is_left_movable(&[0, 0, 0, 0]));
        assert!(!row_is_left_movable(&[2]));
    }

    #[test]
    fn movable_agrees_with_move() {
        let rows: [&[u32]; 6] = [
            &[2, 4, 8, 0],
            &[0, 0, 0, 2],
            &[2, 2, 0, 0],
            &[0, 0, 0, 0],
            &[16, 8, 16, 8],
            &[4, 0, 4, 0],
        ];
        for row in rows {
            let (moved, _) = move_row_left(row);
            assert_eq!(row_is_left_movable(row), moved != row, "row {row:?}");
        }
    }

    // ── Geometry ──────────────────────────────────────────────────────

    #[test]
    fn flip_reverses_rows() {
        let b = Board::from_rows(&[[1, 2, 3], [4, 5, 6]]);
        assert_eq!(b.flip_horizontal(), Board::from_rows(&[[3, 2, 1], [6, 5, 4]]));
    }

    #[test]
    fn transpose_swaps_dimensions() {
        let b = Board::from_rows(&[[1, 2, 3], [4, 5, 6]]);
        let t = b.transpose();
        assert_eq!(t, Board::from_rows(&[[1, 4], [2, 5], [3, 6]]));
        assert_eq!(t.transpose(), b);
    }

    // ── Moves by composition ──────────────────────────────────────────

    #[test]
    fn right_is_flipped_left() {
        for b in sample_boards() {
            let (left, gained) = b.flip_horizontal().move_left();
            assert_eq!(b.move_right(), (left.flip_horizontal(), gained));
        }
    }

    #[test]
    fn up_is_transposed_left() {
        for b in sample_boards() {
            let (left, gained) = b.transpose().move_left();
            assert_eq!(b.move_up(), (left.transpose(), gained));
        }
    }

    #[test]
    fn down_is_transposed_right() {
        for b in sample_boards() {
            let (right, gained) = b.transpose().move_right();
            assert_eq!(b.move_down(), (right.transpose(), gained));
        }
    }

    #[test]
    fn moves_keep_dimensions() {
        for b in sample_boards() {
            for dir in Direction::ALL {
                let (moved, _) = b.shifted(dir);
                assert_eq!((moved.height(), moved.width()), (b.height(), b.width()));
            }
        }
    }

    #[test]
    fn moves_conserve_board_sum() {
        for b in sample_boards() {
            for dir in Direction::ALL {
                assert_eq!(b.shifted(dir).0.sum(), b.sum(), "{dir} on {b}");
            }
        }
    }

    #[test]
    fn each_direction_on_a_column_pair() {
        let b = Board::from_rows(&[[0, 2, 0], [0, 0, 0], [0, 2, 0]]);
        assert_eq!(
            b.move_up(),
            (Board::from_rows(&[[0, 4, 0], [0, 0, 0], [0, 0, 0]]), 4)
        );
        assert_eq!(
            b.move_down(),
            (Board::from_rows(&[[0, 0, 0], [0, 0, 0], [0, 4, 0]]), 4)
        );
        assert_eq!(
            b.move_left(),
            (Board::from_rows(&[[2, 0, 0], [0, 0, 0], [2, 0, 0]]), 0)
        );
        assert_eq!(
            b.move_right(),
            (Board::from_rows(&[[0, 0, 2], [0, 0, 0], [0, 0, 2]]), 0)
        );
    }

    #[test]
    fn distant_pair_moved_together_merges_once() {
        let b = Board::from_rows(&[[0, 0, 0, 0], [2, 0, 0, 2], [0, 0, 0, 0], [0, 0, 0, 0]]);
        let (left, gained) = b.move_left();
        assert_eq!(left.row(1), &[4, 0, 0, 0]);
        assert_eq!(gained, 4);
        assert_eq!(left.count_tiles(), 1);

        let (right, gained) = b.move_right();
        assert_eq!(right.row(1), &[0, 0, 0, 4]);
        assert_eq!(gained, 4);
    }

    // ── Legality ──────────────────────────────────────────────────────

    #[test]
    fn can_move_agrees_with_shift() {
        for b in sample_boards() {
            for dir in Direction::ALL {
                let (moved, _) = b.shifted(dir);
                assert_eq!(b.can_move(dir), moved != b, "{dir} on {b}");
            }
        }
    }

    #[test]
    fn tile_in_corner_moves_two_ways() {
        let mut b = Board::new(4, 4);
        b.set(0, 0, 2);
        assert!(!b.can_move(Direction::Up));
        assert!(!b.can_move(Direction::Left));
        assert!(b.can_move(Direction::Down));
        assert!(b.can_move(Direction::Right));
    }

    #[test]
    fn checkerboard_is_stuck() {
        let b = Board::from_rows(&[[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        assert!(b.is_full());
        assert!(b.is_stuck());
    }

    #[test]
    fn full_board_with_vertical_pair_is_not_stuck() {
        let b = Board::from_rows(&[[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [2, 8, 16, 32]]);
        assert!(b.is_full());
        assert!(!b.can_move(Direction::Left));
        assert!(b.can_move(Direction::Up));
        assert!(!b.is_stuck());
    }

    #[test]
    fn empty_board_is_stuck() {
        assert!(Board::new(4, 4).is_stuck());
    }

    // ── Queries ───────────────────────────────────────────────────────

    #[test]
    fn empty_cells_are_row_major() {
        let b = Board::from_rows(&[[2, 0], [0, 4]]);
        assert_eq!(b.empty_cells(), vec![(0, 1), (1, 0)]);
        assert_eq!(b.count_tiles(), 2);
        assert!(!b.is_full());
    }

    #[test]
    fn max_tile_and_sum() {
        let b = Board::from_rows(&[[2, 0, 64], [0, 4, 8]]);
        assert_eq!(b.max_tile(), 64);
        assert_eq!(b.sum(), 78);
        assert_eq!(Board::new(2, 2).max_tile(), 0);
    }

    #[test]
    fn clear_empties_every_cell() {
        let mut b = Board::from_rows(&[[2, 4], [8, 16]]);
        b.clear();
        assert_eq!(b, Board::new(2, 2));
    }

    #[test]
    fn display_is_compact() {
        let b = Board::from_rows(&[[2, 0], [0, 1024]]);
        assert_eq!(b.to_string(), "2 . / . 1024");
    }

    #[test]
    fn direction_names() {
        assert_eq!(Direction::Up.to_string(), "up");
        assert_eq!(Direction::Right.name(), "right");
    }
}
