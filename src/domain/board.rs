/// Board: the square grid of tiles.
///
/// Cells are stored row-major. A cell is either `0` (empty) or a power of
/// two >= 2. All mutation outside this module goes through `set()`, and
/// every constructor validates both the dimensions and the cell values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_SIZE: usize = 4;
pub const MIN_SIZE: usize = 2;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("invalid direction: {0:?}")]
    InvalidDirection(String),
    #[error("invalid board dimensions: {rows}x{cols} (must be square and at least 2x2)")]
    InvalidBoardDimensions { rows: usize, cols: usize },
    #[error("invalid tile value {value} at ({row}, {col})")]
    InvalidTile { row: usize, col: usize, value: u32 },
}

// ── Direction ──

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Decode the compact numeric form (0=Up, 1=Down, 2=Left, 3=Right).
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn from_code(code: u8) -> Result<Direction, BoardError> {
        match code {
            0 => Ok(Direction::Up),
            1 => Ok(Direction::Down),
            2 => Ok(Direction::Left),
            3 => Ok(Direction::Right),
            other => Err(BoardError::InvalidDirection(other.to_string())),
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl FromStr for Direction {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "u" => Ok(Direction::Up),
            "down" | "d" => Ok(Direction::Down),
            "left" | "l" => Ok(Direction::Left),
            "right" | "r" => Ok(Direction::Right),
            _ => Err(BoardError::InvalidDirection(s.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Position ──

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }
}

/// Is `value` a legal cell content?
#[inline]
pub fn is_valid_tile(value: u32) -> bool {
    value == 0 || (value >= 2 && value.is_power_of_two())
}

/// Largest tile a cell can hold. Two of these never merge.
pub const MAX_TILE: u32 = 1 << 31;

/// Would two neighbouring cells holding `a` and `b` merge?
#[inline]
pub fn can_merge(a: u32, b: u32) -> bool {
    a != 0 && a == b && a < MAX_TILE
}

// ── Board ──

#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Board {
    size: usize,
    cells: Vec<u32>,
}

impl Board {
    /// Empty board of `size` x `size`.
    pub fn new(size: usize) -> Result<Self, BoardError> {
        if size < MIN_SIZE {
            return Err(BoardError::InvalidBoardDimensions { rows: size, cols: size });
        }
        Ok(Board { size, cells: vec![0; size * size] })
    }

    /// Build a board from explicit rows. Rows must form a square of at
    /// least `MIN_SIZE` and every value must be a legal tile.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn from_rows<R: AsRef<[u32]>>(rows: &[R]) -> Result<Self, BoardError> {
        let size = rows.len();
        let mut board = Board::new(size).map_err(|_| BoardError::InvalidBoardDimensions {
            rows: size,
            cols: rows.first().map_or(0, |r| r.as_ref().len()),
        })?;

        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != size {
                return Err(BoardError::InvalidBoardDimensions { rows: size, cols: values.len() });
            }
            for (col, &value) in values.iter().enumerate() {
                if !is_valid_tile(value) {
                    return Err(BoardError::InvalidTile { row, col, value });
                }
                board.cells[row * size + col] = value;
            }
        }
        Ok(board)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, pos: Position) -> u32 {
        self.cells[pos.row * self.size + pos.col]
    }

    /// Write a cell. Callers only ever write 0 or a doubled tile, so the
    /// tile invariant is checked in debug builds only.
    #[inline]
    pub fn set(&mut self, pos: Position, value: u32) {
        debug_assert!(is_valid_tile(value), "illegal tile value {value}");
        self.cells[pos.row * self.size + pos.col] = value;
    }

    #[inline]
    pub fn is_empty_at(&self, pos: Position) -> bool {
        self.get(pos) == 0
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.cells.chunks(self.size)
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        self.rows().map(|r| r.to_vec()).collect()
    }

    /// All empty cells in row-major order.
    pub fn empty_cells(&self) -> Vec<Position> {
        self.positions().filter(|&p| self.is_empty_at(p)).collect()
    }

    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|&&v| v == 0).count()
    }

    pub fn max_tile(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    pub fn tile_sum(&self) -> u64 {
        self.cells.iter().map(|&v| v as u64).sum()
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let size = self.size;
        (0..size * size).map(move |i| Position::new(i / size, i % size))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            let line: Vec<String> = row
                .iter()
                .map(|&v| if v == 0 { format!("{:>6}", ".") } else { format!("{v:>6}") })
                .collect();
            writeln!(f, "{}", line.join(""))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_board_is_empty_and_square() {
        let b = Board::new(4).unwrap();
        assert_eq!(b.size(), 4);
        assert_eq!(b.count_empty(), 16);
        assert_eq!(b.max_tile(), 0);
    }

    #[test]
    fn too_small_board_rejected() {
        assert_eq!(
            Board::new(1),
            Err(BoardError::InvalidBoardDimensions { rows: 1, cols: 1 })
        );
        assert!(Board::new(0).is_err());
    }

    #[test]
    fn non_square_rows_rejected() {
        let err = Board::from_rows(&[[2, 2, 2, 2]]).unwrap_err();
        assert_eq!(err, BoardError::InvalidBoardDimensions { rows: 1, cols: 4 });

        let ragged: Vec<Vec<u32>> = vec![vec![0, 0], vec![0, 0, 0]];
        assert!(matches!(
            Board::from_rows(&ragged),
            Err(BoardError::InvalidBoardDimensions { .. })
        ));
    }

    #[test]
    fn illegal_tile_values_rejected() {
        let err = Board::from_rows(&[[0, 3], [0, 0]]).unwrap_err();
        assert_eq!(err, BoardError::InvalidTile { row: 0, col: 1, value: 3 });
        assert!(Board::from_rows(&[[1, 0], [0, 0]]).is_err());
    }

    #[test]
    fn from_rows_round_trips_layout() {
        let rows = [[2, 0, 0], [0, 4, 0], [0, 0, 8]];
        let b = Board::from_rows(&rows).unwrap();
        assert_eq!(b.get(Position::new(1, 1)), 4);
        assert_eq!(b.get(Position::new(2, 2)), 8);
        let back: Vec<&[u32]> = b.rows().collect();
        assert_eq!(back, vec![&[2, 0, 0][..], &[0, 4, 0], &[0, 0, 8]]);
        assert_eq!(b.tile_sum(), 14);
        assert_eq!(b.empty_cells().len(), 6);
    }

    #[test]
    fn direction_parsing() {
        assert_eq!("LEFT".parse::<Direction>(), Ok(Direction::Left));
        assert_eq!(" u ".parse::<Direction>(), Ok(Direction::Up));
        assert_eq!(
            "diagonal".parse::<Direction>(),
            Err(BoardError::InvalidDirection("diagonal".into()))
        );
        for d in Direction::ALL {
            assert_eq!(Direction::from_code(d.code()), Ok(d));
        }
        assert!(matches!(Direction::from_code(4), Err(BoardError::InvalidDirection(_))));
    }
}
