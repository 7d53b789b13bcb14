/// Terminal rules: when a game is won or lost, and what each level demands.
///
/// Pure functions over a `Board`. These decide "is this over" without
/// touching session state.
///
/// ## Terminal Table
///
/// ┌───────────────────────────────────────┬──────────┐
/// │ Condition                             │ Result   │
/// ├───────────────────────────────────────┼──────────┤
/// │ any cell >= target, not yet won       │ WIN      │
/// │ any cell >= target, already won       │ -        │
/// │ an empty cell exists                  │ -        │
/// │ full, some right/down neighbour equal │ -        │
/// │ full, no equal neighbours             │ LOSS     │
/// └───────────────────────────────────────┴──────────┘
///
/// ## Level Table
///
/// ┌───────┬────────┬───────────────┐
/// │ Level │ Target │ Initial tiles │
/// ├───────┼────────┼───────────────┤
/// │ 1     │ 2048   │ 2             │
/// │ 2     │ 4096   │ 3             │
/// │ 3     │ 8192   │ 3             │
/// │ 4     │ 16384  │ 4             │
/// │ n     │ 2^(10+n) │ min(2+n/2, 6) │
/// └───────┴────────┴───────────────┘

use super::board::{can_merge, Board, Position};

pub const MAX_INITIAL_TILES: usize = 6;

/// Highest level; its target 2^63 is the last one a u64 holds.
pub const MAX_LEVEL: u32 = 53;

/// No empty cell and no horizontally or vertically adjacent equal pair.
///
/// Checking each cell against its right and down neighbour covers every
/// adjacent pair exactly once. A pair of MAX_TILE tiles cannot merge and
/// does not count.
pub fn is_loss(board: &Board) -> bool {
    if board.count_empty() > 0 {
        return false;
    }
    let n = board.size();
    for pos in board.positions() {
        let v = board.get(pos);
        if pos.col + 1 < n && can_merge(v, board.get(Position::new(pos.row, pos.col + 1))) {
            return false;
        }
        if pos.row + 1 < n && can_merge(v, board.get(Position::new(pos.row + 1, pos.col))) {
            return false;
        }
    }
    true
}

/// Some tile reached `target` and this level has not been won yet.
pub fn is_win(board: &Board, target: u64, already_won: bool) -> bool {
    !already_won && board.max_tile() as u64 >= target
}

/// Winning tile for `level`: 2048 at level 1, doubling per level.
pub fn level_target(level: u32) -> u64 {
    let exp = level.max(1).saturating_add(10);
    1u64.checked_shl(exp).unwrap_or(u64::MAX)
}

/// Tiles placed on a fresh board at `level`.
pub fn initial_tile_count(level: u32) -> usize {
    (2 + level as usize / 2).min(MAX_INITIAL_TILES)
}
