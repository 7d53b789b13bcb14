/// Tile spawner: drops a 2 or a 4 into a random empty cell.
///
/// The only randomness in the engine lives here, behind a caller-supplied
/// `rand::Rng`, so everything else stays deterministic.

use rand::Rng;

use super::board::{Board, Position};

/// Chance of a 4 never exceeds this, whatever the level.
pub const MAX_FOUR_CHANCE: f64 = 0.4;

/// A tile placed by the spawner.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Placement {
    pub pos: Position,
    pub value: u32,
}

/// Probability that a spawned tile is a 4 at `level`.
/// Grows by 3% per level from a 10% base, capped at 40%.
pub fn four_chance(level: u32) -> f64 {
    (0.1 + 0.03 * level as f64).min(MAX_FOUR_CHANCE)
}

/// Place one tile on `board`. Returns `None` (board untouched) when full.
pub fn spawn<R: Rng + ?Sized>(board: &mut Board, level: u32, rng: &mut R) -> Option<Placement> {
    let empty = board.empty_cells();
    if empty.is_empty() {
        return None;
    }
    let pos = empty[rng.gen_range(0..empty.len())];
    let value = if rng.gen_bool(four_chance(level)) { 4 } else { 2 };
    board.set(pos, value);
    Some(Placement { pos, value })
}

/// Spawn up to `count` tiles, stopping early if the board fills.
pub fn place_initial_tiles<R: Rng + ?Sized>(board: &mut Board, count: usize, level: u32, rng: &mut R) -> Vec<Placement> {
    (0..count).filter_map(|_| spawn(board, level, &mut *rng)).collect()
}
