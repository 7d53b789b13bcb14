/// Move engine: slide and merge every line of the board toward one edge.
///
/// Pure functions, no randomness. Each line is read starting at the cell
/// on the target edge, so index 0 of a line is where tiles come to rest.
///
/// ## Per-line rule
///
///   For i = 1 .. n-1, a non-empty tile at i travels toward index 0:
///     - into an empty cell          → keep going
///     - onto an equal, unmerged tile → merge (value doubles), stop
///       (two MAX_TILE tiles stay apart)
///     - anything else               → stop
///
/// Each destination index carries a `merged` marker for the current move,
/// so `[2,2,2,2]` becomes `[4,4,0,0]` and never `[8,0,0,0]`.

use super::board::{can_merge, Board, Direction, Position};

/// Outcome of applying one direction to a board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveResult {
    pub board: Board,
    pub moved: bool,
    pub score_delta: u32,
    /// Destination cell of every merge, in processing order. No duplicates.
    pub merged_cells: Vec<Position>,
}

/// Slide and merge a single line toward index 0.
///
/// Returns the points scored and the line indices that received a merge.
pub fn slide_line(line: &mut [u32]) -> (u32, Vec<usize>) {
    let n = line.len();
    let mut merged = vec![false; n];
    let mut merged_at = Vec::new();
    let mut score: u32 = 0;

    for i in 1..n {
        if line[i] == 0 {
            continue;
        }
        let mut k = i;
        while k > 0 {
            let ahead = line[k - 1];
            if ahead == 0 {
                line[k - 1] = line[k];
                line[k] = 0;
                k -= 1;
            } else if can_merge(ahead, line[k]) && !merged[k - 1] {
                line[k - 1] = ahead * 2;
                line[k] = 0;
                merged[k - 1] = true;
                score = score.saturating_add(line[k - 1]);
                merged_at.push(k - 1);
                break;
            } else {
                break;
            }
        }
    }

    (score, merged_at)
}

/// Cells of line `index` for `dir`, ordered from the target edge outward.
pub fn line_positions(size: usize, dir: Direction, index: usize) -> Vec<Position> {
    (0..size)
        .map(|step| match dir {
            Direction::Left => Position::new(index, step),
            Direction::Right => Position::new(index, size - 1 - step),
            Direction::Up => Position::new(step, index),
            Direction::Down => Position::new(size - 1 - step, index),
        })
        .collect()
}

/// Apply `dir` to `board` and report what changed.
pub fn apply_direction(board: &Board, dir: Direction) -> MoveResult {
    let size = board.size();
    let mut next = board.clone();
    let mut score_delta: u32 = 0;
    let mut merged_cells = Vec::new();
    let mut line = vec![0u32; size];

    for index in 0..size {
        let cells = line_positions(size, dir, index);
        for (slot, &pos) in line.iter_mut().zip(&cells) {
            *slot = board.get(pos);
        }

        let (points, merged_at) = slide_line(&mut line);
        score_delta = score_delta.saturating_add(points);
        merged_cells.extend(merged_at.into_iter().map(|i| cells[i]));

        for (&value, &pos) in line.iter().zip(&cells) {
            next.set(pos, value);
        }
    }

    let moved = next != *board;
    MoveResult { board: next, moved, score_delta, merged_cells }
}

/// Would `dir` change the board?
pub fn can_move(board: &Board, dir: Direction) -> bool {
    apply_direction(board, dir).moved
}

/// Directions that change the board, in `Direction::ALL` order.
pub fn legal_directions(board: &Board) -> Vec<Direction> {
    Direction::ALL.into_iter().filter(|&d| can_move(board, d)).collect()
}
