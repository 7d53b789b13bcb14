/// Events emitted by session operations.
/// The presentation layer consumes these for animation/sound.

use crate::domain::board::{Direction, Position};
use crate::domain::spawn::Placement;
use crate::sim::progress::Achievement;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Moved { dir: Direction, score_delta: u32 },
    TilesMerged { cells: Vec<Position>, best_value: u32 },
    TileSpawned(Placement),
    NewBest { score: u64 },
    Won { target: u64 },
    GameOver,
    AchievementUnlocked(Achievement),
    LevelAdvanced { level: u32 },
}
