/// Progression: score, best score, level, undo history and achievements.
///
/// Owns every number that outlives a single move. The board itself lives
/// in the session; this module only snapshots it for undo.

use serde::{Deserialize, Serialize};

use crate::domain::board::Board;
use crate::domain::rules;

// ══════════════════════════════════════════════════════════════
// Achievements
// ══════════════════════════════════════════════════════════════

/// An unlocked achievement, as stored and displayed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Family {
    /// Largest tile on the board.
    Tile,
    /// Score of the current game.
    Score,
    /// Current level.
    Level,
}

/// Catalog entry: unlocks once the family's metric reaches `threshold`.
#[derive(Clone, Copy, Debug)]
pub struct AchievementDef {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub family: Family,
    pub threshold: u64,
}

impl AchievementDef {
    pub fn unlock(&self) -> Achievement {
        Achievement {
            id: self.id.to_string(),
            title: self.title.to_string(),
            description: self.description.to_string(),
        }
    }
}

const fn def(id: &'static str, title: &'static str, description: &'static str, family: Family, threshold: u64) -> AchievementDef {
    AchievementDef { id, title, description, family, threshold }
}

/// Evaluated in this order; the order decides which one gets announced
/// when several unlock together.
pub const CATALOG: &[AchievementDef] = &[
    def("2048", "First Milestone", "Reached the 2048 tile", Family::Tile, 2048),
    def("4096", "Double Trouble", "Reached the 4096 tile", Family::Tile, 4096),
    def("8192", "Power Player", "Reached the 8192 tile", Family::Tile, 8192),
    def("16384", "Master Strategist", "Reached the 16384 tile", Family::Tile, 16384),
    def("score10k", "Point Collector", "Scored 10,000 points", Family::Score, 10_000),
    def("score25k", "Score Master", "Scored 25,000 points", Family::Score, 25_000),
    def("score50k", "High Roller", "Scored 50,000 points", Family::Score, 50_000),
    def("level2", "Moving Up", "Reached Level 2", Family::Level, 2),
    def("level3", "Getting Serious", "Reached Level 3", Family::Level, 3),
    def("level4", "Expert Player", "Reached Level 4", Family::Level, 4),
];

// ══════════════════════════════════════════════════════════════
// History
// ══════════════════════════════════════════════════════════════

/// State before an applied move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub board: Board,
    pub score: u64,
}

// ══════════════════════════════════════════════════════════════
// Progression
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct Progression {
    pub score: u64,
    pub best_score: u64,
    level: u32,
    history: Vec<HistoryEntry>,
    achievements: Vec<Achievement>,
}

impl Default for Progression {
    fn default() -> Self {
        Progression::new(0, 1, Vec::new())
    }
}

impl Progression {
    /// Restore from persisted values. Levels below 1 become 1 and
    /// duplicate achievement ids are dropped.
    pub fn new(best_score: u64, level: u32, achievements: Vec<Achievement>) -> Self {
        let mut unique: Vec<Achievement> = Vec::with_capacity(achievements.len());
        for a in achievements {
            if !unique.iter().any(|u| u.id == a.id) {
                unique.push(a);
            }
        }
        Progression {
            score: 0,
            best_score,
            level: level.clamp(1, rules::MAX_LEVEL),
            history: Vec::new(),
            achievements: unique,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn level_target(&self) -> u64 {
        rules::level_target(self.level)
    }

    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn has_achievement(&self, id: &str) -> bool {
        self.achievements.iter().any(|a| a.id == id)
    }

    // ── Score ──

    /// Add points from a move. Returns true when this raised the best score.
    pub fn add_score(&mut self, delta: u64) -> bool {
        self.score += delta;
        if self.score > self.best_score {
            self.best_score = self.score;
            true
        } else {
            false
        }
    }

    // ── History ──

    pub fn push_history(&mut self, board: &Board) {
        self.history.push(HistoryEntry { board: board.clone(), score: self.score });
    }

    /// Pop the last entry and restore its score. The caller restores the board.
    pub fn pop_history(&mut self) -> Option<HistoryEntry> {
        let entry = self.history.pop()?;
        self.score = entry.score;
        Some(entry)
    }

    // ── Achievements ──

    /// Unlock every catalog entry the current state satisfies.
    /// All are appended; only the last one appended is returned.
    pub fn record_move(&mut self, board: &Board, score: u64) -> Option<Achievement> {
        let max_tile = board.max_tile() as u64;
        let mut latest = None;
        for def in CATALOG {
            let metric = match def.family {
                Family::Tile => max_tile,
                Family::Score => score,
                Family::Level => self.level as u64,
            };
            if metric >= def.threshold && !self.has_achievement(def.id) {
                let a = def.unlock();
                self.achievements.push(a.clone());
                latest = Some(a);
            }
        }
        latest
    }

    // ── Lifecycle ──

    /// Fresh game at the current level: score and history cleared.
    pub fn start_game(&mut self) {
        self.score = 0;
        self.history.clear();
    }

    pub fn advance_level(&mut self) {
        self.level = (self.level + 1).min(rules::MAX_LEVEL);
        self.start_game();
    }

    /// Forget everything: best score, level and achievements.
    pub fn reset_all(&mut self) {
        self.best_score = 0;
        self.level = 1;
        self.achievements.clear();
        self.start_game();
    }

    /// Drop the current score only.
    pub fn reset_current(&mut self) {
        self.start_game();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with_max(value: u32) -> Board {
        Board::from_rows(&[[value, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 2]]).unwrap()
    }

    #[test]
    fn catalog_ids_are_unique() {
        for (i, a) in CATALOG.iter().enumerate() {
            assert!(CATALOG[i + 1..].iter().all(|b| b.id != a.id), "duplicate {}", a.id);
        }
    }

    #[test]
    fn reaching_2048_unlocks_first_milestone() {
        let mut p = Progression::default();
        let a = p.record_move(&board_with_max(2048), 20_000).unwrap();
        // Tile and score families both fire; the score one was appended last.
        assert_eq!(a.id, "score10k");
        assert!(p.has_achievement("2048"));
        assert_eq!(p.achievements().len(), 2);
        assert_eq!(p.achievements()[0].title, "First Milestone");
        assert_eq!(p.achievements()[0].description, "Reached the 2048 tile");
    }

    #[test]
    fn unlocks_are_idempotent() {
        let mut p = Progression::default();
        assert!(p.record_move(&board_with_max(4096), 0).is_some());
        assert_eq!(p.achievements().len(), 2);
        assert_eq!(p.record_move(&board_with_max(4096), 0), None);
        assert_eq!(p.achievements().len(), 2);
    }

    #[test]
    fn achievements_are_append_only() {
        let mut p = Progression::default();
        p.record_move(&board_with_max(2048), 0);
        let before = p.achievements().to_vec();
        p.record_move(&board_with_max(8192), 50_000);
        assert_eq!(&p.achievements()[..before.len()], &before[..]);
        let ids: Vec<&str> = p.achievements().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["2048", "4096", "8192", "score10k", "score25k", "score50k"]);
    }

    #[test]
    fn level_achievements_follow_level() {
        let mut p = Progression::default();
        assert_eq!(p.record_move(&board_with_max(2), 0), None);
        p.advance_level();
        p.advance_level();
        let a = p.record_move(&board_with_max(2), 0).unwrap();
        assert_eq!(a.id, "level3");
        assert!(p.has_achievement("level2"));
        assert!(!p.has_achievement("level4"));
    }

    #[test]
    fn best_score_only_rises() {
        let mut p = Progression::new(100, 1, Vec::new());
        assert!(!p.add_score(60));
        assert_eq!(p.best_score, 100);
        assert!(p.add_score(60));
        assert_eq!(p.best_score, 120);
        p.reset_current();
        assert_eq!(p.score, 0);
        assert_eq!(p.best_score, 120);
    }

    #[test]
    fn history_is_lifo_and_restores_score() {
        let mut p = Progression::default();
        let b0 = board_with_max(2);
        p.push_history(&b0);
        p.add_score(4);
        let b1 = board_with_max(4);
        p.push_history(&b1);
        p.add_score(8);
        assert_eq!(p.history_len(), 2);

        let e = p.pop_history().unwrap();
        assert_eq!(e.board, b1);
        assert_eq!(p.score, 4);
        let e = p.pop_history().unwrap();
        assert_eq!(e.board, b0);
        assert_eq!(p.score, 0);
        assert_eq!(p.pop_history(), None);
    }

    #[test]
    fn advance_level_raises_target_and_clears_game() {
        let mut p = Progression::default();
        p.push_history(&board_with_max(2));
        p.add_score(32);
        p.advance_level();
        assert_eq!(p.level(), 2);
        assert_eq!(p.level_target(), 4096);
        assert_eq!(p.score, 0);
        assert_eq!(p.history_len(), 0);
        assert_eq!(p.best_score, 32);
    }

    #[test]
    fn reset_all_forgets_everything() {
        let mut p = Progression::new(500, 3, Vec::new());
        p.record_move(&board_with_max(2048), 0);
        p.reset_all();
        assert_eq!(p.best_score, 0);
        assert_eq!(p.level(), 1);
        assert!(p.achievements().is_empty());
    }

    #[test]
    fn restore_sanitizes_input() {
        let dup = CATALOG[0].unlock();
        let p = Progression::new(0, 0, vec![dup.clone(), dup]);
        assert_eq!(p.level(), 1);
        assert_eq!(p.achievements().len(), 1);
    }
}
