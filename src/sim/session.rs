/// Game session: composes the board engine, spawner, terminal rules and
/// progression into the operations the front-end calls.
///
/// ## State machine
///
/// ┌──────────┬────────────────────────────────┬──────────┐
/// │ From     │ Trigger                        │ To       │
/// ├──────────┼────────────────────────────────┼──────────┤
/// │ Idle     │ initialize / new_game          │ Playing  │
/// │ Playing  │ board-changing move            │ Playing  │
/// │ Playing  │ move reaches level target      │ Won      │
/// │ Playing  │ move leaves no legal move      │ GameOver │
/// │ Won      │ keep_playing                   │ Playing  │
/// │ Won      │ advance_level                  │ Playing  │
/// │ GameOver │ undo                           │ Playing  │
/// │ any      │ new_game / reset_*             │ Playing  │
/// └──────────┴────────────────────────────────┴──────────┘
///
/// Moves are ignored while Idle, Won or GameOver. A winning move that also
/// locks the board reports Won first; keep_playing then shows GameOver.
///
/// ## One move
///
///   push history → slide/merge → score, best → spawn → win → loss
///   → achievements → persist

use log::{debug, info};
use rand::Rng;

use crate::domain::board::{Board, BoardError, Direction, Position};
use crate::domain::moves::apply_direction;
use crate::domain::rules;
use crate::domain::spawn::{self, Placement};
use crate::sim::event::GameEvent;
use crate::sim::progress::{Achievement, Progression};
use crate::sim::store::Preferences;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionStatus {
    Idle,
    Playing,
    Won,
    GameOver,
}

pub struct GameSession<R: Rng> {
    blank: Board,
    board: Board,
    progress: Progression,
    won: bool,
    game_over: bool,
    keep_playing: bool,
    initialized: bool,
    merged_cells: Vec<Position>,
    new_tile: Option<Placement>,
    dark_mode: bool,
    prefs: Preferences,
    rng: R,
}

impl<R: Rng> GameSession<R> {
    /// Build an idle session from stored preferences.
    pub fn new(size: usize, prefs: Preferences, rng: R) -> Result<Self, BoardError> {
        let blank = Board::new(size)?;
        let progress = Progression::new(prefs.best_score(), prefs.level(), prefs.achievements());
        let dark_mode = prefs.dark_mode();
        Ok(GameSession {
            board: blank.clone(),
            blank,
            progress,
            won: false,
            game_over: false,
            keep_playing: false,
            initialized: false,
            merged_cells: Vec::new(),
            new_tile: None,
            dark_mode,
            prefs,
            rng,
        })
    }

    // ── Queries ──

    pub fn status(&self) -> SessionStatus {
        if !self.initialized {
            SessionStatus::Idle
        } else if self.won && !self.keep_playing {
            SessionStatus::Won
        } else if self.game_over {
            SessionStatus::GameOver
        } else {
            SessionStatus::Playing
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> u64 {
        self.progress.score
    }

    pub fn best_score(&self) -> u64 {
        self.progress.best_score
    }

    pub fn level(&self) -> u32 {
        self.progress.level()
    }

    pub fn level_target(&self) -> u64 {
        self.progress.level_target()
    }

    pub fn achievements(&self) -> &[Achievement] {
        self.progress.achievements()
    }

    pub fn can_undo(&self) -> bool {
        self.progress.history_len() > 0
    }

    pub fn merged_cells(&self) -> &[Position] {
        &self.merged_cells
    }

    pub fn new_tile(&self) -> Option<Placement> {
        self.new_tile
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn is_keep_playing(&self) -> bool {
        self.keep_playing
    }

    // ── Lifecycle ──

    /// Fresh board at the current level. Score, history and the
    /// won/game-over flags are cleared; best, level and achievements stay.
    pub fn initialize(&mut self) -> Vec<Placement> {
        let level = self.progress.level();
        self.board = self.blank.clone();
        let placed = spawn::place_initial_tiles(
            &mut self.board,
            rules::initial_tile_count(level),
            level,
            &mut self.rng,
        );
        self.progress.start_game();
        self.won = false;
        self.game_over = false;
        self.keep_playing = false;
        self.merged_cells.clear();
        self.new_tile = None;
        self.initialized = true;
        info!("new game: level {level}, target {}, {} tiles", self.level_target(), placed.len());
        placed
    }

    pub fn new_game(&mut self) -> Vec<Placement> {
        self.initialize()
    }

    // ── Moves ──

    pub fn apply_move(&mut self, dir: Direction) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.status() != SessionStatus::Playing {
            return events;
        }

        let result = apply_direction(&self.board, dir);
        if !result.moved {
            return events;
        }

        self.progress.push_history(&self.board);
        self.board = result.board;
        self.merged_cells = result.merged_cells;
        self.new_tile = None;
        events.push(GameEvent::Moved { dir, score_delta: result.score_delta });
        if !self.merged_cells.is_empty() {
            let best_value = self.merged_cells.iter().map(|&p| self.board.get(p)).max().unwrap_or(0);
            events.push(GameEvent::TilesMerged { cells: self.merged_cells.clone(), best_value });
        }

        if self.progress.add_score(result.score_delta as u64) {
            events.push(GameEvent::NewBest { score: self.progress.best_score });
            self.prefs.set_best_score(self.progress.best_score);
        }

        if let Some(p) = spawn::spawn(&mut self.board, self.progress.level(), &mut self.rng) {
            self.new_tile = Some(p);
            events.push(GameEvent::TileSpawned(p));
        }

        let target = self.level_target();
        if rules::is_win(&self.board, target, self.won) {
            self.won = true;
            info!("reached {target} at level {}", self.level());
            events.push(GameEvent::Won { target });
        }

        if rules::is_loss(&self.board) {
            self.game_over = true;
            info!("game over with {} points", self.score());
            events.push(GameEvent::GameOver);
        }

        if let Some(a) = self.progress.record_move(&self.board, self.progress.score) {
            info!("achievement unlocked: {} ({})", a.title, a.id);
            self.prefs.set_achievements(self.progress.achievements());
            events.push(GameEvent::AchievementUnlocked(a));
        }

        debug!(
            "{dir}: +{} score {} max {} sum {}",
            result.score_delta,
            self.score(),
            self.board.max_tile(),
            self.board.tile_sum()
        );
        events
    }

    /// Step back one applied move. Clears game over but leaves the won and
    /// keep-playing flags as they are.
    pub fn undo(&mut self) -> bool {
        if !self.initialized {
            return false;
        }
        match self.progress.pop_history() {
            Some(entry) => {
                self.board = entry.board;
                self.game_over = false;
                self.merged_cells.clear();
                self.new_tile = None;
                true
            }
            None => false,
        }
    }

    pub fn keep_playing(&mut self) {
        if self.won {
            self.keep_playing = true;
        }
    }

    pub fn advance_level(&mut self) -> Vec<GameEvent> {
        self.progress.advance_level();
        let level = self.progress.level();
        self.prefs.set_level(level);
        info!("advanced to level {level}");
        self.initialize();
        vec![GameEvent::LevelAdvanced { level }]
    }

    /// Forget best score, level and achievements, then start over.
    pub fn reset_all(&mut self) {
        self.progress.reset_all();
        self.prefs.clear_progress();
        info!("all progress cleared");
        self.initialize();
    }

    pub fn reset_current(&mut self) {
        self.progress.reset_current();
        self.initialize();
    }

    pub fn toggle_dark_mode(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        self.prefs.set_dark_mode(self.dark_mode);
        self.dark_mode
    }

    #[cfg(test)]
    fn load_board(&mut self, board: Board) {
        self.initialize();
        self.board = board;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::sim::store::{KeyValueStore, MemoryStore, StoreError, KEY_LEVEL};

    fn session(seed: u64) -> GameSession<StdRng> {
        GameSession::new(4, Preferences::in_memory(), StdRng::seed_from_u64(seed)).unwrap()
    }

    fn board(rows: &[[u32; 4]; 4]) -> Board {
        Board::from_rows(rows).unwrap()
    }

    fn almost_won() -> Board {
        board(&[
            [1024, 1024, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ])
    }

    #[test]
    fn starts_idle_and_ignores_moves() {
        let mut s = session(1);
        assert_eq!(s.status(), SessionStatus::Idle);
        assert!(s.apply_move(Direction::Left).is_empty());
        assert!(!s.undo());
    }

    #[test]
    fn initialize_places_level_tiles() {
        let mut s = session(1);
        let placed = s.initialize();
        assert_eq!(placed.len(), 2);
        assert_eq!(s.board().count_empty(), 14);
        assert_eq!(s.status(), SessionStatus::Playing);
        assert_eq!(s.score(), 0);
        assert!(!s.can_undo());
    }

    #[test]
    fn rejects_bad_board_size() {
        let r = GameSession::new(1, Preferences::in_memory(), StdRng::seed_from_u64(0));
        assert!(matches!(r, Err(BoardError::InvalidBoardDimensions { .. })));
    }

    #[test]
    fn blocked_move_changes_nothing() {
        let mut s = session(2);
        let b = board(&[
            [2, 4, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);
        s.load_board(b.clone());
        assert!(s.apply_move(Direction::Left).is_empty());
        assert_eq!(s.board(), &b);
        assert!(!s.can_undo());
    }

    #[test]
    fn merge_scores_spawns_and_records_history() {
        let mut s = session(3);
        s.load_board(board(&[
            [2, 2, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]));
        let events = s.apply_move(Direction::Left);
        assert_eq!(events[0], GameEvent::Moved { dir: Direction::Left, score_delta: 4 });
        assert!(events.contains(&GameEvent::TilesMerged { cells: vec![Position::new(0, 0)], best_value: 4 }));
        assert!(events.contains(&GameEvent::NewBest { score: 4 }));
        assert_eq!(s.score(), 4);
        assert_eq!(s.best_score(), 4);
        assert_eq!(s.merged_cells(), &[Position::new(0, 0)]);

        let spawned = s.new_tile().unwrap();
        assert_eq!(s.board().tile_sum(), 4 + spawned.value as u64);
        assert!(s.can_undo());
    }

    #[test]
    fn undo_restores_board_and_score() {
        let mut s = session(4);
        let start = board(&[
            [2, 2, 0, 0],
            [0, 4, 0, 0],
            [0, 4, 0, 0],
            [0, 0, 0, 0],
        ]);
        s.load_board(start.clone());
        s.apply_move(Direction::Left);
        s.apply_move(Direction::Up);
        assert!(s.undo());
        assert!(s.undo());
        assert_eq!(s.board(), &start);
        assert_eq!(s.score(), 0);
        assert!(!s.undo());
        assert!(s.new_tile().is_none());
    }

    #[test]
    fn win_blocks_until_keep_playing() {
        let mut s = session(5);
        s.load_board(almost_won());
        let events = s.apply_move(Direction::Left);
        assert!(events.contains(&GameEvent::Won { target: 2048 }));
        assert_eq!(s.status(), SessionStatus::Won);
        assert!(s.apply_move(Direction::Right).is_empty());

        s.keep_playing();
        assert_eq!(s.status(), SessionStatus::Playing);
        let events = s.apply_move(Direction::Right);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::Won { .. })));
        assert_eq!(s.status(), SessionStatus::Playing);
    }

    #[test]
    fn undo_after_win_keeps_won_flag() {
        let mut s = session(6);
        s.load_board(almost_won());
        s.apply_move(Direction::Left);
        assert!(s.undo());
        // Board is back below the target, yet the win stands.
        assert_eq!(s.board().max_tile(), 1024);
        assert_eq!(s.status(), SessionStatus::Won);
    }

    #[test]
    fn reaching_2048_unlocks_and_persists_achievement() {
        let mut s = session(7);
        s.load_board(almost_won());
        let events = s.apply_move(Direction::Left);
        let unlocked: Vec<&Achievement> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::AchievementUnlocked(a) => Some(a),
                _ => None,
            })
            .collect();
        assert_eq!(unlocked.len(), 1);
        assert_eq!(unlocked[0].id, "2048");
        assert_eq!(s.achievements().len(), 1);
        assert_eq!(s.prefs.achievements().len(), 1);
        assert_eq!(s.prefs.best_score(), 2048);
    }

    #[test]
    fn game_over_then_undo() {
        let mut s = session(8);
        let start = board(&[
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 8],
            [0, 8, 16, 32],
        ]);
        s.load_board(start.clone());
        let events = s.apply_move(Direction::Left);
        assert!(events.contains(&GameEvent::GameOver));
        assert_eq!(s.status(), SessionStatus::GameOver);
        assert!(s.apply_move(Direction::Up).is_empty());

        assert!(s.undo());
        assert_eq!(s.status(), SessionStatus::Playing);
        assert_eq!(s.board(), &start);
    }

    #[test]
    fn win_on_a_locked_board_still_offers_advance() {
        let mut s = session(10);
        s.load_board(board(&[
            [1024, 1024, 8, 16],
            [4, 2, 8, 32],
            [2, 4, 2, 4],
            [4, 2, 4, 2],
        ]));
        let events = s.apply_move(Direction::Left);
        assert!(events.contains(&GameEvent::Won { target: 2048 }));
        assert!(events.contains(&GameEvent::GameOver));
        assert_eq!(s.status(), SessionStatus::Won);

        s.keep_playing();
        assert_eq!(s.status(), SessionStatus::GameOver);

        let events = s.advance_level();
        assert_eq!(events, vec![GameEvent::LevelAdvanced { level: 2 }]);
        assert_eq!(s.status(), SessionStatus::Playing);
    }

    #[test]
    fn huge_stored_level_is_clamped() {
        let mut store = MemoryStore::new();
        store.set(KEY_LEVEL, "4294967295").unwrap();
        let mut s = GameSession::new(4, Preferences::new(Box::new(store)), StdRng::seed_from_u64(11)).unwrap();
        s.initialize();
        assert_eq!(s.level(), rules::MAX_LEVEL);
        assert_eq!(s.level_target(), 1 << 63);
        s.advance_level();
        assert_eq!(s.level(), rules::MAX_LEVEL);
    }

    /// Every read and write fails.
    struct DeadDisk;

    impl KeyValueStore for DeadDisk {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "read-only").into())
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "read-only").into())
        }
        fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "read-only").into())
        }
    }

    #[test]
    fn failing_store_keeps_progress_in_memory() {
        let mut s = GameSession::new(4, Preferences::new(Box::new(DeadDisk)), StdRng::seed_from_u64(12)).unwrap();
        assert!(s.dark_mode());
        s.load_board(almost_won());
        let events = s.apply_move(Direction::Left);
        assert!(events.contains(&GameEvent::NewBest { score: 2048 }));
        assert_eq!(s.best_score(), 2048);
        assert_eq!(s.achievements().len(), 1);

        s.advance_level();
        assert_eq!(s.level(), 2);
        assert_eq!(s.best_score(), 2048);
        assert_eq!(s.achievements()[0].id, "2048");

        assert!(!s.toggle_dark_mode());
        assert!(!s.dark_mode());

        s.reset_all();
        assert_eq!(s.level(), 1);
        assert_eq!(s.best_score(), 0);
        assert!(s.achievements().is_empty());
        assert_eq!(s.status(), SessionStatus::Playing);
    }

    #[test]
    fn advance_level_starts_harder_game() {
        let mut s = session(9);
        s.load_board(almost_won());
        s.apply_move(Direction::Left);
        let events = s.advance_level();
        assert_eq!(events, vec![GameEvent::LevelAdvanced { level: 2 }]);
        assert_eq!(s.level(), 2);
        assert_eq!(s.level_target(), 4096);
        assert_eq!(s.status(), SessionStatus::Playing);
        assert_eq!(s.board().count_empty(), 13);
        assert_eq!(s.score(), 0);
        assert_eq!(s.best_score(), 2048);
        assert!(!s.can_undo());
        assert_eq!(s.prefs.level(), 2);
    }

    #[test]
    fn level_achievement_unlocks_on_next_move() {
        let mut s = session(10);
        s.initialize();
        s.advance_level();
        let mut unlocked = None;
        for dir in Direction::ALL.iter().cycle().take(8) {
            for e in s.apply_move(*dir) {
                if let GameEvent::AchievementUnlocked(a) = e {
                    unlocked = Some(a);
                }
            }
            if unlocked.is_some() {
                break;
            }
        }
        assert_eq!(unlocked.map(|a| a.id), Some("level2".to_string()));
    }

    #[test]
    fn reset_current_keeps_best_and_level() {
        let mut s = session(11);
        s.load_board(almost_won());
        s.apply_move(Direction::Left);
        s.advance_level();
        s.reset_current();
        assert_eq!(s.score(), 0);
        assert_eq!(s.best_score(), 2048);
        assert_eq!(s.level(), 2);
        assert_eq!(s.achievements().len(), 1);
    }

    #[test]
    fn reset_all_clears_progress() {
        let mut s = session(12);
        s.load_board(almost_won());
        s.apply_move(Direction::Left);
        s.advance_level();
        s.reset_all();
        assert_eq!(s.best_score(), 0);
        assert_eq!(s.level(), 1);
        assert!(s.achievements().is_empty());
        assert_eq!(s.board().count_empty(), 14);
        assert_eq!(s.prefs.level(), 1);
        assert_eq!(s.prefs.best_score(), 0);
    }

    #[test]
    fn restores_from_preferences() {
        let mut store = MemoryStore::new();
        store.set(KEY_LEVEL, "3").unwrap();
        let mut s = GameSession::new(4, Preferences::new(Box::new(store)), StdRng::seed_from_u64(0)).unwrap();
        s.initialize();
        assert_eq!(s.level(), 3);
        assert_eq!(s.level_target(), 8192);
        assert_eq!(s.board().count_empty(), 13);
    }

    #[test]
    fn dark_mode_toggles_and_persists() {
        let mut s = session(13);
        assert!(s.dark_mode());
        assert!(!s.toggle_dark_mode());
        assert!(!s.prefs.dark_mode());
    }

    #[test]
    fn same_seed_same_game() {
        let play = |seed| {
            let mut s = session(seed);
            s.initialize();
            for dir in [Direction::Left, Direction::Up, Direction::Right, Direction::Down] {
                s.apply_move(dir);
            }
            (s.board().clone(), s.score())
        };
        assert_eq!(play(42), play(42));
    }

    proptest! {
        #[test]
        fn tile_sum_grows_by_spawned_value(seed in any::<u64>(), dirs in prop::collection::vec(0u8..4, 1..40)) {
            let mut s = session(seed);
            s.initialize();
            for code in dirs {
                let dir = Direction::from_code(code).unwrap();
                let before = s.board().tile_sum();
                let events = s.apply_move(dir);
                let spawned: u64 = events
                    .iter()
                    .filter_map(|e| match e {
                        GameEvent::TileSpawned(p) => Some(p.value as u64),
                        _ => None,
                    })
                    .sum();
                prop_assert_eq!(s.board().tile_sum(), before + spawned);
                if events.is_empty() {
                    prop_assert_eq!(spawned, 0);
                }
                let ids: Vec<&str> = s.achievements().iter().map(|a| a.id.as_str()).collect();
                let mut dedup = ids.clone();
                dedup.sort();
                dedup.dedup();
                prop_assert_eq!(dedup.len(), ids.len());
            }
        }
    }
}
