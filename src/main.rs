/// Entry point and game loop.

mod app;
mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use env_logger::{Builder, Env, Target};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use app::{AppState, Overlay, Screen, TOAST_TICKS};
use config::GameConfig;
use domain::board::{Board, Direction, DEFAULT_SIZE};
use sim::event::GameEvent;
use sim::session::{GameSession, SessionStatus};
use sim::store::{self, FileStore, Preferences};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const LOG_FILE: &str = "levels2048.log";

type Session = GameSession<StdRng>;

fn main() {
    let config = GameConfig::load();
    let data_dir = store::data_dir(&config.general.data_dir);
    init_logging(&data_dir, &config.general.log_level);

    match &config.source {
        Some(path) => info!("config loaded from {}", path.display()),
        None => info!("no config.toml found, using defaults"),
    }
    for w in &config.warnings {
        warn!("{w}");
    }

    let prefs = match FileStore::open(&data_dir) {
        Ok(fs) => {
            info!("preferences at {}", fs.path().display());
            Preferences::new(Box::new(fs))
        }
        Err(e) => {
            warn!("cannot open preferences in {}: {e}; progress will not be saved", data_dir.display());
            Preferences::in_memory()
        }
    };

    let rng = match config.general.seed {
        0 => StdRng::from_entropy(),
        seed => StdRng::seed_from_u64(seed),
    };

    let size = match Board::new(config.general.board_size) {
        Ok(_) => config.general.board_size,
        Err(e) => {
            eprintln!("{e}; using a {DEFAULT_SIZE}x{DEFAULT_SIZE} board");
            warn!("board_size rejected ({e}), falling back to {DEFAULT_SIZE}");
            DEFAULT_SIZE
        }
    };

    let mut session = match GameSession::new(size, prefs, rng) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Cannot start: {e}");
            return;
        }
    };
    session.initialize();

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut session, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    info!("quit at level {} with {} points", session.level(), session.score());
    println!();
    println!("Thanks for playing Levels 2048!");
    println!("Level: {}  Score: {}  Best: {}", session.level(), session.score(), session.best_score());
}

/// Log to a file next to the preferences; the terminal belongs to the game.
/// `RUST_LOG` overrides the configured level.
fn init_logging(dir: &Path, level: &str) {
    let mut builder = Builder::from_env(Env::default().default_filter_or(level));
    builder.format_timestamp_millis();
    // No writable log file: stay silent rather than draw over the board
    if let Ok(file) = File::create(dir.join(LOG_FILE)) {
        builder.target(Target::Pipe(Box::new(file)));
        let _ = builder.try_init();
    }
}

fn game_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        info!("gamepad connected");
    }

    let mut app = AppState::new(&config.timing, Instant::now());
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.timing.tick_rate_ms);

    loop {
        kb.drain_events();
        gp.update();
        let now = Instant::now();

        if kb.ctrl_c_pressed() {
            break;
        }
        if kb.resized {
            renderer.invalidate();
        }

        match app.screen {
            Screen::Welcome => {
                if kb.any_key() || gp.any_button_pressed() || gp.direction_pressed().is_some() {
                    app.skip_welcome();
                } else {
                    app.update_welcome(now);
                }
            }
            Screen::Game => {
                if handle_meta(session, &mut app, sound, &kb, &gp) {
                    break;
                }
                if app.overlay == Overlay::None {
                    for dir in detect_moves(&kb, &gp) {
                        let events = session.apply_move(dir);
                        if events.is_empty() {
                            continue;
                        }
                        let merged = !session.merged_cells().is_empty();
                        app.note_move(Instant::now(), merged);
                        process_sound_events(sound, &events);
                        announce(&mut app, &events);
                    }
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }

        renderer.render(session, &app, Instant::now())?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    let merged = events.iter().any(|e| matches!(e, GameEvent::TilesMerged { .. }));
    for event in events {
        match event {
            GameEvent::Moved { .. } if !merged => sfx.play_slide(),
            GameEvent::TilesMerged { best_value, .. } => sfx.play_merge(*best_value),
            GameEvent::Won { .. } => sfx.play_win(),
            GameEvent::GameOver => sfx.play_lose(),
            GameEvent::AchievementUnlocked(_) => sfx.play_achievement(),
            GameEvent::LevelAdvanced { .. } => sfx.play_level_up(),
            _ => {}
        }
    }
}

/// Toast for events worth a line of text.
fn announce(app: &mut AppState, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::AchievementUnlocked(a) => {
                app.set_message(&format!("★ Achievement: {}", a.title), TOAST_TICKS);
            }
            GameEvent::LevelAdvanced { level } => {
                app.set_message(&format!("Level {level}"), TOAST_TICKS);
            }
            _ => {}
        }
    }
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_UNDO: &[KeyCode] = &[KeyCode::Char('u'), KeyCode::Char('U'), KeyCode::Backspace];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_ADVANCE: &[KeyCode] = &[KeyCode::Char('n'), KeyCode::Char('N'), KeyCode::Enter];
const KEYS_KEEP: &[KeyCode] = &[KeyCode::Char('k'), KeyCode::Char('K')];
const KEYS_THEME: &[KeyCode] = &[KeyCode::Char('t'), KeyCode::Char('T')];
const KEYS_INFO: &[KeyCode] = &[KeyCode::Char('i'), KeyCode::Char('I')];
const KEYS_ACHIEVEMENTS: &[KeyCode] = &[KeyCode::Char('h'), KeyCode::Char('H')];
const KEYS_CLEAR_CURRENT: &[KeyCode] = &[KeyCode::Char('c'), KeyCode::Char('C')];
const KEYS_CLEAR_ALL: &[KeyCode] = &[KeyCode::Char('x'), KeyCode::Char('X')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];

fn key_direction(code: KeyCode) -> Option<Direction> {
    [
        (KEYS_LEFT, Direction::Left),
        (KEYS_RIGHT, Direction::Right),
        (KEYS_UP, Direction::Up),
        (KEYS_DOWN, Direction::Down),
    ]
    .into_iter()
    .find(|(keys, _)| keys.contains(&code))
    .map(|(_, dir)| dir)
}

/// Directions pressed this frame, keyboard first, in arrival order.
fn detect_moves(kb: &InputState, gp: &GamepadState) -> Vec<Direction> {
    let mut dirs: Vec<Direction> = kb.presses().filter_map(key_direction).collect();
    dirs.extend(gp.direction_pressed());
    dirs
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum EscAction {
    KeepPlaying,
    Dismiss,
    Quit,
}

/// Esc with no overlay open: closes a result box first, quits otherwise.
fn esc_action(status: SessionStatus, result_dismissed: bool) -> EscAction {
    match status {
        SessionStatus::Won => EscAction::KeepPlaying,
        SessionStatus::GameOver if !result_dismissed => EscAction::Dismiss,
        _ => EscAction::Quit,
    }
}

/// Everything except sliding. Returns true when the player quits.
fn handle_meta(
    session: &mut Session,
    app: &mut AppState,
    sound: Option<&SoundEngine>,
    kb: &InputState,
    gp: &GamepadState,
) -> bool {
    let esc = kb.any_pressed(&[KeyCode::Esc]) || gp.cancel_pressed();

    match app.overlay {
        // ── Info ──
        Overlay::Info => {
            if esc || kb.any_pressed(KEYS_INFO) || gp.info_pressed() {
                app.overlay = Overlay::None;
            }
            return false;
        }

        // ── Achievements ──
        Overlay::Achievements => {
            if kb.any_pressed(KEYS_CLEAR_CURRENT) {
                session.reset_current();
                app.clear_effects();
                app.overlay = Overlay::None;
                app.set_message("Current score cleared", TOAST_TICKS);
            } else if kb.any_pressed(KEYS_CLEAR_ALL) {
                session.reset_all();
                app.clear_effects();
                app.overlay = Overlay::None;
                app.set_message("All progress cleared", TOAST_TICKS);
            } else if esc || kb.any_pressed(KEYS_ACHIEVEMENTS) || gp.achievements_pressed() {
                app.overlay = Overlay::None;
            }
            return false;
        }

        Overlay::None => {}
    }

    if kb.any_pressed(&[KeyCode::Esc]) {
        match esc_action(session.status(), app.result_dismissed) {
            EscAction::KeepPlaying => session.keep_playing(),
            EscAction::Dismiss => app.result_dismissed = true,
            EscAction::Quit => return true,
        }
        return false;
    }
    if kb.any_pressed(KEYS_QUIT) {
        return true;
    }

    if kb.any_pressed(KEYS_INFO) || gp.info_pressed() {
        app.toggle_overlay(Overlay::Info);
        return false;
    }
    if kb.any_pressed(KEYS_ACHIEVEMENTS) || gp.achievements_pressed() {
        app.toggle_overlay(Overlay::Achievements);
        return false;
    }

    if kb.any_pressed(KEYS_THEME) {
        let dark = session.toggle_dark_mode();
        app.set_message(if dark { "Dark mode" } else { "Light mode" }, TOAST_TICKS / 2);
    }

    if kb.any_pressed(KEYS_RESTART) || gp.new_game_pressed() {
        session.new_game();
        app.clear_effects();
        app.set_message("New game", TOAST_TICKS / 2);
        return false;
    }

    if kb.any_pressed(KEYS_UNDO) || gp.undo_pressed() {
        if session.undo() {
            app.clear_effects();
            if let Some(sfx) = sound {
                sfx.play_undo();
            }
        }
        return false;
    }

    match session.status() {
        SessionStatus::Won => {
            if kb.any_pressed(KEYS_ADVANCE) || gp.confirm_pressed() {
                let events = session.advance_level();
                app.clear_effects();
                process_sound_events(sound, &events);
                announce(app, &events);
            } else if kb.any_pressed(KEYS_KEEP) || gp.cancel_pressed() {
                session.keep_playing();
            }
        }
        SessionStatus::GameOver => {
            if kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed() {
                session.new_game();
                app.clear_effects();
            }
        }
        SessionStatus::Idle => {
            session.initialize();
        }
        SessionStatus::Playing => {}
    }

    false
}
