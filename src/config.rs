/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD or
/// `~/.local/share/levels2048`. Falls back to defaults if the file is
/// missing or incomplete.
///
/// The logger is not up yet when this runs (its file lives in the data
/// directory configured here), so problems are collected in `warnings`
/// and logged by `main` once logging starts.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::board::DEFAULT_SIZE;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub general: GeneralConfig,
    pub timing: TimingConfig,
    pub gamepad: GamepadConfig,
    /// File the settings came from, if any.
    pub source: Option<PathBuf>,
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct GeneralConfig {
    pub board_size: usize,
    /// Where prefs.json and the log live. Empty = pick automatically.
    pub data_dir: String,
    /// 0 = seed from entropy.
    pub seed: u64,
    pub log_level: String,
}

#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub tick_rate_ms: u64,
    pub spawn_delay_ms: u64,   // new tile stays hidden this long after a move
    pub merge_flash_ms: u64,
    pub welcome_ms: u64,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub undo: Vec<String>,
    pub new_game: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub info: Vec<String>,
    pub achievements: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_board_size")]
    board_size: usize,
    #[serde(default)]
    data_dir: String,
    #[serde(default)]
    seed: u64,
    #[serde(default = "default_log_level")]
    log_level: String,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_spawn_delay")]
    spawn_delay_ms: u64,
    #[serde(default = "default_merge_flash")]
    merge_flash_ms: u64,
    #[serde(default = "default_welcome")]
    welcome_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_undo")]
    undo: Vec<String>,
    #[serde(default = "default_new_game")]
    new_game: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_info")]
    info: Vec<String>,
    #[serde(default = "default_achievements")]
    achievements: Vec<String>,
}

// ── Defaults ──

fn default_board_size() -> usize { DEFAULT_SIZE }
fn default_log_level() -> String { "info".into() }

fn default_tick_rate() -> u64 { 50 }
fn default_spawn_delay() -> u64 { 150 }
fn default_merge_flash() -> u64 { 200 }
fn default_welcome() -> u64 { 5000 }

fn default_undo() -> Vec<String> { vec!["B".into()] }
fn default_new_game() -> Vec<String> { vec!["Start".into()] }
fn default_confirm() -> Vec<String> { vec!["A".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }
fn default_info() -> Vec<String> { vec!["Y".into()] }
fn default_achievements() -> Vec<String> { vec!["X".into()] }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            board_size: default_board_size(),
            data_dir: String::new(),
            seed: 0,
            log_level: default_log_level(),
        }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            tick_rate_ms: default_tick_rate(),
            spawn_delay_ms: default_spawn_delay(),
            merge_flash_ms: default_merge_flash(),
            welcome_ms: default_welcome(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            undo: default_undo(),
            new_game: default_new_game(),
            confirm: default_confirm(),
            cancel: default_cancel(),
            info: default_info(),
            achievements: default_achievements(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from the first `config.toml` found.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let (toml_cfg, source, warnings) = load_toml(&candidate_dirs());
        GameConfig::from_toml(toml_cfg, source, warnings)
    }

    /// Parse settings from TOML text.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn from_toml_str(text: &str) -> Self {
        let mut warnings = Vec::new();
        let cfg = parse(text, Path::new("config.toml"), &mut warnings);
        GameConfig::from_toml(cfg, None, warnings)
    }

    fn from_toml(t: TomlConfig, source: Option<PathBuf>, mut warnings: Vec<String>) -> Self {
        // Zero would spin the loop
        let tick_rate_ms = if t.timing.tick_rate_ms == 0 {
            warnings.push("tick_rate_ms must be positive, using default".into());
            default_tick_rate()
        } else {
            t.timing.tick_rate_ms
        };

        GameConfig {
            general: GeneralConfig {
                board_size: t.general.board_size,
                data_dir: t.general.data_dir,
                seed: t.general.seed,
                log_level: t.general.log_level,
            },
            timing: TimingConfig {
                tick_rate_ms,
                spawn_delay_ms: t.timing.spawn_delay_ms,
                merge_flash_ms: t.timing.merge_flash_ms,
                welcome_ms: t.timing.welcome_ms,
            },
            gamepad: GamepadConfig {
                undo: t.gamepad.undo,
                new_game: t.gamepad.new_game,
                confirm: t.gamepad.confirm,
                cancel: t.gamepad.cancel,
                info: t.gamepad.info,
                achievements: t.gamepad.achievements,
            },
            source,
            warnings,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), None, Vec::new())
    }
}

/// Candidate directories to search: exe dir + CWD + XDG (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a linked binary still finds its config.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/levels2048)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/levels2048");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

fn parse(text: &str, path: &Path, warnings: &mut Vec<String>) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            warnings.push(format!("{} parse error, using default settings: {e}", path.display()));
            TomlConfig::default()
        }
    }
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> (TomlConfig, Option<PathBuf>, Vec<String>) {
    let mut warnings = Vec::new();
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    let cfg = parse(&text, &path, &mut warnings);
                    return (cfg, Some(path), warnings);
                }
                Err(e) => {
                    warnings.push(format!("could not read {}: {e}", path.display()));
                }
            }
        }
    }
    (TomlConfig::default(), None, warnings)
}
