/// Preference storage: a small string key-value store plus typed accessors.
///
/// ## Layout
///
///   `prefs.json` in the data directory holds one JSON object. Each value
///   is itself a JSON document stored as a string, so the file reads the
///   same way the keys are addressed:
///
///     { "2048-best-score": "1234", "2048-dark-mode": "true", ... }
///
/// Writes go to `prefs.json.tmp` first and are renamed into place.
///
/// ## Failure policy
///
///   `Preferences` never surfaces a `StoreError`. Reads that fail or do not
///   parse fall back to the default, writes that fail are logged and the
///   in-memory value stays authoritative.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::progress::Achievement;
use crate::domain::rules;

pub const KEY_DARK_MODE: &str = "2048-dark-mode";
pub const KEY_BEST_SCORE: &str = "2048-best-score";
pub const KEY_LEVEL: &str = "2048-current-level";
pub const KEY_ACHIEVEMENTS: &str = "2048-achievements";

const PREFS_FILE: &str = "prefs.json";
const APP_DIR: &str = "levels2048";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ══════════════════════════════════════════════════════════════
// Key-value stores
// ══════════════════════════════════════════════════════════════

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store. Used by tests and when no directory is writable.
#[derive(Default, Debug)]
pub struct MemoryStore {
    map: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.map.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.map.remove(key);
        Ok(())
    }
}

/// JSON-object file store. The whole map is cached and rewritten on change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    map: BTreeMap<String, String>,
}

impl FileStore {
    /// Open `prefs.json` inside `dir`. A missing file is an empty store.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(PREFS_FILE);
        let map = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(FileStore { path, map })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(&self.map)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, text)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.map.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.map.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        self.map.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.map.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

// ══════════════════════════════════════════════════════════════
// Paths
// ══════════════════════════════════════════════════════════════

/// Pick a writable data directory. `configured` wins when non-empty.
pub fn data_dir(configured: &str) -> PathBuf {
    if !configured.is_empty() {
        return PathBuf::from(configured);
    }

    // 1. Exe directory (portable installs)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            // System installs like /usr/games/ won't be writable
            let test_path = parent.join(".write_test_levels2048");
            if std::fs::write(&test_path, "").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return parent.to_path_buf();
            }
        }
    }

    // 2. XDG data home
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share").join(APP_DIR);
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    // 3. CWD
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

// ══════════════════════════════════════════════════════════════
// Typed preferences
// ══════════════════════════════════════════════════════════════

pub struct Preferences {
    store: Box<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Preferences { store }
    }

    pub fn in_memory() -> Self {
        Preferences::new(Box::new(MemoryStore::new()))
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("reading {key}: {e}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("ignoring stored {key}: {e}");
                None
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(StoreError::from)
            .and_then(|raw| self.store.set(key, &raw));
        if let Err(e) = result {
            warn!("writing {key}: {e}");
        }
    }

    pub fn dark_mode(&self) -> bool {
        self.read(KEY_DARK_MODE).unwrap_or(true)
    }

    pub fn set_dark_mode(&mut self, on: bool) {
        self.write(KEY_DARK_MODE, &on);
    }

    pub fn best_score(&self) -> u64 {
        self.read(KEY_BEST_SCORE).unwrap_or(0)
    }

    pub fn set_best_score(&mut self, score: u64) {
        self.write(KEY_BEST_SCORE, &score);
    }

    /// Stored level, or 1 when missing or below 1. Levels past the last
    /// one are clamped.
    pub fn level(&self) -> u32 {
        match self.read::<u32>(KEY_LEVEL) {
            Some(l) if l >= 1 => l.min(rules::MAX_LEVEL),
            _ => 1,
        }
    }

    pub fn set_level(&mut self, level: u32) {
        self.write(KEY_LEVEL, &level);
    }

    pub fn achievements(&self) -> Vec<Achievement> {
        self.read(KEY_ACHIEVEMENTS).unwrap_or_default()
    }

    pub fn set_achievements(&mut self, list: &[Achievement]) {
        self.write(KEY_ACHIEVEMENTS, list);
    }

    /// Drop best score, level and achievements so they read as defaults.
    /// The theme choice stays.
    pub fn clear_progress(&mut self) {
        for key in [KEY_BEST_SCORE, KEY_LEVEL, KEY_ACHIEVEMENTS] {
            if let Err(e) = self.store.remove(key) {
                warn!("removing {key}: {e}");
            }
        }
    }
}
