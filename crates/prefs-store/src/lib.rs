//! # prefs-store
//!
//! A tiny durable key-value store for user preferences, the native-client
//! counterpart of a browser's `localStorage`. Values are strings, keys are
//! strings, and the whole store is one flat JSON object on disk:
//!
//! ```json
//! { "theme": "dark" }
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use prefs_store::{FileStore, KeyValueStore};
//!
//! let store = FileStore::open_default().expect("prefs unavailable");
//! store.set("theme", "dark").expect("write failed");
//! assert_eq!(store.get("theme").as_deref(), Some("dark"));
//! ```
//!
//! ## Location
//!
//! | OS      | Default file                                          |
//! |---------|-------------------------------------------------------|
//! | macOS   | `~/Library/Application Support/pdf2img/prefs.json`    |
//! | Linux   | `~/.config/pdf2img/prefs.json`                        |
//! | Windows | `%APPDATA%\pdf2img\prefs.json`                        |
//!
//! ## Environment variable overrides
//!
//! - `PDF2IMG_PREFS_DIR` — directory holding `prefs.json`.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};
use thiserror::Error;

// ── Public constants ─────────────────────────────────────────────────────────

/// File name of the on-disk store inside the preferences directory.
pub const PREFS_FILE_NAME: &str = "prefs.json";

/// Application folder created under the platform config directory.
const APP_DIR: &str = "pdf2img";

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by prefs-store operations.
#[derive(Error, Debug)]
pub enum PrefsError {
    /// Could not create the preferences directory or read/write the file.
    #[error("Preferences I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not a JSON object.
    #[error("Preferences file '{path}' is corrupt: {detail}")]
    Corrupt { path: PathBuf, detail: String },
}

// ── Store trait ──────────────────────────────────────────────────────────────

/// A durable string-to-string store.
///
/// Reads never fail: a missing key and an unreadable backend both look like
/// "absent", mirroring `localStorage.getItem` returning `null`.
pub trait KeyValueStore: Send + Sync {
    /// Look up `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), PrefsError>;

    /// Delete `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), PrefsError>;
}

// ── Directory resolution ─────────────────────────────────────────────────────

/// Returns the directory that holds `prefs.json`.
///
/// Override by setting `PDF2IMG_PREFS_DIR`.
pub fn prefs_dir() -> PathBuf {
    if let Ok(override_dir) = std::env::var("PDF2IMG_PREFS_DIR") {
        if !override_dir.is_empty() {
            return PathBuf::from(override_dir);
        }
    }

    let base = dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .unwrap_or_else(std::env::temp_dir);

    base.join(APP_DIR)
}

// ── File-backed store ────────────────────────────────────────────────────────

/// Store persisted as a JSON object in a single file.
///
/// The file is loaded once on [`FileStore::open`] and rewritten atomically
/// (temp file + rename) on every mutation.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<Map<String, Value>>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A missing file is an empty store; nothing is written until the first
    /// [`KeyValueStore::set`].
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PrefsError> {
        let path = path.into();
        let entries = load_entries(&path)?;
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Open the store at `prefs_dir()/prefs.json`.
    pub fn open_default() -> Result<Self, PrefsError> {
        Self::open(prefs_dir().join(PREFS_FILE_NAME))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, Map<String, Value>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, entries: &Map<String, Value>) -> Result<(), PrefsError> {
        let io_err = |source| PrefsError::Io {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(io_err)?;

        let body = serde_json::to_vec_pretty(entries).map_err(|e| PrefsError::Corrupt {
            path: self.path.clone(),
            detail: e.to_string(),
        })?;

        // Unique temp name per write, so concurrent writers never share one.
        let mut tmp = tempfile::Builder::new()
            .prefix(".prefs-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(io_err)?;
        tmp.write_all(&body).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock()
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PrefsError> {
        let mut entries = self.lock();
        entries.insert(key.to_string(), Value::String(value.to_string()));
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), PrefsError> {
        let mut entries = self.lock();
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.persist(&entries)
    }
}

fn load_entries(path: &Path) -> Result<Map<String, Value>, PrefsError> {
    let raw = match std::fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(source) => {
            return Err(PrefsError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(&raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(PrefsError::Corrupt {
            path: path.to_path_buf(),
            detail: format!("expected a JSON object, found {other}"),
        }),
        Err(e) => Err(PrefsError::Corrupt {
            path: path.to_path_buf(),
            detail: e.to_string(),
        }),
    }
}

// ── In-memory store ──────────────────────────────────────────────────────────

/// Non-durable store, used when no writable location exists and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PrefsError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PrefsError> {
        self.lock().remove(key);
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
