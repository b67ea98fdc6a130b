//! Light/dark theme preference.
//!
//! The preference lives in the durable [`KeyValueStore`] under [`THEME_KEY`]
//! as `"dark"` or `"light"`. On startup a stored value wins; otherwise the
//! environment's own preference decides.

use crate::view::View;
use prefs_store::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Storage key of the persisted preference.
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Parse a stored value; anything unrecognised counts as absent.
    pub fn from_stored(value: &str) -> Option<Self> {
        match value.trim() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The persisted theme, or `system` when nothing usable is stored.
pub fn resolve_theme(store: &dyn KeyValueStore, system: Theme) -> Theme {
    match store.get(THEME_KEY).as_deref().and_then(Theme::from_stored) {
        Some(stored) => stored,
        None => system,
    }
}

/// Resolve the startup theme and apply it to the view.
pub fn init_theme<V: View + ?Sized>(store: &dyn KeyValueStore, system: Theme, view: &V) -> Theme {
    let theme = resolve_theme(store, system);
    debug!("Initial theme: {} (system: {})", theme, system);
    view.apply_theme(theme);
    theme
}

/// Flip `current`, persist the new value and apply it.
///
/// A failed write is logged; the view still switches.
pub fn toggle_theme<V: View + ?Sized>(current: Theme, store: &dyn KeyValueStore, view: &V) -> Theme {
    let next = current.toggled();
    if let Err(e) = store.set(THEME_KEY, next.as_str()) {
        warn!("Could not persist theme preference: {}", e);
    }
    view.apply_theme(next);
    next
}

/// The terminal's colour-scheme preference.
///
/// `PDF2IMG_THEME` (`dark`/`light`) takes precedence; otherwise the
/// `COLORFGBG` convention (`"fg;bg"`) is read, where background colours 0–6
/// and 8 are dark. Light when neither says otherwise.
pub fn detect_system_theme(lookup: impl Fn(&str) -> Option<String>) -> Theme {
    if let Some(explicit) = lookup("PDF2IMG_THEME").as_deref().and_then(Theme::from_stored) {
        return explicit;
    }

    let bg = lookup("COLORFGBG").and_then(|v| {
        v.rsplit(';')
            .next()
            .and_then(|last| last.trim().parse::<u8>().ok())
    });

    match bg {
        Some(0..=6) | Some(8) => Theme::Dark,
        _ => Theme::Light,
    }
}
