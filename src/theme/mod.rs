//! Theme preference — the persisted dark/light display mode.
//!
//! DESIGN
//! ======
//! [`ThemeManager`] is the single source of truth for the display mode. It
//! bridges an async [`PreferenceStore`](crate::prefs::PreferenceStore) to a
//! synchronously readable value that UI code observes through
//! [`ThemeObserver`]. The flag lives under one key; only a stored `true`
//! boolean means dark mode, anything else (missing key, wrong type, corrupt
//! group) means light mode.

mod manager;

use std::fmt;
use std::str::FromStr;

pub use manager::{DEFAULT_EVENT_CAPACITY, ThemeManager, ThemeObserver};

/// Default key under which the flag is stored.
pub const DEFAULT_THEME_KEY: &str = "dark_mode";

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    /// `initialize` was called a second time on the same manager.
    #[error("theme manager already initialized")]
    AlreadyInitialized,
}

// =============================================================================
// MODE
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    #[must_use]
    pub fn from_dark_flag(is_dark: bool) -> Self {
        if is_dark { Self::Dark } else { Self::Light }
    }

    #[must_use]
    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme mode '{0}' (expected 'light' or 'dark')")]
pub struct ParseThemeModeError(String);

impl FromStr for ThemeMode {
    type Err = ParseThemeModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(ParseThemeModeError(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
