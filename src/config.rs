//! Runtime configuration parsed from environment variables.

use std::path::PathBuf;

use crate::theme::{DEFAULT_EVENT_CAPACITY, DEFAULT_THEME_KEY};

pub const DEFAULT_PREFS_DIR: &str = ".lectern";
pub const DEFAULT_PREFS_GROUP: &str = "settings";
pub const DEFAULT_WATCH_INTERVAL_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var} '{value}': {reason}")]
    InvalidName { var: &'static str, value: String, reason: &'static str },

    #[error("invalid {var} '{value}': expected a positive integer")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LecternConfig {
    /// Directory holding preference group files.
    pub prefs_dir: PathBuf,
    /// Preference group (file stem) holding the theme flag.
    pub group: String,
    /// Key of the dark-mode flag inside the group.
    pub theme_key: String,
    /// Change events buffered per theme observer.
    pub event_capacity: usize,
    /// How often `watch` re-reads the group file, in milliseconds.
    pub watch_interval_ms: u64,
}

impl Default for LecternConfig {
    fn default() -> Self {
        Self {
            prefs_dir: PathBuf::from(DEFAULT_PREFS_DIR),
            group: DEFAULT_PREFS_GROUP.to_owned(),
            theme_key: DEFAULT_THEME_KEY.to_owned(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
            watch_interval_ms: DEFAULT_WATCH_INTERVAL_MS,
        }
    }
}

impl LecternConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `LECTERN_PREFS_DIR`: default `.lectern`
    /// - `LECTERN_PREFS_GROUP`: default `settings`
    /// - `LECTERN_THEME_KEY`: default `dark_mode`
    /// - `LECTERN_THEME_EVENT_CAPACITY`: default 64
    /// - `LECTERN_WATCH_INTERVAL_MS`: default 500
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a value is present but unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let prefs_dir = lookup("LECTERN_PREFS_DIR")
            .filter(|v| !v.trim().is_empty())
            .map_or(defaults.prefs_dir, PathBuf::from);
        let group = match lookup("LECTERN_PREFS_GROUP") {
            Some(raw) => parse_group("LECTERN_PREFS_GROUP", &raw)?,
            None => defaults.group,
        };
        let theme_key = match lookup("LECTERN_THEME_KEY") {
            Some(raw) => parse_key("LECTERN_THEME_KEY", &raw)?,
            None => defaults.theme_key,
        };
        let event_capacity = match lookup("LECTERN_THEME_EVENT_CAPACITY") {
            Some(raw) => parse_positive("LECTERN_THEME_EVENT_CAPACITY", &raw)?,
            None => defaults.event_capacity,
        };
        let watch_interval_ms = match lookup("LECTERN_WATCH_INTERVAL_MS") {
            Some(raw) => parse_positive("LECTERN_WATCH_INTERVAL_MS", &raw)?,
            None => defaults.watch_interval_ms,
        };

        Ok(Self { prefs_dir, group, theme_key, event_capacity, watch_interval_ms })
    }

    /// Replace the group, validating it the same way as the environment value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidName`] for an unusable group name.
    pub fn with_group(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.group = parse_group("--group", raw)?;
        Ok(self)
    }

    /// Full path of the group file.
    #[must_use]
    pub fn group_path(&self) -> PathBuf {
        self.prefs_dir.join(format!("{}.json", self.group))
    }
}

fn parse_group(var: &'static str, raw: &str) -> Result<String, ConfigError> {
    let value = raw.trim();
    let invalid = |reason: &'static str| ConfigError::InvalidName { var, value: raw.to_owned(), reason };

    if value.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if value == "." || value == ".." {
        return Err(invalid("must not be a relative path component"));
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')) {
        return Err(invalid("only ASCII letters, digits, '_', '-' and '.' are allowed"));
    }
    Ok(value.to_owned())
}

fn parse_key(var: &'static str, raw: &str) -> Result<String, ConfigError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ConfigError::InvalidName { var, value: raw.to_owned(), reason: "must not be empty" });
    }
    Ok(value.to_owned())
}

fn parse_positive<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match raw.trim().parse::<T>() {
        Ok(n) if n > T::default() => Ok(n),
        _ => Err(ConfigError::InvalidNumber { var, value: raw.to_owned() }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
