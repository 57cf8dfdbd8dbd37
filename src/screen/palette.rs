//! Colour scheme per theme mode (Material 3 baseline).

use crate::theme::ThemeMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub primary: &'static str,
    pub on_primary: &'static str,
    pub background: &'static str,
    pub surface: &'static str,
    pub on_surface: &'static str,
}

impl Palette {
    pub const LIGHT: Self = Self {
        primary: "#6750A4",
        on_primary: "#FFFFFF",
        background: "#FFFBFE",
        surface: "#FFFBFE",
        on_surface: "#1C1B1F",
    };

    pub const DARK: Self = Self {
        primary: "#D0BCFF",
        on_primary: "#381E72",
        background: "#1C1B1F",
        surface: "#1C1B1F",
        on_surface: "#E6E1E5",
    };

    #[must_use]
    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => Self::LIGHT,
            ThemeMode::Dark => Self::DARK,
        }
    }
}
