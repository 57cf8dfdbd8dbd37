//! Login form state and the screen that ties it to the theme manager.

use std::borrow::Cow;
use std::fmt::Write as _;

use tracing::debug;

use super::{Palette, Strings};
use crate::prefs::StorageError;
use crate::theme::{ThemeManager, ThemeMode, ThemeObserver};

/// Logo scale while a field has focus (the on-screen keyboard is up).
const COMPACT_LOGO_SCALE: f32 = 0.4;
/// Top spacer weight while a field has focus.
const COMPACT_TOP_SPACER_WEIGHT: f32 = 0.1;

const PASSWORD_MASK: char = '•';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Email,
    Password,
}

/// Header sizing. The host animates between values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LogoLayout {
    pub logo_scale: f32,
    pub top_spacer_weight: f32,
}

// =============================================================================
// FORM
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoginForm {
    email: String,
    password: String,
    password_visible: bool,
    focused: Option<Field>,
}

impl LoginForm {
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn set_email(&mut self, value: impl Into<String>) {
        self.email = value.into();
    }

    pub fn set_password(&mut self, value: impl Into<String>) {
        self.password = value.into();
    }

    pub fn focus(&mut self, field: Field) {
        self.focused = Some(field);
    }

    /// Focus left `field`. Ignored if another field already took focus.
    pub fn blur(&mut self, field: Field) {
        if self.focused == Some(field) {
            self.focused = None;
        }
    }

    #[must_use]
    pub fn focused(&self) -> Option<Field> {
        self.focused
    }

    /// A focused text field means the on-screen keyboard is showing.
    #[must_use]
    pub fn keyboard_visible(&self) -> bool {
        self.focused.is_some()
    }

    pub fn toggle_password_visibility(&mut self) {
        self.password_visible = !self.password_visible;
    }

    #[must_use]
    pub fn is_password_visible(&self) -> bool {
        self.password_visible
    }

    /// Password as it should be drawn: masked unless visibility is on.
    #[must_use]
    pub fn password_display(&self) -> Cow<'_, str> {
        if self.password_visible {
            Cow::Borrowed(&self.password)
        } else {
            Cow::Owned(std::iter::repeat_n(PASSWORD_MASK, self.password.chars().count()).collect())
        }
    }

    #[must_use]
    pub fn layout(&self) -> LogoLayout {
        if self.keyboard_visible() {
            LogoLayout { logo_scale: COMPACT_LOGO_SCALE, top_spacer_weight: COMPACT_TOP_SPACER_WEIGHT }
        } else {
            LogoLayout { logo_scale: 1.0, top_spacer_weight: 1.0 }
        }
    }

    /// The login button has no behaviour attached.
    pub fn press_login(&self) {
        debug!(has_email = !self.email.is_empty(), "login pressed; no action wired");
    }
}

// =============================================================================
// THEME BUTTON
// =============================================================================

/// The button offers the mode you would switch to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemeButton {
    pub icon: &'static str,
    pub label: &'static str,
}

impl ThemeButton {
    #[must_use]
    pub fn for_mode(mode: ThemeMode, strings: &Strings) -> Self {
        match mode {
            ThemeMode::Dark => Self { icon: "light_mode", label: strings.light_mode },
            ThemeMode::Light => Self { icon: "dark_mode", label: strings.dark_mode },
        }
    }
}

// =============================================================================
// SCREEN
// =============================================================================

pub struct LoginScreen {
    form: LoginForm,
    strings: Strings,
    theme: ThemeObserver,
    notice: Option<String>,
}

impl LoginScreen {
    #[must_use]
    pub fn new(theme: ThemeObserver) -> Self {
        Self { form: LoginForm::default(), strings: Strings::DEFAULT, theme, notice: None }
    }

    #[must_use]
    pub fn form(&self) -> &LoginForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut LoginForm {
        &mut self.form
    }

    #[must_use]
    pub fn strings(&self) -> &Strings {
        &self.strings
    }

    #[must_use]
    pub fn mode(&self) -> ThemeMode {
        self.theme.mode()
    }

    #[must_use]
    pub fn palette(&self) -> Palette {
        Palette::for_mode(self.mode())
    }

    #[must_use]
    pub fn theme_button(&self) -> ThemeButton {
        ThemeButton::for_mode(self.mode(), &self.strings)
    }

    /// Icon and label for the password visibility toggle.
    #[must_use]
    pub fn password_toggle(&self) -> (&'static str, &'static str) {
        if self.form.is_password_visible() {
            ("visibility_off", self.strings.hide_password)
        } else {
            ("visibility", self.strings.show_password)
        }
    }

    /// Transient message from the last failed theme toggle.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Theme button handler: switch to the mode opposite to the one shown.
    ///
    /// On failure the shown mode stays as it was and a notice is recorded.
    ///
    /// # Errors
    ///
    /// Returns the store's [`StorageError`] when the preference write fails.
    pub async fn toggle_theme(&mut self, manager: &ThemeManager) -> Result<ThemeMode, StorageError> {
        let target = self.mode().toggled();
        match manager.set_dark_mode(target.is_dark()).await {
            Ok(()) => {
                self.notice = None;
                Ok(target)
            }
            Err(e) => {
                self.notice = Some(format!("{}: {e}", self.strings.theme_save_failed));
                Err(e)
            }
        }
    }

    /// Plain-text rendering for terminals and snapshots.
    #[must_use]
    pub fn render(&self) -> String {
        let palette = self.palette();
        let layout = self.form.layout();
        let button = self.theme_button();
        let (_, password_toggle) = self.password_toggle();
        let marker = |field: Field| if self.form.focused() == Some(field) { ">" } else { " " };
        let or_placeholder = |value: &str, placeholder: &'static str| {
            if value.is_empty() { format!("<{placeholder}>") } else { value.to_owned() }
        };

        let mut out = String::new();
        let _ = writeln!(out, "theme: {} (primary {}, background {})", self.mode(), palette.primary, palette.background);
        let _ = writeln!(out, "[logo x{:.1}]", layout.logo_scale);
        let _ = writeln!(
            out,
            "{} {}",
            marker(Field::Email),
            or_placeholder(self.form.email(), self.strings.email_placeholder)
        );
        let _ = writeln!(
            out,
            "{} {}  [{password_toggle}]",
            marker(Field::Password),
            or_placeholder(&*self.form.password_display(), self.strings.password_placeholder)
        );
        let _ = writeln!(out, "[ {} ]", self.strings.login);
        let _ = writeln!(out, "[{}: {}]", button.icon, button.label);
        if let Some(notice) = &self.notice {
            let _ = writeln!(out, "! {notice}");
        }
        out
    }
}

#[cfg(test)]
#[path = "login_test.rs"]
mod tests;
