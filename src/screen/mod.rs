//! Login screen presentation model.
//!
//! DESIGN
//! ======
//! Toolkit-free state for the login screen: colours for the active theme,
//! labels, form fields, and the theme button. A host renders from this model
//! and forwards input events to it; the only side effect it triggers is the
//! theme write through [`ThemeManager`](crate::theme::ThemeManager).

mod login;
mod palette;
mod strings;

pub use login::{Field, LoginForm, LoginScreen, LogoLayout, ThemeButton};
pub use palette::Palette;
pub use strings::Strings;
