//! User-facing labels.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Strings {
    pub email_placeholder: &'static str,
    pub password_placeholder: &'static str,
    pub login: &'static str,
    pub dark_mode: &'static str,
    pub light_mode: &'static str,
    pub show_password: &'static str,
    pub hide_password: &'static str,
    pub theme_save_failed: &'static str,
}

impl Strings {
    pub const DEFAULT: Self = Self {
        email_placeholder: "Email",
        password_placeholder: "Password",
        login: "Log in",
        dark_mode: "Dark mode",
        light_mode: "Light mode",
        show_password: "Mostrar contraseña",
        hide_password: "Ocultar contraseña",
        theme_save_failed: "Could not save theme",
    };
}

impl Default for Strings {
    fn default() -> Self {
        Self::DEFAULT
    }
}
