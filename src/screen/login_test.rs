use std::sync::Arc;

use super::*;
use crate::prefs::MemoryStore;

// =============================================================
// LoginForm
// =============================================================

#[test]
fn form_starts_empty_and_unfocused() {
    let form = LoginForm::default();
    assert_eq!(form.email(), "");
    assert_eq!(form.password(), "");
    assert!(!form.keyboard_visible());
    assert!(!form.is_password_visible());
}

#[test]
fn password_is_masked_until_revealed() {
    let mut form = LoginForm::default();
    form.set_password("ñandú42");
    assert_eq!(form.password_display(), "•••••••");

    form.toggle_password_visibility();
    assert_eq!(form.password_display(), "ñandú42");

    form.toggle_password_visibility();
    assert_eq!(form.password_display(), "•••••••");
}

#[test]
fn focus_compacts_logo_layout() {
    let mut form = LoginForm::default();
    assert_eq!(form.layout(), LogoLayout { logo_scale: 1.0, top_spacer_weight: 1.0 });

    form.focus(Field::Email);
    assert_eq!(
        form.layout(),
        LogoLayout { logo_scale: COMPACT_LOGO_SCALE, top_spacer_weight: COMPACT_TOP_SPACER_WEIGHT }
    );
}

#[test]
fn moving_focus_between_fields_keeps_keyboard_up() {
    let mut form = LoginForm::default();
    form.focus(Field::Email);
    form.focus(Field::Password);
    form.blur(Field::Email);

    assert_eq!(form.focused(), Some(Field::Password));
    assert!(form.keyboard_visible());

    form.blur(Field::Password);
    assert!(!form.keyboard_visible());
}

#[test]
fn press_login_changes_nothing() {
    let mut form = LoginForm::default();
    form.set_email("reader@example.com");
    let before = form.clone();
    form.press_login();
    assert_eq!(form, before);
}

// =============================================================
// ThemeButton
// =============================================================

#[test]
fn theme_button_offers_opposite_mode() {
    let strings = Strings::DEFAULT;
    assert_eq!(
        ThemeButton::for_mode(ThemeMode::Light, &strings),
        ThemeButton { icon: "dark_mode", label: "Dark mode" }
    );
    assert_eq!(
        ThemeButton::for_mode(ThemeMode::Dark, &strings),
        ThemeButton { icon: "light_mode", label: "Light mode" }
    );
}

// =============================================================
// LoginScreen
// =============================================================

#[tokio::test]
async fn screen_follows_theme_and_palette() {
    let manager = ThemeManager::new(Arc::new(MemoryStore::new()), "dark_mode");
    let mut screen = LoginScreen::new(manager.observe());
    assert_eq!(screen.mode(), ThemeMode::Light);
    assert_eq!(screen.palette(), Palette::LIGHT);

    let mode = screen.toggle_theme(&manager).await.unwrap();
    assert_eq!(mode, ThemeMode::Dark);
    assert_eq!(screen.mode(), ThemeMode::Dark);
    assert_eq!(screen.palette(), Palette::DARK);
    assert_eq!(screen.theme_button().icon, "light_mode");
    assert!(screen.notice().is_none());
}

#[tokio::test]
async fn failed_toggle_keeps_mode_and_records_notice() {
    let store = Arc::new(MemoryStore::new());
    let manager = ThemeManager::new(store.clone(), "dark_mode");
    let mut screen = LoginScreen::new(manager.observe());

    store.fail_writes(true);
    assert!(screen.toggle_theme(&manager).await.is_err());
    assert_eq!(screen.mode(), ThemeMode::Light);
    let notice = screen.notice().unwrap();
    assert!(notice.starts_with("Could not save theme"));

    screen.dismiss_notice();
    assert!(screen.notice().is_none());
}

#[tokio::test]
async fn successful_toggle_clears_previous_notice() {
    let store = Arc::new(MemoryStore::new());
    let manager = ThemeManager::new(store.clone(), "dark_mode");
    let mut screen = LoginScreen::new(manager.observe());

    store.fail_writes(true);
    let _ = screen.toggle_theme(&manager).await;
    store.fail_writes(false);
    screen.toggle_theme(&manager).await.unwrap();
    assert!(screen.notice().is_none());
}

#[test]
fn password_toggle_label_tracks_visibility() {
    let manager = ThemeManager::new(Arc::new(MemoryStore::new()), "dark_mode");
    let mut screen = LoginScreen::new(manager.observe());
    assert_eq!(screen.password_toggle(), ("visibility", "Mostrar contraseña"));

    screen.form_mut().toggle_password_visibility();
    assert_eq!(screen.password_toggle(), ("visibility_off", "Ocultar contraseña"));
}

#[test]
fn render_shows_placeholders_focus_and_theme() {
    let manager = ThemeManager::new(Arc::new(MemoryStore::new()), "dark_mode");
    let mut screen = LoginScreen::new(manager.observe());
    screen.form_mut().focus(Field::Password);
    screen.form_mut().set_password("abc");

    let text = screen.render();
    assert!(text.contains("theme: light"));
    assert!(text.contains("[logo x0.4]"));
    assert!(text.contains("  <Email>"));
    assert!(text.contains("> •••  [Mostrar contraseña]"));
    assert!(text.contains("[ Log in ]"));
    assert!(text.contains("[dark_mode: Dark mode]"));
}
