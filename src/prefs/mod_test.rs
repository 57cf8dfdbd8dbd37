use super::*;

#[test]
fn default_snapshot_is_empty_at_revision_zero() {
    let prefs = Preferences::default();
    assert_eq!(prefs.revision(), 0);
    assert!(prefs.is_empty());
    assert_eq!(prefs.get_bool("dark_mode"), None);
}

#[test]
fn with_value_bumps_revision_and_keeps_original() {
    let base = Preferences::default();
    let next = base.with_value("dark_mode", PrefValue::Bool(true));

    assert_eq!(next.revision(), 1);
    assert_eq!(next.get_bool("dark_mode"), Some(true));
    assert!(base.is_empty());
}

#[test]
fn get_bool_ignores_other_types() {
    let prefs = Preferences::default().with_value("dark_mode", PrefValue::Text("true".into()));
    assert_eq!(prefs.get_bool("dark_mode"), None);
    assert_eq!(prefs.get("dark_mode"), Some(&PrefValue::Text("true".into())));
}

#[test]
fn without_absent_key_is_none() {
    let prefs = Preferences::default().with_value("a", PrefValue::Int(1));
    assert!(prefs.without("b").is_none());

    let removed = prefs.without("a").unwrap();
    assert_eq!(removed.revision(), 2);
    assert!(removed.is_empty());
}

#[test]
fn snapshot_serializes_as_plain_json() {
    let prefs = Preferences::default()
        .with_value("dark_mode", PrefValue::Bool(true))
        .with_value("font_scale", PrefValue::Float(1.5));

    let json = serde_json::to_value(&prefs).unwrap();
    assert_eq!(json["revision"], 2);
    assert_eq!(json["values"]["dark_mode"], true);
    assert_eq!(json["values"]["font_scale"], 1.5);

    let back: Preferences = serde_json::from_value(json).unwrap();
    assert_eq!(back, prefs);
}

#[test]
fn snapshot_without_revision_field_defaults_to_zero() {
    let prefs: Preferences = serde_json::from_str(r#"{"values":{"dark_mode":false}}"#).unwrap();
    assert_eq!(prefs.revision(), 0);
    assert_eq!(prefs.get_bool("dark_mode"), Some(false));
}

#[test]
fn iter_yields_keys_in_order() {
    let prefs = Preferences::default()
        .with_value("b", PrefValue::Int(2))
        .with_value("a", PrefValue::Int(1));
    let keys: Vec<&str> = prefs.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["a", "b"]);
}

#[test]
fn storage_error_io_mentions_path() {
    let err = StorageError::Io {
        path: PathBuf::from("/tmp/settings.json"),
        source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
    };
    assert!(err.to_string().contains("/tmp/settings.json"));
}
