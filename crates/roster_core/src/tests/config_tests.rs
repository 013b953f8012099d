use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_match_original_dashboard() {
    let settings = EngineSettings::default();
    assert_eq!(settings.page_size, 10);
    assert_eq!(settings.page_overflow, PageOverflow::Empty);
    assert!(!settings.prune_stale_likes);
    assert!(!settings.reset_page_on_change);
}

#[test]
fn parses_partial_toml_over_defaults() {
    let settings = parse_settings(
        r#"
server_url = "http://directory.internal/api"
prune_stale_likes = true
page_overflow = "clamp"
"#,
    )
    .expect("parse");

    assert_eq!(settings.server_url, "http://directory.internal/api");
    assert!(settings.prune_stale_likes);
    assert_eq!(settings.page_overflow, PageOverflow::Clamp);
    assert_eq!(settings.page_size, DEFAULT_PAGE_SIZE);
}

#[test]
fn zero_page_size_falls_back_to_default() {
    let settings = parse_settings("page_size = 0").expect("parse");
    assert_eq!(settings.page_size, DEFAULT_PAGE_SIZE);
}

#[test]
fn environment_overrides_win_over_file_values() {
    let mut settings = parse_settings("page_size = 25").expect("parse");
    apply_overrides(
        &mut settings,
        lookup_from(&[
            ("DIRECTORY_URL", "http://ignored"),
            ("APP__SERVER_URL", "http://override/api"),
            ("APP__PAGE_SIZE", "5"),
            ("APP__RESET_PAGE_ON_CHANGE", "yes"),
            ("APP__PAGE_OVERFLOW", "clamp"),
            ("APP__REQUEST_TIMEOUT_SECS", "3"),
        ]),
    );

    assert_eq!(settings.server_url, "http://override/api");
    assert_eq!(settings.page_size, 5);
    assert!(settings.reset_page_on_change);
    assert_eq!(settings.page_overflow, PageOverflow::Clamp);
    assert_eq!(settings.request_timeout(), Duration::from_secs(3));
}

#[test]
fn malformed_overrides_are_ignored() {
    let mut settings = EngineSettings::default();
    apply_overrides(
        &mut settings,
        lookup_from(&[
            ("APP__PAGE_SIZE", "ten"),
            ("APP__PRUNE_STALE_LIKES", "maybe"),
            ("APP__PAGE_OVERFLOW", "wrap"),
        ]),
    );
    assert_eq!(settings, EngineSettings::default());
}

#[test]
fn explicit_missing_file_is_an_error() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let missing = env::temp_dir().join(format!("roster_settings_missing_{suffix}.toml"));

    let err = load_settings_file(&missing).expect_err("missing file");
    assert!(matches!(err, SettingsError::Read { .. }));
}

#[test]
fn reads_settings_file_from_disk() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("roster_settings_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join(DEFAULT_SETTINGS_FILE);
    fs::write(&path, "page_size = 3\n").expect("write settings");

    let settings = load_settings_file(&path).expect("load");
    assert_eq!(settings.page_size, 3);

    fs::write(&path, "page_size = \"three\"\n").expect("rewrite settings");
    let err = load_settings_file(&path).expect_err("bad type");
    assert!(matches!(err, SettingsError::Parse { .. }));

    fs::remove_dir_all(temp_root).expect("cleanup");
}
