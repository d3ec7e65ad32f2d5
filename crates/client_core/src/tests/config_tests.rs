use super::*;

use std::collections::HashMap;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name: &str| vars.get(name).cloned()
}

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings =
        load_settings_from(&dir.path().join("emulator.toml"), env_from(&[])).expect("settings");
    assert_eq!(settings, ClientSettings::default());
}

#[test]
fn file_values_override_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("emulator.toml");
    fs::write(
        &path,
        "server_url = \"http://10.0.0.5:9000\"\nrequest_timeout_ms = 250\nordering = \"latest_issued\"\n",
    )
    .expect("write config");

    let settings = load_settings_from(&path, env_from(&[])).expect("settings");
    assert_eq!(settings.server_url, "http://10.0.0.5:9000");
    assert_eq!(settings.request_timeout_ms, 250);
    assert_eq!(settings.ordering, OrderingPolicy::LatestIssued);
}

#[test]
fn env_overrides_file_and_app_prefix_wins() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("emulator.toml");
    fs::write(&path, "server_url = \"http://from-file:1\"\n").expect("write config");

    let settings = load_settings_from(
        &path,
        env_from(&[
            ("EMULATOR_SERVER_URL", "http://from-env:2"),
            ("APP__SERVER_URL", "http://from-app-env:3"),
            ("APP__ORDERING", "Latest-Issued"),
        ]),
    )
    .expect("settings");
    assert_eq!(settings.server_url, "http://from-app-env:3");
    assert_eq!(settings.ordering, OrderingPolicy::LatestIssued);
}

#[test]
fn malformed_file_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("emulator.toml");
    fs::write(&path, "request_timeout_ms = \"soon\"\n").expect("write config");

    let err = load_settings_from(&path, env_from(&[])).expect_err("parse error");
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn rejects_bad_env_values() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("emulator.toml");

    let err = load_settings_from(&path, env_from(&[("APP__REQUEST_TIMEOUT_MS", "fast")]))
        .expect_err("timeout");
    assert!(matches!(
        err,
        ConfigError::InvalidValue {
            key: "APP__REQUEST_TIMEOUT_MS",
            ..
        }
    ));

    let err = load_settings_from(&path, env_from(&[("APP__ORDERING", "random")]))
        .expect_err("ordering");
    assert!(matches!(err, ConfigError::InvalidValue { key: "APP__ORDERING", .. }));

    let err = load_settings_from(&path, env_from(&[("APP__SERVER_URL", "ftp://host")]))
        .expect_err("url");
    assert!(matches!(err, ConfigError::InvalidValue { key: "server_url", .. }));
}
