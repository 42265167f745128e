use std::fs;
use std::sync::{Mutex, OnceLock};

use lazyticket::settings::{default_path, load, load_from, SettingsError, CONFIG_ENV_VAR};
use serde_json::json;
use tempfile::TempDir;

const FULL: &str = r#"
jira_url: https://example.atlassian.net/
username: me@example.com
api_key: secret
create_issue:
  project: OPS
  custom_fields:
    customfield_10010:
      value: Platform
    priority:
      name: High
"#;

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.yaml");
    fs::write(&path, contents).expect("write config");
    path
}

#[test]
fn loads_full_settings_file() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(&dir, FULL);

    let settings = load_from(&path).expect("settings");
    assert_eq!(settings.service_url, "https://example.atlassian.net/");
    assert_eq!(settings.username, "me@example.com");
    assert_eq!(settings.credential, "secret");
    assert_eq!(settings.project_key, "OPS");
    assert_eq!(settings.issue_type, "Bug");
    assert_eq!(
        settings.extra_fields.get("priority"),
        Some(&json!({ "name": "High" }))
    );
    assert_eq!(settings.extra_fields.len(), 2);
}

#[test]
fn missing_file_is_reported_with_its_path() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("absent.yaml");

    let err = load_from(&path).unwrap_err();
    match &err {
        SettingsError::MissingFile { path: reported } => assert_eq!(reported, &path),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("absent.yaml"));
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(&dir, "jira_url: [unterminated\n");
    assert!(matches!(
        load_from(&path),
        Err(SettingsError::ParseError { .. })
    ));
}

#[test]
fn directory_instead_of_file_is_an_io_error() {
    let dir = TempDir::new().expect("tempdir");
    let err = load_from(dir.path()).unwrap_err();
    assert!(
        matches!(
            err,
            SettingsError::Io { .. } | SettingsError::PermissionDenied { .. }
        ),
        "got {err:?}"
    );
}

#[cfg(unix)]
#[test]
fn unreadable_file_is_permission_denied() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().expect("tempdir");
    let path = write_config(&dir, FULL);
    fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).expect("chmod");

    // Root ignores file modes; nothing to assert there.
    if fs::read(&path).is_ok() {
        return;
    }
    assert!(matches!(
        load_from(&path),
        Err(SettingsError::PermissionDenied { .. })
    ));
}

#[test]
fn env_var_overrides_default_location() {
    let _guard = env_lock().lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(&dir, FULL);

    let previous = std::env::var_os(CONFIG_ENV_VAR);
    std::env::set_var(CONFIG_ENV_VAR, &path);
    let resolved = default_path();
    let loaded = load();
    match previous {
        Some(value) => std::env::set_var(CONFIG_ENV_VAR, value),
        None => std::env::remove_var(CONFIG_ENV_VAR),
    }

    assert_eq!(resolved.expect("path"), path);
    assert_eq!(loaded.expect("settings").project_key, "OPS");
}

#[test]
fn default_location_is_under_home_config() {
    let _guard = env_lock().lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let previous = std::env::var_os(CONFIG_ENV_VAR);
    std::env::remove_var(CONFIG_ENV_VAR);
    let resolved = default_path();
    if let Some(value) = previous {
        std::env::set_var(CONFIG_ENV_VAR, value);
    }

    if let Ok(path) = resolved {
        assert!(path.ends_with(".config/lazyjira/config.yaml"), "{path:?}");
    }
}
