//! Settings file loading.
//!
//! The file is read once at startup; the resulting [`Settings`] is never mutated.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub const CONFIG_ENV_VAR: &str = "LAZYTICKET_CONFIG";
pub const DEFAULT_ISSUE_TYPE: &str = "Bug";

/// Location under the home directory used when [`CONFIG_ENV_VAR`] is unset.
const HOME_RELATIVE_PATH: [&str; 3] = [".config", "lazyjira", "config.yaml"];

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot locate settings: no home directory and {CONFIG_ENV_VAR} is unset")]
    NoHomeDir,

    #[error("settings file not found at {path}")]
    MissingFile { path: PathBuf },

    #[error("permission denied reading settings at {path}")]
    PermissionDenied { path: PathBuf },

    #[error("failed to parse settings at {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("I/O error while reading settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SettingsError {
    fn from_io(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => Self::MissingFile { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source },
        }
    }

    fn parse(path: &Path, message: impl Into<String>) -> Self {
        Self::ParseError {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

/// Everything needed to route one submission.
#[derive(Clone, PartialEq)]
pub struct Settings {
    pub service_url: String,
    pub username: String,
    pub credential: String,
    pub project_key: String,
    pub issue_type: String,
    /// Extra issue fields attached verbatim to every submission.
    pub extra_fields: BTreeMap<String, Value>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("service_url", &self.service_url)
            .field("username", &self.username)
            .field("credential", &"<redacted>")
            .field("project_key", &self.project_key)
            .field("issue_type", &self.issue_type)
            .field("extra_fields", &self.extra_fields)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    jira_url: String,
    username: String,
    api_key: String,
    create_issue: RawCreateIssue,
}

#[derive(Debug, Deserialize)]
struct RawCreateIssue {
    project: String,
    #[serde(default)]
    issue_type: Option<String>,
    #[serde(default)]
    custom_fields: Option<BTreeMap<String, serde_yaml::Value>>,
}

/// Resolve the settings path: [`CONFIG_ENV_VAR`] wins, then `~/.config/lazyjira/config.yaml`.
pub fn default_path() -> Result<PathBuf, SettingsError> {
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(path));
    }

    let dirs = directories::BaseDirs::new().ok_or(SettingsError::NoHomeDir)?;
    Ok(HOME_RELATIVE_PATH
        .iter()
        .fold(dirs.home_dir().to_path_buf(), |path, part| path.join(part)))
}

/// Load settings from the default location.
pub fn load() -> Result<Settings, SettingsError> {
    load_from(&default_path()?)
}

pub fn load_from(path: &Path) -> Result<Settings, SettingsError> {
    let text = std::fs::read_to_string(path).map_err(|err| SettingsError::from_io(path, err))?;
    let settings = parse(&text, path)?;
    tracing::info!(
        path = %path.display(),
        project = %settings.project_key,
        issue_type = %settings.issue_type,
        extra_fields = settings.extra_fields.len(),
        "settings loaded"
    );
    Ok(settings)
}

/// Parse settings text; `path` is only used in error messages.
pub fn parse(text: &str, path: &Path) -> Result<Settings, SettingsError> {
    let raw: RawSettings =
        serde_yaml::from_str(text).map_err(|err| SettingsError::parse(path, err.to_string()))?;

    let service_url = required(path, "jira_url", raw.jira_url)?;
    if !(service_url.starts_with("https://") || service_url.starts_with("http://")) {
        return Err(SettingsError::parse(
            path,
            format!("`jira_url` must start with http:// or https://, got {service_url}"),
        ));
    }
    let username = required(path, "username", raw.username)?;
    if raw.api_key.trim().is_empty() {
        return Err(SettingsError::parse(path, "`api_key` must not be empty"));
    }
    let project_key = required(path, "create_issue.project", raw.create_issue.project)?;
    let issue_type = match raw.create_issue.issue_type {
        Some(value) => required(path, "create_issue.issue_type", value)?,
        None => DEFAULT_ISSUE_TYPE.to_string(),
    };

    let mut extra_fields = BTreeMap::new();
    for (key, value) in raw.create_issue.custom_fields.unwrap_or_default() {
        let value = serde_json::to_value(&value).map_err(|err| {
            SettingsError::parse(path, format!("custom field `{key}` is not JSON-compatible: {err}"))
        })?;
        extra_fields.insert(key, value);
    }

    Ok(Settings {
        service_url,
        username,
        credential: raw.api_key,
        project_key,
        issue_type,
        extra_fields,
    })
}

fn required(path: &Path, name: &str, value: String) -> Result<String, SettingsError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SettingsError::parse(path, format!("`{name}` must not be empty")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use serde_json::json;

    use super::{parse, SettingsError, DEFAULT_ISSUE_TYPE};

    const MINIMAL: &str = "\
jira_url: https://example.atlassian.net
username: me@example.com
api_key: secret
create_issue:
  project: OPS
";

    #[test]
    fn minimal_file_defaults_issue_type_and_fields() {
        let settings = parse(MINIMAL, Path::new("config.yaml")).unwrap();
        assert_eq!(settings.service_url, "https://example.atlassian.net");
        assert_eq!(settings.project_key, "OPS");
        assert_eq!(settings.issue_type, DEFAULT_ISSUE_TYPE);
        assert!(settings.extra_fields.is_empty());
    }

    #[test]
    fn custom_fields_convert_to_json_values() {
        let text = format!(
            "{MINIMAL}  issue_type: Task\n  custom_fields:\n    customfield_10010:\n      value: Platform\n    labels: [triage, ops]\n"
        );
        let settings = parse(&text, Path::new("config.yaml")).unwrap();
        assert_eq!(settings.issue_type, "Task");
        assert_eq!(
            settings.extra_fields.get("customfield_10010"),
            Some(&json!({ "value": "Platform" }))
        );
        assert_eq!(
            settings.extra_fields.get("labels"),
            Some(&json!(["triage", "ops"]))
        );
    }

    #[test]
    fn blank_required_values_are_parse_errors() {
        let text = MINIMAL.replace("project: OPS", "project: \"  \"");
        let err = parse(&text, Path::new("config.yaml")).unwrap_err();
        assert!(matches!(err, SettingsError::ParseError { .. }));
        assert!(err.to_string().contains("create_issue.project"));
    }

    #[test]
    fn service_url_needs_a_scheme() {
        let text = MINIMAL.replace("https://example.atlassian.net", "example.atlassian.net");
        let err = parse(&text, Path::new("config.yaml")).unwrap_err();
        assert!(err.to_string().contains("jira_url"));
    }

    #[test]
    fn missing_keys_are_parse_errors() {
        let err = parse("jira_url: x\n", Path::new("c.yaml")).unwrap_err();
        assert!(matches!(err, SettingsError::ParseError { .. }));
    }

    #[test]
    fn debug_output_redacts_credential() {
        let settings = parse(MINIMAL, Path::new("config.yaml")).unwrap();
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("secret"));
    }
}
