use std::collections::BTreeMap;

use base64::{engine::general_purpose, Engine as _};

use crate::config::JiraApiConfig;
use crate::error::JiraApiError;

pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_AUTHORIZATION: &str = "authorization";
pub const HEADER_USER_AGENT: &str = "user-agent";

/// Build a deterministic header map for Jira requests.
pub fn build_headers(config: &JiraApiConfig) -> Result<BTreeMap<String, String>, JiraApiError> {
    let username = config.username.trim();
    if username.is_empty() {
        return Err(JiraApiError::MissingUsername);
    }
    // Tokens are used verbatim; only an all-blank one is rejected.
    if config.api_token.trim().is_empty() {
        return Err(JiraApiError::MissingApiToken);
    }

    let mut headers = BTreeMap::new();
    headers.insert(
        HEADER_AUTHORIZATION.to_owned(),
        basic_auth_value(username, &config.api_token),
    );
    headers.insert(HEADER_ACCEPT.to_owned(), "application/json".to_owned());
    headers.insert(
        HEADER_CONTENT_TYPE.to_owned(),
        "application/json".to_owned(),
    );

    let ua = match config.user_agent.as_deref() {
        Some(explicit) if !explicit.trim().is_empty() => explicit.trim().to_owned(),
        _ => default_user_agent(),
    };
    headers.insert(HEADER_USER_AGENT.to_owned(), ua);

    for (key, value) in &config.extra_headers {
        headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_owned());
    }

    Ok(headers)
}

/// `Basic base64(user:token)` as defined by RFC 7617.
pub fn basic_auth_value(username: &str, api_token: &str) -> String {
    let credentials = format!("{username}:{api_token}");
    format!("Basic {}", general_purpose::STANDARD.encode(credentials))
}

fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match runtime_os_triplet() {
        Some((platform, release, arch)) => {
            format!("lazyticket/{version} ({platform} {release}; {arch})")
        }
        None => format!("lazyticket/{version}"),
    }
}

fn normalize_arch(arch: &str) -> String {
    match arch.to_ascii_lowercase().as_str() {
        "x86_64" | "amd64" => "x64".to_owned(),
        "x86" | "i386" | "i686" => "ia32".to_owned(),
        "aarch64" => "arm64".to_owned(),
        normalized => normalized.to_owned(),
    }
}

#[cfg(unix)]
fn runtime_os_triplet() -> Option<(String, String, String)> {
    use std::ffi::CStr;
    use std::mem::MaybeUninit;

    let mut raw = MaybeUninit::<libc::utsname>::uninit();
    // SAFETY: `uname` initializes the provided `utsname` struct on success.
    let rc = unsafe { libc::uname(raw.as_mut_ptr()) };
    if rc != 0 {
        return None;
    }

    // SAFETY: `uname` returned success, so `raw` is initialized.
    let raw = unsafe { raw.assume_init() };
    // SAFETY: `uname` provides NUL-terminated fixed-size C strings.
    let (platform, release, arch) = unsafe {
        (
            CStr::from_ptr(raw.sysname.as_ptr()).to_string_lossy().to_lowercase(),
            CStr::from_ptr(raw.release.as_ptr()).to_string_lossy().into_owned(),
            CStr::from_ptr(raw.machine.as_ptr()).to_string_lossy().into_owned(),
        )
    };
    let arch = normalize_arch(&arch);

    if platform.is_empty() || release.is_empty() || arch.is_empty() {
        None
    } else {
        Some((platform, release, arch))
    }
}

#[cfg(not(unix))]
fn runtime_os_triplet() -> Option<(String, String, String)> {
    None
}
