use crate::error::JiraApiError;

/// REST path of the create-issue endpoint.
pub const ISSUE_PATH: &str = "/rest/api/2/issue";

/// Normalize a site URL to the create-issue endpoint.
///
/// Normalization rules:
/// 1) keep a URL already ending in `/rest/api/2/issue`
/// 2) append `/issue` when the path ends in `/rest/api/2`
/// 3) append `/rest/api/2/issue` otherwise
///
/// Blank input or a scheme other than http(s) is rejected.
pub fn normalize_issue_url(input: &str) -> Result<String, JiraApiError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(JiraApiError::InvalidBaseUrl("base URL is empty".to_owned()));
    }
    if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
        return Err(JiraApiError::InvalidBaseUrl(format!(
            "{trimmed} (expected http:// or https://)"
        )));
    }

    let trimmed = trimmed.trim_end_matches('/');
    if trimmed.ends_with(ISSUE_PATH) {
        return Ok(trimmed.to_owned());
    }
    if trimmed.ends_with("/rest/api/2") {
        return Ok(format!("{trimmed}/issue"));
    }
    Ok(format!("{trimmed}{ISSUE_PATH}"))
}
