use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;

use crate::config::JiraApiConfig;
use crate::error::{parse_error_message, JiraApiError};
use crate::headers::build_headers;
use crate::payload::{CreateIssueRequest, CreatedIssue};
use crate::url::normalize_issue_url;

#[derive(Debug)]
pub struct JiraApiClient {
    http: Client,
    config: JiraApiConfig,
    endpoint: String,
}

impl JiraApiClient {
    pub fn new(config: JiraApiConfig) -> Result<Self, JiraApiError> {
        let endpoint = normalize_issue_url(&config.base_url)?;
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(JiraApiError::from)?;
        Ok(Self {
            http,
            config,
            endpoint,
        })
    }

    pub fn config(&self) -> &JiraApiConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn build_headers(&self) -> Result<HeaderMap, JiraApiError> {
        let headers = build_headers(&self.config)?;
        let mut out = HeaderMap::new();
        for (key, value) in headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| JiraApiError::InvalidHeader(format!("invalid header key: {key}")))?;
            let mut value = HeaderValue::from_str(&value)
                .map_err(|_| JiraApiError::InvalidHeader(format!("invalid value for {key}")))?;
            if name == reqwest::header::AUTHORIZATION {
                value.set_sensitive(true);
            }
            out.insert(name, value);
        }
        Ok(out)
    }

    pub fn build_request(
        &self,
        request: &CreateIssueRequest,
    ) -> Result<reqwest::RequestBuilder, JiraApiError> {
        let headers = self.build_headers()?;
        Ok(self.http.post(&self.endpoint).headers(headers).json(request))
    }

    /// Create one issue. A single attempt: failures are returned, never retried.
    pub async fn create_issue(
        &self,
        request: &CreateIssueRequest,
    ) -> Result<CreatedIssue, JiraApiError> {
        let response = self.build_request(request)?.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(JiraApiError::Status(
                status,
                parse_error_message(status, &body),
            ));
        }

        serde_json::from_str::<CreatedIssue>(&body).map_err(|error| {
            JiraApiError::MalformedResponse(format!("{error} in create-issue response"))
        })
    }
}
