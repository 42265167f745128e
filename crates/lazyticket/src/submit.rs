//! Ticket submission.
//!
//! [`submit_if_completed`] is the only caller of a [`TicketSubmitter`]: it forwards a completed
//! form exactly once and never forwards a cancelled one.

use std::time::Duration;

use jira_api::{CreateIssueRequest, JiraApiClient, JiraApiConfig, JiraApiError};
use thiserror::Error;

use crate::form::{FormOutcome, FormState};
use crate::settings::Settings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    pub issue_key: String,
    pub issue_url: String,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("authentication failed: {message}")]
    AuthFailure { message: String },

    #[error("network failure: {message}")]
    NetworkFailure { message: String },

    #[error("Jira rejected the ticket: {message}")]
    RemoteValidationFailure { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl SubmitError {
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<JiraApiError> for SubmitError {
    fn from(error: JiraApiError) -> Self {
        let message = error.to_string();
        if error.is_auth_failure() {
            return Self::AuthFailure { message };
        }
        if error.is_transport_failure() {
            return Self::NetworkFailure { message };
        }
        match error.status() {
            Some(status) if status.is_server_error() => Self::NetworkFailure { message },
            Some(_) => Self::RemoteValidationFailure { message },
            None => Self::Internal { message },
        }
    }
}

pub trait TicketSubmitter {
    fn submit(
        &self,
        settings: &Settings,
        title: &str,
        body: &str,
    ) -> Result<SubmissionResult, SubmitError>;
}

/// Create-issue payload for one submission.
pub fn build_request(settings: &Settings, title: &str, body: &str) -> CreateIssueRequest {
    CreateIssueRequest::new(&settings.project_key, &settings.issue_type, title, body)
        .with_custom_fields(settings.extra_fields.clone())
}

/// Files tickets through the Jira REST API on a short-lived current-thread runtime.
#[derive(Debug, Clone)]
pub struct JiraSubmitter {
    timeout: Option<Duration>,
}

impl Default for JiraSubmitter {
    fn default() -> Self {
        Self {
            timeout: Some(jira_api::config::DEFAULT_TIMEOUT),
        }
    }
}

impl JiraSubmitter {
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl TicketSubmitter for JiraSubmitter {
    fn submit(
        &self,
        settings: &Settings,
        title: &str,
        body: &str,
    ) -> Result<SubmissionResult, SubmitError> {
        let config = JiraApiConfig::new(
            &settings.service_url,
            &settings.username,
            &settings.credential,
        )
        .with_timeout(self.timeout);
        let client = JiraApiClient::new(config)?;
        let request = build_request(settings, title, body);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| SubmitError::internal(format!("failed to start async runtime: {err}")))?;

        tracing::info!(endpoint = %client.endpoint(), project = %settings.project_key, "creating issue");
        let created = runtime.block_on(client.create_issue(&request))?;
        tracing::info!(key = %created.key, "issue created");

        Ok(SubmissionResult {
            issue_key: created.key,
            issue_url: created.self_url,
        })
    }
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Submitted(SubmissionResult),
    Cancelled,
    /// The collected input is kept so it can be shown to the operator.
    Failed {
        error: SubmitError,
        title: String,
        body: String,
    },
}

/// Submit the form's `(title, body)` if, and only if, the form completed.
pub fn submit_if_completed(
    state: FormState,
    settings: &Settings,
    submitter: &dyn TicketSubmitter,
) -> SubmitOutcome {
    match state.outcome() {
        Some(FormOutcome::Completed) => {}
        Some(FormOutcome::Cancelled) => return SubmitOutcome::Cancelled,
        None => {
            return SubmitOutcome::Failed {
                error: SubmitError::internal("form ended without completing"),
                title: String::new(),
                body: String::new(),
            }
        }
    }

    let (title, body) = state.into_ticket();
    match submitter.submit(settings, &title, &body) {
        Ok(result) => SubmitOutcome::Submitted(result),
        Err(error) => {
            tracing::error!(%error, "submission failed");
            SubmitOutcome::Failed { error, title, body }
        }
    }
}
