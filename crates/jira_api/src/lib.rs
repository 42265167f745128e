//! Transport-only Jira REST client primitives.
//!
//! This crate builds, sends and parses the single create-issue call used by the
//! `lazyticket` binary. It owns no UI and no settings-file handling; callers pass
//! a ready [`JiraApiConfig`].

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod payload;
pub mod url;

pub use client::JiraApiClient;
pub use config::JiraApiConfig;
pub use error::JiraApiError;
pub use payload::{CreateIssueRequest, CreatedIssue};
pub use reqwest::StatusCode;
pub use url::normalize_issue_url;
