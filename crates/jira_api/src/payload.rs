use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Names of the fields [`IssueFields`] always sets; custom fields can't override them.
pub const RESERVED_FIELDS: [&str; 4] = ["project", "summary", "description", "issuetype"];

/// Body of `POST /rest/api/2/issue`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateIssueRequest {
    pub fields: IssueFields,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueFields {
    pub project: ProjectRef,
    pub summary: String,
    pub description: String,
    pub issuetype: IssueTypeRef,
    /// Site-specific fields (`customfield_10010`, `labels`, ...) sent verbatim.
    #[serde(flatten)]
    pub custom: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRef {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueTypeRef {
    pub name: String,
}

impl CreateIssueRequest {
    pub fn new(
        project_key: impl Into<String>,
        issue_type: impl Into<String>,
        summary: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            fields: IssueFields {
                project: ProjectRef {
                    key: project_key.into(),
                },
                summary: summary.into(),
                description: description.into(),
                issuetype: IssueTypeRef {
                    name: issue_type.into(),
                },
                custom: BTreeMap::new(),
            },
        }
    }

    /// Attach extra fields, skipping any that collide with [`RESERVED_FIELDS`].
    pub fn with_custom_fields(mut self, fields: impl IntoIterator<Item = (String, Value)>) -> Self {
        for (key, value) in fields {
            if RESERVED_FIELDS.contains(&key.as_str()) {
                continue;
            }
            self.fields.custom.insert(key, value);
        }
        self
    }
}

/// Identifier returned by a successful create-issue call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedIssue {
    #[serde(default)]
    pub id: String,
    pub key: String,
    /// REST link to the created issue.
    #[serde(rename = "self")]
    pub self_url: String,
}
