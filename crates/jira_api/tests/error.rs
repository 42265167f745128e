use reqwest::StatusCode;

use jira_api::error::parse_error_message;
use jira_api::JiraApiError;

#[test]
fn parse_error_message_joins_jira_error_lists() {
    let body = r#"{"errorMessages":["Project is archived"],"errors":{"summary":"Summary is required","components":"Component is invalid"}}"#;
    let message = parse_error_message(StatusCode::BAD_REQUEST, body);
    assert_eq!(
        message,
        "Project is archived; components: Component is invalid; summary: Summary is required"
    );
}

#[test]
fn parse_error_message_falls_back_to_raw_body() {
    let message = parse_error_message(StatusCode::INTERNAL_SERVER_ERROR, "raw failure text\n");
    assert_eq!(message, "raw failure text");
}

#[test]
fn parse_error_message_uses_reason_for_empty_bodies() {
    assert_eq!(
        parse_error_message(StatusCode::UNAUTHORIZED, ""),
        "Unauthorized"
    );
    assert_eq!(
        parse_error_message(StatusCode::FORBIDDEN, r#"{"errorMessages":[],"errors":{}}"#),
        r#"{"errorMessages":[],"errors":{}}"#
    );
}

#[test]
fn status_errors_classify_auth_failures() {
    let unauthorized = JiraApiError::Status(StatusCode::UNAUTHORIZED, "nope".into());
    assert!(unauthorized.is_auth_failure());
    assert!(!unauthorized.is_transport_failure());

    let invalid = JiraApiError::Status(StatusCode::BAD_REQUEST, "bad".into());
    assert!(!invalid.is_auth_failure());
    assert_eq!(invalid.status(), Some(StatusCode::BAD_REQUEST));
    assert_eq!(invalid.to_string(), "HTTP 400 Bad Request bad");
}
