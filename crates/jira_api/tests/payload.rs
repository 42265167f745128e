use jira_api::payload::RESERVED_FIELDS;
use jira_api::{CreateIssueRequest, CreatedIssue};
use serde_json::json;

#[test]
fn request_serializes_to_jira_issue_shape() {
    let request = CreateIssueRequest::new("OPS", "Bug", "Bug in login", "Steps: ...");
    let value = serde_json::to_value(&request).expect("serialize");
    assert_eq!(
        value,
        json!({
            "fields": {
                "project": { "key": "OPS" },
                "summary": "Bug in login",
                "description": "Steps: ...",
                "issuetype": { "name": "Bug" }
            }
        })
    );
}

#[test]
fn custom_fields_are_flattened_into_fields() {
    let request = CreateIssueRequest::new("OPS", "Task", "t", "b").with_custom_fields([
        ("customfield_10010".to_string(), json!({ "value": "Platform" })),
        ("labels".to_string(), json!(["triage"])),
    ]);
    let value = serde_json::to_value(&request).expect("serialize");
    assert_eq!(value["fields"]["customfield_10010"], json!({ "value": "Platform" }));
    assert_eq!(value["fields"]["labels"], json!(["triage"]));
    assert_eq!(value["fields"]["issuetype"], json!({ "name": "Task" }));
}

#[test]
fn custom_fields_cannot_override_core_fields() {
    let request = CreateIssueRequest::new("OPS", "Bug", "real title", "b")
        .with_custom_fields([("summary".to_string(), json!("hijacked"))]);
    let value = serde_json::to_value(&request).expect("serialize");
    assert_eq!(value["fields"]["summary"], json!("real title"));
    assert!(request.fields.custom.is_empty());
    assert!(RESERVED_FIELDS.contains(&"summary"));
}

#[test]
fn created_issue_reads_key_and_self_link() {
    let created: CreatedIssue = serde_json::from_str(
        r#"{"id":"10001","key":"OPS-42","self":"https://jira.example/rest/api/2/issue/10001"}"#,
    )
    .expect("deserialize");
    assert_eq!(created.key, "OPS-42");
    assert_eq!(created.id, "10001");
    assert_eq!(
        created.self_url,
        "https://jira.example/rest/api/2/issue/10001"
    );
}
