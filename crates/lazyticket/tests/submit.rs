use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use lazyticket::settings::{parse, Settings};
use lazyticket::submit::{JiraSubmitter, SubmitError, TicketSubmitter};

/// Answers exactly one request with `status_line` and `body`, returning the raw request.
fn serve_once(status_line: &'static str, body: &'static str) -> (SocketAddr, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let request = read_request(&mut stream);
        let response = format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).expect("write response");
        request
    });
    (addr, handle)
}

fn read_request(stream: &mut impl Read) -> String {
    let mut raw = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).expect("read request");
        if n == 0 {
            break;
        }
        raw.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&raw);
        if let Some(head_end) = text.find("\r\n\r\n") {
            let length = text[..head_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if raw.len() >= head_end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&raw).into_owned()
}

fn settings_for(base: &str) -> Settings {
    let yaml = format!(
        "jira_url: {base}\nusername: me@example.com\napi_key: secret\ncreate_issue:\n  project: OPS\n"
    );
    parse(&yaml, Path::new("test.yaml")).expect("settings parse")
}

fn submitter() -> JiraSubmitter {
    JiraSubmitter::default().with_timeout(Some(Duration::from_secs(5)))
}

#[test]
fn created_issue_is_reported_with_its_self_link() {
    let (addr, server) = serve_once(
        "201 Created",
        r#"{"id":"10001","key":"OPS-42","self":"https://jira.example/rest/api/2/issue/10001"}"#,
    );
    let settings = settings_for(&format!("http://{addr}"));

    let result = submitter()
        .submit(&settings, "Bug in login", "Steps: ...")
        .expect("submission succeeds");
    assert_eq!(result.issue_key, "OPS-42");
    assert_eq!(
        result.issue_url,
        "https://jira.example/rest/api/2/issue/10001"
    );

    let request = server.join().expect("server thread");
    assert!(request.starts_with("POST /rest/api/2/issue HTTP/1.1"));
    assert!(request.contains(r#""summary":"Bug in login""#));
    assert!(request.contains(r#""issuetype":{"name":"Bug"}"#));
}

#[test]
fn rejected_credentials_become_auth_failure() {
    let (addr, server) = serve_once("401 Unauthorized", r#"{"errorMessages":["bad token"]}"#);
    let settings = settings_for(&format!("http://{addr}"));

    let error = submitter()
        .submit(&settings, "title", "")
        .expect_err("submission fails");
    assert!(matches!(error, SubmitError::AuthFailure { .. }), "{error}");
    assert!(error.to_string().contains("bad token"));
    server.join().expect("server thread");
}

#[test]
fn unreachable_server_becomes_network_failure() {
    let addr = TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .expect("reserve loopback port");
    let settings = settings_for(&format!("http://{addr}"));

    let error = submitter()
        .submit(&settings, "title", "")
        .expect_err("submission fails");
    assert!(matches!(error, SubmitError::NetworkFailure { .. }), "{error}");
}
