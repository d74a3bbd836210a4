#![allow(dead_code)]

use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_feebookd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn feebookd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

pub fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

pub fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

pub fn request_err(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> String {
    let value = request(stdin, reader, id, method, params);
    assert!(
        !value.get("ok").and_then(|v| v.as_bool()).unwrap_or(true),
        "{} unexpectedly succeeded: {}",
        method,
        value
    );
    value["error"]["code"]
        .as_str()
        .expect("error code")
        .to_string()
}

pub async fn mount_action(server: &MockServer, action: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(query_param("action", action))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_login(server: &MockServer, role: &str) {
    mount_action(server, "checkLogin", json!({ "success": true, "role": role })).await;
}

pub async fn mount_data(
    server: &MockServer,
    teacher_rows: serde_json::Value,
    student_rows: serde_json::Value,
) {
    mount_action(
        server,
        "getTeacherData",
        json!({ "success": true, "rows": teacher_rows }),
    )
    .await;
    mount_action(
        server,
        "getStudentData",
        json!({ "success": true, "rows": student_rows }),
    )
    .await;
}

/// connect + login + refresh against a prepared mock service.
pub fn open_session(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    url: &str,
) -> serde_json::Value {
    request_ok(stdin, reader, "c1", "service.connect", json!({ "url": url }));
    request_ok(
        stdin,
        reader,
        "c2",
        "auth.login",
        json!({ "username": "admin", "password": "secret" }),
    );
    request_ok(stdin, reader, "c3", "data.refresh", json!({}))
}

/// One student row in raw sheet order; columns 5..8 are the legacy padding
/// the live sheet still carries.
pub fn student_row(name: &str, gender: &str, grade: &str, teacher: &str, fee: &str, date: &str) -> serde_json::Value {
    json!([name, gender, grade, teacher, fee, null, null, null, date])
}
